//! Request/response models

pub mod alert_query;

pub use alert_query::{AlertFilter, AlertPage, AlertQuery, SortField, SortOrder};

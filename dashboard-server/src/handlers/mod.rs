//! HTTP handlers

pub mod health;
pub mod alerts;
pub mod summary;
pub mod charts;
pub mod reload;

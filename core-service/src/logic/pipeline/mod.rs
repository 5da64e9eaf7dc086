//! Pipeline Module - batch scoring orchestration
//!
//! Owns the loaded scaler/scorer pair and turns a batch of observations
//! into alerts in one all-or-nothing call.

mod engine;

pub use engine::Pipeline;

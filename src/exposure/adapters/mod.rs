//! Adapter implementations for exposure evaluation.

pub mod http;

pub use http::{HttpExposureEvaluator, HttpExposureEvaluatorConfig};

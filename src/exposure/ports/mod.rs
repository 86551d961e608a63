//! Port contracts for exposure evaluation.

pub mod evaluator;

pub use evaluator::{ExposureEvaluationError, ExposureEvaluationResult, ExposureEvaluator};

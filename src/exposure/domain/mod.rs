//! Domain values produced by exposure evaluation.

mod evaluation;

pub use evaluation::ExposureEvaluation;

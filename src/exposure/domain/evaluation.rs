//! Structured score returned by the analysis model.

use serde::{Deserialize, Serialize};

/// Brand-exposure figures extracted from a model response.
///
/// Field names match the JSON object the analysis prompt asks the model to
/// return, so this type deserializes directly from the model's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureEvaluation {
    /// Brand score, conceptually 0–100. The range is not enforced.
    pub brand_score: f64,
    /// Number of times the brand is mentioned.
    pub exposure_count: i32,
    /// Rank of the brand among all mentioned brands, 1 being the highest.
    /// Models commonly answer zero or a negative value for an unmentioned
    /// brand; those are kept as reported.
    pub exposure_rank: i32,
    /// Short free-text analysis.
    pub analysis: String,
}

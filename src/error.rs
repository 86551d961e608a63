//! Failure classification shared by the service layers.

use serde::{Deserialize, Serialize};

/// Coarse category of a service failure.
///
/// Callers at the edge of the system (an HTTP router, a CLI) use this to pick
/// a status code or exit code without matching on every error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request was malformed; nothing was persisted.
    Validation,
    /// A referenced task or prompt does not exist; nothing was persisted.
    NotFound,
    /// The request conflicts with stored state (duplicate result, terminal
    /// status); the transaction was rolled back.
    Conflict,
    /// Storage or infrastructure failure; the transaction was rolled back.
    Internal,
}

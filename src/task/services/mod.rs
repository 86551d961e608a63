//! Application services for task generation, claiming, and completion.

mod claimer;
mod generator;
mod recorder;

pub use claimer::{ClaimedPromptError, ClaimedTask, TaskClaimError, TaskClaimResult, TaskClaimer};
pub use generator::{
    TaskGenerationError, TaskGenerationReport, TaskGenerationResult, TaskGenerator,
};
pub use recorder::{
    CitationInput, CompletionReportRequest, TaskResultError, TaskResultRecorder,
    TaskResultResult,
};

//! Shared world state for task lifecycle BDD scenarios.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use geoscope::exposure::{
    domain::ExposureEvaluation,
    ports::{ExposureEvaluationError, ExposureEvaluationResult, ExposureEvaluator},
};
use geoscope::prompt::adapters::memory::InMemoryPromptRepository;
use geoscope::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::Task,
    services::{
        ClaimedTask, TaskClaimer, TaskGenerator, TaskResultError, TaskResultRecorder,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Evaluator whose score the scenario controls. `None` simulates an outage.
#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    score: Mutex<Option<f64>>,
}

impl ScriptedEvaluator {
    /// Sets the score returned by later evaluations.
    pub fn set_score(&self, score: Option<f64>) {
        if let Ok(mut slot) = self.score.lock() {
            *slot = score;
        }
    }
}

#[async_trait]
impl ExposureEvaluator for ScriptedEvaluator {
    async fn evaluate(&self, _response_text: &str) -> ExposureEvaluationResult<ExposureEvaluation> {
        let scripted = *self.score.lock().map_err(|err| {
            ExposureEvaluationError::transport(std::io::Error::other(err.to_string()))
        })?;
        let score = scripted.ok_or_else(|| {
            ExposureEvaluationError::transport(std::io::Error::other("evaluator unavailable"))
        })?;
        Ok(ExposureEvaluation {
            brand_score: score,
            exposure_count: 2,
            exposure_rank: 1,
            analysis: "scripted".to_owned(),
        })
    }
}

/// Generator type used by the BDD world.
pub type TestGenerator = TaskGenerator<InMemoryTaskRepository, InMemoryPromptRepository, DefaultClock>;
/// Claimer type used by the BDD world.
pub type TestClaimer = TaskClaimer<InMemoryTaskRepository, InMemoryPromptRepository, DefaultClock>;
/// Recorder type used by the BDD world.
pub type TestRecorder = TaskResultRecorder<InMemoryTaskRepository, ScriptedEvaluator, DefaultClock>;

/// Scenario world for task lifecycle behaviour tests.
pub struct TaskLifecycleWorld {
    pub tasks: Arc<InMemoryTaskRepository>,
    pub prompts: Arc<InMemoryPromptRepository>,
    pub evaluator: Arc<ScriptedEvaluator>,
    pub generator: TestGenerator,
    pub claimer: TestClaimer,
    pub recorder: TestRecorder,
    pub current_task: Option<Task>,
    pub last_claim: Option<Vec<ClaimedTask>>,
    pub last_report: Option<Result<Task, TaskResultError>>,
}

impl TaskLifecycleWorld {
    /// Creates a world with empty repositories and an unavailable evaluator.
    #[must_use]
    pub fn new() -> Self {
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let prompts = Arc::new(InMemoryPromptRepository::new());
        let evaluator = Arc::new(ScriptedEvaluator::default());
        let clock = Arc::new(DefaultClock);

        Self {
            generator: TaskGenerator::new(
                Arc::clone(&tasks),
                Arc::clone(&prompts),
                Arc::clone(&clock),
            ),
            claimer: TaskClaimer::new(Arc::clone(&tasks), Arc::clone(&prompts), Arc::clone(&clock)),
            recorder: TaskResultRecorder::new(Arc::clone(&tasks), Arc::clone(&evaluator), clock),
            tasks,
            prompts,
            evaluator,
            current_task: None,
            last_claim: None,
            last_report: None,
        }
    }

    /// Returns the task the scenario is working on.
    pub fn current_task(&self) -> Result<&Task, eyre::Report> {
        self.current_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))
    }
}

impl Default for TaskLifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskLifecycleWorld {
    TaskLifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

//! Periodic trigger for daily task generation.

use crate::config::SchedulerConfig;
use crate::prompt::ports::PromptRepository;
use crate::task::{ports::TaskRepository, services::TaskGenerator};
use mockable::Clock;
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

const MIN_PERIOD: Duration = Duration::from_millis(1);
const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 3600);

/// Runs [`TaskGenerator::generate_daily_tasks`] on a fixed period.
pub struct DailyTaskScheduler<T, P, C>
where
    T: TaskRepository,
    P: PromptRepository,
    C: Clock + Send + Sync,
{
    generator: TaskGenerator<T, P, C>,
    period: Duration,
    run_on_startup: bool,
}

impl<T, P, C> DailyTaskScheduler<T, P, C>
where
    T: TaskRepository,
    P: PromptRepository,
    C: Clock + Send + Sync,
{
    /// Creates a scheduler that fires every `period`, starting immediately.
    ///
    /// The period is clamped to between one millisecond and one year.
    #[must_use]
    pub fn new(generator: TaskGenerator<T, P, C>, period: Duration) -> Self {
        Self {
            generator,
            period: period.clamp(MIN_PERIOD, MAX_PERIOD),
            run_on_startup: true,
        }
    }

    /// Creates a scheduler from configuration.
    #[must_use]
    pub fn from_config(generator: TaskGenerator<T, P, C>, config: &SchedulerConfig) -> Self {
        Self::new(generator, config.interval()).with_run_on_startup(config.run_on_startup)
    }

    /// Sets whether the first run happens at startup or after one period.
    #[must_use]
    pub const fn with_run_on_startup(mut self, run_on_startup: bool) -> Self {
        self.run_on_startup = run_on_startup;
        self
    }

    /// Runs generation on schedule until `shutdown` resolves and returns the
    /// number of runs started.
    ///
    /// Generation errors are logged and never stop the schedule. A run in
    /// progress finishes before shutdown is observed.
    pub async fn run_until<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let start = if self.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + self.period
        };
        let mut ticker = time::interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            period_secs = self.period.as_secs(),
            run_on_startup = self.run_on_startup,
            "task scheduler started"
        );

        tokio::pin!(shutdown);
        let mut runs = 0_u64;
        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    runs += 1;
                    self.run_once().await;
                }
            }
        }
        info!(runs, "task scheduler stopped");
        runs
    }

    async fn run_once(&self) {
        match self.generator.generate_daily_tasks().await {
            Ok(report) if !report.is_complete() => {
                warn!(
                    failed = report.failed().len(),
                    "daily task generation left prompts without tasks"
                );
            }
            Ok(_) => {}
            Err(err) => error!(error = %err, "daily task generation failed"),
        }
    }
}

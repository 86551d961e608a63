//! Task claiming and transactional completion against `PostgreSQL`.

use super::helpers::{BoxError, PreparedRepos, clock, execute_sql, prepared_repos};
use chrono::{Duration, Utc};
use geoscope::exposure::domain::ExposureEvaluation;
use geoscope::prompt::domain::PromptId;
use geoscope::task::{
    domain::{
        Citation, CompletionRecord, PersistedTaskData, Task, TaskCompletion, TaskId, TaskResult,
        TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::DefaultClock;
use rstest::rstest;
use std::collections::HashSet;

fn pending_task_created(minutes_ago: i64) -> Task {
    let created = Utc::now() - Duration::minutes(minutes_ago);
    Task::from_persisted(PersistedTaskData {
        id: TaskId::new(),
        prompt_id: PromptId::new(),
        status: TaskStatus::Pending,
        last_run: None,
        retry_count: 0,
        created_at: created,
        updated_at: created,
    })
}

fn completion_for(task_id: TaskId, score: f64, urls: &[&str]) -> TaskCompletion {
    completion_ranked(task_id, score, 1, urls)
}

fn completion_ranked(task_id: TaskId, score: f64, rank: i32, urls: &[&str]) -> TaskCompletion {
    let now = Utc::now();
    let result = TaskResult::new(
        task_id,
        "Brand A leads the market.",
        ExposureEvaluation {
            brand_score: score,
            exposure_count: 2,
            exposure_rank: rank,
            analysis: "Brand A is first.".to_owned(),
        },
        now,
    );
    let citations = urls
        .iter()
        .zip(0_u32..)
        .map(|(url, position)| Citation::new(task_id, *url, None, position, now))
        .collect();
    TaskCompletion::completed(task_id, CompletionRecord { result, citations }, now)
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn claim_marks_pending_tasks_oldest_first(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let newer = pending_task_created(5);
    let older = pending_task_created(10);
    repos.tasks.store(&newer).await?;
    repos.tasks.store(&older).await?;

    let claimed = repos.tasks.claim_pending(Utc::now()).await?;
    let again = repos.tasks.claim_pending(Utc::now()).await?;

    let ids: Vec<TaskId> = claimed.iter().map(Task::id).collect();
    assert_eq!(ids, vec![older.id(), newer.id()]);
    assert!(claimed.iter().all(|task| task.status() == TaskStatus::Processing));
    assert!(claimed.iter().all(|task| task.last_run().is_some()));
    assert!(again.is_empty());
    let processing = repos.tasks.find_by_status(TaskStatus::Processing).await?;
    assert_eq!(processing.len(), 2);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_claims_never_share_a_task(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let mut stored = HashSet::new();
    for _ in 0..20 {
        let task = Task::new_for_prompt(PromptId::new(), &clock);
        repos.tasks.store(&task).await?;
        stored.insert(task.id());
    }

    let (left, right) = tokio::join!(
        repos.tasks.claim_pending(Utc::now()),
        repos.tasks.claim_pending(Utc::now())
    );
    let left_ids: HashSet<TaskId> = left?.iter().map(Task::id).collect();
    let right_ids: HashSet<TaskId> = right?.iter().map(Task::id).collect();

    assert!(left_ids.is_disjoint(&right_ids));
    let union: HashSet<TaskId> = left_ids.union(&right_ids).copied().collect();
    assert_eq!(union, stored);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn completion_writes_task_result_and_citations(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let task = Task::new_for_prompt(PromptId::new(), &clock);
    repos.tasks.store(&task).await?;
    repos.tasks.claim_pending(Utc::now()).await?;

    let updated = repos
        .tasks
        .record_completion(&completion_for(
            task.id(),
            81.5,
            &["https://one.example", "https://two.example"],
        ))
        .await?;

    assert_eq!(updated.status(), TaskStatus::Completed);
    let result = repos
        .tasks
        .find_result(task.id())
        .await?
        .ok_or("result missing")?;
    assert!(result.brand_score().total_cmp(&81.5).is_eq());
    assert_eq!(result.exposure_count(), 2);
    assert_eq!(result.analysis_report(), "Brand A is first.");
    let urls: Vec<String> = repos
        .tasks
        .find_citations(task.id())
        .await?
        .iter()
        .map(|citation| citation.url().to_owned())
        .collect();
    assert_eq!(urls, ["https://one.example", "https://two.example"]);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn failed_report_writes_only_the_task(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let task = Task::new_for_prompt(PromptId::new(), &clock);
    repos.tasks.store(&task).await?;

    let updated = repos
        .tasks
        .record_completion(&TaskCompletion::failed(task.id(), Utc::now()))
        .await?;

    assert_eq!(updated.status(), TaskStatus::Failed);
    assert!(updated.last_run().is_some());
    assert!(repos.tasks.find_result(task.id()).await?.is_none());
    assert!(repos.tasks.find_citations(task.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn second_completion_is_a_duplicate_result(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let task = Task::new_for_prompt(PromptId::new(), &clock);
    repos.tasks.store(&task).await?;
    repos
        .tasks
        .record_completion(&completion_for(task.id(), 40.0, &["https://first.example"]))
        .await?;

    let second = repos
        .tasks
        .record_completion(&completion_for(task.id(), 90.0, &["https://second.example"]))
        .await;

    assert!(matches!(second, Err(TaskRepositoryError::DuplicateResult(id)) if id == task.id()));
    let result = repos
        .tasks
        .find_result(task.id())
        .await?
        .ok_or("first result missing")?;
    assert!(result.brand_score().total_cmp(&40.0).is_eq());
    assert_eq!(repos.tasks.find_citations(task.id()).await?.len(), 1);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn failed_result_insert_rolls_back_the_status_change(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let task = Task::new_for_prompt(PromptId::new(), &clock);
    repos.tasks.store(&task).await?;
    execute_sql(
        &repos.pool,
        format!(
            "INSERT INTO task_results (id, task_id, response_text) VALUES ('{}', '{}', 'stale')",
            uuid::Uuid::new_v4(),
            task.id()
        ),
    )
    .await?;

    let result = repos
        .tasks
        .record_completion(&completion_for(task.id(), 10.0, &["https://c.example"]))
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::DuplicateResult(_))));
    let stored = repos
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or("task missing")?;
    assert_eq!(stored.status(), TaskStatus::Pending);
    assert!(stored.last_run().is_none());
    assert!(repos.tasks.find_citations(task.id()).await?.is_empty());
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn completed_task_rejects_a_failed_report(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let task = Task::new_for_prompt(PromptId::new(), &clock);
    repos.tasks.store(&task).await?;
    repos
        .tasks
        .record_completion(&completion_for(task.id(), 50.0, &[]))
        .await?;

    let result = repos
        .tasks
        .record_completion(&TaskCompletion::failed(task.id(), Utc::now()))
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::Transition(_))));
    let stored = repos
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or("task missing")?;
    assert_eq!(stored.status(), TaskStatus::Completed);
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn completion_for_unknown_task_is_not_found(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let missing = TaskId::new();

    let result = repos
        .tasks
        .record_completion(&TaskCompletion::failed(missing, Utc::now()))
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == missing));
    Ok(())
}

#[rstest]
#[ignore = "needs PostgreSQL: starts an embedded cluster unless GEOSCOPE_TEST_DATABASE_URL is set"]
#[tokio::test(flavor = "multi_thread")]
async fn unranked_brand_result_is_stored_as_reported(
    #[future] prepared_repos: Result<PreparedRepos, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let repos = prepared_repos.await?;
    let task = Task::new_for_prompt(PromptId::new(), &clock);
    repos.tasks.store(&task).await?;

    repos
        .tasks
        .record_completion(&completion_ranked(task.id(), 72.5, -1, &[]))
        .await?;

    let result = repos
        .tasks
        .find_result(task.id())
        .await?
        .ok_or("result missing")?;
    assert_eq!(result.exposure_rank(), -1);
    assert!(result.brand_score().total_cmp(&72.5).is_eq());
    Ok(())
}

//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use geoscope::error::FailureKind;
use geoscope::task::{domain::TaskStatus, ports::TaskRepository};
use rstest_bdd_macros::then;

#[then("{count:usize} tasks are pending")]
fn tasks_are_pending(world: &TaskLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let pending = run_async(world.tasks.find_by_status(TaskStatus::Pending))?;
    if pending.len() != count {
        return Err(eyre::eyre!(
            "expected {count} pending tasks, found {}",
            pending.len()
        ));
    }
    Ok(())
}

#[then("the claim returns {count:usize} tasks")]
fn claim_returns(world: &TaskLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let claimed = world
        .last_claim
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing claim result"))?;
    if claimed.len() != count {
        return Err(eyre::eyre!(
            "expected {count} claimed tasks, found {}",
            claimed.len()
        ));
    }
    Ok(())
}

#[then("every claimed task is processing with its prompt")]
fn claimed_tasks_processing(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let claimed = world
        .last_claim
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing claim result"))?;
    for claim in claimed {
        if claim.task().status() != TaskStatus::Processing {
            return Err(eyre::eyre!(
                "task {} is {}",
                claim.task().id(),
                claim.task().status()
            ));
        }
        let prompt = claim
            .prompt()
            .map_err(|err| eyre::eyre!("claimed task has no prompt: {err}"))?;
        if prompt.id() != claim.task().prompt_id() {
            return Err(eyre::eyre!("claimed task carries the wrong prompt"));
        }
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task_id = world.current_task()?.id();
    let stored = run_async(world.tasks.find_by_id(task_id))?
        .ok_or_else(|| eyre::eyre!("task {task_id} vanished"))?;
    if stored.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            stored.status()
        ));
    }
    Ok(())
}

#[then("the stored result has brand score {score:f64}")]
fn stored_result_score(world: &TaskLifecycleWorld, score: f64) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let result = run_async(world.tasks.find_result(task_id))?
        .ok_or_else(|| eyre::eyre!("no result stored for task {task_id}"))?;
    if result.brand_score().total_cmp(&score).is_ne() {
        return Err(eyre::eyre!(
            "expected brand score {score}, found {}",
            result.brand_score()
        ));
    }
    Ok(())
}

#[then(r#"the stored citations are "{citations}""#)]
fn stored_citations(world: &TaskLifecycleWorld, citations: String) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    let stored = run_async(world.tasks.find_citations(task_id))?;
    let urls: Vec<&str> = stored.iter().map(|citation| citation.url()).collect();
    let expected: Vec<&str> = citations.split(',').collect();
    if urls != expected {
        return Err(eyre::eyre!("expected citations {expected:?}, found {urls:?}"));
    }
    Ok(())
}

#[then("no result is stored")]
fn no_result_stored(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let task_id = world.current_task()?.id();
    if run_async(world.tasks.find_result(task_id))?.is_some() {
        return Err(eyre::eyre!("unexpected result for task {task_id}"));
    }
    if !run_async(world.tasks.find_citations(task_id))?.is_empty() {
        return Err(eyre::eyre!("unexpected citations for task {task_id}"));
    }
    Ok(())
}

#[then("the report fails with a {kind} error")]
fn report_fails_with(world: &TaskLifecycleWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = match kind.as_str() {
        "validation" => FailureKind::Validation,
        "not found" => FailureKind::NotFound,
        "conflict" => FailureKind::Conflict,
        "internal" => FailureKind::Internal,
        other => return Err(eyre::eyre!("unknown failure kind in scenario: {other}")),
    };
    let result = world
        .last_report
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing report result"))?;
    match result {
        Err(err) if err.kind() == expected => Ok(()),
        other => Err(eyre::eyre!("expected a {kind} error, got {other:?}")),
    }
}

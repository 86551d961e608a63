//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{CitationRow, NewTaskRow, TaskResultRow, TaskRow},
    schema::{task_citations, task_results, tasks},
};
use crate::prompt::domain::PromptId;
use crate::task::{
    domain::{
        Citation, CitationId, PersistedTaskData, PersistedTaskResultData, Task, TaskCompletion,
        TaskId, TaskResult, TaskResultId, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
///
/// Claims lock pending rows with `FOR UPDATE SKIP LOCKED`, so concurrent
/// claimers partition the pending set instead of blocking on each other.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let new_row = to_new_row(task)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_status(&self, status: TaskStatus) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::status.eq(status.as_str()))
                .order((tasks::created_at.asc(), tasks::id.asc()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn claim_pending(&self, claimed_at: DateTime<Utc>) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let ids = tasks::table
                    .filter(tasks::status.eq(TaskStatus::Pending.as_str()))
                    .order((tasks::created_at.asc(), tasks::id.asc()))
                    .select(tasks::id)
                    .for_update()
                    .skip_locked()
                    .load::<uuid::Uuid>(tx)?;
                if ids.is_empty() {
                    return Ok(Vec::new());
                }

                let mut rows = diesel::update(tasks::table.filter(tasks::id.eq_any(&ids)))
                    .set((
                        tasks::status.eq(TaskStatus::Processing.as_str()),
                        tasks::updated_at.eq(claimed_at),
                    ))
                    .returning(TaskRow::as_returning())
                    .get_results::<TaskRow>(tx)?;
                rows.sort_by_key(|row| (row.created_at, row.id));
                rows.into_iter().map(row_to_task).collect()
            })
        })
        .await
    }

    async fn record_completion(&self, completion: &TaskCompletion) -> TaskRepositoryResult<Task> {
        let task_id = completion.task_id();
        let reported = completion.status();
        let reported_at = completion.reported_at();
        let (result_row, citation_rows) = match completion.record() {
            Some(record) => (
                Some(to_result_row(&record.result)),
                record
                    .citations
                    .iter()
                    .map(to_citation_row)
                    .collect::<TaskRepositoryResult<Vec<_>>>()?,
            ),
            None => (None, Vec::new()),
        };

        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let row = tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .select(TaskRow::as_select())
                    .for_update()
                    .first::<TaskRow>(tx)
                    .optional()?
                    .ok_or(TaskRepositoryError::NotFound(task_id))?;
                let mut task = row_to_task(row)?;
                task.apply_report(reported, reported_at)
                    .map_err(TaskRepositoryError::Transition)?;

                diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                    .set((
                        tasks::status.eq(task.status().as_str()),
                        tasks::last_run.eq(task.last_run()),
                        tasks::updated_at.eq(task.updated_at()),
                    ))
                    .execute(tx)?;

                if let Some(result_row) = result_row {
                    diesel::insert_into(task_results::table)
                        .values(&result_row)
                        .execute(tx)
                        .map_err(|err| match err {
                            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                                TaskRepositoryError::DuplicateResult(task_id)
                            }
                            _ => TaskRepositoryError::persistence(err),
                        })?;
                }
                if !citation_rows.is_empty() {
                    diesel::insert_into(task_citations::table)
                        .values(&citation_rows)
                        .execute(tx)?;
                }
                Ok(task)
            })
        })
        .await
    }

    async fn find_result(&self, task_id: TaskId) -> TaskRepositoryResult<Option<TaskResult>> {
        self.run_blocking(move |connection| {
            let row = task_results::table
                .filter(task_results::task_id.eq(task_id.into_inner()))
                .select(TaskResultRow::as_select())
                .first::<TaskResultRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_result).transpose()
        })
        .await
    }

    async fn find_citations(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Citation>> {
        self.run_blocking(move |connection| {
            let rows = task_citations::table
                .filter(task_citations::task_id.eq(task_id.into_inner()))
                .order(task_citations::position.asc())
                .select(CitationRow::as_select())
                .load::<CitationRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_citation).collect()
        })
        .await
    }
}

fn to_i32(value: u32) -> TaskRepositoryResult<i32> {
    i32::try_from(value).map_err(TaskRepositoryError::persistence)
}

fn to_u32(value: i32) -> TaskRepositoryResult<u32> {
    u32::try_from(value).map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        prompt_id: task.prompt_id().into_inner(),
        status: task.status().as_str().to_owned(),
        last_run: task.last_run(),
        retry_count: to_i32(task.retry_count())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        prompt_id,
        status: persisted_status,
        last_run,
        retry_count,
        created_at,
        updated_at,
    } = row;

    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        prompt_id: PromptId::from_uuid(prompt_id),
        status,
        last_run,
        retry_count: to_u32(retry_count)?,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn to_result_row(result: &TaskResult) -> TaskResultRow {
    TaskResultRow {
        id: result.id().into_inner(),
        task_id: result.task_id().into_inner(),
        response_text: result.response_text().to_owned(),
        brand_score: result.brand_score(),
        exposure_count: result.exposure_count(),
        exposure_rank: result.exposure_rank(),
        analysis_report: result.analysis_report().to_owned(),
        created_at: result.created_at(),
    }
}

fn row_to_result(row: TaskResultRow) -> TaskRepositoryResult<TaskResult> {
    let TaskResultRow {
        id,
        task_id,
        response_text,
        brand_score,
        exposure_count,
        exposure_rank,
        analysis_report,
        created_at,
    } = row;

    Ok(TaskResult::from_persisted(PersistedTaskResultData {
        id: TaskResultId::from_uuid(id),
        task_id: TaskId::from_uuid(task_id),
        response_text,
        brand_score,
        exposure_count,
        exposure_rank,
        analysis_report,
        created_at,
    }))
}

fn to_citation_row(citation: &Citation) -> TaskRepositoryResult<CitationRow> {
    Ok(CitationRow {
        id: citation.id().into_inner(),
        task_id: citation.task_id().into_inner(),
        url: citation.url().to_owned(),
        title: citation.title().map(str::to_owned),
        position: to_i32(citation.position())?,
        created_at: citation.created_at(),
    })
}

fn row_to_citation(row: CitationRow) -> TaskRepositoryResult<Citation> {
    let CitationRow {
        id,
        task_id,
        url,
        title,
        position,
        created_at,
    } = row;

    Ok(Citation::from_persisted(
        CitationId::from_uuid(id),
        TaskId::from_uuid(task_id),
        url,
        title,
        to_u32(position)?,
        created_at,
    ))
}

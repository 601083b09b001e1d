use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{HistoryStore, HistoryStoreError};
use crate::domain::{ActivityOutcome, HistoryEvent, InstanceId, OrchestrationRun, RunStatus};

const UNIQUE_VIOLATION: &str = "23505";

pub struct PgHistoryStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct RunRow {
    instance_id: Uuid,
    pipeline: String,
    status: String,
    output: Option<Json<Value>>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct HistoryRow {
    sequence: i64,
    activity_name: String,
    input: Json<Value>,
    input_hash: String,
    outcome: Json<ActivityOutcome>,
    attempts: i32,
    recorded_at: DateTime<Utc>,
}

impl From<HistoryRow> for HistoryEvent {
    fn from(r: HistoryRow) -> Self {
        HistoryEvent {
            sequence: r.sequence as u64,
            activity_name: r.activity_name,
            input: r.input.0,
            input_hash: r.input_hash,
            outcome: r.outcome.0,
            attempts: r.attempts as u32,
            recorded_at: r.recorded_at,
        }
    }
}

fn query_failed(e: sqlx::Error) -> HistoryStoreError {
    HistoryStoreError::QueryFailed(e.to_string())
}

impl PgHistoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), HistoryStoreError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| HistoryStoreError::QueryFailed(e.to_string()))
    }

    async fn load_history(&self, instance_id: Uuid) -> Result<Vec<HistoryEvent>, HistoryStoreError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT sequence, activity_name, input, input_hash, outcome, attempts, recorded_at
            FROM orchestration_history
            WHERE instance_id = $1
            ORDER BY sequence ASC
            "#,
        )
        .bind(instance_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        Ok(rows.into_iter().map(HistoryEvent::from).collect())
    }

    async fn into_run(&self, row: RunRow) -> Result<OrchestrationRun, HistoryStoreError> {
        let status = row
            .status
            .parse::<RunStatus>()
            .map_err(HistoryStoreError::QueryFailed)?;
        let history = self.load_history(row.instance_id).await?;

        Ok(OrchestrationRun {
            instance_id: InstanceId::from_uuid(row.instance_id),
            pipeline: row.pipeline,
            status,
            history,
            output: row.output.map(|o| o.0),
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    async fn finish(
        &self,
        instance_id: InstanceId,
        status: RunStatus,
        output: Option<&Value>,
        error: Option<&str>,
    ) -> Result<(), HistoryStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE orchestration_runs
            SET status = $1, output = $2, error = $3, updated_at = $4
            WHERE instance_id = $5 AND status = 'running'
            "#,
        )
        .bind(status.as_str())
        .bind(output.map(Json))
        .bind(error)
        .bind(Utc::now())
        .bind(instance_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(query_failed)?;

        if result.rows_affected() == 0 {
            return match self.load_run(instance_id).await? {
                Some(_) => Err(HistoryStoreError::Sealed(instance_id)),
                None => Err(HistoryStoreError::NotFound(instance_id)),
            };
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    #[instrument(skip(self), fields(instance_id = %instance_id))]
    async fn create_run(
        &self,
        instance_id: InstanceId,
        pipeline: &str,
    ) -> Result<(), HistoryStoreError> {
        let now = Utc::now();
        let inserted = sqlx::query(
            r#"
            INSERT INTO orchestration_runs (instance_id, pipeline, status, created_at, updated_at)
            VALUES ($1, $2, 'running', $3, $3)
            "#,
        )
        .bind(instance_id.as_uuid())
        .bind(pipeline)
        .bind(now)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                let active: Option<Uuid> = sqlx::query_scalar(
                    r#"
                    SELECT instance_id FROM orchestration_runs
                    WHERE pipeline = $1 AND status = 'running'
                    "#,
                )
                .bind(pipeline)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_failed)?;

                match active {
                    Some(active) => Err(HistoryStoreError::PipelineBusy {
                        pipeline: pipeline.to_string(),
                        active: active.to_string(),
                    }),
                    None => Err(HistoryStoreError::QueryFailed(db.to_string())),
                }
            }
            Err(e) => Err(query_failed(e)),
        }
    }

    #[instrument(skip(self), fields(instance_id = %instance_id))]
    async fn load_run(
        &self,
        instance_id: InstanceId,
    ) -> Result<Option<OrchestrationRun>, HistoryStoreError> {
        let row = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT instance_id, pipeline, status, output, error, created_at, updated_at
            FROM orchestration_runs
            WHERE instance_id = $1
            "#,
        )
        .bind(instance_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed)?;

        match row {
            Some(r) => Ok(Some(self.into_run(r).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, event), fields(instance_id = %instance_id, sequence = event.sequence))]
    async fn append(
        &self,
        instance_id: InstanceId,
        event: &HistoryEvent,
    ) -> Result<(), HistoryStoreError> {
        let mut tx = self.pool.begin().await.map_err(query_failed)?;

        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM orchestration_runs WHERE instance_id = $1 FOR UPDATE",
        )
        .bind(instance_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_failed)?;

        match status.as_deref() {
            None => return Err(HistoryStoreError::NotFound(instance_id)),
            Some("running") => {}
            Some(_) => return Err(HistoryStoreError::Sealed(instance_id)),
        }

        let recorded: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orchestration_history WHERE instance_id = $1",
        )
        .bind(instance_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(query_failed)?;

        if event.sequence != recorded as u64 {
            return Err(HistoryStoreError::SequenceConflict {
                instance_id,
                expected: recorded as u64,
                actual: event.sequence,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO orchestration_history
                (instance_id, sequence, activity_name, input, input_hash, outcome, attempts, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(instance_id.as_uuid())
        .bind(event.sequence as i64)
        .bind(&event.activity_name)
        .bind(Json(&event.input))
        .bind(&event.input_hash)
        .bind(Json(&event.outcome))
        .bind(event.attempts as i32)
        .bind(event.recorded_at)
        .execute(&mut *tx)
        .await
        .map_err(query_failed)?;

        sqlx::query("UPDATE orchestration_runs SET updated_at = $1 WHERE instance_id = $2")
            .bind(Utc::now())
            .bind(instance_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(query_failed)?;

        tx.commit().await.map_err(query_failed)
    }

    #[instrument(skip(self, output), fields(instance_id = %instance_id))]
    async fn complete_run(
        &self,
        instance_id: InstanceId,
        output: &Value,
    ) -> Result<(), HistoryStoreError> {
        self.finish(instance_id, RunStatus::Completed, Some(output), None)
            .await
    }

    #[instrument(skip(self), fields(instance_id = %instance_id))]
    async fn abort_run(
        &self,
        instance_id: InstanceId,
        reason: &str,
    ) -> Result<(), HistoryStoreError> {
        self.finish(instance_id, RunStatus::Aborted, None, Some(reason))
            .await
    }

    #[instrument(skip(self))]
    async fn list_running(&self) -> Result<Vec<OrchestrationRun>, HistoryStoreError> {
        let rows = sqlx::query_as::<_, RunRow>(
            r#"
            SELECT instance_id, pipeline, status, output, error, created_at, updated_at
            FROM orchestration_runs
            WHERE status = 'running'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed)?;

        let mut runs = Vec::with_capacity(rows.len());
        for row in rows {
            runs.push(self.into_run(row).await?);
        }
        Ok(runs)
    }
}

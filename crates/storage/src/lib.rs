use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Executor, Pool, Row, Sqlite,
};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;
use uuid::Uuid;

use shared::{
    domain::{QuestionNumber, ResponseId},
    protocol::{AnswerSet, StoredResponse},
};

/// Append-only store of finished survey answer sets.
#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Persists a new record stamped with the current time. Never upserts:
    /// resubmitting the same answers creates another record.
    pub async fn insert_response(&self, answers: &AnswerSet) -> Result<StoredResponse> {
        self.insert_response_at(answers, Utc::now()).await
    }

    pub async fn insert_response_at(
        &self,
        answers: &AnswerSet,
        submitted_at: DateTime<Utc>,
    ) -> Result<StoredResponse> {
        insert_row(&self.pool, answers, submitted_at).await
    }

    /// Inserts every answer set in one transaction; either all rows land or
    /// none do. Each call still creates fresh records.
    pub async fn insert_responses_at(
        &self,
        batch: &[(AnswerSet, DateTime<Utc>)],
    ) -> Result<Vec<StoredResponse>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin survey import")?;
        let mut stored = Vec::with_capacity(batch.len());
        for (answers, submitted_at) in batch {
            stored.push(insert_row(&mut *tx, answers, *submitted_at).await?);
        }
        tx.commit().await.context("failed to commit survey import")?;
        Ok(stored)
    }

    /// All stored records, newest submission first. Records sharing a
    /// timestamp come back in reverse insertion order.
    pub async fn list_responses(&self) -> Result<Vec<StoredResponse>> {
        let rows = sqlx::query(
            "SELECT id, answers, score, submitted_at
             FROM survey_responses
             ORDER BY submitted_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list survey responses")?;

        rows.iter().map(stored_response_from_row).collect()
    }

    pub async fn count_responses(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM survey_responses")
            .fetch_one(&self.pool)
            .await
            .context("failed to count survey responses")?;
        Ok(count)
    }
}

async fn insert_row<'e, E>(
    executor: E,
    answers: &AnswerSet,
    submitted_at: DateTime<Utc>,
) -> Result<StoredResponse>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = ResponseId::generate();
    let answers_json =
        serde_json::to_string(&answers.answers).context("failed to encode answers")?;

    sqlx::query(
        "INSERT INTO survey_responses (id, answers, score, submitted_at) VALUES (?, ?, ?, ?)",
    )
    .bind(id.0.to_string())
    .bind(answers_json)
    .bind(answers.score)
    .bind(submitted_at)
    .execute(executor)
    .await
    .context("failed to insert survey response")?;

    debug!(response_id = %id, score = answers.score, "stored survey response");
    Ok(StoredResponse {
        id,
        answers: answers.answers.clone(),
        score: answers.score,
        submitted_at,
    })
}

fn stored_response_from_row(row: &SqliteRow) -> Result<StoredResponse> {
    let raw_id: String = row.try_get(0)?;
    let id = Uuid::parse_str(&raw_id)
        .with_context(|| format!("invalid response id '{raw_id}'"))?;
    let raw_answers: String = row.try_get(1)?;
    let answers: BTreeMap<QuestionNumber, String> = serde_json::from_str(&raw_answers)
        .with_context(|| format!("invalid answers stored for response {raw_id}"))?;

    Ok(StoredResponse {
        id: ResponseId(id),
        answers,
        score: row.try_get(2)?,
        submitted_at: row.try_get::<DateTime<Utc>, _>(3)?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

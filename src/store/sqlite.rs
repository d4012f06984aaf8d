// src/store/sqlite.rs

use std::{collections::HashMap, str::FromStr, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{
    Row, SqlitePool,
    migrate::MigrateError,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};

use super::{
    DeleteOutcome, ResultStore, StoreError, TestCatalog, TestStructureProvider, UpdateOutcome,
};
use crate::models::{
    result::{NewTestResult, TestResult},
    test::{AnswerOption, NewTest, Question, Test, TestSummary, TestUpdate},
};

/// SQLite-backed implementation of every storage port.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TestRow {
    id: i64,
    topic_id: i64,
    title: String,
    description: Option<String>,
    version: i64,
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: i64,
    text: String,
}

#[derive(sqlx::FromRow)]
struct OptionRow {
    id: i64,
    question_id: i64,
    text: String,
    is_correct: bool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool with foreign keys enforced on every connection.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn map_result_row(row: &SqliteRow) -> Result<TestResult, StoreError> {
    let score: String = row.try_get("score")?;
    let score = Decimal::from_str(&score)
        .map_err(|e| StoreError::Serialization(format!("invalid score '{score}': {e}")))?;

    Ok(TestResult {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        test_id: row.try_get("test_id")?,
        score,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl TestStructureProvider for SqliteStore {
    async fn get_test_structure(&self, test_id: i64) -> Result<Option<Test>, StoreError> {
        // One read transaction so the three queries see the same snapshot.
        let mut tx = self.pool.begin().await?;

        let Some(test) = sqlx::query_as::<_, TestRow>(
            "SELECT id, topic_id, title, description, version FROM tests WHERE id = ?1",
        )
        .bind(test_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, text FROM questions WHERE test_id = ?1 ORDER BY id",
        )
        .bind(test_id)
        .fetch_all(&mut *tx)
        .await?;

        let options = sqlx::query_as::<_, OptionRow>(
            r"
            SELECT o.id, o.question_id, o.text, o.is_correct
            FROM answer_options o
            JOIN questions q ON q.id = o.question_id
            WHERE q.test_id = ?1
            ORDER BY o.id
            ",
        )
        .bind(test_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut by_question: HashMap<i64, Vec<AnswerOption>> = HashMap::new();
        for o in options {
            by_question.entry(o.question_id).or_default().push(AnswerOption {
                id: o.id,
                text: o.text,
                is_correct: o.is_correct,
            });
        }

        let questions = questions
            .into_iter()
            .map(|q| Question {
                options: by_question.remove(&q.id).unwrap_or_default(),
                id: q.id,
                text: q.text,
            })
            .collect();

        Ok(Some(Test {
            id: test.id,
            topic_id: test.topic_id,
            title: test.title,
            description: test.description,
            version: test.version,
            questions,
        }))
    }
}

#[async_trait]
impl ResultStore for SqliteStore {
    async fn append_result(&self, result: NewTestResult) -> Result<TestResult, StoreError> {
        let created_at = Utc::now();

        let id = sqlx::query(
            r"
            INSERT INTO test_results (user_id, test_id, score, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(result.user_id)
        .bind(result.test_id)
        .bind(result.score.to_string())
        .bind(created_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(TestResult {
            id,
            user_id: result.user_id,
            test_id: result.test_id,
            score: result.score,
            created_at,
        })
    }

    async fn list_results(
        &self,
        user_id: i64,
        test_id: i64,
    ) -> Result<Vec<TestResult>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, test_id, score, created_at
            FROM test_results
            WHERE user_id = ?1 AND test_id = ?2
            ORDER BY id ASC
            ",
        )
        .bind(user_id)
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_result_row).collect()
    }
}

#[async_trait]
impl TestCatalog for SqliteStore {
    async fn list_tests(&self) -> Result<Vec<TestSummary>, StoreError> {
        let tests = sqlx::query_as::<_, TestSummary>(
            r"
            SELECT
                t.id, t.topic_id, t.title, t.description, t.version,
                COUNT(q.id) AS question_count
            FROM tests t
            LEFT JOIN questions q ON q.test_id = t.id
            GROUP BY t.id
            ORDER BY t.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tests)
    }

    async fn create_test(&self, test: NewTest) -> Result<Test, StoreError> {
        let mut tx = self.pool.begin().await?;

        let test_id = sqlx::query(
            "INSERT INTO tests (topic_id, title, description, version) VALUES (?1, ?2, ?3, 1)",
        )
        .bind(test.topic_id)
        .bind(&test.title)
        .bind(&test.description)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let mut questions = Vec::with_capacity(test.questions.len());
        for q in test.questions {
            let question_id = sqlx::query("INSERT INTO questions (test_id, text) VALUES (?1, ?2)")
                .bind(test_id)
                .bind(&q.text)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();

            let mut options = Vec::with_capacity(q.options.len());
            for o in q.options {
                let option_id = sqlx::query(
                    "INSERT INTO answer_options (question_id, text, is_correct) VALUES (?1, ?2, ?3)",
                )
                .bind(question_id)
                .bind(&o.text)
                .bind(o.is_correct)
                .execute(&mut *tx)
                .await?
                .last_insert_rowid();

                options.push(AnswerOption {
                    id: option_id,
                    text: o.text,
                    is_correct: o.is_correct,
                });
            }

            questions.push(Question {
                id: question_id,
                text: q.text,
                options,
            });
        }

        tx.commit().await?;

        Ok(Test {
            id: test_id,
            topic_id: test.topic_id,
            title: test.title,
            description: test.description,
            version: 1,
            questions,
        })
    }

    async fn update_test(
        &self,
        test_id: i64,
        update: TestUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        // One autocommit statement guarded by the version. Zero rows means the
        // test is gone or another writer got there first.
        let (set_description, description) = match update.description {
            Some(value) => (true, value),
            None => (false, None),
        };

        let result = sqlx::query(
            r"
            UPDATE tests SET
                title = COALESCE(?2, title),
                description = CASE WHEN ?3 THEN ?4 ELSE description END,
                topic_id = COALESCE(?5, topic_id),
                version = version + 1
            WHERE id = ?1 AND version = ?6
            ",
        )
        .bind(test_id)
        .bind(&update.title)
        .bind(set_description)
        .bind(&description)
        .bind(update.topic_id)
        .bind(update.expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current: Option<i64> =
                sqlx::query_scalar("SELECT version FROM tests WHERE id = ?1")
                    .bind(test_id)
                    .fetch_optional(&self.pool)
                    .await?;

            return Ok(match current {
                Some(current_version) => UpdateOutcome::Conflict { current_version },
                None => UpdateOutcome::NotFound,
            });
        }

        match self.get_test_structure(test_id).await? {
            Some(test) => Ok(UpdateOutcome::Updated(test)),
            None => Ok(UpdateOutcome::NotFound),
        }
    }

    async fn delete_test(&self, test_id: i64) -> Result<DeleteOutcome, StoreError> {
        let result = sqlx::query("DELETE FROM tests WHERE id = ?1")
            .bind(test_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(DeleteOutcome::NotFound);
        }
        Ok(DeleteOutcome::Deleted)
    }
}

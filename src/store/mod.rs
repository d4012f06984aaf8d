// src/store/mod.rs

//! Storage ports used by the scoring core.
//!
//! The core never talks to a pool directly: it receives something that
//! implements these traits, so the unit of work is explicit at every call.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    result::{NewTestResult, TestResult},
    test::{NewTest, Test, TestSummary, TestUpdate},
};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    /// A referenced row (user, test, topic) does not exist, or a row is
    /// still referenced and cannot be removed.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::ForeignKey(db.message().to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

/// Result of an optimistic-concurrency update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(Test),
    NotFound,
    Conflict { current_version: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Read-only access to a test's question/option structure.
#[async_trait]
pub trait TestStructureProvider: Send + Sync {
    /// Loads the test with all questions and options as one snapshot.
    ///
    /// Returns `Ok(None)` when no test has this id.
    async fn get_test_structure(&self, test_id: i64) -> Result<Option<Test>, StoreError>;
}

/// Append-only result history.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Inserts exactly one row and returns it with its assigned id.
    async fn append_result(&self, result: NewTestResult) -> Result<TestResult, StoreError>;

    /// All results of one student on one test, oldest first.
    async fn list_results(&self, user_id: i64, test_id: i64)
    -> Result<Vec<TestResult>, StoreError>;
}

/// Test management used by teachers and administrators.
#[async_trait]
pub trait TestCatalog: TestStructureProvider {
    async fn list_tests(&self) -> Result<Vec<TestSummary>, StoreError>;

    /// Inserts the test, its questions and options atomically.
    async fn create_test(&self, test: NewTest) -> Result<Test, StoreError>;

    async fn update_test(&self, test_id: i64, update: TestUpdate)
    -> Result<UpdateOutcome, StoreError>;

    async fn delete_test(&self, test_id: i64) -> Result<DeleteOutcome, StoreError>;
}

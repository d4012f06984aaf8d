// src/store/memory.rs

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;

use super::{ResultStore, StoreError, TestStructureProvider};
use crate::models::{
    result::{NewTestResult, TestResult},
    test::Test,
};

/// In-memory store for tests and prototyping.
///
/// Mirrors the relational constraints the core relies on: a result can only
/// reference a known user and a known test.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    users: HashSet<i64>,
    tests: HashMap<i64, Test>,
    results: Vec<TestResult>,
    next_result_id: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Database("store lock poisoned".to_string()))
    }

    pub fn add_user(&self, user_id: i64) -> Result<(), StoreError> {
        self.state()?.users.insert(user_id);
        Ok(())
    }

    pub fn insert_test(&self, test: Test) -> Result<(), StoreError> {
        self.state()?.tests.insert(test.id, test);
        Ok(())
    }

    pub fn result_count(&self) -> Result<usize, StoreError> {
        Ok(self.state()?.results.len())
    }
}

#[async_trait]
impl TestStructureProvider for InMemoryStore {
    async fn get_test_structure(&self, test_id: i64) -> Result<Option<Test>, StoreError> {
        Ok(self.state()?.tests.get(&test_id).cloned())
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn append_result(&self, result: NewTestResult) -> Result<TestResult, StoreError> {
        let mut state = self.state()?;
        if !state.users.contains(&result.user_id) {
            return Err(StoreError::ForeignKey(format!(
                "unknown user {}",
                result.user_id
            )));
        }
        if !state.tests.contains_key(&result.test_id) {
            return Err(StoreError::ForeignKey(format!(
                "unknown test {}",
                result.test_id
            )));
        }

        state.next_result_id += 1;
        let stored = TestResult {
            id: state.next_result_id,
            user_id: result.user_id,
            test_id: result.test_id,
            score: result.score,
            created_at: Utc::now(),
        };
        state.results.push(stored.clone());
        Ok(stored)
    }

    async fn list_results(
        &self,
        user_id: i64,
        test_id: i64,
    ) -> Result<Vec<TestResult>, StoreError> {
        Ok(self
            .state()?
            .results
            .iter()
            .filter(|r| r.user_id == user_id && r.test_id == test_id)
            .cloned()
            .collect())
    }
}

// src/state.rs

use crate::{config::Config, store::SqliteStore};
use axum::extract::FromRef;

#[derive(Clone)]
pub struct AppState {
    pub store: SqliteStore,
    pub config: Config,
}

impl FromRef<AppState> for SqliteStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

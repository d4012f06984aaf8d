// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::test::{CreateTestRequest, TestUpdate, UpdateTestRequest},
    store::{DeleteOutcome, SqliteStore, TestCatalog, TestStructureProvider, UpdateOutcome},
};

/// Retrieves a test including the answer key.
/// Teacher or admin only.
pub async fn get_test_full(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = store
        .get_test_structure(id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(test))
}

/// Creates a new test with its questions and options.
/// Teacher or admin only.
pub async fn create_test(
    State(store): State<SqliteStore>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let test = store.create_test(payload.into()).await.map_err(|e| {
        tracing::error!("Failed to create test: {:?}", e);
        AppError::from(e)
    })?;

    tracing::info!(test_id = test.id, questions = test.questions.len(), "Test created");

    Ok((StatusCode::CREATED, Json(test)))
}

/// Updates a test's header fields, guarded by `expected_version`.
/// Teacher or admin only.
pub async fn update_test(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let update = TestUpdate::from(payload);
    if update.is_empty() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    match store.update_test(id, update).await? {
        UpdateOutcome::Updated(test) => Ok(Json(test)),
        UpdateOutcome::NotFound => Err(AppError::NotFound("Test not found".to_string())),
        UpdateOutcome::Conflict { current_version } => Err(AppError::Conflict(format!(
            "Test was modified concurrently; current version is {}",
            current_version
        ))),
    }
}

/// Deletes a test with its questions and options.
/// Teacher or admin only. Tests with recorded results cannot be deleted.
pub async fn delete_test(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    match store.delete_test(id).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::NotFound => Err(AppError::NotFound("Test not found".to_string())),
    }
}

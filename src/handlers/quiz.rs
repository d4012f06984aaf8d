// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{result::SubmitTestRequest, test::PublicTest},
    services::submission::submit_answers,
    store::{ResultStore, SqliteStore, TestCatalog, TestStructureProvider},
    utils::jwt::Claims,
};

/// Lists all tests with their question counts.
pub async fn list_tests(State(store): State<SqliteStore>) -> Result<impl IntoResponse, AppError> {
    let tests = store.list_tests().await.map_err(|e| {
        tracing::error!("Failed to list tests: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(tests))
}

/// Retrieves a test with its questions and options.
/// Correctness flags are stripped via `PublicTest`.
pub async fn get_test(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = store
        .get_test_structure(id)
        .await?
        .ok_or(AppError::NotFound("Test not found".to_string()))?;

    Ok(Json(PublicTest::from(test)))
}

/// Submits a student's answers and calculates the score.
///
/// * Takes the student ID from the verified token.
/// * Scores against the stored answer key (percentage of all questions).
/// * Appends a new row to `test_results`; earlier attempts are kept.
pub async fn submit_test(
    State(store): State<SqliteStore>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let outcome = submit_answers(&store, student_id, &req).await.map_err(|e| {
        tracing::warn!(student_id, test_id = req.test_id, "Submission rejected: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(outcome))
}

/// Lists the calling student's results for one test, oldest first.
pub async fn list_my_results(
    State(store): State<SqliteStore>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id()?;

    let results = store.list_results(student_id, test_id).await?;

    Ok(Json(results))
}

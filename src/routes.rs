// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, staff_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * `/api/tests`: browsing for every authenticated role, submission and
///   result history for students.
/// * `/api/admin/tests`: test management for teachers and admins.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let test_routes = Router::new()
        .route("/", get(quiz::list_tests))
        .route("/{id}", get(quiz::get_test))
        // Student-only routes
        .merge(
            Router::new()
                .route("/submit", post(quiz::submit_test))
                .route("/{id}/results", get(quiz::list_my_results))
                .layer(middleware::from_fn(student_middleware)),
        )
        .layer(auth.clone());

    let admin_routes = Router::new()
        .route("/tests", post(admin::create_test))
        .route(
            "/tests/{id}",
            get(admin::get_test_full)
                .put(admin::update_test)
                .delete(admin::delete_test),
        )
        // Double middleware protection: Auth first, then Staff check
        .layer(middleware::from_fn(staff_middleware))
        .layer(auth);

    Router::new()
        .nest("/api/tests", test_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

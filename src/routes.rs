// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, ai, analytics, image_quiz, quiz, stats, users},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quiz, image-quiz, stats, ai, analytics, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (storage, profile store, tutor gateway, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://localhost:5173".parse().unwrap(),
        "http://127.0.0.1:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/categories", get(quiz::get_categories))
        .route("/questions", get(quiz::list_questions))
        .route("/random", get(quiz::random_question))
        .route("/record-answer", post(quiz::record_answer));

    let image_quiz_routes = Router::new()
        .route("/categories", get(image_quiz::get_categories))
        .route("/random", get(image_quiz::random_question))
        .route("/record-answer", post(image_quiz::record_answer));

    let stats_routes = Router::new()
        .route("/user/{user_id}", get(stats::user_stats))
        .route("/leaderboard", get(stats::leaderboard));

    let analytics_routes = Router::new().route("/user", get(analytics::user_analytics));

    let admin_routes = Router::new()
        .route("/questions", post(admin::create_question))
        .route("/image-questions", post(admin::create_image_question));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        .nest("/api/image-quiz", image_quiz_routes)
        .nest("/api/stats", stats_routes)
        .nest("/api/analytics", analytics_routes)
        .nest("/api/admin", admin_routes)
        .route("/api/ai/ask", post(ai::ask))
        .route("/api/categories", get(analytics::categories))
        .route("/api/users", post(users::create_user))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

//! Route definitions for the Orion server.

use axum::{
    Router, middleware,
    routing::{get, post}
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer
};

use crate::auth;
use crate::handlers::{self, cv, habitica, journal, memory, narrative, opportunity};
use crate::state::AppState;

/// Creates the Axum router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Session-protected routes
    let protected = Router::new()
        .route("/journal/save", post(journal::save_journal))
        .route("/journal/list", get(journal::list_journal))
        .route(
            "/opportunity/{id}/evaluation",
            post(opportunity::evaluate_opportunity)
        )
        .route("/memory/generate-embeddings", post(memory::generate))
        .route("/memory/upsert", post(memory::upsert))
        .route("/memory/search", post(memory::search))
        .route("/habitica/tasks", post(habitica::list_tasks))
        .route("/habitica/tasks/score", post(habitica::score_task))
        .route("/habitica/todo", post(habitica::create_todo))
        .route("/narrative/milestones/reorder", post(narrative::reorder))
        .route("/cv/suggest", post(cv::suggest))
        .route("/cv/score", post(cv::score))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

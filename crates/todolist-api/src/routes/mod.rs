use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers, state::ApiState};

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))

        // Task endpoints
        .route("/tasks", get(handlers::task::search_tasks))
        .route("/tasks", post(handlers::task::create_task))
        .route("/tasks/:task_id", get(handlers::task::get_task))
        .route("/tasks/:task_id", put(handlers::task::update_task))
        .route("/tasks/:task_id", delete(handlers::task::delete_task))

        // Task list endpoints
        .route("/lists", get(handlers::list::my_lists))
        .route("/lists", post(handlers::list::create_list))
        .route("/lists/:list_id", get(handlers::list::get_list))
        .route("/lists/:list_id", put(handlers::list::update_list))
        .route("/lists/:list_id", delete(handlers::list::delete_list))
        .route("/lists/:list_id/tasks", get(handlers::list::list_tasks))

        // Add state
        .with_state(state)

        // Request tracing and CORS
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

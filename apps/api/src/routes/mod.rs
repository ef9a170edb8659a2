pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::templates::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/templates",
            get(handlers::handle_list_templates).post(handlers::handle_create_template),
        )
        .route("/templates/seed", post(handlers::handle_seed_templates))
        .route(
            "/templates/usage/:name",
            post(handlers::handle_record_usage),
        )
        .route(
            "/templates/:id",
            get(handlers::handle_get_template)
                .put(handlers::handle_update_template)
                .delete(handlers::handle_delete_template),
        )
        .with_state(state)
}

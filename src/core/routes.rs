// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(crate::handlers::health::health_handler))

        // Session endpoints (session create requires the panel API key)
        .route("/session", post(crate::handlers::session::create_handler))
        .route("/session/destroy", post(crate::handlers::session::destroy_handler))

        // Account endpoints (require a session cookie)
        .route("/user/list", get(crate::handlers::list_user::list_handler))
        .route(
            "/user/edit",
            get(crate::handlers::edit_user::show_handler)
                .post(crate::handlers::edit_user::save_handler),
        )

        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)

        .with_state(state)
}

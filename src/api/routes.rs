use crate::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(crate::api::handlers::chat::chat))
        .route(
            "/memory/{user_id}",
            get(crate::api::handlers::chat::get_user_memory),
        )
        .route("/health", get(crate::api::handlers::health::health))
        .route("/openapi.json", get(crate::api::openapi_doc))
}

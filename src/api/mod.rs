//! HTTP API Handlers and Routes
//!
//! Thin transport layer over the turn processor, built on the Axum web
//! framework. The core contract is a plain string reply; this module only
//! wraps it for HTTP delivery.
//!
//! # API Endpoints
//!
//! - `POST /api/chat` - Process one conversational turn
//! - `GET /api/memory/{user_id}` - Inspect the stored profile for a user
//! - `GET /api/health` - Health check endpoint
//! - `GET /api/openapi.json` - OpenAPI document for this surface

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::OpenApi;

/// OpenAPI document for the HTTP surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::chat::chat,
        handlers::chat::get_user_memory,
        handlers::health::health,
    ),
    components(schemas(
        crate::types::ChatRequest,
        crate::types::ChatResponse,
        crate::types::UserProfile,
    ))
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_doc() -> axum::Json<utoipa::openapi::OpenApi> {
    axum::Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_covers_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/chat", "/api/memory/{user_id}", "/api/health"] {
            assert!(
                doc.paths.paths.contains_key(path),
                "missing path {}",
                path
            );
        }
        assert!(doc.components.is_some());
    }
}

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;

pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .as_deref()
        .map(|list| list.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();

    // No (valid) origins configured: wildcard, suitable for development.
    let layer = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    };

    // Chat requests carry `workspace_id` / `isRealEstateAgent` custom headers,
    // and clients need `Content-Disposition` to name the PDF download.
    layer
        .allow_headers(Any)
        .allow_methods(Any)
        .expose_headers([axum::http::header::CONTENT_DISPOSITION])
}

//! Middleware
//!
//! Request tracing and CORS for the command API.

use std::time::Duration;

use axum::http::header::{InvalidHeaderValue, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// One span per request with method, URI and status.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

// Configures CORS (Cross-Origin Resource Sharing)
// The client is usually served from a different origin than the API.
pub fn cors_policy(allowed_origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = match allowed_origin {
        Some(origin) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
        None => AllowOrigin::any(),
    };
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unencodable_origin() {
        assert!(cors_policy(Some("http://ok.example")).is_ok());
        assert!(cors_policy(Some("bad\norigin")).is_err());
        assert!(cors_policy(None).is_ok());
    }
}

use axum::http::{HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Comma-separated list of allowed origins.
pub const CORS_ALLOWED_ORIGIN_VAR: &str = "CORS_ALLOWED_ORIGIN";

/// CORS layer restricted to `allowed_origins`.
///
/// Allows the verbs the catalog API serves, JSON content headers and a one
/// hour preflight cache.
pub fn create_cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

/// Allows any origin.
pub fn create_permissive_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}

/// Parse a comma-separated origin list, skipping blank entries.
pub fn parse_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid {} value '{}': {}", CORS_ALLOWED_ORIGIN_VAR, s, e),
                )
            })
        })
        .collect()
}

/// Build the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// Unset or blank means any origin is accepted, which is how the catalog
/// service has always been deployed. A set but unparsable value is an error.
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    let raw = std::env::var(CORS_ALLOWED_ORIGIN_VAR).unwrap_or_default();
    let origins = parse_origins(&raw)?;

    if origins.is_empty() {
        warn!("{} not set, allowing any origin", CORS_ALLOWED_ORIGIN_VAR);
        return Ok(create_permissive_cors_layer());
    }

    info!("CORS configured with allowed origins: {}", raw);
    Ok(create_cors_layer(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = parse_origins("http://localhost:3000, ,https://shop.example.com").unwrap();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1], "https://shop.example.com");
    }

    #[test]
    fn test_parse_origins_rejects_invalid_header() {
        let err = parse_origins("http://ok.example.com,bad\nvalue").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_cors_layer_from_env_unset_is_permissive() {
        temp_env::with_var(CORS_ALLOWED_ORIGIN_VAR, None::<&str>, || {
            assert!(cors_layer_from_env().is_ok());
        });
    }

    #[test]
    fn test_cors_layer_from_env_invalid_fails() {
        temp_env::with_var(CORS_ALLOWED_ORIGIN_VAR, Some("bad\u{7f}origin"), || {
            assert!(cors_layer_from_env().is_err());
        });
    }
}

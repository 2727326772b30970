pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod bom;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use bom::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backend.poll_interval_ms, 2000);
        assert_eq!(config.backend.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.layout.horizontal_spacing, 250.0);
        assert_eq!(config.layout.vertical_spacing, 180.0);
        assert_eq!(config.export.description_max_chars, 40);
    }

    #[test]
    fn test_error_handling() {
        let error = BomForgeError::validation("test_field", "test message");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.http_status_code(), 400);
        assert!(!error.is_retryable());

        let error = BomForgeError::conversion_failed("conv-1", "Parser crashed");
        assert_eq!(error.http_status_code(), 422);
        assert!(!error.is_retryable());
        assert_eq!(error.to_string(), "Conversion conv-1 failed: Parser crashed");

        assert!(BomForgeError::backend_status(503, "unavailable").is_retryable());
        assert!(!BomForgeError::backend_status(404, "missing").is_retryable());
    }

    #[test]
    fn test_backend_answers_are_not_retryable() {
        let rejected = BomForgeError::backend_rejected("Conversion is locked");
        assert_eq!(rejected.error_code(), "BACKEND_REJECTED");
        assert!(!rejected.is_retryable());

        let garbled = BomForgeError::invalid_response("expected value at line 1");
        assert_eq!(garbled.error_code(), "INVALID_RESPONSE");
        assert_eq!(garbled.http_status_code(), 502);
        assert!(!garbled.is_retryable());

        assert!(BomForgeError::backend("connection reset").is_retryable());
    }

    #[test]
    fn test_error_response_from_error() {
        let response = ErrorResponse::from(BomForgeError::not_found("conversion conv-9"));
        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.message, "Not found: conversion conv-9");
    }
}

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BomForgeError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Backend rejected request: {message}")]
    BackendRejected { message: String },

    #[error("Invalid backend response: {message}")]
    InvalidResponse { message: String },

    #[error("Backend returned HTTP {status}: {message}")]
    BackendStatus { status: u16, message: String },

    #[error("Conversion {conversion_id} failed: {message}")]
    ConversionFailed { conversion_id: String, message: String },

    #[error("Timed out: {message}")]
    Timeout { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BomForgeError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Envelope answered with `success: false`
    pub fn backend_rejected(message: impl Into<String>) -> Self {
        Self::BackendRejected {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn backend_status(status: u16, message: impl Into<String>) -> Self {
        Self::BackendStatus {
            status,
            message: message.into(),
        }
    }

    pub fn conversion_failed(conversion_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConversionFailed {
            conversion_id: conversion_id.into(),
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Export { .. } => "EXPORT_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Backend { .. } => "BACKEND_ERROR",
            Self::BackendRejected { .. } => "BACKEND_REJECTED",
            Self::InvalidResponse { .. } => "INVALID_RESPONSE",
            Self::BackendStatus { .. } => "BACKEND_STATUS_ERROR",
            Self::ConversionFailed { .. } => "CONVERSION_FAILED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::Export { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Backend { .. } => 502,
            Self::BackendRejected { .. } => 502,
            Self::InvalidResponse { .. } => 502,
            Self::BackendStatus { .. } => 502,
            Self::ConversionFailed { .. } => 422,
            Self::Timeout { .. } => 504,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { .. } | Self::Timeout { .. } => true,
            Self::BackendStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type BomForgeResult<T> = Result<T, BomForgeError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<BomForgeError> for ErrorResponse {
    fn from(error: BomForgeError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }
}

// Conversion from common error types
impl From<reqwest::Error> for BomForgeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::timeout(error.to_string());
        }
        match error.status() {
            Some(status) => Self::backend_status(status.as_u16(), error.to_string()),
            None => Self::backend(error.to_string()),
        }
    }
}

impl From<serde_json::Error> for BomForgeError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<csv::Error> for BomForgeError {
    fn from(error: csv::Error) -> Self {
        Self::export(error.to_string())
    }
}

impl From<std::io::Error> for BomForgeError {
    fn from(error: std::io::Error) -> Self {
        Self::internal(error.to_string())
    }
}

impl From<config::ConfigError> for BomForgeError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}

use axum::{
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use bomforge_utils::{BomForgeError, ErrorResponse};
use tracing::{error, warn};

/// Handler error rendered as an `ErrorResponse` body
#[derive(Debug)]
pub struct ApiError(pub BomForgeError);

impl From<BomForgeError> for ApiError {
    fn from(error: BomForgeError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

/// Logs every failed response with its method and path
pub async fn error_handling_middleware(request: Request<axum::body::Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        error!(%method, %path, status = status.as_u16(), "Request failed");
    } else if status.is_client_error() {
        warn!(%method, %path, status = status.as_u16(), "Request rejected");
    }

    response
}

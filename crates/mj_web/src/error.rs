use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mj_core::{Error, ErrorKind};
use mj_site::render::ErrorPanel;
use serde_json::json;

/// Handler failures, rendered as `{"error": {...}}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Site(#[from] Error),

    /// A transport failure already shown as an error panel.
    #[error("{}", .0.message)]
    Reported(ErrorPanel),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Transport => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, panel) = match self {
            ApiError::Site(err) => {
                let kind = err.kind();
                if kind == ErrorKind::Transport {
                    tracing::error!("Upstream error: {err}");
                }
                let error_type = match kind {
                    ErrorKind::NotFound => "notFound",
                    ErrorKind::Validation => "validation",
                    ErrorKind::Transport => "transport",
                };
                (Self::status(kind), error_type, err.to_string(), None)
            }
            ApiError::Reported(panel) => (StatusCode::BAD_GATEWAY, "transport", panel.message.clone(), Some(panel)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg, None),
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
                "dismissible": true,
                "panel": panel,
            }
        });

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(error: ApiError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_message_is_verbatim() {
        let (status, body) = body_of(Error::validation("Моля, изберете поне една статия").into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["type"], "validation");
        assert_eq!(body["error"]["message"], "Моля, изберете поне една статия");
        assert_eq!(body["error"]["dismissible"], true);
    }

    #[tokio::test]
    async fn test_not_found_and_transport() {
        let (status, _) = body_of(Error::NotFound("Статията не е намерена".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = body_of(Error::Storage("connection reset".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["message"], "Storage error: connection reset");
        assert!(body["error"]["panel"].is_null());
    }

    #[tokio::test]
    async fn test_reported_panel_is_included() {
        let panel = ErrorPanel::from_error(7, "Грешка", &Error::Storage("down".into()));
        let (status, body) = body_of(ApiError::Reported(panel)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["panel"]["id"], 7);
        assert_eq!(body["error"]["panel"]["retry"], true);
    }
}

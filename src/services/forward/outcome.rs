use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// Normalized outcome of one forwarded call.
///
/// Callers only look at this shape; the HTTP method that produced it never
/// changes how it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ForwardResult {
    /// Upstream answered 2xx.
    Success { body: Value },
    /// Upstream answered with anything else (3xx included, redirects are not followed).
    UpstreamError { status: StatusCode, body: Value },
    /// No upstream status exists: DNS, connect, timeout, broken body.
    TransportFailed { error: String },
}

impl ForwardResult {
    pub fn from_upstream(status: StatusCode, text: &str) -> Self {
        if status.is_success() {
            Self::Success {
                body: success_body(text),
            }
        } else {
            Self::UpstreamError {
                status,
                body: error_body(text),
            }
        }
    }

    pub fn transport_failed(error: impl Into<String>) -> Self {
        Self::TransportFailed {
            error: error.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Success { .. } => StatusCode::OK,
            Self::UpstreamError { status, .. } => *status,
            Self::TransportFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Success { .. } => Some(StatusCode::OK),
            Self::UpstreamError { status, .. } => Some(*status),
            Self::TransportFailed { .. } => None,
        }
    }

    pub fn into_body(self) -> Value {
        match self {
            Self::Success { body } | Self::UpstreamError { body, .. } => body,
            Self::TransportFailed { error } => json!({ "error": error }),
        }
    }
}

impl IntoResponse for ForwardResult {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.into_body())).into_response()
    }
}

fn success_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return json!({ "message": "Success", "data": null });
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "message": "Success", "data": text }))
}

fn error_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "error": text }))
}

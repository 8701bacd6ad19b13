//! API error responses.
//!
//! JSON endpoints answer failures with a structured body carrying a
//! stable code: `{"error":{"code":"...","message":"..."}}`. Range
//! rejections (416) deliberately carry no body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error that maps to an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL",
            message: message.into(),
        }
    }

    /// 416 with an empty body.
    pub fn range_not_satisfiable() -> Self {
        Self {
            status: StatusCode::RANGE_NOT_SATISFIABLE,
            code: "RANGE_NOT_SATISFIABLE",
            message: String::new(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status == StatusCode::RANGE_NOT_SATISFIABLE {
            return self.status.into_response();
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ottstream_common::Error> for ApiError {
    fn from(err: ottstream_common::Error) -> Self {
        use ottstream_common::Error;
        match err {
            Error::NotFound(msg) => Self::not_found(msg),
            Error::Unauthorized => Self::unauthorized("Authorization required"),
            Error::InvalidInput(msg) => Self::bad_request(msg),
            Error::Database(msg) => {
                tracing::error!("database error: {}", msg);
                Self::internal("Database error")
            }
            Error::Io(e) => {
                tracing::error!("io error: {}", e);
                Self::internal("IO error")
            }
            Error::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                Self::internal("Internal error")
            }
        }
    }
}

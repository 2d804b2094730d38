//! Error mapping and response bodies.
//!
//! Every failure leaves the API as `{ "error": "<code>", "message": "<text>" }`.
//! Reference failures use the field code (`customer_error`, ...) so clients can
//! tell which reference did not resolve.

use crate::{core::pagination::Page, errors::Error};
use axum::{
    Json,
    extract::{FromRequest, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::borrow::Cow;
use tracing::{debug, error};

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: Cow<'a, str>,
    message: String,
}

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::Reference { .. }
            | Self::Duplicate { .. }
            | Self::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } | Self::Token(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::IntConversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in the `error` field.
    #[must_use]
    pub fn code(&self) -> Cow<'static, str> {
        match self {
            Self::Validation { .. } => Cow::Borrowed("validation_error"),
            Self::InvalidAmount { .. } => Cow::Borrowed("invalid_amount"),
            Self::Reference { field } => Cow::Borrowed(field.code()),
            Self::Duplicate { field } => Cow::Owned(format!("{field}_error")),
            Self::InsufficientFunds { .. } => Cow::Borrowed("insufficient_balance"),
            Self::Unauthorized { .. } | Self::Token(_) => Cow::Borrowed("unauthorized"),
            Self::Forbidden { .. } => Cow::Borrowed("forbidden"),
            Self::NotFound { .. } => Cow::Borrowed("not_found"),
            _ => Cow::Borrowed("internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            debug!(error = %self, status = status.as_u16(), "request rejected");
            self.to_string()
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// JSON body extractor whose rejections become [`Error::Validation`].
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// List response: `{ "total_count": n, "<entity>_items": [...] }`.
#[derive(Debug)]
pub struct ListBody<T> {
    key: &'static str,
    page: Page<T>,
}

impl<T> ListBody<T> {
    pub const fn new(key: &'static str, page: Page<T>) -> Self {
        Self { key, page }
    }
}

impl<T: Serialize> Serialize for ListBody<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("total_count", &self.page.total_count)?;
        map.serialize_entry(self.key, &self.page.items)?;
        map.end()
    }
}

impl<T: Serialize> IntoResponse for ListBody<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Body returned by hard deletes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Deleted {
    pub deleted_count: u64,
}

impl Deleted {
    pub const ONE: Self = Self { deleted_count: 1 };
}

//! Mapping of pipeline errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sweeper_core::table::TableError;
use sweeper_core::SweeperError;

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// A pipeline error on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub SweeperError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SweeperError::FileNotLoaded { .. }
            | SweeperError::Table(TableError::ColumnNotFound { .. }) => StatusCode::NOT_FOUND,
            SweeperError::Table(TableError::UnsupportedFormat { .. }) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            SweeperError::Table(TableError::Serialize(_) | TableError::Io(_))
            | SweeperError::Io(_)
            | SweeperError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SweeperError::Table(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<SweeperError> for ApiError {
    fn from(err: SweeperError) -> Self {
        Self(err)
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }
        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

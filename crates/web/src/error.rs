use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use structure::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Data(DataError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Data(DataError::InvalidFilter(_)) => StatusCode::BAD_REQUEST,
            Self::Data(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Data(err) => {
                crate::metrics::record_error(err);
                if status.is_server_error() {
                    tracing::error!(error = %err, "data error");
                } else {
                    tracing::info!(error = %err, "rejected request");
                }
            }
            Self::Template(err) => tracing::error!(error = %err, "template render failed"),
        }
        (status, self.to_string()).into_response()
    }
}

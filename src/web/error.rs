use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::parser::Dataset;

/// Failures while turning an upload into a results page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Please upload both datasets: the {0} file is missing or empty.")]
    MissingUpload(Dataset),
    #[error("Could not read the upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Could not process the uploaded CSV: {0:#}")]
    Parse(anyhow::Error),
    #[error("Failed to render page: {0:#}")]
    Render(anyhow::Error),
    #[error("Report task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::MissingUpload(_) => StatusCode::BAD_REQUEST,
            PageError::Multipart(e) => e.status(),
            PageError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PageError::Render(_) | PageError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Plain-text fallback, used when the page itself cannot be rendered.
impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            PageError::Render(e) => {
                let detail = format!("{e:#}");
                tracing::error!(error = %detail, "Page render failed");
                "An internal error occurred".to_string()
            }
            PageError::Task(e) => {
                tracing::error!(error = %e, "Report task failed");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };
        (status, message).into_response()
    }
}

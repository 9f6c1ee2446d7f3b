use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use bytes::Bytes;
use tracing::{info, warn};

use super::AppState;
use super::error::PageError;
use crate::parser::Dataset;
use crate::pipeline::{Report, build_report};

pub(super) async fn upload_page(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let html = state
        .renderer
        .render_upload_page(None, None)
        .map_err(PageError::Render)?;
    Ok(Html(html))
}

/// Builds a report from the `mj` and `gva` file fields and renders it under
/// the upload form. Failures re-render the form with the error as a notice.
pub(super) async fn upload_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, PageError> {
    match report_from_upload(multipart).await {
        Ok(report) => {
            info!(rows = report.rows.len(), "Rendered uploaded datasets");
            let html = state
                .renderer
                .render_upload_page(None, Some(&report))
                .map_err(PageError::Render)?;
            Ok(Html(html).into_response())
        }
        Err(e @ PageError::Task(_)) => Err(e),
        Err(e) => {
            warn!(error = %e, "Upload rejected");
            let notice = e.to_string();
            let html = state
                .renderer
                .render_upload_page(Some(&notice), None)
                .map_err(PageError::Render)?;
            Ok((e.status(), Html(html)).into_response())
        }
    }
}

async fn report_from_upload(mut multipart: Multipart) -> Result<Report, PageError> {
    let mut mj: Option<Bytes> = None;
    let mut gva: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "mj" => mj = Some(field.bytes().await?),
            "gva" => gva = Some(field.bytes().await?),
            _ => {}
        }
    }

    let mj = mj
        .filter(|b| !b.is_empty())
        .ok_or(PageError::MissingUpload(Dataset::MotherJones))?;
    let gva = gva
        .filter(|b| !b.is_empty())
        .ok_or(PageError::MissingUpload(Dataset::Gva))?;

    // CPU-bound for large uploads
    let report = tokio::task::spawn_blocking(move || build_report(&mj, &gva)).await?;
    report.map_err(PageError::Parse)
}

pub(super) async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

//! Upload page: build the report from two CSVs sent through a browser form.
//!
//! Each request is handled on its own; the server keeps no session state.

mod error;
mod handlers;

pub use error::PageError;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use crate::output::HtmlRenderer;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub struct WebConfig {
    pub bind: SocketAddr,
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    renderer: Arc<HtmlRenderer>,
}

impl AppState {
    pub fn new() -> Result<Self> {
        Ok(Self {
            renderer: Arc::new(HtmlRenderer::new()?),
        })
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::upload_page))
        .route("/report", get(handlers::upload_page).post(handlers::upload_report))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Serves the upload page until Ctrl+C.
#[tracing::instrument(skip_all, fields(bind = %config.bind))]
pub async fn serve(config: WebConfig) -> Result<()> {
    let app = router(AppState::new()?, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(addr = %listener.local_addr()?, "Upload page listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    const MJ_CSV: &str = "Date,State,School\n2019-01-01,Ohio,TRUE\n";
    const GVA_CSV: &str = "Incident Date,State,School\n\"June 1, 2019\",Ohio,No\n";
    const BOUNDARY: &str = "report-test-boundary";

    fn app() -> Router {
        router(AppState::new().unwrap(), DEFAULT_MAX_UPLOAD_BYTES)
    }

    fn upload_request(parts: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        for (name, content) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.csv\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::builder()
            .method("POST")
            .uri("/report")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn upload_page_shows_empty_form() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"name="mj""#));
        assert!(html.contains(r#"name="gva""#));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn upload_renders_table_and_chart() {
        let response = app()
            .oneshot(upload_request(&[("mj", MJ_CSV), ("gva", GVA_CSV)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains(r#"class="dataframe mass-shooting-table""#));
        assert!(html.contains("<td>Ohio</td>"));
        assert!(html.contains(r#"<td class="school">★</td>"#));
        assert!(html.contains("Plotly.newPlot"));
        // The form stays on the page for another upload
        assert!(html.contains(r#"name="mj""#));
    }

    #[tokio::test]
    async fn upload_missing_dataset_is_bad_request() {
        let response = app()
            .oneshot(upload_request(&[("mj", MJ_CSV)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("GVA file is missing or empty"));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[tokio::test]
    async fn upload_empty_file_is_bad_request() {
        let response = app()
            .oneshot(upload_request(&[("mj", ""), ("gva", GVA_CSV)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("MJ file is missing or empty"));
    }

    #[tokio::test]
    async fn upload_over_body_limit_is_rejected() {
        let app = router(AppState::new().unwrap(), 64);

        let response = app
            .oneshot(upload_request(&[("mj", MJ_CSV), ("gva", GVA_CSV)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let html = body_text(response).await;
        assert!(html.contains("Could not read the upload"));
        assert!(html.contains(r#"class="notice""#));
        assert!(!html.contains("Plotly.newPlot"));
    }

    #[tokio::test]
    async fn upload_bad_csv_is_unprocessable() {
        let bad_gva = "Incident Date,State\nnot a date,Ohio\n";
        let response = app()
            .oneshot(upload_request(&[("mj", MJ_CSV), ("gva", bad_gva)]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("cannot parse date"));
        assert!(html.contains(r#"class="notice""#));
    }
}

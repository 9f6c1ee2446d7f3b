//! Dataset retrieval over HTTP or from the local filesystem.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

/// Downloads `url` and returns the response body.
///
/// # Errors
///
/// Fails with `Failed to download CSV from <url>` when the server answers with
/// anything but `200 OK`, and propagates transport errors unchanged.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if status != reqwest::StatusCode::OK {
        return Err(anyhow!("Failed to download CSV from {url} (HTTP {status})"));
    }

    let bytes = resp.bytes().await?;
    debug!(url, bytes = bytes.len(), "Download complete");
    Ok(bytes.to_vec())
}

/// Loads a dataset from a URL (anything starting with `http`) or a local path.
#[tracing::instrument(skip(client))]
pub async fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    if source.starts_with("http") {
        fetch_bytes(client, source).await
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read CSV from {source}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::net::SocketAddr;

    async fn spawn_server() -> SocketAddr {
        let app = Router::new()
            .route("/data.csv", get(|| async { "Date,State\n2020-01-01,Ohio\n" }))
            .route(
                "/gone.csv",
                get(|| async { (StatusCode::NOT_FOUND, "no such file") }),
            )
            .route(
                "/partial.csv",
                get(|| async {
                    (StatusCode::PARTIAL_CONTENT, "Date,State\n2020-01-01,Oh")
                }),
            )
            .route("/empty.csv", get(|| async { StatusCode::NO_CONTENT }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_fetch_bytes_success() {
        let addr = spawn_server().await;
        let client = BasicClient::new().unwrap();

        let bytes = fetch_bytes(&client, &format!("http://{addr}/data.csv"))
            .await
            .unwrap();

        assert_eq!(bytes, b"Date,State\n2020-01-01,Ohio\n");
    }

    #[tokio::test]
    async fn test_fetch_bytes_non_success_names_url() {
        let addr = spawn_server().await;
        let client = BasicClient::new().unwrap();
        let url = format!("http://{addr}/gone.csv");

        let err = fetch_bytes(&client, &url).await.unwrap_err();
        let message = err.to_string();

        assert!(message.contains(&format!("Failed to download CSV from {url}")));
        assert!(message.contains("404"));
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_other_2xx() {
        let addr = spawn_server().await;
        let client = BasicClient::new().unwrap();

        for (path, status) in [("partial.csv", "206"), ("empty.csv", "204")] {
            let url = format!("http://{addr}/{path}");
            let err = fetch_bytes(&client, &url).await.unwrap_err();
            let message = err.to_string();

            assert!(message.contains(&format!("Failed to download CSV from {url}")));
            assert!(message.contains(status), "{message}");
        }
    }

    #[tokio::test]
    async fn test_fetch_bytes_rejects_invalid_url() {
        let client = BasicClient::new().unwrap();
        assert!(fetch_bytes(&client, "not a url").await.is_err());
    }

    #[tokio::test]
    async fn test_load_source_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.csv");
        std::fs::write(&path, "Date,State\n").unwrap();

        let client = BasicClient::new().unwrap();
        let bytes = load_source(&client, path.to_str().unwrap()).await.unwrap();

        assert_eq!(bytes, b"Date,State\n");
    }

    #[tokio::test]
    async fn test_load_source_missing_file_names_path() {
        let client = BasicClient::new().unwrap();
        let err = load_source(&client, "/nonexistent/mj.csv")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("/nonexistent/mj.csv"));
    }
}

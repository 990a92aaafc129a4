use crate::error::ApiError;
use async_trait::async_trait;
use configuration::CoverConfig;
use reqwest::StatusCode;

pub mod covers;
pub mod error;

// --- Public API ---
pub use covers::CoverService;

/// The abstract interface for a cover-image service.
/// The catalog only depends on this trait, so the live implementation can be
/// swapped for a fake in tests.
#[async_trait]
pub trait CoverClient: Send + Sync {
    /// Resolves the cover image URL for a digits-only ISBN.
    ///
    /// `Ok(None)` means the service answered but has no cover for the ISBN.
    async fn cover_url(&self, clean_isbn: &str) -> Result<Option<String>, ApiError>;
}

/// A concrete implementation of the `CoverClient` for the Open Library Covers API.
#[derive(Clone)]
pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(config: &CoverConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn image_url(&self, clean_isbn: &str) -> String {
        format!("{}/b/isbn/{}-M.jpg", self.base_url, clean_isbn)
    }
}

#[async_trait]
impl CoverClient for OpenLibraryClient {
    async fn cover_url(&self, clean_isbn: &str) -> Result<Option<String>, ApiError> {
        if clean_isbn.is_empty() {
            return Ok(None);
        }
        let url = self.image_url(clean_isbn);

        // Without `default=false` the service answers 200 with a blank placeholder.
        let response = self
            .client
            .get(&url)
            .query(&[("default", "false")])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(url)),
            status => {
                tracing::debug!(isbn = clean_isbn, %status, "No cover available.");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Router};
    use std::collections::HashMap;

    async fn fake_cover_service() -> String {
        async fn cover(
            Path(file): Path<String>,
            axum::extract::Query(query): axum::extract::Query<HashMap<String, String>>,
        ) -> AxumStatus {
            if query.get("default").map(String::as_str) != Some("false") {
                return AxumStatus::BAD_REQUEST;
            }
            if file == "9780141439518-M.jpg" {
                AxumStatus::OK
            } else {
                AxumStatus::NOT_FOUND
            }
        }

        let app = Router::new().route("/b/isbn/:file", get(cover));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn client(base_url: String) -> OpenLibraryClient {
        let config = CoverConfig { base_url, ..CoverConfig::default() };
        OpenLibraryClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn found_cover_resolves_to_image_url() {
        let base = fake_cover_service().await;
        let client = client(base.clone());
        let url = client.cover_url("9780141439518").await.unwrap();
        assert_eq!(url, Some(format!("{base}b/isbn/9780141439518-M.jpg")));
    }

    #[tokio::test]
    async fn missing_cover_resolves_to_none() {
        let client = client(fake_cover_service().await);
        assert_eq!(client.cover_url("1234567890").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_isbn_makes_no_request() {
        // Nothing listens on this address; a request would fail.
        let client = client("http://127.0.0.1:9".to_string());
        assert_eq!(client.cover_url("").await.unwrap(), None);
    }
}

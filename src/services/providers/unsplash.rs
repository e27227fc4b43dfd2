/// Unsplash photo search provider
///
/// Uses `GET /search/photos` with a single landscape result per query.
use crate::{
    error::{AppError, AppResult},
    models::{ListingImage, UnsplashSearchResponse},
    services::providers::ImageProvider,
};
use reqwest::Client as HttpClient;

const API_VERSION: &str = "v1";

#[derive(Clone)]
pub struct UnsplashProvider {
    http_client: HttpClient,
    access_key: String,
    api_url: String,
}

impl UnsplashProvider {
    pub fn new(access_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            access_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn convert_api_response(&self, response: UnsplashSearchResponse) -> Option<ListingImage> {
        response
            .results
            .into_iter()
            .find_map(|photo| photo.into_image())
    }
}

#[async_trait::async_trait]
impl ImageProvider for UnsplashProvider {
    async fn search_image(&self, query: &str) -> AppResult<Option<ListingImage>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Image query cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/search/photos", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .header("Accept-Version", API_VERSION)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .query(&[
                ("query", query),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("content_filter", "high"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ImageFetchFailed(format!(
                "Unsplash returned status {}: {}",
                status, body
            )));
        }

        let search: UnsplashSearchResponse = response.json().await?;
        let image = self.convert_api_response(search);

        tracing::debug!(
            query = %query,
            found = image.is_some(),
            provider = "unsplash",
            "Image search completed"
        );

        Ok(image)
    }

    fn name(&self) -> &'static str {
        "unsplash"
    }
}

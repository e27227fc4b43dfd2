/// Photo provider abstraction
///
/// Image lookup goes through this trait so the photo API can be swapped or
/// disabled without touching the recommendation flow.
use crate::{error::AppResult, models::ListingImage};

pub mod unsplash;

pub use unsplash::UnsplashProvider;

/// Trait for photo search providers
///
/// A provider returns at most one image per query. `Ok(None)` means the
/// search ran and found nothing; errors are left for the caller to absorb.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    /// Search for a single landscape photo matching `query`
    async fn search_image(&self, query: &str) -> AppResult<Option<ListingImage>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Provider used when no API key is configured
#[derive(Debug, Clone, Default)]
pub struct DisabledImageProvider;

#[async_trait::async_trait]
impl ImageProvider for DisabledImageProvider {
    async fn search_image(&self, _query: &str) -> AppResult<Option<ListingImage>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

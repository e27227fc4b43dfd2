use serde::{Deserialize, Serialize};

mod credential;
mod criteria;
mod listing;
mod reservation;

pub use credential::{Credential, CredentialEntry, Role};
pub use criteria::SearchCriteria;
pub use listing::{parse_price, split_amenities, Availability, Listing, ListingId};
pub use reservation::{Reservation, ReservationRequest, ReservationStatus};

/// Display image for a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingImage {
    pub url: String,
    /// Attribution required by the photo provider
    pub credit: Option<String>,
}

/// A recommended listing, with an image when one could be found
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendedListing {
    pub listing: Listing,
    pub image: Option<ListingImage>,
}

// ============================================================================
// Unsplash API Types
// ============================================================================

/// Raw response from GET /search/photos
#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashSearchResponse {
    #[serde(default)]
    pub results: Vec<UnsplashPhoto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashPhoto {
    pub urls: UnsplashUrls,
    #[serde(default)]
    pub user: Option<UnsplashUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUrls {
    #[serde(default)]
    pub regular: Option<String>,
    #[serde(default)]
    pub small: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub links: Option<UnsplashUserLinks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashUserLinks {
    #[serde(default)]
    pub html: Option<String>,
}

impl UnsplashPhoto {
    /// Attribution line in the form Unsplash asks for
    pub fn credit(&self) -> String {
        let user = self.user.as_ref();
        let name = user
            .and_then(|u| u.name.as_deref())
            .unwrap_or("Unknown");
        let link = user
            .and_then(|u| u.links.as_ref())
            .and_then(|l| l.html.as_deref())
            .unwrap_or("https://unsplash.com");
        format!("Photo by {} on Unsplash ({})", name, link)
    }

    /// Converts to a display image; photos without a usable URL yield none
    pub fn into_image(self) -> Option<ListingImage> {
        let credit = self.credit();
        let url = self.urls.regular.or(self.urls.small)?;
        Some(ListingImage {
            url,
            credit: Some(credit),
        })
    }
}

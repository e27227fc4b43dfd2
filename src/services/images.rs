use crate::{
    models::{Listing, ListingImage, RecommendedListing},
    services::providers::ImageProvider,
};

/// Search phrase for a listing photo, e.g. `"tiny house in Lisbon"`
pub fn image_query(listing: &Listing) -> String {
    let property_type = listing
        .property_type
        .as_deref()
        .map(|t| t.replace('_', " "))
        .unwrap_or_default();
    let property_type = property_type.trim();
    let location = listing.location.trim();

    match (property_type.is_empty(), location.is_empty()) {
        (false, false) => format!("{} in {}", property_type, location),
        (false, true) => property_type.to_string(),
        (true, _) => location.to_string(),
    }
}

/// Finds a display image for one listing
///
/// A URL already present in the listings table wins. Otherwise the
/// provider is asked for the type-and-location query, then the location
/// alone. Provider failures are logged and yield no image.
pub async fn lookup_image(provider: &dyn ImageProvider, listing: &Listing) -> Option<ListingImage> {
    if let Some(url) = listing.image_url.as_deref().filter(|u| !u.trim().is_empty()) {
        return Some(ListingImage {
            url: url.to_string(),
            credit: None,
        });
    }

    let primary = image_query(listing);
    let mut queries = vec![primary];
    let location = listing.location.trim();
    if !location.is_empty() && queries[0] != location {
        queries.push(location.to_string());
    }

    for query in queries.iter().filter(|q| !q.is_empty()) {
        match provider.search_image(query).await {
            Ok(Some(image)) => return Some(image),
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(
                    listing_id = listing.id,
                    query = %query,
                    provider = provider.name(),
                    error = %e,
                    "Image lookup failed, continuing without image"
                );
                return None;
            }
        }
    }

    None
}

/// Pairs each recommended listing with an image when one can be found
pub async fn decorate(
    provider: &dyn ImageProvider,
    listings: Vec<Listing>,
) -> Vec<RecommendedListing> {
    let mut decorated = Vec::with_capacity(listings.len());
    for listing in listings {
        let image = lookup_image(provider, &listing).await;
        decorated.push(RecommendedListing { listing, image });
    }
    decorated
}

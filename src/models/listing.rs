use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Identifier of a listing as it appears in the listings table
pub type ListingId = u64;

/// Whether a listing can currently be booked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    #[default]
    Available,
    Booked,
}

impl Availability {
    /// Interprets an `availability` cell; blank counts as available
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("available") {
            Availability::Available
        } else {
            Availability::Booked
        }
    }
}

/// A rentable property record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub id: ListingId,
    pub name: Option<String>,
    pub location: String,
    pub property_type: Option<String>,
    pub price_per_night: Option<f64>,
    /// Guest capacity from the table, if it has such a column
    pub capacity: Option<u32>,
    pub bedrooms: Option<u32>,
    pub rating: Option<f32>,
    pub reviews_count: Option<u32>,
    pub amenities: Vec<String>,
    pub description: String,
    pub availability: Availability,
    /// Image already attached to the row upstream
    pub image_url: Option<String>,
}

impl Listing {
    /// Creates a listing with only the required fields set
    pub fn new(id: ListingId, location: impl Into<String>) -> Self {
        Self {
            id,
            name: None,
            location: location.into(),
            property_type: None,
            price_per_night: None,
            capacity: None,
            bedrooms: None,
            rating: None,
            reviews_count: None,
            amenities: Vec::new(),
            description: String::new(),
            availability: Availability::Available,
            image_url: None,
        }
    }

    /// Guest capacity, falling back to two guests per bedroom
    pub fn effective_capacity(&self) -> Option<u32> {
        self.capacity
            .or_else(|| self.bedrooms.map(|bedrooms| bedrooms.saturating_mul(2)))
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// Amenity tags joined into one lowercase string
    pub fn amenity_text(&self) -> String {
        self.amenities.join(", ").to_lowercase()
    }

    /// All free text of the listing, lowercased, for similarity scoring
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        if let Some(name) = &self.name {
            parts.push(name);
        }
        parts.push(&self.location);
        if let Some(property_type) = &self.property_type {
            parts.push(property_type);
        }
        parts.push(&self.description);
        let amenities = self.amenities.join(" ");
        format!("{} {}", parts.join(" "), amenities).to_lowercase()
    }
}

/// Parses a price cell such as `"$1,200 / night"` into its first number
pub fn parse_price(raw: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER.get_or_init(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").expect("valid regex"));
    let cleaned = raw.replace(',', "");
    number.find(&cleaned)?.as_str().parse().ok()
}

/// Splits an amenities cell on commas, semicolons or pipes
pub fn split_amenities(raw: &str) -> Vec<String> {
    raw.split([',', ';', '|'])
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

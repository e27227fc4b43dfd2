use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::models::{Listing, SearchCriteria};

const PROPERTY_TYPES: &[&str] = &["apartment", "house", "studio", "cabin", "penthouse", "hotel"];

const AMENITY_WORDS: &[&str] = &[
    "wifi",
    "parking",
    "pool",
    "air conditioning",
    "kitchen",
    "washer",
    "dryer",
    "heating",
];

const OPTIONAL_PROMPT: &str = "Great. Any preferred property type (apartment, house, studio, \
cabin, penthouse, hotel), a budget per night, or must-have amenities?";

const READY_PROMPT: &str = "Thanks, I have everything I need to search.";

/// Criteria a conversation must settle before searching
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Location,
    Guests,
}

impl RequiredField {
    pub fn prompt(self) -> &'static str {
        match self {
            RequiredField::Location => "Which city would you like to stay in?",
            RequiredField::Guests => "How many guests?",
        }
    }
}

/// Pulls search criteria out of free-form chat messages
///
/// Locations are recognised from the listings snapshot, so anything the
/// table offers can be named. Longer names are tried first, which lets
/// "Quebec City" win over "Quebec".
pub struct PreferenceExtractor<'a> {
    locations: Vec<&'a str>,
}

impl<'a> PreferenceExtractor<'a> {
    pub fn new(listings: &'a [Listing]) -> Self {
        Self::with_locations(listings.iter().map(|listing| listing.location.as_str()))
    }

    pub fn with_locations(locations: impl IntoIterator<Item = &'a str>) -> Self {
        let mut known: Vec<&'a str> = Vec::new();
        for location in locations
            .into_iter()
            .map(str::trim)
            .filter(|location| !location.is_empty())
        {
            if !known.iter().any(|k| k.eq_ignore_ascii_case(location)) {
                known.push(location);
            }
        }
        known.sort_by(|a, b| b.len().cmp(&a.len()));
        Self { locations: known }
    }

    /// Merges whatever the message states into `criteria`
    ///
    /// Fields the message says nothing about are left as they were; amenities
    /// accumulate. Returns the names of the fields that changed.
    pub fn ingest(&self, message: &str, criteria: &mut SearchCriteria) -> Vec<&'static str> {
        let text = message.to_lowercase();
        let mut updated = Vec::new();

        if let Some(location) = self.extract_location(&text) {
            criteria.location = Some(location.to_string());
            updated.push("location");
        }
        if let Some(guests) = extract_guests(&text) {
            criteria.guests = Some(guests);
            updated.push("guests");
        }
        if let Some(property_type) = extract_property_type(&text) {
            criteria.property_type = Some(property_type.to_string());
            updated.push("property_type");
        }
        if let Some(budget) = extract_budget(&text) {
            criteria.price_ceiling = Some(budget);
            updated.push("price_ceiling");
        }

        let mut added_amenity = false;
        for amenity in AMENITY_WORDS.iter().filter(|word| text.contains(**word)) {
            if !criteria.amenities.iter().any(|a| a.eq_ignore_ascii_case(amenity)) {
                criteria.amenities.push(amenity.to_string());
                added_amenity = true;
            }
        }
        if added_amenity {
            updated.push("amenities");
        }

        updated
    }

    fn extract_location(&self, text: &str) -> Option<&'a str> {
        self.locations
            .iter()
            .copied()
            .find(|location| contains_word(text, &location.to_lowercase()))
    }
}

/// Required fields still unset, in the order they should be asked for
pub fn missing_fields(criteria: &SearchCriteria) -> Vec<RequiredField> {
    let mut missing = Vec::new();
    if criteria.location().is_none() {
        missing.push(RequiredField::Location);
    }
    if criteria.guests.map_or(true, |guests| guests == 0) {
        missing.push(RequiredField::Guests);
    }
    missing
}

/// What to say next given the criteria gathered so far
pub fn next_prompt(criteria: &SearchCriteria, missing: &[RequiredField]) -> &'static str {
    if let Some(field) = missing.first() {
        return field.prompt();
    }
    let has_optional = criteria.property_type().is_some()
        || criteria.price_ceiling.is_some()
        || !criteria.amenity_terms().is_empty();
    if has_optional {
        READY_PROMPT
    } else {
        OPTIONAL_PROMPT
    }
}

/// "4 guests", "3 people", or a message that is only a number
fn extract_guests(text: &str) -> Option<u32> {
    static GUESTS_RE: OnceLock<Regex> = OnceLock::new();
    let re = GUESTS_RE.get_or_init(|| {
        Regex::new(r"(\d+)\s*(?:guests?|people|persons?|ppl|adults?)\b").expect("valid regex")
    });

    re.captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .or_else(|| text.trim().parse().ok())
        .filter(|guests| *guests > 0)
}

fn extract_property_type(text: &str) -> Option<&'static str> {
    PROPERTY_TYPES
        .iter()
        .copied()
        .find(|property_type| contains_word(text, property_type))
}

/// A nightly budget needs a currency or "per night" marker next to the number
fn extract_budget(text: &str) -> Option<f64> {
    static BUDGET_RE: OnceLock<Regex> = OnceLock::new();
    let re = BUDGET_RE.get_or_init(|| {
        Regex::new(
            r"\$\s*(\d+(?:\.\d+)?)|(\d+(?:\.\d+)?)\s*(?:\$|dollars?\b|usd\b|cad\b|eur\b|(?:per|a|/)\s*night)",
        )
        .expect("valid regex")
    });

    let caps = re.captures(text)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
}

fn contains_word(text: &str, word: &str) -> bool {
    text.match_indices(word).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITIES: &[&str] = &[
        "Montreal",
        "Quebec City",
        "Quebec",
        "Toronto",
        "Magog",
        "Ottawa",
        "Vancouver",
    ];

    fn extractor() -> PreferenceExtractor<'static> {
        PreferenceExtractor::with_locations(CITIES.iter().copied())
    }

    fn ingest(message: &str) -> SearchCriteria {
        let mut criteria = SearchCriteria::default();
        extractor().ingest(message, &mut criteria);
        criteria
    }

    #[test]
    fn test_full_message() {
        let criteria =
            ingest("Looking for a cabin in Magog for 4 guests, $150 per night, wifi and parking");
        assert_eq!(criteria.location.as_deref(), Some("Magog"));
        assert_eq!(criteria.guests, Some(4));
        assert_eq!(criteria.property_type.as_deref(), Some("cabin"));
        assert_eq!(criteria.price_ceiling, Some(150.0));
        assert_eq!(criteria.amenities, vec!["wifi", "parking"]);
        assert!(missing_fields(&criteria).is_empty());
    }

    #[test]
    fn test_guest_phrasings() {
        assert_eq!(ingest("we are 3 people").guests, Some(3));
        assert_eq!(ingest("2ppl").guests, Some(2));
        assert_eq!(ingest(" 5 ").guests, Some(5));
        assert_eq!(ingest("0 guests").guests, None);
        assert_eq!(ingest("somewhere nice").guests, None);
    }

    #[test]
    fn test_longest_location_wins() {
        assert_eq!(
            ingest("a week in quebec city").location.as_deref(),
            Some("Quebec City")
        );
        assert_eq!(ingest("QUEBEC please").location.as_deref(), Some("Quebec"));
    }

    #[test]
    fn test_penthouse_is_not_a_house() {
        assert_eq!(
            ingest("a penthouse in Toronto").property_type.as_deref(),
            Some("penthouse")
        );
    }

    #[test]
    fn test_guest_count_is_not_a_budget() {
        let criteria = ingest("4 guests in Ottawa");
        assert_eq!(criteria.price_ceiling, None);

        assert_eq!(ingest("under 200 dollars").price_ceiling, Some(200.0));
        assert_eq!(ingest("120/night max").price_ceiling, Some(120.0));
    }

    #[test]
    fn test_messages_accumulate() {
        let extractor = extractor();
        let mut criteria = SearchCriteria::default();

        let updated = extractor.ingest("Hi! Somewhere with a pool", &mut criteria);
        assert_eq!(updated, vec!["amenities"]);
        assert_eq!(
            missing_fields(&criteria),
            vec![RequiredField::Location, RequiredField::Guests]
        );
        assert_eq!(
            next_prompt(&criteria, &missing_fields(&criteria)),
            "Which city would you like to stay in?"
        );

        extractor.ingest("Vancouver", &mut criteria);
        assert_eq!(missing_fields(&criteria), vec![RequiredField::Guests]);
        assert_eq!(
            next_prompt(&criteria, &missing_fields(&criteria)),
            "How many guests?"
        );

        let updated = extractor.ingest("2 guests, pool and kitchen", &mut criteria);
        assert_eq!(updated, vec!["guests", "amenities"]);
        assert_eq!(criteria.location.as_deref(), Some("Vancouver"));
        assert_eq!(criteria.amenities, vec!["pool", "kitchen"]);
        assert_eq!(next_prompt(&criteria, &[]), READY_PROMPT);
    }

    #[test]
    fn test_optional_prompt_once_required_are_known() {
        let criteria = ingest("Montreal, 2 guests");
        let missing = missing_fields(&criteria);
        assert!(missing.is_empty());
        assert_eq!(next_prompt(&criteria, &missing), OPTIONAL_PROMPT);
    }

    #[test]
    fn test_locations_from_snapshot() {
        let listings = vec![
            Listing::new(1, "Paris"),
            Listing::new(2, "paris"),
            Listing::new(3, "Rome"),
        ];
        let extractor = PreferenceExtractor::new(&listings);
        let mut criteria = SearchCriteria::default();
        extractor.ingest("Rome for two", &mut criteria);
        assert_eq!(criteria.location.as_deref(), Some("Rome"));
        assert_eq!(extractor.locations.len(), 2);
    }
}

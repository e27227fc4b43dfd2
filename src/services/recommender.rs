use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};

use crate::models::{Listing, SearchCriteria};

/// Known spellings for common amenities
const AMENITY_SYNONYMS: &[(&str, &[&str])] = &[
    ("wifi", &[r"\bwifi\b", r"\bwi-?fi\b", r"wireless internet"]),
    ("gym", &[r"\bgym\b", r"fitness center", r"fitness room"]),
    ("pool", &[r"\bpool\b", r"swimming pool"]),
    ("hot tub", &[r"hot tub", r"jacuzzi"]),
    ("parking", &[r"parking", r"free parking"]),
];

/// Matches search criteria against a listings snapshot
///
/// Filtering and ranking are pure; the recommender never touches disk or
/// network and borrows the snapshot it was built on.
pub struct Recommender<'a> {
    listings: &'a [Listing],
}

impl<'a> Recommender<'a> {
    pub fn new(listings: &'a [Listing]) -> Self {
        Self { listings }
    }

    /// Returns the eligible listings, most relevant first
    ///
    /// Criteria without constraints return the whole snapshot in source
    /// order. No eligible listing is an empty result, not an error.
    pub fn recommend(&self, criteria: &SearchCriteria) -> Vec<&'a Listing> {
        let limit = criteria.limit.unwrap_or(usize::MAX);

        if !criteria.has_constraints() {
            return self.listings.iter().take(limit).collect();
        }

        let terms = criteria.text_terms();
        let eligible: Vec<&'a Listing> = self
            .listings
            .iter()
            .filter(|listing| is_eligible(listing, criteria, &terms))
            .collect();

        let eligible = prefer_property_type(eligible, criteria.property_type());

        let amenities = AmenityMatcher::new(&criteria.amenity_terms());
        let mut scored: Vec<(u32, &'a Listing)> = eligible
            .into_iter()
            .map(|listing| (similarity(listing, &terms, &amenities), listing))
            .collect();

        // stable: equal keys keep source order
        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .cmp(score_a)
                .then_with(|| cmp_price_ascending(a, b))
                .then_with(|| cmp_desc(a.rating, b.rating))
                .then_with(|| cmp_desc(a.reviews_count, b.reviews_count))
        });

        tracing::debug!(
            candidates = self.listings.len(),
            matches = scored.len(),
            "Recommendation pass completed"
        );

        scored
            .into_iter()
            .take(limit)
            .map(|(_, listing)| listing)
            .collect()
    }
}

fn is_eligible(listing: &Listing, criteria: &SearchCriteria, terms: &[String]) -> bool {
    if criteria.available_only && !listing.is_available() {
        return false;
    }

    if let Some(location) = criteria.location() {
        if !contains_ignore_case(&listing.location, location) {
            return false;
        }
    }

    if let Some(ceiling) = criteria.price_ceiling {
        match listing.price_per_night {
            Some(price) if price <= ceiling => {}
            _ => return false,
        }
    }

    if let Some(guests) = criteria.guests {
        // unknown capacity does not exclude
        if listing.effective_capacity().is_some_and(|capacity| capacity < guests) {
            return false;
        }
    }

    if !terms.is_empty() {
        let description = listing.description.to_lowercase();
        let amenities = listing.amenity_text();
        if !terms
            .iter()
            .any(|term| description.contains(term.as_str()) || amenities.contains(term.as_str()))
        {
            return false;
        }
    }

    true
}

/// Keeps only listings of the requested type, unless none has it
fn prefer_property_type<'a>(listings: Vec<&'a Listing>, wanted: Option<&str>) -> Vec<&'a Listing> {
    let Some(wanted) = wanted else {
        return listings;
    };

    let matching: Vec<&'a Listing> = listings
        .iter()
        .copied()
        .filter(|listing| {
            listing
                .property_type
                .as_deref()
                .is_some_and(|t| contains_ignore_case(t, wanted))
        })
        .collect();

    if matching.is_empty() {
        listings
    } else {
        matching
    }
}

/// Number of query terms and requested amenities the listing mentions
fn similarity(listing: &Listing, terms: &[String], amenities: &AmenityMatcher) -> u32 {
    let text = listing.searchable_text();
    let term_hits = terms.iter().filter(|term| text.contains(term.as_str())).count();
    let amenity_hits = amenities.count_matches(&format!(
        "{} {}",
        listing.amenity_text(),
        listing.description
    ));
    (term_hits + amenity_hits) as u32
}

struct AmenityMatcher {
    /// One pattern set per requested amenity
    amenities: Vec<Vec<Regex>>,
}

impl AmenityMatcher {
    fn new(requested: &[String]) -> Self {
        let amenities = requested
            .iter()
            .map(|amenity| {
                let escaped = [regex::escape(amenity)];
                let variants: Vec<&str> = AMENITY_SYNONYMS
                    .iter()
                    .find(|(key, _)| *key == amenity.as_str())
                    .map(|(_, patterns)| patterns.to_vec())
                    .unwrap_or_else(|| escaped.iter().map(String::as_str).collect());
                variants
                    .into_iter()
                    .filter_map(|pattern| {
                        RegexBuilder::new(pattern)
                            .case_insensitive(true)
                            .build()
                            .ok()
                    })
                    .collect()
            })
            .collect();
        Self { amenities }
    }

    fn count_matches(&self, text: &str) -> usize {
        self.amenities
            .iter()
            .filter(|patterns| patterns.iter().any(|p| p.is_match(text)))
            .count()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Cheaper first; listings without a price sort last
fn cmp_price_ascending(a: &Listing, b: &Listing) -> Ordering {
    match (a.price_per_night, b.price_per_night) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Larger first; missing values sort last
fn cmp_desc<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

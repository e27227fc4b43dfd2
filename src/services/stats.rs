use std::collections::HashMap;

use serde::Serialize;

use crate::models::Listing;

/// Locations reported in the average-price table
pub const TOP_LOCATIONS: usize = 20;

pub const DEFAULT_PRICE_BUCKETS: usize = 10;
pub const MAX_PRICE_BUCKETS: usize = 100;

/// Price overview of a listings snapshot
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListingStats {
    pub listings: usize,
    /// Listings with a parseable nightly price
    pub priced: usize,
    pub price_histogram: Vec<PriceBucket>,
    /// Most expensive locations first
    pub average_price_by_location: Vec<LocationPrice>,
}

/// Equal-width price range; `upper` is inclusive only for the last bucket
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationPrice {
    pub location: String,
    pub average_price: f64,
    pub listings: usize,
}

impl ListingStats {
    pub fn compute(listings: &[Listing], buckets: usize) -> Self {
        let prices: Vec<f64> = listings
            .iter()
            .filter_map(|listing| listing.price_per_night)
            .filter(|price| price.is_finite())
            .collect();

        Self {
            listings: listings.len(),
            priced: prices.len(),
            price_histogram: price_histogram(&prices, buckets),
            average_price_by_location: average_price_by_location(listings),
        }
    }
}

fn price_histogram(prices: &[f64], buckets: usize) -> Vec<PriceBucket> {
    if prices.is_empty() {
        return Vec::new();
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![PriceBucket {
            lower: min,
            upper: max,
            count: prices.len(),
        }];
    }

    let buckets = buckets.clamp(1, MAX_PRICE_BUCKETS);
    let width = (max - min) / buckets as f64;
    let mut counts = vec![0usize; buckets];
    for price in prices {
        let index = (((price - min) / width) as usize).min(buckets - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| PriceBucket {
            lower: round_cents(min + width * i as f64),
            upper: if i + 1 == buckets {
                max
            } else {
                round_cents(min + width * (i + 1) as f64)
            },
            count,
        })
        .collect()
}

fn average_price_by_location(listings: &[Listing]) -> Vec<LocationPrice> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for listing in listings {
        if let Some(price) = listing.price_per_night.filter(|p| p.is_finite()) {
            let entry = totals.entry(listing.location.as_str()).or_default();
            entry.0 += price;
            entry.1 += 1;
        }
    }

    let mut averages: Vec<LocationPrice> = totals
        .into_iter()
        .map(|(location, (total, count))| LocationPrice {
            location: location.to_string(),
            average_price: round_cents(total / count as f64),
            listings: count,
        })
        .collect();

    averages.sort_by(|a, b| {
        b.average_price
            .total_cmp(&a.average_price)
            .then_with(|| a.location.cmp(&b.location))
    });
    averages.truncate(TOP_LOCATIONS);
    averages
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Filters and preferences supplied for a single search
///
/// Every field is optional; an absent field places no constraint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchCriteria {
    /// Case-insensitive substring of the listing location
    #[serde(default)]
    pub location: Option<String>,
    /// Highest acceptable nightly price
    #[serde(default)]
    pub price_ceiling: Option<f64>,
    #[serde(default)]
    pub check_in: Option<NaiveDate>,
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    /// Number of guests the listing must hold
    #[serde(default)]
    pub guests: Option<u32>,
    /// Free text; a listing must mention at least one of its terms
    #[serde(default)]
    pub text: Option<String>,
    /// Preferred property type (soft filter)
    #[serde(default)]
    pub property_type: Option<String>,
    /// Wanted amenities; they rank, never exclude
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Skip listings that are already booked
    #[serde(default)]
    pub available_only: bool,
    /// Maximum number of results
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchCriteria {
    /// Location with surrounding whitespace removed, if non-blank
    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn property_type(&self) -> Option<&str> {
        non_blank(self.property_type.as_deref())
    }

    /// Lowercased, de-duplicated terms of the free-text query
    pub fn text_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let Some(text) = non_blank(self.text.as_deref()) else {
            return terms;
        };
        for term in text
            .split(|c: char| !c.is_alphanumeric() && c != '-')
            .map(|t| t.trim_matches('-').to_lowercase())
            .filter(|t| !t.is_empty())
        {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }

    /// Requested amenities, trimmed and lowercased
    pub fn amenity_terms(&self) -> Vec<String> {
        self.amenities
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect()
    }

    /// True when any field would filter or reorder the listings
    pub fn has_constraints(&self) -> bool {
        self.location().is_some()
            || self.price_ceiling.is_some()
            || self.guests.is_some()
            || !self.text_terms().is_empty()
            || self.property_type().is_some()
            || !self.amenity_terms().is_empty()
            || self.available_only
    }

    /// Rejects a date range whose check-out is not after check-in
    pub fn validate(&self) -> AppResult<()> {
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            if check_out <= check_in {
                return Err(AppError::InvalidInput(
                    "Check-out date must be after check-in date".to_string(),
                ));
            }
        }
        if let Some(ceiling) = self.price_ceiling {
            if !ceiling.is_finite() || ceiling < 0.0 {
                return Err(AppError::InvalidInput(
                    "Price ceiling must be a non-negative number".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

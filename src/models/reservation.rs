use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ListingId;

/// Status recorded with a reservation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Booked against a listing present in the loaded table
    Booked,
    /// The listing identifier was not found; recorded anyway
    Unverified,
}

/// A booking request as submitted by a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationRequest {
    pub listing_id: ListingId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub guests: Option<u32>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
}

/// One row of the reservation log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub reservation_id: Uuid,
    pub listing_id: ListingId,
    pub username: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: u32,
    pub guests: Option<u32>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub listing_name: Option<String>,
    pub location: Option<String>,
    pub price_per_night: Option<f64>,
    pub estimated_total: Option<f64>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_unverified(&self) -> bool {
        self.status == ReservationStatus::Unverified
    }
}

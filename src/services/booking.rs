use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{ListingStore, ReservationLog},
    error::{AppError, AppResult},
    models::{Reservation, ReservationRequest, ReservationStatus},
};

/// A recorded reservation plus anything the user should be told about it
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingOutcome {
    pub reservation: Reservation,
    pub warning: Option<String>,
}

/// Validates a booking request and appends it to the log
///
/// An unknown listing id is still recorded, with status `unverified` and a
/// warning. Write failures are returned as-is; nothing is retried.
pub fn reserve(
    listings: &ListingStore,
    log: &ReservationLog,
    username: &str,
    request: ReservationRequest,
) -> AppResult<BookingOutcome> {
    if username.trim().is_empty() {
        return Err(AppError::InvalidInput("Username is required".to_string()));
    }
    if request.check_out <= request.check_in {
        return Err(AppError::InvalidInput(
            "Check-out date must be after check-in date".to_string(),
        ));
    }
    if request.guests == Some(0) {
        return Err(AppError::InvalidInput(
            "Number of guests must be at least 1".to_string(),
        ));
    }

    let nights = (request.check_out - request.check_in).num_days() as u32;
    let listing = listings.get(request.listing_id);

    if let Some(listing) = listing {
        if !listing.is_available() {
            return Err(AppError::InvalidInput(format!(
                "Listing {} is no longer available",
                listing.id
            )));
        }
    }

    let (status, warning) = match listing {
        Some(_) => (ReservationStatus::Booked, None),
        None => {
            tracing::warn!(
                listing_id = request.listing_id,
                username = %username,
                "Reservation references an unknown listing, recording as unverified"
            );
            (
                ReservationStatus::Unverified,
                Some(format!(
                    "Listing {} was not found; the reservation is recorded as unverified",
                    request.listing_id
                )),
            )
        }
    };

    let price_per_night = listing.and_then(|l| l.price_per_night);
    let reservation = Reservation {
        reservation_id: Uuid::new_v4(),
        listing_id: request.listing_id,
        username: username.to_string(),
        check_in: request.check_in,
        check_out: request.check_out,
        nights,
        guests: request.guests,
        guest_name: non_blank(request.guest_name),
        guest_email: non_blank(request.guest_email),
        listing_name: listing.and_then(|l| l.name.clone()),
        location: listing.map(|l| l.location.clone()),
        price_per_night,
        estimated_total: price_per_night.map(|price| round_cents(price * nights as f64)),
        status,
        created_at: Utc::now(),
    };

    log.append(&reservation)?;

    Ok(BookingOutcome {
        reservation,
        warning,
    })
}

/// Blank contact fields are dropped; anything else is stored as submitted
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Availability, Listing};
    use chrono::NaiveDate;

    fn store() -> ListingStore {
        let mut loft = Listing::new(1, "Paris");
        loft.name = Some("Loft du Marais".to_string());
        loft.price_per_night = Some(99.99);

        let mut villa = Listing::new(2, "Rome");
        villa.availability = Availability::Booked;

        ListingStore::from_listings("listings.csv", vec![loft, villa])
    }

    type Ymd = (i32, u32, u32);

    fn request(listing_id: u64, check_in: Ymd, check_out: Ymd) -> ReservationRequest {
        ReservationRequest {
            listing_id,
            check_in: NaiveDate::from_ymd_opt(check_in.0, check_in.1, check_in.2).unwrap(),
            check_out: NaiveDate::from_ymd_opt(check_out.0, check_out.1, check_out.2).unwrap(),
            guests: Some(2),
            guest_name: Some("  ".to_string()),
            guest_email: Some("ana@example.com".to_string()),
        }
    }

    #[test]
    fn test_reserve_known_listing() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReservationLog::new(dir.path().join("reservations.csv"));

        let outcome = reserve(&store(), &log, "demo", request(1, (2025, 8, 20), (2025, 8, 23))).unwrap();
        let reservation = &outcome.reservation;

        assert!(outcome.warning.is_none());
        assert_eq!(reservation.status, ReservationStatus::Booked);
        assert_eq!(reservation.nights, 3);
        assert_eq!(reservation.estimated_total, Some(299.97));
        assert_eq!(reservation.listing_name.as_deref(), Some("Loft du Marais"));
        assert_eq!(reservation.guest_name, None);
        assert_eq!(log.read_all().unwrap(), vec![reservation.clone()]);
    }

    #[test]
    fn test_guest_fields_stored_as_submitted() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReservationLog::new(dir.path().join("reservations.csv"));

        let mut padded = request(1, (2025, 8, 20), (2025, 8, 22));
        padded.guest_name = Some("  Ana  ".to_string());
        let outcome = reserve(&store(), &log, "demo", padded).unwrap();

        assert_eq!(outcome.reservation.guest_name.as_deref(), Some("  Ana  "));
        let stored = log.read_all().unwrap();
        assert_eq!(stored[0].guest_name.as_deref(), Some("  Ana  "));
    }

    #[test]
    fn test_unknown_listing_recorded_but_flagged() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReservationLog::new(dir.path().join("reservations.csv"));

        let outcome = reserve(&store(), &log, "demo", request(99, (2025, 8, 20), (2025, 8, 21))).unwrap();

        assert!(outcome.reservation.is_unverified());
        assert!(outcome.warning.unwrap().contains("99"));
        assert!(outcome.reservation.estimated_total.is_none());
        assert_eq!(log.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_date_range_rejected_and_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReservationLog::new(dir.path().join("reservations.csv"));

        for (check_in, check_out) in [((2025, 8, 20), (2025, 8, 20)), ((2025, 8, 21), (2025, 8, 20))] {
            let err = reserve(&store(), &log, "demo", request(1, check_in, check_out)).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_booked_listing_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReservationLog::new(dir.path().join("reservations.csv"));

        let err = reserve(&store(), &log, "demo", request(2, (2025, 8, 20), (2025, 8, 22))).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_write_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let log = ReservationLog::new(dir.path().join("no-such-dir").join("reservations.csv"));

        let err = reserve(&store(), &log, "demo", request(1, (2025, 8, 20), (2025, 8, 22))).unwrap_err();
        assert!(matches!(err, AppError::ReservationWriteFailed(_)));
    }
}

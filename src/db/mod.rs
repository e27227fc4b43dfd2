pub mod listings;
pub mod reservations;

pub use listings::ListingStore;
pub use reservations::ReservationLog;

pub mod access_gate;
pub mod booking;
pub mod images;
pub mod preferences;
pub mod providers;
pub mod recommender;
pub mod stats;

pub use access_gate::AccessGate;
pub use preferences::PreferenceExtractor;
pub use recommender::Recommender;
pub use stats::ListingStats;

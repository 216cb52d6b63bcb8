//! Orchestration layer for orb registry commands
//!
//! Sequencing of remote calls lives here; rendering lives in
//! `crate::render` and the transport in `crate::registry`.

pub mod listing;
pub mod orb_publisher;

pub use listing::ListingAggregator;
pub use orb_publisher::{read_orb_source, BumpedOrb, CreatedOrb, OrbPublisher, PublishedOrb};

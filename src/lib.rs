pub mod core;
pub mod orchestration;
pub mod registry;
pub mod render;
pub mod validation;

pub use core::*;
pub use orchestration::{
    read_orb_source, BumpedOrb, CreatedOrb, ListingAggregator, OrbPublisher, PublishedOrb,
};
pub use registry::RegistryClient;
pub use render::MetadataFormatter;
pub use validation::{
    ParsedReference, ReferenceParser, Segment, SegmentValidator, VersionClassifier, VersionKind,
};

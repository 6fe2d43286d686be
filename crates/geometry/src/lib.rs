//! Geometry resolver for floating elements.
//!
//! Given an anchor rectangle, the floating element's size and a
//! [`PlacementRequest`], [`compute_placement`] returns the coordinates,
//! resolved side, arrow offset and transform origin for the floating element.
//! The computation is pure: the anchor is read once per call and nothing is
//! cached, so keeping results fresh is the position updater's job.

pub mod placement;
pub mod resolve;
pub mod style;

pub use placement::{
    Alignment, ArrowPosition, ArrowRequest, FlipFallback, Placement, PlacementRequest, PlacementResult,
    Side, Strategy,
};
pub use resolve::{compute_for_document, compute_placement};
pub use style::FloatingStyles;

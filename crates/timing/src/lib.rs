//! Hover, focus and touch timing for floating-element triggers.
//!
//! Each trigger owns an [`InteractionTimer`]; all timers created from one
//! context share a [`Hysteresis`] so a quick succession of triggers opens
//! without the full enter delay.

pub mod hysteresis;
pub mod machine;

pub use hysteresis::Hysteresis;
pub use machine::{InteractionTimer, TimingOptions, TimingState, Transition};

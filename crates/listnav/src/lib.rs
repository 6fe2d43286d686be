//! Keyboard navigation over a list of items.
//!
//! The state is plain data and [`reduce`] is a pure function of state and
//! action, so menus, listboxes and selects drive the same logic and can
//! replay it in tests.

pub mod model;
pub mod reducer;

pub use model::{
    ListAction, ListConfig, ListItem, ListNavigationState, Orientation, SelectionMode,
    TypeaheadBuffer,
};
pub use reducer::{Reduction, reduce};

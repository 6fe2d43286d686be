//! Floating-element engine for component libraries.
//!
//! Tooltips, popovers and menus built from the subsystem crates: placement
//! ([`geometry`]), position resync ([`updater`]), focus trapping ([`focus`]),
//! interaction timing ([`timing`]), the overlay stack ([`layers`]) and list
//! navigation ([`listnav`]). Everything is sans-IO: the host forwards DOM
//! events and drives timers through `next_deadline`/`poll`.
//!
//! ```text
//! host events ─▶ Tooltip/Popover/Menu ─▶ timing / listnav decisions
//!                      │                        │
//!                      ▼                        ▼
//!               FloatingContext ─▶ layers, updater, focus ─▶ Document
//! ```

pub mod context;
pub mod menu;
pub mod popover;
pub mod props;
pub mod tooltip;

pub use context::FloatingContext;
pub use menu::{Menu, MenuOptions, MenuOutcome};
pub use popover::{CloseReason, Popover, PopoverHandle, PopoverNodes, PopoverOptions};
pub use props::{TriggerEvent, TriggerProps};
pub use tooltip::{Tooltip, TooltipInput, TooltipOptions};

pub use floating_core as core_types;
pub use floating_focus as focus;
pub use floating_geometry as geometry;
pub use floating_layers as layers;
pub use floating_listnav as listnav;
pub use floating_timing as timing;
pub use floating_updater as updater;

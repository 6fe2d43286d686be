//! Engine state shared by every floating surface of one application.

use core::cell::RefCell;
use core::fmt;
use floating_core::{Document, FloatingConfig};
use floating_layers::{LayerId, OverlayManager};
use floating_timing::Hysteresis;
use floating_updater::PositionUpdater;
use std::rc::Rc;
use std::time::Instant;

/// Handle to the overlay stack, the position updater and the tooltip
/// hysteresis flag.
///
/// Constructed explicitly and passed to each composite; clones share state.
/// Two contexts never see each other's layers, which keeps tests and
/// independent widget trees isolated.
pub struct FloatingContext<N> {
    config: Rc<FloatingConfig>,
    overlays: Rc<RefCell<OverlayManager<N>>>,
    positions: Rc<RefCell<PositionUpdater<N>>>,
    hysteresis: Rc<Hysteresis>,
}

impl<N> Clone for FloatingContext<N> {
    fn clone(&self) -> Self {
        Self {
            config: Rc::clone(&self.config),
            overlays: Rc::clone(&self.overlays),
            positions: Rc::clone(&self.positions),
            hysteresis: Rc::clone(&self.hysteresis),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for FloatingContext<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FloatingContext")
            .field("config", &self.config)
            .field("overlays", &self.overlays)
            .field("hysteresis", &self.hysteresis)
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug + 'static> FloatingContext<N> {
    /// A context with empty stacks.
    #[must_use]
    pub fn new(config: FloatingConfig) -> Self {
        let positions = PositionUpdater::from_config(&config);
        let overlays = OverlayManager::new(&config);
        Self {
            config: Rc::new(config),
            overlays: Rc::new(RefCell::new(overlays)),
            positions: Rc::new(RefCell::new(positions)),
            hysteresis: Rc::new(Hysteresis::new()),
        }
    }

    /// Configuration this context was built with.
    #[must_use]
    pub fn config(&self) -> &FloatingConfig {
        &self.config
    }

    /// Overlay stack.
    #[must_use]
    pub fn overlays(&self) -> &RefCell<OverlayManager<N>> {
        &self.overlays
    }

    /// Position updater.
    #[must_use]
    pub fn positions(&self) -> &RefCell<PositionUpdater<N>> {
        &self.positions
    }

    pub(crate) fn positions_rc(&self) -> Rc<RefCell<PositionUpdater<N>>> {
        Rc::clone(&self.positions)
    }

    /// Hysteresis flag shared by every tooltip of this context.
    #[must_use]
    pub fn hysteresis(&self) -> Rc<Hysteresis> {
        Rc::clone(&self.hysteresis)
    }

    /// Whether `layer` is the topmost modal layer.
    #[must_use]
    pub fn is_top_modal(&self, layer: LayerId) -> bool {
        self.overlays.borrow().is_top_modal(layer)
    }

    /// Predicate answering "is `layer` on top" without holding a borrow.
    ///
    /// Reports `false` while the stack is being modified.
    pub(crate) fn top_modal_check(&self, layer: LayerId) -> Box<dyn Fn() -> bool> {
        let overlays = Rc::clone(&self.overlays);
        Box::new(move || {
            overlays
                .try_borrow()
                .is_ok_and(|manager| manager.is_top_modal(layer))
        })
    }

    /// Number of open layers.
    #[must_use]
    pub fn open_layers(&self) -> usize {
        self.overlays.borrow().len()
    }

    /// Window resized.
    pub fn on_resize(&self, now: Instant) {
        self.positions.borrow_mut().on_resize(now);
    }

    /// Page scrolled.
    pub fn on_scroll<D: Document<Node = N>>(&self, doc: &mut D) {
        self.positions.borrow_mut().on_scroll(doc);
    }

    /// Whether the host should request an animation frame.
    #[must_use]
    pub fn wants_animation_frame(&self) -> bool {
        self.positions.borrow().wants_animation_frame()
    }

    /// Animation frame; returns whether another one is wanted.
    pub fn on_animation_frame<D: Document<Node = N>>(&self, doc: &mut D) -> bool {
        self.positions.borrow_mut().on_animation_frame(doc)
    }

    /// Earliest deadline of the context-wide timers (tooltip hysteresis reset,
    /// resize debounce). Composites report their own deadlines.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let resize = self.positions.borrow().next_deadline();
        let reset = self.hysteresis.reset_deadline();
        match (resize, reset) {
            (Some(first), Some(second)) => Some(first.min(second)),
            (first, second) => first.or(second),
        }
    }

    /// Fire due context-wide deadlines.
    pub fn on_timer<D: Document<Node = N>>(&self, now: Instant, doc: &mut D) -> bool {
        let reset = self.hysteresis.reset_deadline().is_some_and(|deadline| deadline <= now);
        if reset {
            // Reading the flag past its deadline clears it.
            let _still_open = self.hysteresis.is_open(now);
        }
        let resized = self.positions.borrow_mut().on_timer(now, doc);
        reset || resized
    }
}

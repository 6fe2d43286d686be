//! Position updater.
//!
//! Keeps floating elements glued to their anchors. Each subscription pairs an
//! anchor with a floating node and a placement request; the updater re-runs the
//! geometry resolver when the window is resized (debounced), when the page
//! scrolls, on every animation frame for `auto_update` subscriptions, and when
//! the anchor or request is replaced. Results are written to the floating node
//! as inline styles and handed to the subscriber's callback.
//!
//! The updater is sans-IO: the host forwards resize/scroll/frame events and
//! drives the debounce through [`PositionUpdater::next_deadline`] and
//! [`PositionUpdater::on_timer`].

use core::fmt;
use core::time::Duration;
use floating_core::{AnchorRect, AnchorReference, Document, FloatingConfig, Rect, Size, Viewport};
use floating_geometry::{FloatingStyles, PlacementRequest, PlacementResult, compute_placement};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info_span;

const LOG_TARGET: &str = "floating_updater";

/// Identity of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Per-subscription behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdaterOptions {
    /// Resync on every animation frame while subscribed.
    pub auto_update: bool,
    /// Recompute on page scroll.
    pub observe_scroll: bool,
    /// Viewport margin handed to the resolver.
    pub margin: f64,
    /// Start hidden until [`PositionUpdater::on_entering`] is called.
    pub entering: bool,
    /// Write the computed styles onto the floating node.
    pub apply_styles: bool,
}

impl UpdaterOptions {
    /// Options using the configured margin.
    #[must_use]
    pub const fn from_config(config: &FloatingConfig) -> Self {
        Self {
            auto_update: false,
            observe_scroll: true,
            margin: config.margin_threshold,
            entering: true,
            apply_styles: true,
        }
    }
}

impl Default for UpdaterOptions {
    fn default() -> Self {
        Self::from_config(&FloatingConfig::default())
    }
}

/// What a subscriber receives after each successful recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    /// Subscription that was recomputed.
    pub id: SubscriptionId,
    /// Fresh placement.
    pub result: PlacementResult,
    /// Styles derived from `result`.
    pub styles: FloatingStyles,
}

/// Subscriber callback.
pub type UpdateCallback = Box<dyn FnMut(&PositionUpdate)>;

/// Inputs that determine a placement; a frame only recomputes when these move.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Snapshot {
    anchor: Rect,
    floating: Size,
    viewport: Viewport,
}

struct Subscription<N> {
    anchor: AnchorReference<N>,
    floating: N,
    request: PlacementRequest,
    options: UpdaterOptions,
    callback: UpdateCallback,
    entering: bool,
    snapshot: Option<Snapshot>,
    last_result: Option<PlacementResult>,
}

impl<N: fmt::Debug> fmt::Debug for Subscription<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Subscription")
            .field("anchor", &self.anchor)
            .field("floating", &self.floating)
            .field("request", &self.request)
            .field("entering", &self.entering)
            .finish_non_exhaustive()
    }
}

/// Registry of live position subscriptions.
#[derive(Debug)]
pub struct PositionUpdater<N> {
    subscriptions: BTreeMap<SubscriptionId, Subscription<N>>,
    next_id: u64,
    resize_debounce: Duration,
    resize_deadline: Option<Instant>,
}

impl<N: Copy + Eq + fmt::Debug> PositionUpdater<N> {
    /// Create an updater with the given resize debounce.
    #[must_use]
    pub const fn new(resize_debounce: Duration) -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            next_id: 0,
            resize_debounce,
            resize_deadline: None,
        }
    }

    /// Create an updater from the shared configuration.
    #[must_use]
    pub const fn from_config(config: &FloatingConfig) -> Self {
        Self::new(config.resize_debounce())
    }

    /// Start tracking `floating` against `anchor` and compute the first placement.
    ///
    /// With `options.entering` the first result is applied with
    /// `opacity: 0`; the element becomes visible once
    /// [`Self::on_entering`] recomputes after the initial layout.
    pub fn subscribe<D: Document<Node = N>>(
        &mut self,
        doc: &mut D,
        anchor: AnchorReference<N>,
        floating: N,
        request: PlacementRequest,
        options: UpdaterOptions,
        callback: UpdateCallback,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let mut subscription = Subscription {
            anchor,
            floating,
            request,
            options,
            callback,
            entering: options.entering,
            snapshot: None,
            last_result: None,
        };
        recompute(id, &mut subscription, doc);
        tracing::debug!(subscription = id.0, auto_update = options.auto_update, "position subscription added");
        self.subscriptions.insert(id, subscription);
        id
    }

    /// Stop tracking. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let removed = self.subscriptions.remove(&id).is_some();
        if removed {
            tracing::debug!(subscription = id.0, "position subscription removed");
        }
        if self.subscriptions.is_empty() {
            self.resize_deadline = None;
        }
        removed
    }

    /// Drop every subscription and pending deadline.
    pub fn dispose(&mut self) {
        self.subscriptions.clear();
        self.resize_deadline = None;
    }

    /// Whether `id` is live.
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscriptions.contains_key(&id)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Last placement delivered for `id`.
    #[must_use]
    pub fn last_result(&self, id: SubscriptionId) -> Option<&PlacementResult> {
        self.subscriptions.get(&id)?.last_result.as_ref()
    }

    /// Recompute one subscription immediately. Returns whether a result was delivered.
    pub fn recompute_now<D: Document<Node = N>>(&mut self, id: SubscriptionId, doc: &mut D) -> bool {
        self.subscriptions
            .get_mut(&id)
            .is_some_and(|subscription| recompute(id, subscription, doc))
    }

    /// The entering transition finished its initial layout: recompute and show.
    pub fn on_entering<D: Document<Node = N>>(&mut self, id: SubscriptionId, doc: &mut D) -> bool {
        let Some(subscription) = self.subscriptions.get_mut(&id) else {
            return false;
        };
        subscription.entering = false;
        recompute(id, subscription, doc)
    }

    /// Replace the anchor and recompute.
    pub fn set_anchor<D: Document<Node = N>>(
        &mut self,
        id: SubscriptionId,
        anchor: AnchorReference<N>,
        doc: &mut D,
    ) -> bool {
        let Some(subscription) = self.subscriptions.get_mut(&id) else {
            return false;
        };
        subscription.anchor = anchor;
        recompute(id, subscription, doc)
    }

    /// Replace the placement request and recompute.
    pub fn set_request<D: Document<Node = N>>(
        &mut self,
        id: SubscriptionId,
        request: PlacementRequest,
        doc: &mut D,
    ) -> bool {
        let Some(subscription) = self.subscriptions.get_mut(&id) else {
            return false;
        };
        subscription.request = request;
        recompute(id, subscription, doc)
    }

    /// Window resized: (re)start the debounce.
    pub fn on_resize(&mut self, now: Instant) {
        if !self.subscriptions.is_empty() {
            self.resize_deadline = Some(now + self.resize_debounce);
        }
    }

    /// Page scrolled: recompute every scroll-observing subscription.
    pub fn on_scroll<D: Document<Node = N>>(&mut self, doc: &mut D) {
        for (id, subscription) in &mut self.subscriptions {
            if subscription.options.observe_scroll {
                recompute(*id, subscription, doc);
            }
        }
    }

    /// Whether the host should schedule an animation frame.
    #[must_use]
    pub fn wants_animation_frame(&self) -> bool {
        self.subscriptions
            .values()
            .any(|subscription| subscription.options.auto_update)
    }

    /// Animation frame callback.
    ///
    /// Returns whether another frame is wanted; that decision is made before
    /// any recomputation so a frame is never skipped while subscribed.
    /// Subscriptions whose anchor, size and viewport are unchanged are skipped.
    pub fn on_animation_frame<D: Document<Node = N>>(&mut self, doc: &mut D) -> bool {
        let next_frame = self.wants_animation_frame();
        let _span = info_span!("updater.animation_frame").entered();
        for (id, subscription) in &mut self.subscriptions {
            if !subscription.options.auto_update {
                continue;
            }
            if snapshot(subscription, doc).is_some_and(|current| subscription.snapshot == Some(current)) {
                continue;
            }
            recompute(*id, subscription, doc);
        }
        next_frame
    }

    /// Earliest pending deadline.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.resize_deadline
    }

    /// Fire due deadlines. Returns whether anything ran.
    pub fn on_timer<D: Document<Node = N>>(&mut self, now: Instant, doc: &mut D) -> bool {
        match self.resize_deadline {
            Some(deadline) if deadline <= now => {
                self.resize_deadline = None;
                for (id, subscription) in &mut self.subscriptions {
                    recompute(*id, subscription, doc);
                }
                true
            }
            Some(_) | None => false,
        }
    }
}

fn snapshot<D: Document>(subscription: &Subscription<D::Node>, doc: &D) -> Option<Snapshot> {
    let AnchorRect::Attached(anchor) = subscription.anchor.resolve(doc) else {
        return None;
    };
    Some(Snapshot {
        anchor,
        floating: doc.bounding_rect(subscription.floating)?.size(),
        viewport: doc.viewport(),
    })
}

/// Recompute and deliver. Detached anchors or floating nodes discard the update.
fn recompute<D: Document>(id: SubscriptionId, subscription: &mut Subscription<D::Node>, doc: &mut D) -> bool {
    let Some(current) = snapshot(subscription, doc) else {
        log::debug!(target: LOG_TARGET, "subscription {} skipped: anchor or floating node detached", id.0);
        return false;
    };
    let result = compute_placement(
        &current.anchor,
        current.floating,
        &subscription.request,
        &current.viewport,
        subscription.options.margin,
    );
    let styles = FloatingStyles::from_result(&result, !subscription.entering);
    if subscription.options.apply_styles {
        styles.apply(doc, subscription.floating);
    }
    subscription.snapshot = Some(current);
    let update = PositionUpdate { id, result, styles };
    (subscription.callback)(&update);
    subscription.last_result = Some(update.result);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use floating_dom::{Dom, NodeKey};
    use floating_geometry::{Alignment, Placement, Side};
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting(counter: &Rc<Cell<u32>>) -> UpdateCallback {
        let counter = Rc::clone(counter);
        Box::new(move |_update| counter.set(counter.get() + 1))
    }

    struct Nodes {
        anchor: NodeKey,
        floating: NodeKey,
    }

    fn setup() -> (Dom, Nodes) {
        let _ignored = env_logger::builder().is_test(true).try_init();
        let mut dom = Dom::new(Viewport::new(800.0, 600.0));
        let anchor = dom.append_element(dom.body(), "button");
        let floating = dom.append_element(dom.body(), "div");
        dom.set_rect(anchor, Rect::new(100.0, 100.0, 40.0, 20.0));
        dom.set_rect(floating, Rect::new(0.0, 0.0, 80.0, 40.0));
        (dom, Nodes { anchor, floating })
    }

    /// Resize events are debounced into a single recomputation.
    ///
    /// # Panics
    /// Panics if the debounce fires early or more than once.
    #[test]
    fn resize_is_debounced() {
        let (mut dom, nodes) = setup();
        let calls = Rc::new(Cell::new(0u32));
        let mut updater = PositionUpdater::new(Duration::from_millis(166));
        updater.subscribe(
            &mut dom,
            AnchorReference::Element(nodes.anchor),
            nodes.floating,
            PlacementRequest::default(),
            UpdaterOptions::default(),
            counting(&calls),
        );
        assert_eq!(calls.get(), 1);

        let start = Instant::now();
        updater.on_resize(start);
        updater.on_resize(start + Duration::from_millis(100));
        assert!(!updater.on_timer(start + Duration::from_millis(200), &mut dom));
        assert_eq!(updater.next_deadline(), Some(start + Duration::from_millis(266)));
        assert!(updater.on_timer(start + Duration::from_millis(266), &mut dom));
        assert_eq!(calls.get(), 2);
        assert_eq!(updater.next_deadline(), None);
    }

    /// Frames request the next frame and recompute only when the anchor moved.
    ///
    /// # Panics
    /// Panics if unchanged frames recompute or the loop stops early.
    #[test]
    fn animation_frames_skip_unchanged_anchor() {
        let (mut dom, nodes) = setup();
        let calls = Rc::new(Cell::new(0u32));
        let mut updater = PositionUpdater::new(Duration::from_millis(166));
        let id = updater.subscribe(
            &mut dom,
            AnchorReference::Element(nodes.anchor),
            nodes.floating,
            PlacementRequest::default(),
            UpdaterOptions {
                auto_update: true,
                ..UpdaterOptions::default()
            },
            counting(&calls),
        );
        assert!(updater.wants_animation_frame());
        assert!(updater.on_animation_frame(&mut dom));
        assert_eq!(calls.get(), 1);

        dom.set_rect(nodes.anchor, Rect::new(150.0, 100.0, 40.0, 20.0));
        assert!(updater.on_animation_frame(&mut dom));
        assert_eq!(calls.get(), 2);

        assert!(updater.unsubscribe(id));
        assert!(!updater.wants_animation_frame());
        assert!(!updater.on_animation_frame(&mut dom));
    }

    /// The floating node stays transparent until the entering recomputation.
    ///
    /// # Panics
    /// Panics if the element becomes visible before entering completes.
    #[test]
    fn entering_keeps_element_transparent() {
        let (mut dom, nodes) = setup();
        let mut updater = PositionUpdater::new(Duration::from_millis(166));
        let id = updater.subscribe(
            &mut dom,
            AnchorReference::Element(nodes.anchor),
            nodes.floating,
            PlacementRequest::default(),
            UpdaterOptions::default(),
            Box::new(|_update| {}),
        );
        assert_eq!(dom.style_property(nodes.floating, "opacity").as_deref(), Some("0"));
        assert!(dom.style_property(nodes.floating, "left").is_some());
        assert!(updater.on_entering(id, &mut dom));
        assert_eq!(dom.style_property(nodes.floating, "opacity").as_deref(), Some("1"));
        assert_eq!(dom.style_property(nodes.floating, "visibility").as_deref(), Some("visible"));
    }

    /// Replacing the request repositions immediately.
    ///
    /// # Panics
    /// Panics if the new placement is not applied.
    #[test]
    fn replacing_request_recomputes() {
        let (mut dom, nodes) = setup();
        let mut updater = PositionUpdater::new(Duration::from_millis(166));
        let id = updater.subscribe(
            &mut dom,
            AnchorReference::Element(nodes.anchor),
            nodes.floating,
            PlacementRequest::default(),
            UpdaterOptions::default(),
            Box::new(|_update| {}),
        );
        assert_eq!(dom.style_property(nodes.floating, "top").as_deref(), Some("120px"));

        let above = PlacementRequest::at(Placement::new(Side::Top, Alignment::Center));
        assert!(updater.set_request(id, above, &mut dom));
        assert_eq!(
            updater.last_result(id).map(|result| result.placement),
            Some(Placement::new(Side::Top, Alignment::Center))
        );
        assert_eq!(dom.style_property(nodes.floating, "top").as_deref(), Some("60px"));
        assert!(!updater.set_request(SubscriptionId(99), above, &mut dom));
    }

    /// A detached anchor turns recomputation into a no-op.
    ///
    /// # Panics
    /// Panics if a detached anchor delivers a result.
    #[test]
    fn detached_anchor_is_no_op() {
        let (mut dom, nodes) = setup();
        let calls = Rc::new(Cell::new(0u32));
        let mut updater = PositionUpdater::new(Duration::from_millis(166));
        let id = updater.subscribe(
            &mut dom,
            AnchorReference::Element(nodes.anchor),
            nodes.floating,
            PlacementRequest::default(),
            UpdaterOptions::default(),
            counting(&calls),
        );
        dom.detach(nodes.anchor);
        assert!(!updater.recompute_now(id, &mut dom));
        updater.on_scroll(&mut dom);
        assert_eq!(calls.get(), 1);
        assert!(updater.last_result(id).is_some());
    }
}

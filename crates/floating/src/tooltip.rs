//! Tooltip: interaction timing driving a non-modal, positioned layer.

use crate::context::FloatingContext;
use crate::props::{TriggerEvent, TriggerProps};
use anyhow::Result;
use core::fmt;
use floating_core::{
    AnchorReference, Document, FloatingConfig, KeyEvent, Point, PointerAnchor,
};
use floating_geometry::PlacementRequest;
use floating_layers::{LayerId, OverlayLayer};
use floating_timing::{InteractionTimer, TimingOptions, Transition};
use floating_updater::{SubscriptionId, UpdaterOptions};
use std::rc::Rc;
use std::time::Instant;

/// Tooltip configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipOptions {
    /// DOM id given to the popup, referenced by `aria-describedby`.
    pub id: String,
    /// Text content; used as the trigger's accessible name.
    pub title: String,
    /// The tooltip describes the trigger instead of naming it.
    pub describe_child: bool,
    /// Position against the cursor instead of the trigger.
    pub follow_cursor: bool,
    /// Hovering the popup does not keep it open.
    pub disable_interactive: bool,
    /// Where the popup goes.
    pub request: PlacementRequest,
    /// Position resync behaviour.
    pub updater: UpdaterOptions,
    /// Delays and listener switches.
    pub timing: TimingOptions,
}

impl TooltipOptions {
    /// Defaults from the shared configuration.
    pub fn new(id: impl Into<String>, title: impl Into<String>, config: &FloatingConfig) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            describe_child: false,
            follow_cursor: false,
            disable_interactive: false,
            request: PlacementRequest::default(),
            updater: UpdaterOptions {
                entering: false,
                ..UpdaterOptions::from_config(config)
            },
            timing: TimingOptions::from_config(config),
        }
    }
}

/// Events the host forwards from the trigger and the popup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TooltipInput {
    /// Pointer entered the trigger.
    PointerEnter,
    /// Pointer left the trigger.
    PointerLeave,
    /// Pointer moved over the trigger, in client coordinates.
    PointerMove(Point),
    /// Pointer entered the popup.
    PopupPointerEnter,
    /// Pointer left the popup.
    PopupPointerLeave,
    /// Trigger focused.
    Focus {
        /// The focus came from the keyboard.
        focus_visible: bool,
    },
    /// Trigger blurred.
    Blur,
    /// Finger down on the trigger.
    TouchStart,
    /// Finger lifted.
    TouchEnd,
    /// Key pressed on the trigger.
    KeyDown(KeyEvent),
}

/// A tooltip bound to one trigger element.
pub struct Tooltip<N> {
    context: FloatingContext<N>,
    trigger: N,
    popup: N,
    options: TooltipOptions,
    timer: InteractionTimer,
    pointer: Rc<PointerAnchor>,
    layer: Option<LayerId>,
    subscription: Option<SubscriptionId>,
}

impl<N: fmt::Debug> fmt::Debug for Tooltip<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Tooltip")
            .field("trigger", &self.trigger)
            .field("popup", &self.popup)
            .field("timer", &self.timer)
            .field("layer", &self.layer)
            .finish_non_exhaustive()
    }
}

impl<N: Copy + Eq + fmt::Debug + 'static> Tooltip<N> {
    /// Bind a tooltip. The popup starts hidden and gets `role="tooltip"`.
    pub fn new<D: Document<Node = N>>(
        context: &FloatingContext<N>,
        doc: &mut D,
        trigger: N,
        popup: N,
        options: TooltipOptions,
    ) -> Self {
        doc.set_attribute(popup, "role", "tooltip");
        doc.set_attribute(popup, "id", &options.id);
        doc.set_style_property(popup, "visibility", Some("hidden"));

        let mut timer = InteractionTimer::new(options.timing, context.hysteresis());
        timer.attach_target(doc.attribute(trigger, "disabled").is_some());
        let tooltip = Self {
            context: context.clone(),
            trigger,
            popup,
            options,
            timer,
            pointer: Rc::new(PointerAnchor::default()),
            layer: None,
            subscription: None,
        };
        tooltip.trigger_props().apply(doc, trigger);
        tooltip
    }

    /// Whether the popup is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.layer.is_some()
    }

    /// Layer of the open popup.
    #[must_use]
    pub const fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Underlying timing machine.
    #[must_use]
    pub const fn timer(&self) -> &InteractionTimer {
        &self.timer
    }

    /// Forward one trigger or popup event.
    ///
    /// # Errors
    /// Returns an error if the overlay stack rejects the popup layer.
    pub fn handle<D: Document<Node = N>>(
        &mut self,
        input: TooltipInput,
        now: Instant,
        doc: &mut D,
    ) -> Result<Option<Transition>> {
        let interactive = !self.options.disable_interactive;
        let transition = match input {
            TooltipInput::PointerEnter => self.timer.pointer_enter(now),
            TooltipInput::PointerLeave => self.timer.pointer_leave(now),
            TooltipInput::PopupPointerEnter if interactive => self.timer.pointer_enter(now),
            TooltipInput::PopupPointerLeave if interactive => self.timer.pointer_leave(now),
            TooltipInput::PopupPointerEnter | TooltipInput::PopupPointerLeave => None,
            TooltipInput::PointerMove(position) => {
                self.pointer.move_to(position);
                if let Some(subscription) = self.subscription.filter(|_| self.options.follow_cursor) {
                    self.context.positions().borrow_mut().recompute_now(subscription, doc);
                }
                None
            }
            TooltipInput::Focus { focus_visible } => self.timer.focus(now, focus_visible),
            TooltipInput::Blur => self.timer.blur(now),
            TooltipInput::TouchStart => {
                self.timer.touch_start(now, doc);
                None
            }
            TooltipInput::TouchEnd => {
                self.timer.touch_end(now, doc);
                None
            }
            TooltipInput::KeyDown(event) => self.timer.key_down(now, &event),
        };
        self.apply(transition, doc)
    }

    /// Fire a due enter, leave or long-press deadline.
    ///
    /// # Errors
    /// Returns an error if the overlay stack rejects the popup layer.
    pub fn poll<D: Document<Node = N>>(&mut self, now: Instant, doc: &mut D) -> Result<Option<Transition>> {
        let transition = self.timer.poll(now);
        self.apply(transition, doc)
    }

    /// Pending timing deadline.
    #[must_use]
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.timer.next_deadline()
    }

    /// Show immediately (controlled usage).
    ///
    /// # Errors
    /// Returns an error if the overlay stack rejects the popup layer.
    pub fn open<D: Document<Node = N>>(&mut self, doc: &mut D) -> Result<bool> {
        let transition = self.timer.open();
        Ok(self.apply(transition, doc)?.is_some())
    }

    /// Hide immediately (controlled usage).
    pub fn close<D: Document<Node = N>>(&mut self, now: Instant, doc: &mut D) -> bool {
        let closed = self.timer.close(now) == Some(Transition::Close);
        if closed {
            self.hide(doc);
        }
        closed
    }

    /// Attributes and listeners for the trigger in the current state.
    #[must_use]
    pub fn trigger_props(&self) -> TriggerProps {
        let open = self.is_open();
        let timing = &self.options.timing;
        let attributes = if self.options.describe_child {
            let show_title = !open && !timing.disable_hover_listener;
            vec![
                ("title", show_title.then(|| self.options.title.clone())),
                ("aria-describedby", open.then(|| self.options.id.clone())),
            ]
        } else {
            vec![("aria-label", Some(self.options.title.clone()))]
        };

        let mut events = vec![TriggerEvent::KeyDown];
        if !timing.disable_hover_listener {
            events.extend([TriggerEvent::PointerEnter, TriggerEvent::PointerLeave]);
            if self.options.follow_cursor {
                events.push(TriggerEvent::PointerMove);
            }
        }
        if !timing.disable_focus_listener {
            events.extend([TriggerEvent::Focus, TriggerEvent::Blur]);
        }
        if !timing.disable_touch_listener {
            events.extend([TriggerEvent::TouchStart, TriggerEvent::TouchEnd]);
        }
        TriggerProps { attributes, events }
    }

    /// Clear every deadline and take the popup down.
    pub fn dispose<D: Document<Node = N>>(&mut self, doc: &mut D) {
        self.timer.dispose(doc);
        self.hide(doc);
    }

    fn apply<D: Document<Node = N>>(
        &mut self,
        transition: Option<Transition>,
        doc: &mut D,
    ) -> Result<Option<Transition>> {
        match transition {
            Some(Transition::Open) => self.show(doc)?,
            Some(Transition::Close) => self.hide(doc),
            None => {}
        }
        Ok(transition)
    }

    fn show<D: Document<Node = N>>(&mut self, doc: &mut D) -> Result<()> {
        if self.layer.is_some() {
            return Ok(());
        }
        let container = doc.parent(self.popup).unwrap_or_else(|| doc.body());
        let layer = {
            let mut overlays = self.context.overlays().borrow_mut();
            let id = overlays.next_layer_id();
            overlays.add(
                doc,
                OverlayLayer {
                    id,
                    root: self.popup,
                    container,
                    anchor: Some(self.trigger),
                    modal: false,
                    disable_scroll_lock: true,
                },
            );
            overlays.mount(doc, id)?;
            id
        };
        self.layer = Some(layer);

        let anchor = if self.options.follow_cursor {
            let pointer = Rc::clone(&self.pointer);
            AnchorReference::Virtual(pointer)
        } else {
            AnchorReference::Element(self.trigger)
        };
        let id = self.options.id.clone();
        self.subscription = Some(self.context.positions().borrow_mut().subscribe(
            doc,
            anchor,
            self.popup,
            self.options.request,
            self.options.updater,
            Box::new(move |update| {
                tracing::trace!(tooltip = %id, placement = %update.result.placement, "tooltip positioned");
            }),
        ));
        self.trigger_props().apply(doc, self.trigger);
        tracing::debug!(tooltip = %self.options.id, "tooltip opened");
        Ok(())
    }

    fn hide<D: Document<Node = N>>(&mut self, doc: &mut D) {
        let Some(layer) = self.layer.take() else {
            return;
        };
        self.context.overlays().borrow_mut().remove(doc, layer);
        if let Some(subscription) = self.subscription.take() {
            self.context.positions().borrow_mut().unsubscribe(subscription);
        }
        doc.set_style_property(self.popup, "visibility", Some("hidden"));
        self.trigger_props().apply(doc, self.trigger);
        tracing::debug!(tooltip = %self.options.id, "tooltip closed");
    }
}

//! Attributes and listeners a composite asks the host to put on its trigger.

use floating_core::Document;

/// Event a trigger needs a listener for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// `pointerenter`.
    PointerEnter,
    /// `pointerleave`.
    PointerLeave,
    /// `pointermove`, for cursor-following surfaces.
    PointerMove,
    /// `focus`.
    Focus,
    /// `blur`.
    Blur,
    /// `touchstart`.
    TouchStart,
    /// `touchend`.
    TouchEnd,
    /// `keydown`.
    KeyDown,
    /// `click`.
    Click,
}

/// Attribute set plus listener set for one trigger element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerProps {
    /// Attributes to set; `None` means the attribute must be absent.
    pub attributes: Vec<(&'static str, Option<String>)>,
    /// Listeners to attach.
    pub events: Vec<TriggerEvent>,
}

impl TriggerProps {
    /// Value the props set `name` to; `None` when unset or removed.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Whether a listener for `event` is requested.
    #[must_use]
    pub fn listens_to(&self, event: TriggerEvent) -> bool {
        self.events.contains(&event)
    }

    /// Write the attributes onto `node`.
    pub fn apply<D: Document>(&self, doc: &mut D, node: D::Node) {
        for (name, value) in &self.attributes {
            match value {
                Some(text) => doc.set_attribute(node, name, text),
                None => doc.remove_attribute(node, name),
            }
        }
    }
}

//! Anchor references.
//!
//! The engine never owns an anchor. It asks for the current rectangle each
//! time a placement is computed, so staleness is handled by recomputing.

use crate::diagnostics::{Warning, emit};
use crate::document::Document;
use crate::geometry::{Point, Rect};
use core::cell::Cell;
use core::fmt;
use std::rc::Rc;

/// Anything that can report a bounding rectangle without being a document node,
/// such as a text selection range or the mouse cursor.
pub trait VirtualElement {
    /// Current bounding rectangle in client coordinates.
    fn bounding_rect(&self) -> Rect;
}

/// What a floating element is positioned against.
pub enum AnchorReference<N> {
    /// A live document node.
    Element(N),
    /// A virtual stand-in.
    Virtual(Rc<dyn VirtualElement>),
    /// A fixed client-coordinate position. `None` means the caller chose
    /// position-based anchoring but has not supplied a position yet.
    Position(Option<Point>),
}

/// Outcome of resolving an anchor against the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorRect {
    /// The anchor is measurable.
    Attached(Rect),
    /// The anchor node is no longer part of the document.
    Detached,
}

impl<N: Copy> AnchorReference<N> {
    /// Read the anchor's rectangle once.
    pub fn resolve<D: Document<Node = N>>(&self, doc: &D) -> AnchorRect {
        match self {
            Self::Element(node) => {
                if !doc.is_connected(*node) {
                    return AnchorRect::Detached;
                }
                doc.bounding_rect(*node)
                    .map_or(AnchorRect::Detached, AnchorRect::Attached)
            }
            Self::Virtual(element) => AnchorRect::Attached(element.bounding_rect()),
            Self::Position(Some(point)) => AnchorRect::Attached(Rect::at_point(*point)),
            Self::Position(None) => {
                emit("floating_core", &Warning::MissingAnchorPosition);
                AnchorRect::Attached(Rect::default())
            }
        }
    }

    /// The anchor node when this reference points into the document.
    pub fn element(&self) -> Option<N> {
        match self {
            Self::Element(node) => Some(*node),
            Self::Virtual(_) | Self::Position(_) => None,
        }
    }
}

impl<N: Copy> Clone for AnchorReference<N> {
    fn clone(&self) -> Self {
        match self {
            Self::Element(node) => Self::Element(*node),
            Self::Virtual(element) => Self::Virtual(Rc::clone(element)),
            Self::Position(point) => Self::Position(*point),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for AnchorReference<N> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(node) => formatter.debug_tuple("Element").field(node).finish(),
            Self::Virtual(element) => formatter
                .debug_tuple("Virtual")
                .field(&element.bounding_rect())
                .finish(),
            Self::Position(point) => formatter.debug_tuple("Position").field(point).finish(),
        }
    }
}

/// Virtual anchor that follows the pointer.
///
/// The host updates the position on every pointer move; the rectangle is a
/// zero-sized box under the cursor.
#[derive(Debug, Default)]
pub struct PointerAnchor {
    position: Cell<Point>,
}

impl PointerAnchor {
    /// Create an anchor at a starting position.
    #[must_use]
    pub const fn new(position: Point) -> Self {
        Self {
            position: Cell::new(position),
        }
    }

    /// Record the latest pointer position.
    pub fn move_to(&self, position: Point) {
        self.position.set(position);
    }

    /// Last recorded pointer position.
    pub fn position(&self) -> Point {
        self.position.get()
    }
}

impl VirtualElement for PointerAnchor {
    fn bounding_rect(&self) -> Rect {
        Rect::at_point(self.position.get())
    }
}

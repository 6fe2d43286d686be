//! Placement computation.

use crate::placement::{
    Alignment, ArrowPosition, ArrowRequest, FlipFallback, Placement, PlacementRequest, PlacementResult,
    Side, Strategy,
};
use floating_core::{
    AnchorRect, AnchorReference, Axis, Document, Point, Rect, Size, Viewport, Warning, emit,
};
use smallvec::SmallVec;

const LOG_TARGET: &str = "floating_geometry";

/// Compute where a floating element of `floating` size goes relative to `anchor`.
///
/// # Placement Algorithm:
///
/// 1. Place the floating box flush against the preferred side of the anchor,
///    aligned along the anchor edge, and apply the main/cross axis offsets
/// 2. Flip: if the preferred side overflows the margin-bounded viewport, use
///    the opposite side when it has room
/// 3. Shift: clamp each axis into `[margin, viewport - margin]`, moving the
///    transform origin by the same delta the box moved in the other direction
///    so the visual pivot stays where the unclamped placement put it
/// 4. Round to whole pixels, then position the arrow against the rounded box
/// 5. Convert to document coordinates for the `absolute` strategy
///
/// ## Edge cases:
/// - An all-zero anchor rect raises [`Warning::DegenerateAnchor`]; the result
///   is still computed and ends up near the origin.
/// - A floating box larger than the margin-bounded viewport raises a size
///   warning and is pinned to the start margin.
#[must_use]
pub fn compute_placement(
    anchor: &Rect,
    floating: Size,
    request: &PlacementRequest,
    viewport: &Viewport,
    margin: f64,
) -> PlacementResult {
    let mut warnings: SmallVec<Warning, 2> = SmallVec::new();
    if anchor.is_degenerate() {
        warnings.push(Warning::DegenerateAnchor);
    }

    let placement = if request.allow_flip {
        choose_side(anchor, floating, request, viewport, margin)
    } else {
        request.placement
    };

    let mut position = base_position(anchor, floating, placement, request);
    let mut origin = transform_origin(floating, placement);

    if request.allow_shift {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let diff = shift_axis(&mut position, floating, viewport, margin, axis, &mut warnings);
            *origin.along_mut(axis) += diff;
        }
    }

    position = position.round();
    if request.allow_shift {
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let before = position.along(axis);
            let (low, high) = pixel_bounds(floating, viewport, margin, axis);
            let after = before.min(high).max(low);
            *position.along_mut(axis) = after;
            *origin.along_mut(axis) += before - after;
        }
    }

    let arrow = request
        .arrow
        .map(|arrow| arrow_position(anchor, floating, position, placement.side, &arrow));

    for warning in warnings.iter() {
        emit(LOG_TARGET, warning);
    }

    let hidden = !anchor.intersects(&viewport.rect());
    let coordinates = match request.strategy {
        Strategy::Absolute => Point::new(position.x + viewport.scroll_x, position.y + viewport.scroll_y),
        Strategy::Fixed => position,
    };

    PlacementResult {
        placement,
        coordinates,
        arrow,
        transform_origin: origin.round(),
        strategy: request.strategy,
        hidden,
        warnings,
    }
}

/// Resolve `anchor` against `doc` and compute the placement of `floating_node`.
///
/// Returns `None` when either the anchor or the floating element is detached;
/// the caller keeps whatever position it applied last.
pub fn compute_for_document<D: Document>(
    doc: &D,
    anchor: &AnchorReference<D::Node>,
    floating_node: D::Node,
    request: &PlacementRequest,
    margin: f64,
) -> Option<PlacementResult> {
    let AnchorRect::Attached(anchor_rect) = anchor.resolve(doc) else {
        log::debug!(target: LOG_TARGET, "anchor detached; placement skipped");
        return None;
    };
    let floating = doc.bounding_rect(floating_node)?.size();
    Some(compute_placement(&anchor_rect, floating, request, &doc.viewport(), margin))
}

fn base_position(anchor: &Rect, floating: Size, placement: Placement, request: &PlacementRequest) -> Point {
    let main = placement.side.main_axis();
    let cross = main.cross();
    let mut position = Point::default();

    let main_start = match placement.side {
        Side::Top | Side::Left => anchor.start(main) - floating.along(main) - request.offset_main_axis,
        Side::Bottom | Side::Right => {
            anchor.start(main) + anchor.extent(main) + request.offset_main_axis
        }
    };
    let cross_start = match placement.alignment {
        Alignment::Start => anchor.start(cross),
        Alignment::Center => anchor.start(cross) + (anchor.extent(cross) - floating.along(cross)) / 2.0,
        Alignment::End => anchor.start(cross) + anchor.extent(cross) - floating.along(cross),
    };

    *position.along_mut(main) = main_start;
    *position.along_mut(cross) = cross_start + request.offset_cross_axis;
    position
}

/// Overflow past the margins along the side's main axis. Zero or less means it fits.
fn main_axis_overflow(
    anchor: &Rect,
    floating: Size,
    placement: Placement,
    request: &PlacementRequest,
    viewport: &Viewport,
    margin: f64,
) -> f64 {
    let axis = placement.side.main_axis();
    let start = base_position(anchor, floating, placement, request).along(axis);
    let end = start + floating.along(axis);
    let before = margin - start;
    let after = end - (viewport.extent(axis) - margin);
    before.max(after)
}

fn choose_side(
    anchor: &Rect,
    floating: Size,
    request: &PlacementRequest,
    viewport: &Viewport,
    margin: f64,
) -> Placement {
    let preferred = request.placement;
    let preferred_overflow = main_axis_overflow(anchor, floating, preferred, request, viewport, margin);
    if preferred_overflow <= 0.0 {
        return preferred;
    }
    let flipped = preferred.flipped();
    let flipped_overflow = main_axis_overflow(anchor, floating, flipped, request, viewport, margin);
    if flipped_overflow <= 0.0 {
        log::trace!(target: LOG_TARGET, "flipped {preferred} to {flipped}");
        return flipped;
    }
    match request.flip_fallback {
        FlipFallback::BestFit if flipped_overflow < preferred_overflow => flipped,
        FlipFallback::BestFit | FlipFallback::Initial => preferred,
    }
}

/// Clamp one axis of `position` and return the delta to add to the transform origin.
fn shift_axis(
    position: &mut Point,
    floating: Size,
    viewport: &Viewport,
    margin: f64,
    axis: Axis,
    warnings: &mut SmallVec<Warning, 2>,
) -> f64 {
    let extent = floating.along(axis);
    let low = margin;
    let high = viewport.extent(axis) - margin;
    let available = high - low;

    if extent > available && extent > 0.0 {
        warnings.push(match axis {
            Axis::Vertical => Warning::FloatingTallerThanViewport {
                height: extent,
                available,
            },
            Axis::Horizontal => Warning::FloatingWiderThanViewport {
                width: extent,
                available,
            },
        });
        let diff = position.along(axis) - low;
        *position.along_mut(axis) = low;
        return diff;
    }

    let start = position.along(axis);
    let diff = if start < low {
        start - low
    } else if start + extent > high {
        start + extent - high
    } else {
        0.0
    };
    *position.along_mut(axis) = start - diff;
    diff
}

/// Whole-pixel range the rounded start coordinate may take on `axis`.
fn pixel_bounds(floating: Size, viewport: &Viewport, margin: f64, axis: Axis) -> (f64, f64) {
    let low = margin.ceil();
    let high = (viewport.extent(axis) - margin - floating.along(axis)).floor();
    (low, high.max(low))
}

/// Pivot at the edge touching the anchor, placed along that edge by alignment.
fn transform_origin(floating: Size, placement: Placement) -> Point {
    let main = placement.side.main_axis();
    let cross = main.cross();
    let mut origin = Point::default();
    *origin.along_mut(main) = if placement.side.is_leading() {
        floating.along(main)
    } else {
        0.0
    };
    *origin.along_mut(cross) = match placement.alignment {
        Alignment::Start => 0.0,
        Alignment::Center => floating.along(cross) / 2.0,
        Alignment::End => floating.along(cross),
    };
    origin
}

/// Rotation of the arrow square so its tip points at the anchor.
const fn arrow_rotation(side: Side) -> f64 {
    match side {
        Side::Bottom => 45.0,
        Side::Left => 135.0,
        Side::Top => 225.0,
        Side::Right => 315.0,
    }
}

fn arrow_position(anchor: &Rect, floating: Size, position: Point, side: Side, arrow: &ArrowRequest) -> ArrowPosition {
    let main = side.main_axis();
    let cross = main.cross();
    let half = arrow.width / 2.0;

    let anchor_center = anchor.start(cross) + anchor.extent(cross) / 2.0;
    let ideal = anchor_center - position.along(cross) - half;
    let low = arrow.padding;
    let high = floating.along(cross) - arrow.width - arrow.padding;
    let along_edge = if high < low {
        (floating.along(cross) - arrow.width) / 2.0
    } else {
        ideal.min(high).max(low)
    };
    let across_edge = if side.is_leading() {
        floating.along(main) - half
    } else {
        -half
    };

    let mut offset = Point::default();
    *offset.along_mut(cross) = along_edge;
    *offset.along_mut(main) = across_edge;
    let offset = offset.round();
    ArrowPosition {
        x: offset.x,
        y: offset.y,
        rotation_deg: arrow_rotation(side),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(placement: &str) -> PlacementRequest {
        PlacementRequest {
            strategy: Strategy::Fixed,
            ..PlacementRequest::at(placement.parse().expect("valid placement"))
        }
    }

    /// A bottom-centred tooltip sits under the anchor, centred, with its pivot on the top edge.
    ///
    /// # Panics
    /// Panics if the base placement is wrong.
    #[test]
    fn bottom_center_base_position() {
        let anchor = Rect::new(100.0, 100.0, 50.0, 20.0);
        let result = compute_placement(&anchor, Size::new(30.0, 10.0), &fixed("bottom"), &Viewport::new(800.0, 600.0), 16.0);
        assert_eq!(result.placement, "bottom".parse().expect("valid placement"));
        assert_eq!(result.coordinates, Point::new(110.0, 120.0));
        assert_eq!(result.transform_origin, Point::new(15.0, 0.0));
        assert!(!result.hidden);
        assert!(result.warnings.is_empty());
    }

    /// Offsets push away from the anchor and along its edge.
    ///
    /// # Panics
    /// Panics if offsets are applied in the wrong direction.
    #[test]
    fn offsets_follow_side() {
        let anchor = Rect::new(300.0, 300.0, 40.0, 40.0);
        let request = PlacementRequest {
            offset_main_axis: 8.0,
            offset_cross_axis: 4.0,
            ..fixed("left-start")
        };
        let result = compute_placement(&anchor, Size::new(100.0, 60.0), &request, &Viewport::new(800.0, 600.0), 0.0);
        assert_eq!(result.coordinates, Point::new(192.0, 304.0));
        assert_eq!(result.transform_origin, Point::new(100.0, 0.0));
    }

    /// With no room below, a bottom request flips to top.
    ///
    /// # Panics
    /// Panics if the flip does not happen.
    #[test]
    fn flips_to_top_near_bottom_edge() {
        let anchor = Rect::new(100.0, 560.0, 80.0, 20.0);
        let result = compute_placement(&anchor, Size::new(120.0, 100.0), &fixed("bottom"), &Viewport::new(800.0, 600.0), 16.0);
        assert_eq!(result.placement.side, Side::Top);
        assert!((result.coordinates.y - 460.0).abs() < f64::EPSILON);
    }

    /// When neither side fits, best-fit picks the side with less overflow.
    ///
    /// # Panics
    /// Panics if the fallback ignores the policy.
    #[test]
    fn best_fit_fallback() {
        let anchor = Rect::new(100.0, 150.0, 80.0, 20.0);
        let size = Size::new(100.0, 250.0);
        let viewport = Viewport::new(800.0, 400.0);

        let initial = compute_placement(&anchor, size, &fixed("top"), &viewport, 0.0);
        assert_eq!(initial.placement.side, Side::Top);

        let request = PlacementRequest {
            flip_fallback: FlipFallback::BestFit,
            ..fixed("top")
        };
        let best = compute_placement(&anchor, size, &request, &viewport, 0.0);
        assert_eq!(best.placement.side, Side::Bottom);
    }

    /// Shifting moves the box inside the margins and moves the pivot the other way.
    ///
    /// # Panics
    /// Panics if the clamp delta is not folded into the transform origin.
    #[test]
    fn shift_accumulates_into_origin() {
        let anchor = Rect::new(5.0, 100.0, 10.0, 10.0);
        let result = compute_placement(&anchor, Size::new(100.0, 40.0), &fixed("bottom"), &Viewport::new(800.0, 600.0), 16.0);
        // Unclamped x = 5 + 5 - 50 = -40; clamped to 16, pivot 50 - 56 = -6.
        assert!((result.coordinates.x - 16.0).abs() < f64::EPSILON);
        assert!((result.transform_origin.x + 6.0).abs() < f64::EPSILON);
    }

    /// The arrow points at the anchor centre and is kept off the corners by its padding.
    ///
    /// # Panics
    /// Panics if the arrow is misplaced.
    #[test]
    fn arrow_tracks_anchor_center() {
        let anchor = Rect::new(200.0, 100.0, 20.0, 20.0);
        let request = PlacementRequest {
            arrow: Some(ArrowRequest { width: 10.0, padding: 4.0 }),
            ..fixed("bottom-start")
        };
        let result = compute_placement(&anchor, Size::new(100.0, 50.0), &request, &Viewport::new(800.0, 600.0), 0.0);
        let arrow = result.arrow.expect("arrow requested");
        assert!((arrow.x - 5.0).abs() < f64::EPSILON);
        assert!((arrow.y + 5.0).abs() < f64::EPSILON);
        assert!((arrow.rotation_deg - 45.0).abs() < f64::EPSILON);

        let clamped = compute_placement(&anchor, Size::new(100.0, 50.0), &PlacementRequest {
            arrow: Some(ArrowRequest { width: 10.0, padding: 4.0 }),
            ..fixed("top-end")
        }, &Viewport::new(800.0, 600.0), 0.0);
        let arrow_top = clamped.arrow.expect("arrow requested");
        // Floating x = 120 and anchor centre 210 give 85, inside the padded range [4, 86].
        assert!((arrow_top.x - 85.0).abs() < f64::EPSILON);
        assert!((arrow_top.y - 45.0).abs() < f64::EPSILON);
        assert!((arrow_top.rotation_deg - 225.0).abs() < f64::EPSILON);
    }

    /// After shifting, the arrow still points at the anchor, and its padding
    /// keeps it off the corners once the anchor is past the edge.
    ///
    /// # Panics
    /// Panics if the arrow follows the unshifted box or leaves the padded range.
    #[test]
    fn arrow_follows_shifted_box() {
        let viewport = Viewport::new(800.0, 600.0);
        let floating = Size::new(200.0, 50.0);
        let request = PlacementRequest {
            arrow: Some(ArrowRequest { width: 10.0, padding: 4.0 }),
            ..fixed("bottom")
        };

        // Centred x would be 650; shifting pulls the box back to 584.
        let near_right = compute_placement(&Rect::new(740.0, 100.0, 20.0, 20.0), floating, &request, &viewport, 16.0);
        assert!((near_right.coordinates.x - 584.0).abs() < f64::EPSILON);
        let arrow = near_right.arrow.expect("arrow requested");
        assert!((arrow.x - 161.0).abs() < f64::EPSILON);
        assert!((arrow.y + 5.0).abs() < f64::EPSILON);

        let past_right = compute_placement(&Rect::new(790.0, 100.0, 10.0, 10.0), floating, &request, &viewport, 16.0);
        let clamped_right = past_right.arrow.expect("arrow requested");
        assert!((clamped_right.x - 186.0).abs() < f64::EPSILON);

        let past_left = compute_placement(&Rect::new(0.0, 100.0, 10.0, 10.0), floating, &request, &viewport, 16.0);
        assert!((past_left.coordinates.x - 16.0).abs() < f64::EPSILON);
        let clamped_left = past_left.arrow.expect("arrow requested");
        assert!((clamped_left.x - 4.0).abs() < f64::EPSILON);
    }

    /// Zero-area anchors warn and still return coordinates near the origin.
    ///
    /// # Panics
    /// Panics if the degenerate anchor is not reported.
    #[test]
    fn degenerate_anchor_warns() {
        let result = compute_placement(&Rect::default(), Size::new(40.0, 20.0), &fixed("bottom-start"), &Viewport::new(800.0, 600.0), 16.0);
        assert!(result.warnings.contains(&Warning::DegenerateAnchor));
        assert_eq!(result.coordinates, Point::new(16.0, 16.0));
    }

    /// Oversized floating boxes warn and are pinned to the start margin.
    ///
    /// # Panics
    /// Panics if the oversize case is not handled.
    #[test]
    fn oversized_box_pins_to_start_margin() {
        let anchor = Rect::new(100.0, 100.0, 20.0, 20.0);
        let result = compute_placement(&anchor, Size::new(50.0, 900.0), &fixed("bottom"), &Viewport::new(800.0, 600.0), 16.0);
        assert!((result.coordinates.y - 16.0).abs() < f64::EPSILON);
        assert!(matches!(
            result.warnings.first(),
            Some(Warning::FloatingTallerThanViewport { .. })
        ));
    }

    /// Absolute coordinates include the scroll offset; anchors scrolled out of view are hidden.
    ///
    /// # Panics
    /// Panics if strategy or visibility handling is wrong.
    #[test]
    fn absolute_strategy_and_hidden() {
        let viewport = Viewport {
            scroll_x: 0.0,
            scroll_y: 250.0,
            ..Viewport::new(800.0, 600.0)
        };
        let anchor = Rect::new(100.0, 100.0, 40.0, 20.0);
        let request = PlacementRequest::at("bottom-start".parse().expect("valid placement"));
        let result = compute_placement(&anchor, Size::new(40.0, 40.0), &request, &viewport, 0.0);
        assert_eq!(result.coordinates, Point::new(100.0, 370.0));

        let offscreen = Rect::new(100.0, -200.0, 40.0, 20.0);
        let hidden = compute_placement(&offscreen, Size::new(40.0, 40.0), &fixed("bottom"), &viewport, 0.0);
        assert!(hidden.hidden);
    }

    /// Fractional inputs produce whole-pixel output.
    ///
    /// # Panics
    /// Panics if coordinates are not rounded.
    #[test]
    fn rounds_to_pixels() {
        let anchor = Rect::new(100.3, 100.6, 33.3, 20.2);
        let result = compute_placement(&anchor, Size::new(17.7, 10.1), &fixed("bottom"), &Viewport::new(800.0, 600.0), 16.0);
        assert!((result.coordinates.x - result.coordinates.x.round()).abs() < f64::EPSILON);
        assert!((result.coordinates.y - result.coordinates.y.round()).abs() < f64::EPSILON);
    }
}

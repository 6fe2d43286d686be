use floating_core::{AnchorReference, Document as _, PointerAnchor, Rect, Size, Viewport};
use floating_dom::Dom;
use floating_geometry::{PlacementRequest, Side, Strategy, compute_for_document, compute_placement};
use std::rc::Rc;

fn init_logger() {
    let _ignored = env_logger::builder().is_test(true).try_init();
}

fn fixed(placement: &str) -> PlacementRequest {
    PlacementRequest {
        strategy: Strategy::Fixed,
        ..PlacementRequest::at(placement.parse().expect("valid placement"))
    }
}

/// With shifting enabled the floating box never leaves `[margin, viewport - margin]`.
///
/// # Panics
/// Panics if any combination escapes the margins.
#[test]
fn clamp_invariant_over_viewports_and_margins() {
    init_logger();
    let size = Size::new(120.0, 80.0);
    for (width, height) in [(320.0, 240.0), (800.0, 600.0), (1920.0, 1080.0)] {
        let viewport = Viewport::new(width, height);
        for margin in [0.0, 8.0, 16.0, 31.5] {
            for name in ["top", "bottom-start", "left-end", "right", "top-end"] {
                for anchor in [
                    Rect::new(-50.0, -50.0, 20.0, 20.0),
                    Rect::new(width - 5.0, height - 5.0, 30.0, 30.0),
                    Rect::new(width / 2.0, height / 2.0, 10.0, 10.0),
                    Rect::new(3.0, height - 10.0, 200.0, 4.0),
                ] {
                    let result = compute_placement(&anchor, size, &fixed(name), &viewport, margin);
                    let position = result.coordinates;
                    assert!(position.x >= margin, "{name} x {} < {margin}", position.x);
                    assert!(position.y >= margin, "{name} y {} < {margin}", position.y);
                    assert!(position.x + size.width <= width - margin, "{name} right edge escaped");
                    assert!(position.y + size.height <= height - margin, "{name} bottom edge escaped");
                }
            }
        }
    }
}

/// Identical inputs give identical results.
///
/// # Panics
/// Panics if the resolver is not deterministic.
#[test]
fn idempotent_for_unchanged_anchor() {
    let mut dom = Dom::new(Viewport::new(800.0, 600.0));
    let anchor = dom.append_element(dom.body(), "button");
    let floating = dom.append_element(dom.body(), "div");
    dom.set_rect(anchor, Rect::new(200.0, 200.0, 60.0, 24.0));
    dom.set_rect(floating, Rect::new(0.0, 0.0, 150.0, 90.0));

    let reference = AnchorReference::Element(anchor);
    let request = fixed("bottom-start");
    let first = compute_for_document(&dom, &reference, floating, &request, 16.0);
    let second = compute_for_document(&dom, &reference, floating, &request, 16.0);
    assert!(first.is_some());
    assert_eq!(first, second);
}

/// Near the bottom edge a bottom request resolves to top.
///
/// # Panics
/// Panics if the flip is not taken.
#[test]
fn flip_near_bottom_edge() {
    let anchor = Rect::new(400.0, 570.0, 40.0, 20.0);
    let result = compute_placement(&anchor, Size::new(100.0, 120.0), &fixed("bottom"), &Viewport::new(800.0, 600.0), 16.0);
    assert_eq!(result.placement.side, Side::Top);
}

/// A detached anchor or floating node yields nothing instead of failing.
///
/// # Panics
/// Panics if a detached node produces a placement.
#[test]
fn detached_nodes_are_no_ops() {
    let mut dom = Dom::new(Viewport::default());
    let anchor = dom.append_element(dom.body(), "button");
    let floating = dom.append_element(dom.body(), "div");
    dom.set_rect(anchor, Rect::new(10.0, 10.0, 10.0, 10.0));
    let request = fixed("bottom");

    dom.detach(anchor);
    assert_eq!(compute_for_document(&dom, &AnchorReference::Element(anchor), floating, &request, 16.0), None);

    let cursor = AnchorReference::Virtual(Rc::new(PointerAnchor::default()));
    dom.detach(floating);
    assert_eq!(compute_for_document(&dom, &cursor, floating, &request, 16.0), None);
}

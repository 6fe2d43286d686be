use core::time::Duration;
use floating::timing::Transition;
use floating::{FloatingContext, Tooltip, TooltipInput, TooltipOptions, TriggerEvent};
use floating_core::{Document as _, FloatingConfig, Key, KeyEvent, Point, Rect, Viewport};
use floating_dom::{Dom, NodeKey};
use std::time::Instant;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

struct Fixture {
    dom: Dom,
    context: FloatingContext<NodeKey>,
    trigger: NodeKey,
    popup: NodeKey,
}

fn fixture() -> Fixture {
    let mut dom = Dom::new(Viewport::new(1024.0, 768.0));
    let trigger = dom.append_element(dom.body(), "button");
    dom.set_rect(trigger, Rect::new(100.0, 100.0, 80.0, 30.0));
    let popup = dom.append_element(dom.body(), "div");
    dom.set_rect(popup, Rect::new(0.0, 0.0, 120.0, 40.0));
    Fixture {
        dom,
        context: FloatingContext::new(FloatingConfig::default()),
        trigger,
        popup,
    }
}

fn tooltip(fixture: &mut Fixture, id: &str, options: impl FnOnce(&mut TooltipOptions)) -> Tooltip<NodeKey> {
    let mut tooltip_options = TooltipOptions::new(id, "Save", fixture.context.config());
    options(&mut tooltip_options);
    Tooltip::new(
        &fixture.context,
        &mut fixture.dom,
        fixture.trigger,
        fixture.popup,
        tooltip_options,
    )
}

/// Hovering opens after the enter delay, positions the popup below the
/// trigger, and leaving closes it again.
///
/// # Panics
/// Panics if the tooltip opens early, lands in the wrong place or stays open.
#[test]
fn hover_opens_after_delay_and_positions() {
    let _ignored = env_logger::builder().is_test(true).try_init();
    let mut fixture = fixture();
    let mut tip = tooltip(&mut fixture, "tip", |_| {});
    let start = Instant::now();

    assert_eq!(tip.handle(TooltipInput::PointerEnter, start, &mut fixture.dom).ok(), Some(None));
    assert_eq!(tip.next_deadline(), Some(start + ms(100)));
    assert!(!tip.is_open());

    let opened = tip.poll(start + ms(100), &mut fixture.dom);
    assert_eq!(opened.ok(), Some(Some(Transition::Open)));
    assert_eq!(fixture.context.open_layers(), 1);

    let dom = &fixture.dom;
    assert_eq!(dom.attribute(fixture.popup, "role").as_deref(), Some("tooltip"));
    assert_eq!(dom.attribute(fixture.trigger, "aria-label").as_deref(), Some("Save"));
    assert_eq!(dom.style_property(fixture.popup, "left").as_deref(), Some("80px"));
    assert_eq!(dom.style_property(fixture.popup, "top").as_deref(), Some("130px"));
    assert_eq!(dom.style_property(fixture.popup, "visibility").as_deref(), Some("visible"));

    let closed = tip.handle(TooltipInput::PointerLeave, start + ms(300), &mut fixture.dom);
    assert_eq!(closed.ok(), Some(Some(Transition::Close)));
    assert_eq!(fixture.context.open_layers(), 0);
    assert_eq!(
        fixture.dom.style_property(fixture.popup, "visibility").as_deref(),
        Some("hidden")
    );
}

/// Tooltips from one context share the fast-reopen window.
///
/// # Panics
/// Panics if the second tooltip waits for the enter delay.
#[test]
fn sibling_tooltips_share_hysteresis() {
    let mut fixture = fixture();
    let mut first = tooltip(&mut fixture, "first", |_| {});
    let mut second = tooltip(&mut fixture, "second", |_| {});
    let start = Instant::now();

    assert_eq!(first.open(&mut fixture.dom).ok(), Some(true));
    assert!(first.close(start, &mut fixture.dom));
    assert_eq!(fixture.context.next_deadline(), Some(start + ms(800)));

    let reopened = second.handle(TooltipInput::PointerEnter, start + ms(400), &mut fixture.dom);
    assert_eq!(reopened.ok(), Some(Some(Transition::Open)));
    assert!(second.is_open());
}

/// A describing tooltip keeps `title` while closed and points
/// `aria-describedby` at the popup while open.
///
/// # Panics
/// Panics if the trigger attributes do not follow the open state.
#[test]
fn describe_child_attributes() {
    let mut fixture = fixture();
    let mut tip = tooltip(&mut fixture, "tip", |options| options.describe_child = true);
    let trigger = fixture.trigger;

    assert_eq!(fixture.dom.attribute(trigger, "title").as_deref(), Some("Save"));
    assert_eq!(fixture.dom.attribute(trigger, "aria-describedby"), None);

    assert_eq!(tip.open(&mut fixture.dom).ok(), Some(true));
    assert_eq!(fixture.dom.attribute(trigger, "title"), None);
    assert_eq!(fixture.dom.attribute(trigger, "aria-describedby").as_deref(), Some("tip"));

    let escape = TooltipInput::KeyDown(KeyEvent::plain(Key::Escape));
    let closed = tip.handle(escape, Instant::now(), &mut fixture.dom);
    assert_eq!(closed.ok(), Some(Some(Transition::Close)));
    assert_eq!(fixture.dom.attribute(trigger, "aria-describedby"), None);
}

/// Listener set follows the listener switches.
///
/// # Panics
/// Panics if a disabled listener is still requested.
#[test]
fn trigger_props_follow_listener_switches() {
    let mut fixture = fixture();
    let tip = tooltip(&mut fixture, "tip", |options| {
        options.timing.disable_touch_listener = true;
        options.follow_cursor = true;
    });
    let props = tip.trigger_props();
    assert!(props.listens_to(TriggerEvent::PointerEnter));
    assert!(props.listens_to(TriggerEvent::PointerMove));
    assert!(props.listens_to(TriggerEvent::Focus));
    assert!(!props.listens_to(TriggerEvent::TouchStart));
    assert_eq!(props.attribute("aria-label"), Some("Save"));
}

/// A cursor-following tooltip is repositioned on every pointer move.
///
/// # Panics
/// Panics if the popup does not follow the pointer.
#[test]
fn follow_cursor_tracks_pointer() {
    let mut fixture = fixture();
    let mut tip = tooltip(&mut fixture, "tip", |options| options.follow_cursor = true);
    assert_eq!(tip.open(&mut fixture.dom).ok(), Some(true));

    let moved = tip.handle(
        TooltipInput::PointerMove(Point::new(300.0, 200.0)),
        Instant::now(),
        &mut fixture.dom,
    );
    assert_eq!(moved.ok(), Some(None));
    assert_eq!(fixture.dom.style_property(fixture.popup, "left").as_deref(), Some("240px"));
    assert_eq!(fixture.dom.style_property(fixture.popup, "top").as_deref(), Some("200px"));
    assert!(tip.trigger_props().listens_to(TriggerEvent::PointerMove));

    // Moves while closed are remembered and used by the next open.
    assert!(tip.close(Instant::now(), &mut fixture.dom));
    let idle = tip.handle(
        TooltipInput::PointerMove(Point::new(500.0, 400.0)),
        Instant::now(),
        &mut fixture.dom,
    );
    assert_eq!(idle.ok(), Some(None));
    assert_eq!(fixture.dom.style_property(fixture.popup, "left").as_deref(), Some("240px"));
    assert_eq!(tip.open(&mut fixture.dom).ok(), Some(true));
    assert_eq!(fixture.dom.style_property(fixture.popup, "left").as_deref(), Some("440px"));
    assert_eq!(fixture.dom.style_property(fixture.popup, "top").as_deref(), Some("400px"));
}

/// Disposing clears pending deadlines and the layer.
///
/// # Panics
/// Panics if anything survives disposal.
#[test]
fn dispose_clears_everything() {
    let mut fixture = fixture();
    let mut tip = tooltip(&mut fixture, "tip", |_| {});
    let pending = tip.handle(TooltipInput::PointerEnter, Instant::now(), &mut fixture.dom);
    assert_eq!(pending.ok(), Some(None));
    assert!(tip.next_deadline().is_some());
    tip.dispose(&mut fixture.dom);
    assert_eq!(tip.next_deadline(), None);

    assert_eq!(tip.open(&mut fixture.dom).ok(), Some(true));
    assert_eq!(fixture.context.open_layers(), 1);
    tip.dispose(&mut fixture.dom);
    assert!(!tip.is_open());
    assert_eq!(fixture.context.open_layers(), 0);
    assert!(fixture.context.positions().borrow().is_empty());
}

use core::time::Duration;
use floating_timing::{Hysteresis, InteractionTimer, TimingOptions, TimingState, Transition};
use std::rc::Rc;
use std::time::Instant;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn pair(leave_delay: Duration) -> (InteractionTimer, InteractionTimer) {
    let shared = Rc::new(Hysteresis::new());
    let options = TimingOptions {
        leave_delay,
        ..TimingOptions::default()
    };
    (
        InteractionTimer::new(options, Rc::clone(&shared)),
        InteractionTimer::new(options, shared),
    )
}

/// Closing one tooltip then hovering another within `leave_delay + 800ms`
/// opens the second one without the enter delay.
///
/// # Panics
/// Panics if the second trigger waits for the full enter delay.
#[test]
fn second_anchor_opens_immediately_within_window() {
    let _ignored = env_logger::builder().is_test(true).try_init();
    let (mut first, mut second) = pair(ms(200));
    let start = Instant::now();

    first.pointer_enter(start);
    assert_eq!(first.poll(start + ms(100)), Some(Transition::Open));
    first.pointer_leave(start + ms(150));
    assert_eq!(first.poll(start + ms(350)), Some(Transition::Close));

    // Closed at 350ms, so the window lasts until 350 + 200 + 800.
    assert_eq!(second.pointer_enter(start + ms(1349)), Some(Transition::Open));
}

/// Outside the window the full enter delay applies again.
///
/// # Panics
/// Panics if the window outlives `leave_delay + 800ms`.
#[test]
fn window_expires() {
    let (mut first, mut second) = pair(Duration::ZERO);
    let start = Instant::now();

    assert_eq!(first.open(), Some(Transition::Open));
    assert_eq!(first.pointer_leave(start), Some(Transition::Close));

    assert_eq!(second.pointer_enter(start + ms(800)), None);
    assert_eq!(second.state(), TimingState::EnterPending(start + ms(900)));
}

/// Hovering back in within half the leave delay keeps the tooltip open.
///
/// # Panics
/// Panics if the pending leave closes the tooltip.
#[test]
fn hover_back_within_half_leave_delay() {
    let (mut timer, _sibling) = pair(ms(400));
    let start = Instant::now();
    timer.pointer_enter(start);
    assert_eq!(timer.poll(start + ms(100)), Some(Transition::Open));

    timer.pointer_leave(start + ms(500));
    timer.pointer_enter(start + ms(700));
    assert_eq!(timer.poll(start + ms(1000)), None);
    assert_eq!(timer.state(), TimingState::Open);
}

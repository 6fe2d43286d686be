//! Pure transition function over [`ListNavigationState`].

use crate::model::{
    ListAction, ListConfig, ListItem, ListNavigationState, SelectionMode, TypeaheadBuffer,
    warn_duplicates,
};
use core::fmt::Debug;
use core::hash::Hash;

const LOG_TARGET: &str = "floating_listnav";

/// Outcome of one [`reduce`] step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction<V> {
    /// State after the action.
    pub state: ListNavigationState<V>,
    /// The surrounding panel should close (single selection or a plain menu
    /// activation).
    pub close_requested: bool,
    /// `selected` differs from before the action.
    pub selection_changed: bool,
    /// The key should not reach the page (`preventDefault`).
    pub handled: bool,
}

impl<V> Reduction<V> {
    const fn unchanged(state: ListNavigationState<V>, handled: bool) -> Self {
        Self {
            state,
            close_requested: false,
            selection_changed: false,
            handled,
        }
    }
}

/// Direction of a traversal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Apply `action` to `state`.
///
/// Navigation actions never leave the highlight on an ineligible item and
/// never loop forever: a traversal that reaches the first item a second time
/// gives up and keeps the current highlight.
pub fn reduce<V: Clone + Eq + Hash + Debug>(
    mut state: ListNavigationState<V>,
    action: ListAction<V>,
    config: &ListConfig,
) -> Reduction<V> {
    match action {
        ListAction::Next => {
            let current = state.highlighted_index();
            let wrap_disabled = current.is_some() && config.disable_list_wrap;
            let target = traverse(&state.items, current, Direction::Forward, wrap_disabled, config, |_| true);
            highlight(&mut state, target);
            Reduction::unchanged(state, true)
        }
        ListAction::Previous => {
            let current = state.highlighted_index();
            let wrap_disabled = current.is_some() && config.disable_list_wrap;
            let target = traverse(&state.items, current, Direction::Backward, wrap_disabled, config, |_| true);
            highlight(&mut state, target);
            Reduction::unchanged(state, true)
        }
        ListAction::First => {
            let target = traverse(&state.items, None, Direction::Forward, false, config, |_| true);
            highlight(&mut state, target);
            Reduction::unchanged(state, true)
        }
        ListAction::Last => {
            let target = traverse(&state.items, None, Direction::Backward, false, config, |_| true);
            highlight(&mut state, target);
            Reduction::unchanged(state, true)
        }
        ListAction::PageDown => {
            let target = page(&state, Direction::Forward, config);
            highlight(&mut state, target);
            Reduction::unchanged(state, true)
        }
        ListAction::PageUp => {
            let target = page(&state, Direction::Backward, config);
            highlight(&mut state, target);
            Reduction::unchanged(state, true)
        }
        ListAction::CharacterKey { ch, time_ms } => typeahead(state, ch, time_ms, config),
        ListAction::ItemClick(value) => {
            let clickable = state
                .index_of(&value)
                .and_then(|index| state.items.get(index))
                .is_some_and(|item| !item.disabled);
            if !clickable {
                return Reduction::unchanged(state, false);
            }
            state.highlighted = Some(value.clone());
            activate(state, value, config)
        }
        ListAction::Select => {
            let target = state
                .highlighted_index()
                .and_then(|index| state.items.get(index))
                .filter(|item| !item.disabled)
                .map(|item| item.value.clone());
            match target {
                Some(value) => activate(state, value, config),
                None => Reduction::unchanged(state, false),
            }
        }
        ListAction::Blur => {
            state.highlighted = None;
            state.typeahead = TypeaheadBuffer::default();
            Reduction::unchanged(state, false)
        }
        ListAction::ItemsChanged(items) => items_changed(state, items),
        ListAction::SetHighlight(value) => {
            let target = state
                .index_of(&value)
                .filter(|index| state.items.get(*index).is_some_and(|item| eligible(item, config)));
            let handled = target.is_some();
            highlight(&mut state, target);
            Reduction::unchanged(state, handled)
        }
        ListAction::ClearSelection => {
            let selection_changed = !state.selected.is_empty();
            state.selected.clear();
            Reduction {
                state,
                close_requested: false,
                selection_changed,
                handled: false,
            }
        }
    }
}

fn eligible<V>(item: &ListItem<V>, config: &ListConfig) -> bool {
    !item.disabled || config.disabled_items_focusable
}

fn highlight<V: Clone>(state: &mut ListNavigationState<V>, target: Option<usize>) {
    if let Some(item) = target.and_then(|index| state.items.get(index)) {
        state.highlighted = Some(item.value.clone());
    }
}

/// One step from `from`; `None` starts at the respective end.
fn step(len: usize, from: Option<usize>, direction: Direction, wrap_disabled: bool) -> Option<usize> {
    let last = len.checked_sub(1)?;
    match (from, direction) {
        (None, Direction::Forward) => Some(0),
        (None, Direction::Backward) => Some(last),
        (Some(index), Direction::Forward) if index < last => Some(index + 1),
        (Some(index), Direction::Backward) if index > 0 => Some(index - 1),
        (Some(_), Direction::Forward) => (!wrap_disabled).then_some(0),
        (Some(_), Direction::Backward) => (!wrap_disabled).then_some(last),
    }
}

/// Walk from `from` until an eligible item matching `criteria` is found.
fn traverse<V>(
    items: &[ListItem<V>],
    from: Option<usize>,
    direction: Direction,
    wrap_disabled: bool,
    config: &ListConfig,
    criteria: impl Fn(&ListItem<V>) -> bool,
) -> Option<usize> {
    let mut wrapped_once = false;
    let mut next = step(items.len(), from, direction, wrap_disabled);
    while let Some(index) = next {
        if index == 0 {
            if wrapped_once {
                return None;
            }
            wrapped_once = true;
        }
        let item = items.get(index)?;
        if eligible(item, config) && criteria(item) {
            return Some(index);
        }
        next = step(items.len(), Some(index), direction, wrap_disabled);
    }
    None
}

/// Target of PageUp/PageDown: `page_size` items away, clamped to the ends,
/// then the nearest eligible item between there and the current one.
fn page<V: Clone + Eq + Hash + Debug>(
    state: &ListNavigationState<V>,
    direction: Direction,
    config: &ListConfig,
) -> Option<usize> {
    let last = state.items.len().checked_sub(1)?;
    let size = config.page_size.max(1);
    let current = state.highlighted_index();
    let target = match (direction, current) {
        (Direction::Forward, Some(index)) => index.saturating_add(size).min(last),
        (Direction::Forward, None) => (size - 1).min(last),
        (Direction::Backward, Some(index)) => index.saturating_sub(size),
        (Direction::Backward, None) => last.saturating_sub(size - 1),
    };
    let is_eligible = |index: &usize| state.items.get(*index).is_some_and(|item| eligible(item, config));
    match direction {
        Direction::Forward => {
            let floor = current.map_or(0, |index| index + 1);
            (floor..=target)
                .rev()
                .find(is_eligible)
                .or_else(|| (target + 1..=last).find(is_eligible))
        }
        Direction::Backward => {
            let ceiling = current.map_or(last, |index| index.saturating_sub(1));
            (target..=ceiling)
                .find(is_eligible)
                .or_else(|| (0..target).rev().find(is_eligible))
        }
    }
}

fn typeahead<V: Clone + Eq + Hash + Debug>(
    mut state: ListNavigationState<V>,
    ch: char,
    time_ms: u64,
    config: &ListConfig,
) -> Reduction<V> {
    state.typeahead.push(ch, time_ms, config.typeahead_timeout_ms);
    let current = state.highlighted_index();
    let buffer = &state.typeahead;
    let keep_current = !buffer.repeating
        && current
            .and_then(|index| state.items.get(index))
            .is_some_and(|item| buffer.matches(&item.label));
    let target = if buffer.previous_key_matched && !keep_current {
        traverse(&state.items, current, Direction::Forward, false, config, |item| {
            buffer.matches(&item.label)
        })
    } else {
        None
    };
    let handled = state.typeahead.previous_key_matched && (keep_current || target.is_some());
    highlight(&mut state, target);
    if !handled {
        state.typeahead.previous_key_matched = false;
        log::trace!(target: LOG_TARGET, "typeahead {:?} matched nothing", state.typeahead.keys);
    }
    Reduction::unchanged(state, handled)
}

fn activate<V: Clone + Eq + Hash + Debug>(
    mut state: ListNavigationState<V>,
    value: V,
    config: &ListConfig,
) -> Reduction<V> {
    let (close_requested, selection_changed) = match config.selection_mode {
        SelectionMode::None => (true, false),
        SelectionMode::Single => {
            let changed = state.selected != [value.clone()];
            state.selected = vec![value];
            (true, changed)
        }
        SelectionMode::Multiple => {
            if let Some(position) = state.selected.iter().position(|selected| *selected == value) {
                state.selected.remove(position);
            } else {
                state.selected.push(value);
            }
            (false, true)
        }
    };
    Reduction {
        state,
        close_requested,
        selection_changed,
        handled: true,
    }
}

fn items_changed<V: Clone + Eq + Hash + Debug>(
    mut state: ListNavigationState<V>,
    items: Vec<ListItem<V>>,
) -> Reduction<V> {
    warn_duplicates(&items);
    state.items = items;
    if state
        .highlighted
        .as_ref()
        .is_some_and(|value| state.index_of(value).is_none())
    {
        state.highlighted = None;
    }
    let before = state.selected.len();
    let items = &state.items;
    state
        .selected
        .retain(|value| items.iter().any(|item| item.value == *value));
    let selection_changed = state.selected.len() != before;
    Reduction {
        state,
        close_requested: false,
        selection_changed,
        handled: false,
    }
}

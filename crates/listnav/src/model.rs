//! List items, configuration, state and actions.

use core::fmt::Debug;
use core::hash::Hash;
use floating_core::{FloatingConfig, Key, KeyEvent, Warning, emit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const LOG_TARGET: &str = "floating_listnav";

/// One entry of a navigable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<V> {
    /// Identity of the item; must be unique within the list.
    pub value: V,
    /// Text used for typeahead matching.
    pub label: String,
    /// Disabled items are skipped unless disabled items are focusable.
    pub disabled: bool,
    /// DOM id used for `aria-activedescendant`.
    pub id: Option<String>,
}

impl<V> ListItem<V> {
    /// An enabled item without a DOM id.
    pub fn new(value: V, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            disabled: false,
            id: None,
        }
    }

    /// Mark the item disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Attach a DOM id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// How many items may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Items are activated but nothing stays selected (plain menus).
    #[default]
    None,
    /// One item; selecting asks the panel to close.
    Single,
    /// Any number of items, toggled; the panel stays open.
    Multiple,
}

/// Which arrow keys move the highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Up/Down.
    #[default]
    Vertical,
    /// Left/Right.
    Horizontal,
}

/// Navigation behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Stop at the ends instead of wrapping.
    pub disable_list_wrap: bool,
    /// Let the highlight land on disabled items.
    pub disabled_items_focusable: bool,
    /// Selection behaviour.
    pub selection_mode: SelectionMode,
    /// Arrow key axis.
    pub orientation: Orientation,
    /// Items skipped by PageUp/PageDown.
    pub page_size: usize,
    /// Gap after which the typeahead buffer starts over.
    pub typeahead_timeout_ms: u64,
}

impl ListConfig {
    /// Defaults from the shared configuration.
    #[must_use]
    pub fn from_config(config: &FloatingConfig) -> Self {
        Self {
            disable_list_wrap: false,
            disabled_items_focusable: false,
            selection_mode: SelectionMode::None,
            orientation: Orientation::Vertical,
            page_size: config.list_page_size.max(1),
            typeahead_timeout_ms: config.typeahead_timeout_ms,
        }
    }
}

impl Default for ListConfig {
    fn default() -> Self {
        Self::from_config(&FloatingConfig::default())
    }
}

/// Characters typed in the current typeahead burst.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeaheadBuffer {
    /// Lower-cased characters typed so far.
    pub keys: String,
    /// Time of the last keystroke, in milliseconds on the caller's clock.
    pub last_key_time_ms: u64,
    /// Every key of the burst so far was the same character.
    pub repeating: bool,
    /// The previous keystroke found a match; once false, the burst is ignored.
    pub previous_key_matched: bool,
}

impl Default for TypeaheadBuffer {
    fn default() -> Self {
        Self {
            keys: String::new(),
            last_key_time_ms: 0,
            repeating: true,
            previous_key_matched: true,
        }
    }
}

impl TypeaheadBuffer {
    /// Record a keystroke, starting a new burst when the previous one timed out.
    pub fn push(&mut self, key: char, time_ms: u64, timeout_ms: u64) {
        let lower: String = key.to_lowercase().collect();
        if let Some(first) = self.keys.chars().next() {
            if time_ms.saturating_sub(self.last_key_time_ms) > timeout_ms {
                *self = Self::default();
            } else if self.repeating && !lower.starts_with(first) {
                self.repeating = false;
            }
        }
        self.last_key_time_ms = time_ms;
        self.keys.push_str(&lower);
    }

    /// Whether a burst is in progress at `time_ms`.
    #[must_use]
    pub fn is_active(&self, time_ms: u64, timeout_ms: u64) -> bool {
        !self.keys.is_empty() && time_ms.saturating_sub(self.last_key_time_ms) <= timeout_ms
    }

    /// Whether `label` matches the buffer.
    ///
    /// A repeating burst matches on the first character only, so pressing the
    /// same key again cycles through items starting with it.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        let text = label.trim().to_lowercase();
        let Some(first) = text.chars().next() else {
            return false;
        };
        if self.repeating {
            self.keys.chars().next() == Some(first)
        } else {
            text.starts_with(&self.keys)
        }
    }
}

/// Full navigation state of one list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNavigationState<V> {
    /// Items in display order.
    pub items: Vec<ListItem<V>>,
    /// Highlighted (active) item.
    pub highlighted: Option<V>,
    /// Selected items.
    pub selected: Vec<V>,
    /// Typeahead burst.
    pub typeahead: TypeaheadBuffer,
}

impl<V: Clone + Eq + Hash + Debug> ListNavigationState<V> {
    /// State over `items` with nothing highlighted or selected.
    pub fn new(items: Vec<ListItem<V>>) -> Self {
        warn_duplicates(&items);
        Self {
            items,
            highlighted: None,
            selected: Vec::new(),
            typeahead: TypeaheadBuffer::default(),
        }
    }

    /// Index of the highlighted item.
    #[must_use]
    pub fn highlighted_index(&self) -> Option<usize> {
        let value = self.highlighted.as_ref()?;
        self.index_of(value)
    }

    /// Index of the item holding `value`.
    #[must_use]
    pub fn index_of(&self, value: &V) -> Option<usize> {
        self.items.iter().position(|item| item.value == *value)
    }

    /// DOM id to put in `aria-activedescendant`.
    #[must_use]
    pub fn active_descendant(&self) -> Option<&str> {
        let index = self.highlighted_index()?;
        self.items.get(index)?.id.as_deref()
    }

    /// Whether `value` is selected.
    #[must_use]
    pub fn is_selected(&self, value: &V) -> bool {
        self.selected.contains(value)
    }
}

/// Log a warning for every value that appears more than once.
pub fn warn_duplicates<V: Eq + Hash + Debug>(items: &[ListItem<V>]) {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(&item.value) {
            emit(
                LOG_TARGET,
                &Warning::DuplicateRegistration {
                    key: format!("{:?}", item.value),
                },
            );
        }
    }
}

/// Input to the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction<V> {
    /// Next item.
    Next,
    /// Previous item.
    Previous,
    /// First eligible item.
    First,
    /// Last eligible item.
    Last,
    /// Jump forward one page.
    PageDown,
    /// Jump back one page.
    PageUp,
    /// Printable character typed at `time_ms`.
    CharacterKey {
        /// The character.
        ch: char,
        /// Keystroke time in milliseconds.
        time_ms: u64,
    },
    /// Pointer activated an item.
    ItemClick(V),
    /// Enter (or Space outside a typeahead burst) on the highlighted item.
    Select,
    /// The list lost focus.
    Blur,
    /// The item collection changed.
    ItemsChanged(Vec<ListItem<V>>),
    /// Highlight an item directly (pointer hover).
    SetHighlight(V),
    /// Drop every selection.
    ClearSelection,
}

impl<V> ListAction<V> {
    /// Translate a key press. Space is a typeahead character only while a burst
    /// is in progress; otherwise it selects like Enter.
    pub fn from_key(
        event: &KeyEvent,
        time_ms: u64,
        typeahead: &TypeaheadBuffer,
        config: &ListConfig,
    ) -> Option<Self> {
        match (event.key, config.orientation) {
            (Key::ArrowDown, Orientation::Vertical) | (Key::ArrowRight, Orientation::Horizontal) => {
                Some(Self::Next)
            }
            (Key::ArrowUp, Orientation::Vertical) | (Key::ArrowLeft, Orientation::Horizontal) => {
                Some(Self::Previous)
            }
            (Key::Home, _) => Some(Self::First),
            (Key::End, _) => Some(Self::Last),
            (Key::PageDown, _) => Some(Self::PageDown),
            (Key::PageUp, _) => Some(Self::PageUp),
            (Key::Enter, _) => Some(Self::Select),
            (Key::Character(' '), _) if !typeahead.is_active(time_ms, config.typeahead_timeout_ms) => {
                Some(Self::Select)
            }
            (Key::Character(ch), _) if !event.mods.has_command_modifier() => {
                Some(Self::CharacterKey { ch, time_ms })
            }
            _ => None,
        }
    }
}

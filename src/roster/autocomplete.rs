//! Autocomplete bound to a text input and a hidden selection value.
//!
//! States:
//! - `Idle`: suggestions hidden.
//! - `Suggesting`: at least one match shown, optionally one highlighted.
//! - `Empty`: the term matched nothing; a placeholder is shown instead.
//!
//! The hidden selection is the only proof that a record was chosen. Any
//! text edit clears it until the next commit.

use std::str::FromStr;

use uuid::Uuid;

use super::filter::{normalize_term, search, EmptyTermPolicy};
use super::{RosterEntry, UnknownOption};

/// What Enter commits while suggestions are showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterPolicy {
    /// The highlighted row; nothing when no row is highlighted.
    Highlighted,
    /// Once any row is highlighted, the first suggestion whose name contains
    /// the typed text. Kept for parity with older desk builds.
    FirstNameMatch,
}

impl EnterPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Highlighted => "highlighted",
            Self::FirstNameMatch => "first-name-match",
        }
    }
}

impl FromStr for EnterPolicy {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highlighted" => Ok(Self::Highlighted),
            "first-name-match" => Ok(Self::FirstNameMatch),
            other => Err(UnknownOption(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionState {
    Idle,
    Suggesting,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
}

/// One suggestion row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub id: Uuid,
    pub label: String,
    pub detail: String,
}

impl Suggestion {
    fn from_entry<E: RosterEntry + ?Sized>(entry: &E) -> Self {
        Self {
            id: entry.entry_id(),
            label: entry.display_name().to_string(),
            detail: entry.display_detail(),
        }
    }
}

/// The record bound by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Autocomplete {
    text: String,
    selection: Option<Uuid>,
    state: SuggestionState,
    suggestions: Vec<Suggestion>,
    selected: Option<usize>,
    enter_policy: EnterPolicy,
    empty_message: &'static str,
}

impl Autocomplete {
    pub fn new(enter_policy: EnterPolicy, empty_message: &'static str) -> Self {
        Self {
            text: String::new(),
            selection: None,
            state: SuggestionState::Idle,
            suggestions: Vec::new(),
            selected: None,
            enter_policy,
            empty_message,
        }
    }

    // ── Accessors ──────────────────────────────────────────

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The hidden selection value.
    pub fn selection(&self) -> Option<Uuid> {
        self.selection
    }

    pub fn state(&self) -> SuggestionState {
        self.state
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Rows currently shown; empty unless suggesting.
    pub fn suggestions(&self) -> &[Suggestion] {
        match self.state {
            SuggestionState::Suggesting => &self.suggestions,
            _ => &[],
        }
    }

    /// Placeholder text while in `Empty`.
    pub fn placeholder(&self) -> Option<&'static str> {
        (self.state == SuggestionState::Empty).then_some(self.empty_message)
    }

    pub fn enter_policy(&self) -> EnterPolicy {
        self.enter_policy
    }

    // ── Events ─────────────────────────────────────────────

    /// The input text changed.
    pub fn input<E: RosterEntry>(&mut self, text: &str, roster: &[E]) {
        self.text = text.to_string();
        self.selection = None;
        self.selected = None;

        match search(roster, text, EmptyTermPolicy::Hide) {
            None => {
                self.suggestions.clear();
                self.state = SuggestionState::Idle;
            }
            Some(matches) if matches.is_empty() => {
                self.suggestions.clear();
                self.state = SuggestionState::Empty;
            }
            Some(matches) => {
                self.suggestions = matches.into_iter().map(Suggestion::from_entry).collect();
                self.state = SuggestionState::Suggesting;
            }
        }
    }

    /// A navigation key. Returns the commit when Enter binds a record.
    pub fn key_down(&mut self, key: NavKey) -> Option<Commit> {
        match key {
            NavKey::Escape => {
                self.state = SuggestionState::Idle;
                None
            }
            _ if self.state != SuggestionState::Suggesting => None,
            NavKey::ArrowDown => {
                let last = self.suggestions.len().saturating_sub(1);
                self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(last)));
                None
            }
            NavKey::ArrowUp => {
                self.selected = match self.selected {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
                None
            }
            NavKey::Enter => {
                let index = match self.enter_policy {
                    EnterPolicy::Highlighted => self.selected,
                    EnterPolicy::FirstNameMatch if self.selected.is_some() => {
                        let term = normalize_term(&self.text);
                        self.suggestions
                            .iter()
                            .position(|s| s.label.to_lowercase().contains(&term))
                    }
                    EnterPolicy::FirstNameMatch => None,
                };
                index.and_then(|i| self.commit(i))
            }
        }
    }

    /// The pointer entered suggestion row `index`.
    pub fn hover(&mut self, index: usize) {
        if self.state == SuggestionState::Suggesting && index < self.suggestions.len() {
            self.selected = Some(index);
        }
    }

    /// Suggestion row `index` was clicked.
    pub fn click(&mut self, index: usize) -> Option<Commit> {
        if self.state != SuggestionState::Suggesting {
            return None;
        }
        self.commit(index)
    }

    /// A click landed outside both the input and the suggestion list.
    pub fn click_outside(&mut self) {
        self.state = SuggestionState::Idle;
    }

    /// Bind an existing record without showing suggestions (edit forms).
    pub fn seed(&mut self, id: Uuid, label: &str) {
        self.text = label.to_string();
        self.selection = Some(id);
        self.suggestions.clear();
        self.selected = None;
        self.state = SuggestionState::Idle;
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.selection = None;
        self.suggestions.clear();
        self.selected = None;
        self.state = SuggestionState::Idle;
    }

    fn commit(&mut self, index: usize) -> Option<Commit> {
        let suggestion = self.suggestions.get(index)?.clone();
        self.text = suggestion.label.clone();
        self.selection = Some(suggestion.id);
        self.suggestions.clear();
        self.selected = None;
        self.state = SuggestionState::Idle;
        tracing::debug!(id = %suggestion.id, "Autocomplete selection committed");
        Some(Commit {
            id: suggestion.id,
            label: suggestion.label,
        })
    }
}

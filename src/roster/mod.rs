//! Roster search index: the in-memory list of one record kind for the
//! signed-in doctor, with substring filtering, per-kind ordering
//! policies and an autocomplete state machine bound to a text input.
//!
//! Every record kind plugs in through [`RosterEntry`], which names the
//! fields a search term is matched against and the text a suggestion
//! row shows.

pub mod autocomplete;
pub mod filter;
pub mod loader;
pub mod ordering;

pub use autocomplete::*;
pub use filter::*;
pub use loader::*;
pub use ordering::*;

use thiserror::Error;
use uuid::Uuid;

use crate::display::{age_label, or_na};
use crate::models::{Appointment, FollowUp, Patient};

/// Unrecognised value for a named behaviour switch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown option: {0}")]
pub struct UnknownOption(pub String);

// ─── Match fields ─────────────────────────────────────────────────────────────

/// One searchable field of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField<'a> {
    /// Compared after lowercasing (names, emails, free text).
    Folded(&'a str),
    /// Compared as stored (phone numbers).
    Exact(&'a str),
}

impl MatchField<'_> {
    /// `term` must already be normalized.
    pub fn contains(&self, term: &str) -> bool {
        match self {
            Self::Folded(value) => value.to_lowercase().contains(term),
            Self::Exact(value) => value.contains(term),
        }
    }
}

// ─── Trait ────────────────────────────────────────────────────────────────────

pub trait RosterEntry {
    fn entry_id(&self) -> Uuid;

    /// Text bound into the input on commit.
    fn display_name(&self) -> &str;

    /// Secondary line of a suggestion row.
    fn display_detail(&self) -> String;

    fn match_fields(&self) -> Vec<MatchField<'_>>;
}

impl<T: RosterEntry + ?Sized> RosterEntry for &T {
    fn entry_id(&self) -> Uuid {
        (**self).entry_id()
    }

    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn display_detail(&self) -> String {
        (**self).display_detail()
    }

    fn match_fields(&self) -> Vec<MatchField<'_>> {
        (**self).match_fields()
    }
}

impl RosterEntry for Patient {
    fn entry_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn display_detail(&self) -> String {
        format!("Age: {} | Phone: {}", age_label(self.age), or_na(&self.phone))
    }

    fn match_fields(&self) -> Vec<MatchField<'_>> {
        vec![
            MatchField::Folded(&self.name),
            MatchField::Exact(&self.phone),
            MatchField::Folded(&self.email),
        ]
    }
}

impl RosterEntry for Appointment {
    fn entry_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.patient_name
    }

    fn display_detail(&self) -> String {
        format!(
            "{} {} | {}",
            self.date.format("%Y-%m-%d"),
            self.time.format("%H:%M"),
            self.status
        )
    }

    fn match_fields(&self) -> Vec<MatchField<'_>> {
        vec![
            MatchField::Folded(&self.patient_name),
            MatchField::Exact(&self.patient_phone),
            MatchField::Folded(&self.reason),
        ]
    }
}

impl RosterEntry for FollowUp {
    fn entry_id(&self) -> Uuid {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.patient_name
    }

    fn display_detail(&self) -> String {
        format!("{} | {}", self.date.format("%Y-%m-%d"), self.status)
    }

    fn match_fields(&self) -> Vec<MatchField<'_>> {
        vec![
            MatchField::Folded(&self.patient_name),
            MatchField::Exact(&self.patient_phone),
            MatchField::Folded(&self.notes),
        ]
    }
}

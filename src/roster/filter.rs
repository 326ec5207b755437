//! Substring filter over a roster.

use super::RosterEntry;

/// What a blank search term means to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyTermPolicy {
    /// Free-text search boxes: a blank term shows the whole roster.
    ShowAll,
    /// Autocomplete: a blank term hides suggestions.
    Hide,
}

pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True when any match field contains the already-normalized `term`.
pub fn entry_matches<E: RosterEntry + ?Sized>(entry: &E, term: &str) -> bool {
    entry.match_fields().iter().any(|field| field.contains(term))
}

/// Entries matching `raw`, in roster order. A blank term matches everything.
pub fn filter_roster<'a, E: RosterEntry>(roster: &'a [E], raw: &str) -> Vec<&'a E> {
    let term = normalize_term(raw);
    if term.is_empty() {
        return roster.iter().collect();
    }
    roster.iter().filter(|e| entry_matches(*e, &term)).collect()
}

/// Filter with an explicit blank-term policy. `None` means "hide results".
pub fn search<'a, E: RosterEntry>(
    roster: &'a [E],
    raw: &str,
    policy: EmptyTermPolicy,
) -> Option<Vec<&'a E>> {
    if policy == EmptyTermPolicy::Hide && normalize_term(raw).is_empty() {
        return None;
    }
    Some(filter_roster(roster, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::fixtures::patient;
    use crate::roster::RosterEntry;

    fn names<E: RosterEntry>(entries: &[E]) -> Vec<String> {
        entries.iter().map(|e| e.display_name().to_string()).collect()
    }

    #[test]
    fn phone_digits_match_every_patient() {
        let roster = vec![patient("Alice", "555-1"), patient("Bea", "555-2")];
        assert_eq!(names(&filter_roster(&roster, "55")), vec!["Alice", "Bea"]);
    }

    #[test]
    fn name_match_is_case_insensitive_and_trimmed() {
        let roster = vec![patient("Alice", "555-1"), patient("Bea", "555-2")];
        assert_eq!(names(&filter_roster(&roster, "alice")), vec!["Alice"]);
        assert_eq!(names(&filter_roster(&roster, "  ALI ")), vec!["Alice"]);
    }

    #[test]
    fn email_is_searched() {
        let mut p = patient("Cara", "");
        p.email = "Cara.Diaz@Mail.com".into();
        let roster = vec![patient("Alice", "555-1"), p];
        assert_eq!(names(&filter_roster(&roster, "diaz@mail")), vec!["Cara"]);
    }

    #[test]
    fn no_match_is_empty() {
        let roster = vec![patient("Alice", "555-1")];
        assert!(filter_roster(&roster, "zed").is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let roster = vec![
            patient("Alice", "555-1"),
            patient("Malik", "444-9"),
            patient("Bea", "555-2"),
        ];
        for term in ["li", "55", "", "zzz", "a"] {
            let once = filter_roster(&roster, term);
            let twice = filter_roster(&once, term);
            let once_ids: Vec<_> = once.iter().map(|e| e.entry_id()).collect();
            let twice_ids: Vec<_> = twice.iter().map(|e| e.entry_id()).collect();
            assert_eq!(once_ids, twice_ids, "term {term:?}");
        }
    }

    #[test]
    fn order_follows_the_roster() {
        let roster = vec![patient("Zoe", "1"), patient("Amy", "1"), patient("Max", "1")];
        assert_eq!(names(&filter_roster(&roster, "1")), vec!["Zoe", "Amy", "Max"]);
    }

    #[test]
    fn blank_term_policies_differ() {
        let roster = vec![patient("Alice", "555-1"), patient("Bea", "555-2")];
        assert_eq!(search(&roster, "   ", EmptyTermPolicy::ShowAll).map(|v| v.len()), Some(2));
        assert!(search(&roster, "   ", EmptyTermPolicy::Hide).is_none());
        assert_eq!(search(&roster, "bea", EmptyTermPolicy::Hide).map(|v| v.len()), Some(1));
    }
}

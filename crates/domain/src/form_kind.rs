// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evaluation form kinds and the per-stage form link record.
//!
//! There are exactly ten evaluation form kinds. Every year-stage carries
//! one slot per kind; a slot is either empty or references exactly one
//! form document.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The closed set of evaluation form kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormKind {
    /// Form C.
    #[serde(rename = "form_c")]
    C,
    /// Form D.
    #[serde(rename = "form_d")]
    D,
    /// Form E.
    #[serde(rename = "form_e")]
    E,
    /// Form F.
    #[serde(rename = "form_f")]
    F,
    /// Form G.
    #[serde(rename = "form_g")]
    G,
    /// Form H.
    #[serde(rename = "form_h")]
    H,
    /// Form I.
    #[serde(rename = "form_i")]
    I,
    /// Form J.
    #[serde(rename = "form_j")]
    J,
    /// Form K.
    #[serde(rename = "form_k")]
    K,
    /// Form R.
    #[serde(rename = "form_r")]
    R,
}

impl FormKind {
    /// Number of form kinds, and therefore of slots per year-stage.
    pub const COUNT: usize = 10;

    /// All form kinds in slot order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::R,
    ];

    /// Returns the canonical string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::C => "form_c",
            Self::D => "form_d",
            Self::E => "form_e",
            Self::F => "form_f",
            Self::G => "form_g",
            Self::H => "form_h",
            Self::I => "form_i",
            Self::J => "form_j",
            Self::K => "form_k",
            Self::R => "form_r",
        }
    }

    /// Returns the single letter naming the kind.
    #[must_use]
    pub const fn letter(&self) -> char {
        match self {
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
            Self::G => 'G',
            Self::H => 'H',
            Self::I => 'I',
            Self::J => 'J',
            Self::K => 'K',
            Self::R => 'R',
        }
    }

    /// Returns the slot index of this kind within `FormLinks`.
    #[must_use]
    pub const fn slot(&self) -> usize {
        match self {
            Self::C => 0,
            Self::D => 1,
            Self::E => 2,
            Self::F => 3,
            Self::G => 4,
            Self::H => 5,
            Self::I => 6,
            Self::J => 7,
            Self::K => 8,
            Self::R => 9,
        }
    }

    /// Parses a kind from `form_c`, `formC`, `c` or `C`.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        let normalized: String = s.trim().to_ascii_uppercase().replace(['_', '-'], "");
        let letter: &str = normalized.strip_prefix("FORM").unwrap_or(&normalized);

        let mut chars = letter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::ALL
                .iter()
                .find(|kind| kind.letter() == c)
                .copied()
                .ok_or_else(|| DomainError::InvalidFormKind(s.to_string())),
            _ => Err(DomainError::InvalidFormKind(s.to_string())),
        }
    }
}

impl FromStr for FormKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier of a document in one of the evaluation form stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(i64);

impl FormId {
    /// Creates a form id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormId` if the value is not positive.
    pub const fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidFormId(value));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ten named form slots of one year-stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormLinks {
    slots: [Option<FormId>; FormKind::COUNT],
}

impl FormLinks {
    /// Creates a record with every slot empty.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            slots: [None; FormKind::COUNT],
        }
    }

    /// Rebuilds a record from stored `(kind, form)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormKind` if a kind appears twice.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (FormKind, FormId)>,
    {
        let mut links: Self = Self::empty();
        for (kind, form_id) in pairs {
            if links.set(kind, form_id).is_some() {
                return Err(DomainError::InvalidFormKind(format!(
                    "{kind} appears more than once"
                )));
            }
        }
        Ok(links)
    }

    /// Returns the form referenced by a slot.
    #[must_use]
    pub const fn get(&self, kind: FormKind) -> Option<FormId> {
        self.slots[kind.slot()]
    }

    /// Writes a slot, returning the previous value.
    pub(crate) fn set(&mut self, kind: FormKind, form_id: FormId) -> Option<FormId> {
        self.slots[kind.slot()].replace(form_id)
    }

    /// Empties a slot, returning the previous value.
    pub(crate) fn clear(&mut self, kind: FormKind) -> Option<FormId> {
        self.slots[kind.slot()].take()
    }

    /// Iterates over every slot in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (FormKind, Option<FormId>)> + '_ {
        FormKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }

    /// Iterates over filled slots only.
    pub fn linked(&self) -> impl Iterator<Item = (FormKind, FormId)> + '_ {
        self.iter()
            .filter_map(|(kind, form_id)| form_id.map(|id| (kind, id)))
    }

    /// Returns the number of filled slots.
    #[must_use]
    pub fn linked_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns true if every slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.linked_count() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in FormKind::ALL {
            match FormKind::parse_str(kind.as_str()) {
                Ok(parsed) => assert_eq!(kind, parsed),
                Err(e) => panic!("Failed to parse kind string: {kind}: {e}"),
            }
        }
    }

    #[test]
    fn test_kind_accepts_letters_and_field_names() {
        assert_eq!(FormKind::parse_str("c"), Ok(FormKind::C));
        assert_eq!(FormKind::parse_str("R"), Ok(FormKind::R));
        assert_eq!(FormKind::parse_str("formK"), Ok(FormKind::K));
    }

    #[test]
    fn test_kind_rejects_unknown_letters() {
        assert!(FormKind::parse_str("form_a").is_err());
        assert!(FormKind::parse_str("form_cc").is_err());
        assert!(FormKind::parse_str("").is_err());
    }

    #[test]
    fn test_slots_are_distinct() {
        let mut seen: Vec<usize> = FormKind::ALL.iter().map(FormKind::slot).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), FormKind::COUNT);
    }

    #[test]
    fn test_form_id_must_be_positive() {
        assert!(FormId::new(1).is_ok());
        assert_eq!(FormId::new(0), Err(DomainError::InvalidFormId(0)));
        assert_eq!(FormId::new(-4), Err(DomainError::InvalidFormId(-4)));
    }

    #[test]
    fn test_empty_links_have_ten_empty_slots() {
        let links: FormLinks = FormLinks::empty();
        assert_eq!(links.iter().count(), 10);
        assert!(links.is_empty());
        assert!(links.iter().all(|(_, form_id)| form_id.is_none()));
    }

    #[test]
    fn test_set_returns_previous_value() {
        let mut links: FormLinks = FormLinks::empty();
        let first: FormId = FormId::new(7).unwrap();
        let second: FormId = FormId::new(8).unwrap();

        assert_eq!(links.set(FormKind::D, first), None);
        assert_eq!(links.set(FormKind::D, second), Some(first));
        assert_eq!(links.get(FormKind::D), Some(second));
        assert_eq!(links.linked_count(), 1);
        assert_eq!(links.clear(FormKind::D), Some(second));
        assert!(links.is_empty());
    }

    #[test]
    fn test_from_pairs_rejects_repeated_kind() {
        let pairs = vec![
            (FormKind::C, FormId::new(1).unwrap()),
            (FormKind::C, FormId::new(2).unwrap()),
        ];
        assert!(FormLinks::from_pairs(pairs).is_err());
    }
}

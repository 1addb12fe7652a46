// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! What happens when a form is linked into an already filled slot.
//!
//! The policy is one named setting applied identically to all ten form
//! kinds. Linking the form a slot already holds is a no-op under every
//! policy.

use crate::error::DomainError;
use crate::form_kind::FormId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Relink policy for occupied form slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkPolicy {
    /// Refuse to replace a slot holding a different form.
    #[default]
    RejectExisting,
    /// Replace the slot, orphaning the previously linked form.
    Overwrite,
}

impl LinkPolicy {
    /// Returns the string representation of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RejectExisting => "reject",
            Self::Overwrite => "overwrite",
        }
    }
}

impl FromStr for LinkPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "reject_existing" => Ok(Self::RejectExisting),
            "overwrite" => Ok(Self::Overwrite),
            _ => Err(DomainError::InvalidLinkPolicy(s.to_string())),
        }
    }
}

impl std::fmt::Display for LinkPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of writing a form reference into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The slot was empty and now holds the form.
    Linked,
    /// The slot already held this form. Nothing changed.
    AlreadyLinked,
    /// The slot held another form, which was replaced.
    Replaced {
        /// The form that is no longer referenced.
        previous: FormId,
    },
}

impl LinkOutcome {
    /// Returns true if the ledger was modified.
    #[must_use]
    pub const fn changed(&self) -> bool {
        !matches!(self, Self::AlreadyLinked)
    }
}

/// Result of clearing a slot on behalf of a specific form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkOutcome {
    /// The slot held the form and is now empty.
    Cleared,
    /// The slot was already empty.
    NotLinked,
    /// The slot references a different form and was left alone.
    HeldByOther {
        /// The form the slot references.
        current: FormId,
    },
}

impl UnlinkOutcome {
    /// Returns true if the ledger was modified.
    #[must_use]
    pub const fn changed(&self) -> bool {
        matches!(self, Self::Cleared)
    }
}

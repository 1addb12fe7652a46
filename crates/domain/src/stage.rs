// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Training stages and stage status.
//!
//! The program has exactly four ordered stages. Stages only ever move
//! forward, one at a time, through an explicit promotion. There is no
//! stage after `Year4`.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the four fixed, totally ordered training years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrainingStage {
    /// First training year.
    #[serde(rename = "year_1")]
    Year1,
    /// Second training year.
    #[serde(rename = "year_2")]
    Year2,
    /// Third training year.
    #[serde(rename = "year_3")]
    Year3,
    /// Fourth and final training year.
    #[serde(rename = "year_4")]
    Year4,
}

impl TrainingStage {
    /// All stages in progression order.
    pub const ALL: [Self; 4] = [Self::Year1, Self::Year2, Self::Year3, Self::Year4];

    /// Returns the canonical string representation of the stage.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Year1 => "year_1",
            Self::Year2 => "year_2",
            Self::Year3 => "year_3",
            Self::Year4 => "year_4",
        }
    }

    /// Returns the label used by the hospital's existing records.
    #[must_use]
    pub const fn record_label(&self) -> &'static str {
        match self {
            Self::Year1 => "سال اول",
            Self::Year2 => "سال دوم",
            Self::Year3 => "سال سوم",
            Self::Year4 => "سال چهارم",
        }
    }

    /// Returns the 1-based position of the stage in the program.
    #[must_use]
    pub const fn ordinal(&self) -> u8 {
        match self {
            Self::Year1 => 1,
            Self::Year2 => 2,
            Self::Year3 => 3,
            Self::Year4 => 4,
        }
    }

    /// Returns the stage at a 1-based position, if any.
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(Self::Year1),
            2 => Some(Self::Year2),
            3 => Some(Self::Year3),
            4 => Some(Self::Year4),
            _ => None,
        }
    }

    /// Returns the stage that follows this one, or `None` for the final stage.
    #[must_use]
    pub const fn successor(&self) -> Option<Self> {
        match self {
            Self::Year1 => Some(Self::Year2),
            Self::Year2 => Some(Self::Year3),
            Self::Year3 => Some(Self::Year4),
            Self::Year4 => None,
        }
    }

    /// Returns true if no promotion is possible from this stage.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Year4)
    }

    /// Parses a stage from any of its accepted labels.
    ///
    /// Accepted forms are the canonical `year_N`, `YearN`, a bare ordinal
    /// and the record label.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        let trimmed: &str = s.trim();

        if let Some(stage) = Self::ALL
            .iter()
            .find(|stage| stage.record_label() == trimmed)
        {
            return Ok(*stage);
        }

        let normalized: String = trimmed.to_ascii_lowercase().replace(['_', '-', ' '], "");
        let digits: &str = normalized.strip_prefix("year").unwrap_or(&normalized);

        let ordinal: Option<u8> = match digits.as_bytes() {
            [digit @ b'1'..=b'4'] => Some(digit - b'0'),
            _ => None,
        };

        ordinal
            .and_then(Self::from_ordinal)
            .ok_or_else(|| DomainError::InvalidStage(s.to_string()))
    }
}

impl FromStr for TrainingStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of a single year-stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// The trainee is currently in this stage.
    #[default]
    InProgress,
    /// The stage was closed by a promotion.
    Completed,
}

impl StageStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for StageStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidStageStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

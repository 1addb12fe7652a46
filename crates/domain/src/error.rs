// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::form_kind::{FormId, FormKind};
use crate::stage::TrainingStage;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Trainee identifier is empty or invalid.
    InvalidTraineeId(String),
    /// Program start year is not a four digit year.
    InvalidProgramStartYear(String),
    /// Academic year label is empty or too long.
    InvalidAcademicYearLabel(String),
    /// A start or end marker is too long.
    InvalidStageMarker(String),
    /// Stage label is not one of the four training years.
    InvalidStage(String),
    /// Stage status label is not recognised.
    InvalidStageStatus(String),
    /// Form kind label is not one of the ten evaluation form kinds.
    InvalidFormKind(String),
    /// Relink policy label is not recognised.
    InvalidLinkPolicy(String),
    /// Form identifier is not a positive integer.
    InvalidFormId(i64),
    /// A progression ledger already exists for the trainee.
    LedgerAlreadyExists {
        /// The trainee owning the existing ledger.
        trainee_id: String,
    },
    /// The ledger has no entry for the requested stage.
    StageNotFound {
        /// The trainee owning the ledger.
        trainee_id: String,
        /// The stage that was requested.
        stage: TrainingStage,
    },
    /// Promotion was attempted from the final stage.
    TerminalStage {
        /// The trainee owning the ledger.
        trainee_id: String,
    },
    /// The slot already references a different form and the policy rejects relinks.
    SlotOccupied {
        /// The trainee owning the ledger.
        trainee_id: String,
        /// The stage holding the slot.
        stage: TrainingStage,
        /// The slot's form kind.
        kind: FormKind,
        /// The form currently referenced by the slot.
        existing: FormId,
    },
    /// A stored ledger breaks a structural invariant.
    CorruptLedger {
        /// The trainee owning the ledger.
        trainee_id: String,
        /// Description of the broken invariant.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTraineeId(msg) => write!(f, "Invalid trainee id: {msg}"),
            Self::InvalidProgramStartYear(msg) => write!(f, "Invalid program start year: {msg}"),
            Self::InvalidAcademicYearLabel(msg) => {
                write!(f, "Invalid academic year label: {msg}")
            }
            Self::InvalidStageMarker(msg) => write!(f, "Invalid stage marker: {msg}"),
            Self::InvalidStage(label) => write!(f, "Unknown training stage '{label}'"),
            Self::InvalidStageStatus(label) => write!(f, "Unknown stage status '{label}'"),
            Self::InvalidFormKind(label) => write!(f, "Unknown evaluation form kind '{label}'"),
            Self::InvalidLinkPolicy(label) => write!(f, "Unknown relink policy '{label}'"),
            Self::InvalidFormId(id) => write!(f, "Invalid form id: {id}"),
            Self::LedgerAlreadyExists { trainee_id } => {
                write!(
                    f,
                    "A progression ledger already exists for trainee '{trainee_id}'"
                )
            }
            Self::StageNotFound { trainee_id, stage } => {
                write!(
                    f,
                    "Trainee '{trainee_id}' has no {stage} entry in the progression ledger"
                )
            }
            Self::TerminalStage { trainee_id } => {
                write!(
                    f,
                    "Trainee '{trainee_id}' is already at the final stage and cannot be promoted"
                )
            }
            Self::SlotOccupied {
                trainee_id,
                stage,
                kind,
                existing,
            } => {
                write!(
                    f,
                    "Slot {kind} of {stage} for trainee '{trainee_id}' already references form {existing}"
                )
            }
            Self::CorruptLedger { trainee_id, reason } => {
                write!(
                    f,
                    "Progression ledger for trainee '{trainee_id}' is inconsistent: {reason}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}

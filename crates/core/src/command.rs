// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use residency_domain::{FormId, FormKind, LinkPolicy, TraineeId, TrainingStage};

/// A command represents administrative or system intent as data only.
///
/// Commands are the only way to request ledger changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a new progression ledger for a trainee.
    OpenLedger {
        /// The trainee the ledger belongs to.
        trainee_id: TraineeId,
        /// The year the trainee entered the program.
        program_start_year: String,
        /// Display label of the first academic year.
        academic_year_label: String,
    },
    /// Record a form reference in a stage's slot.
    LinkForm {
        /// The stage the form belongs to.
        stage: TrainingStage,
        /// The form kind.
        kind: FormKind,
        /// The form to reference.
        form_id: FormId,
        /// What to do if the slot holds a different form.
        policy: LinkPolicy,
    },
    /// Clear a stage's slot if it still references a form.
    UnlinkForm {
        /// The stage the form belonged to.
        stage: TrainingStage,
        /// The form kind.
        kind: FormKind,
        /// The form whose reference should be removed.
        form_id: FormId,
    },
    /// Close the current stage and open the next.
    Promote {
        /// Display label of the next academic year.
        next_academic_year_label: String,
    },
    /// Update the start and end markers of the current stage.
    UpdateStageDetails {
        /// New start marker. Blank or absent clears it.
        start_label: Option<String>,
        /// New end marker. Blank or absent clears it.
        end_label: Option<String>,
    },
}

impl Command {
    /// Returns the action name recorded in the audit trail.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenLedger { .. } => "OpenLedger",
            Self::LinkForm { .. } => "LinkForm",
            Self::UnlinkForm { .. } => "UnlinkForm",
            Self::Promote { .. } => "Promote",
            Self::UpdateStageDetails { .. } => "UpdateStageDetails",
        }
    }

    /// Returns true if applying the command twice has the same effect as once.
    ///
    /// Only idempotent commands may be retried after a version conflict.
    #[must_use]
    pub const fn is_idempotent(&self) -> bool {
        match self {
            Self::LinkForm { .. } | Self::UnlinkForm { .. } | Self::UpdateStageDetails { .. } => {
                true
            }
            Self::OpenLedger { .. } | Self::Promote { .. } => false,
        }
    }
}

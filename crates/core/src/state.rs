// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use residency_audit::{AuditEvent, StateSnapshot};
use residency_domain::{LinkOutcome, ProgressionLedger, TrainingStage, UnlinkOutcome};

/// Converts a ledger to a snapshot for audit purposes.
#[must_use]
pub fn ledger_snapshot(ledger: &ProgressionLedger) -> StateSnapshot {
    StateSnapshot::new(format!(
        "trainee={},current_stage={},stages={},links={}",
        ledger.trainee_id(),
        ledger.current_stage(),
        ledger.history().len(),
        ledger.linked_form_count()
    ))
}

/// What a transition did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// A new ledger was opened.
    Opened,
    /// A form link was written or found already present.
    Linked(LinkOutcome),
    /// A form link was cleared or left alone.
    Unlinked(UnlinkOutcome),
    /// The ledger advanced to a new stage.
    Promoted {
        /// The stage that was closed.
        from: TrainingStage,
        /// The newly opened stage.
        to: TrainingStage,
    },
    /// The current stage's markers were written.
    DetailsUpdated {
        /// The stage that was edited.
        stage: TrainingStage,
        /// False if the markers already had these values.
        changed: bool,
    },
}

impl TransitionOutcome {
    /// Returns true if the transition left the ledger unchanged.
    ///
    /// No-op transitions are not persisted and produce no audit record.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        match self {
            Self::Linked(outcome) => !outcome.changed(),
            Self::Unlinked(outcome) => !outcome.changed(),
            Self::DetailsUpdated { changed, .. } => !*changed,
            Self::Opened | Self::Promoted { .. } => false,
        }
    }
}

/// The result of a successful ledger transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The ledger after the transition.
    pub new_ledger: ProgressionLedger,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
    /// What the transition did.
    pub outcome: TransitionOutcome,
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Recording created forms in their owning year-stage.
//!
//! Linkage runs after the form document is committed and never fails the
//! request that created it. Every outcome is reported to the caller and
//! logged: no-ops at `warn`, swallowed failures at `error`.

use residency::{Command, CoreError, TransitionOutcome};
use residency_audit::{Actor, Cause};
use residency_domain::{
    DomainError, FormId, FormKind, LinkOutcome, TraineeId, TrainingStage, UnlinkOutcome,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::ledger_store::{LedgerMutation, LedgerRepository, LedgerStoreError, mutate_ledger};

/// What happened when a form was linked into the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkageReport {
    /// The slot was empty and now references the form.
    Linked,
    /// The slot already referenced the form.
    AlreadyLinked,
    /// The slot referenced another form, which was replaced.
    Replaced {
        /// The form no longer referenced.
        previous: FormId,
    },
    /// The slot references another form and the policy refuses to replace it.
    SlotOccupied {
        /// The form the slot still references.
        existing: FormId,
    },
    /// The trainee has no ledger yet.
    NoLedger,
    /// The ledger has no entry for the form's training year.
    NoMatchingStage,
    /// The ledger could not be updated.
    Failed {
        /// Why the update failed.
        reason: String,
    },
}

impl LinkageReport {
    /// Returns true if the ledger references the form after linkage.
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        matches!(
            self,
            Self::Linked | Self::AlreadyLinked | Self::Replaced { .. }
        )
    }
}

/// What happened when a deleted form's back-reference was cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnlinkReport {
    /// The slot referenced the form and is now empty.
    Cleared,
    /// The slot was already empty.
    NotLinked,
    /// The slot references a different form and was left alone.
    HeldByOther {
        /// The form the slot references.
        current: FormId,
    },
    /// The trainee has no ledger.
    NoLedger,
    /// The ledger has no entry for the form's training year.
    NoMatchingStage,
    /// The ledger could not be updated.
    Failed {
        /// Why the update failed.
        reason: String,
    },
}

/// Records a created form in its trainee's ledger.
///
/// Never returns an error; every failure is folded into the report.
///
/// # Arguments
///
/// * `repository` - The ledger storage
/// * `config` - Supplies the relink policy and retry bound
/// * `trainee_id` - The trainee the form is about
/// * `training_year` - The stage the form belongs to
/// * `kind` - The form's kind, selecting the slot
/// * `form_id` - The created form
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
#[allow(clippy::too_many_arguments)]
pub fn link_form<R: LedgerRepository>(
    repository: &mut R,
    config: &ServiceConfig,
    trainee_id: &TraineeId,
    training_year: TrainingStage,
    kind: FormKind,
    form_id: FormId,
    actor: &Actor,
    cause: &Cause,
) -> LinkageReport {
    let command: Command = Command::LinkForm {
        stage: training_year,
        kind,
        form_id,
        policy: config.link_policy,
    };

    let result: Result<LedgerMutation, LedgerStoreError> = mutate_ledger(
        repository,
        trainee_id,
        &command,
        actor,
        cause,
        config.max_link_attempts,
    );

    let report: LinkageReport = match result {
        Ok(mutation) => match mutation.outcome {
            TransitionOutcome::Linked(LinkOutcome::Linked) => LinkageReport::Linked,
            TransitionOutcome::Linked(LinkOutcome::AlreadyLinked) => LinkageReport::AlreadyLinked,
            TransitionOutcome::Linked(LinkOutcome::Replaced { previous }) => {
                LinkageReport::Replaced { previous }
            }
            other => LinkageReport::Failed {
                reason: format!("unexpected outcome {other:?}"),
            },
        },
        Err(LedgerStoreError::LedgerNotFound { .. }) => LinkageReport::NoLedger,
        Err(LedgerStoreError::Core(CoreError::DomainViolation(
            DomainError::StageNotFound { .. },
        ))) => LinkageReport::NoMatchingStage,
        Err(LedgerStoreError::Core(CoreError::DomainViolation(DomainError::SlotOccupied {
            existing,
            ..
        }))) => LinkageReport::SlotOccupied { existing },
        Err(e) => LinkageReport::Failed {
            reason: e.to_string(),
        },
    };

    match &report {
        LinkageReport::Linked | LinkageReport::AlreadyLinked | LinkageReport::Replaced { .. } => {
            info!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                form_id = form_id.value(),
                report = ?report,
                "Linked form to ledger"
            );
        }
        LinkageReport::NoLedger | LinkageReport::NoMatchingStage => {
            warn!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                form_id = form_id.value(),
                report = ?report,
                "Form not linked to ledger"
            );
        }
        LinkageReport::SlotOccupied { existing } => {
            warn!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                form_id = form_id.value(),
                existing = existing.value(),
                "Form slot already holds another form; link refused"
            );
        }
        LinkageReport::Failed { reason } => {
            error!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                form_id = form_id.value(),
                reason = %reason,
                "Failed to link form to ledger"
            );
        }
    }

    report
}

/// Clears a deleted form's back-reference from its trainee's ledger.
///
/// The slot is cleared only if it still references `form_id`. Never returns
/// an error; every failure is folded into the report.
#[allow(clippy::too_many_arguments)]
pub fn unlink_form<R: LedgerRepository>(
    repository: &mut R,
    config: &ServiceConfig,
    trainee_id: &TraineeId,
    training_year: TrainingStage,
    kind: FormKind,
    form_id: FormId,
    actor: &Actor,
    cause: &Cause,
) -> UnlinkReport {
    let command: Command = Command::UnlinkForm {
        stage: training_year,
        kind,
        form_id,
    };

    let report: UnlinkReport = match mutate_ledger(
        repository,
        trainee_id,
        &command,
        actor,
        cause,
        config.max_link_attempts,
    ) {
        Ok(mutation) => match mutation.outcome {
            TransitionOutcome::Unlinked(UnlinkOutcome::Cleared) => UnlinkReport::Cleared,
            TransitionOutcome::Unlinked(UnlinkOutcome::NotLinked) => UnlinkReport::NotLinked,
            TransitionOutcome::Unlinked(UnlinkOutcome::HeldByOther { current }) => {
                UnlinkReport::HeldByOther { current }
            }
            other => UnlinkReport::Failed {
                reason: format!("unexpected outcome {other:?}"),
            },
        },
        Err(LedgerStoreError::LedgerNotFound { .. }) => UnlinkReport::NoLedger,
        Err(LedgerStoreError::Core(CoreError::DomainViolation(
            DomainError::StageNotFound { .. },
        ))) => UnlinkReport::NoMatchingStage,
        Err(e) => UnlinkReport::Failed {
            reason: e.to_string(),
        },
    };

    match &report {
        UnlinkReport::Failed { reason } => {
            error!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                form_id = form_id.value(),
                reason = %reason,
                "Failed to clear form back-reference"
            );
        }
        UnlinkReport::NoLedger | UnlinkReport::NoMatchingStage => {
            warn!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                form_id = form_id.value(),
                report = ?report,
                "No back-reference to clear"
            );
        }
        _ => {
            info!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                form_id = form_id.value(),
                report = ?report,
                "Processed form back-reference"
            );
        }
    }

    report
}

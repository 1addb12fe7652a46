// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{TransitionOutcome, TransitionResult, ledger_snapshot};
use residency_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use residency_domain::{
    DomainError, LinkOutcome, ProgressionLedger, TrainingStage, UnlinkOutcome,
};

/// Applies an `OpenLedger` command, producing a new ledger and audit event.
///
/// # Arguments
///
/// * `existing` - The trainee's current ledger, if one is stored
/// * `command` - Must be `Command::OpenLedger`
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - A ledger already exists for the trainee
/// - The start year or academic year label is invalid
/// - The command is not `OpenLedger`
pub fn apply_open(
    existing: Option<&ProgressionLedger>,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let name: &'static str = command.name();
    let Command::OpenLedger {
        trainee_id,
        program_start_year,
        academic_year_label,
    } = command
    else {
        return Err(CoreError::UnexpectedCommand(name));
    };

    if existing.is_some() {
        return Err(CoreError::DomainViolation(
            DomainError::LedgerAlreadyExists {
                trainee_id: trainee_id.value().to_string(),
            },
        ));
    }

    let new_ledger: ProgressionLedger =
        ProgressionLedger::open(trainee_id.clone(), &program_start_year, &academic_year_label)?;

    let action: Action = Action::new(
        String::from(name),
        Some(format!(
            "Opened ledger for trainee '{trainee_id}' starting {program_start_year} at {}",
            TrainingStage::Year1
        )),
    );

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::new(String::from("ledger=none")),
        ledger_snapshot(&new_ledger),
        trainee_id,
    );

    Ok(TransitionResult {
        new_ledger,
        audit_event,
        outcome: TransitionOutcome::Opened,
    })
}

/// Applies a command to an existing ledger, producing a new ledger and audit event.
///
/// The input ledger is never modified. No-op outcomes (an already linked
/// form, an unlink of a slot not holding the form) still return a result;
/// callers decide whether to persist it via `TransitionOutcome::is_noop`.
///
/// # Arguments
///
/// * `ledger` - The current ledger (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The command violates a ledger invariant
/// - The command is `OpenLedger`
pub fn apply(
    ledger: &ProgressionLedger,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let mut new_ledger: ProgressionLedger = ledger.clone();
    let name: &'static str = command.name();

    let (outcome, details): (TransitionOutcome, String) = match command {
        Command::OpenLedger { .. } => return Err(CoreError::UnexpectedCommand(name)),
        Command::LinkForm {
            stage,
            kind,
            form_id,
            policy,
        } => {
            let outcome: LinkOutcome = new_ledger.link_form(stage, kind, form_id, policy)?;
            let details: String = match outcome {
                LinkOutcome::Linked => format!("Linked {kind} {form_id} to {stage}"),
                LinkOutcome::AlreadyLinked => {
                    format!("{kind} {form_id} already linked to {stage}")
                }
                LinkOutcome::Replaced { previous } => {
                    format!("Linked {kind} {form_id} to {stage}, replacing {previous}")
                }
            };
            (TransitionOutcome::Linked(outcome), details)
        }
        Command::UnlinkForm {
            stage,
            kind,
            form_id,
        } => {
            let outcome: UnlinkOutcome = new_ledger.unlink_form(stage, kind, form_id)?;
            let details: String = match outcome {
                UnlinkOutcome::Cleared => format!("Unlinked {kind} {form_id} from {stage}"),
                UnlinkOutcome::NotLinked => format!("{kind} slot of {stage} already empty"),
                UnlinkOutcome::HeldByOther { current } => {
                    format!("{kind} slot of {stage} holds {current}, not {form_id}")
                }
            };
            (TransitionOutcome::Unlinked(outcome), details)
        }
        Command::Promote {
            next_academic_year_label,
        } => {
            let from: TrainingStage = new_ledger.current_stage();
            let to: TrainingStage = new_ledger.promote(&next_academic_year_label)?;
            (
                TransitionOutcome::Promoted { from, to },
                format!("Promoted from {from} to {to} ({next_academic_year_label})"),
            )
        }
        Command::UpdateStageDetails {
            start_label,
            end_label,
        } => {
            let stage: TrainingStage =
                new_ledger.update_current_markers(start_label.as_deref(), end_label.as_deref())?;
            let changed: bool = new_ledger.stage(stage) != ledger.stage(stage);
            (
                TransitionOutcome::DetailsUpdated { stage, changed },
                format!("Updated markers of {stage}"),
            )
        }
    };

    let action: Action = Action::new(String::from(name), Some(details));
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        ledger_snapshot(ledger),
        ledger_snapshot(&new_ledger),
        ledger.trainee_id().clone(),
    );

    Ok(TransitionResult {
        new_ledger,
        audit_event,
        outcome,
    })
}

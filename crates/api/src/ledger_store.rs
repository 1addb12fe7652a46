// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-modify-write of progression ledgers.
//!
//! A mutation loads the ledger, applies a command through the pure core,
//! and saves the result conditioned on the version it was loaded at. When
//! another writer got there first the save fails with a version conflict;
//! idempotent commands are then re-applied to a fresh copy, up to a bounded
//! number of attempts. Commands that are not idempotent are never retried.

use residency::{
    Command, CoreError, TransitionOutcome, TransitionResult, apply, apply_open,
};
use residency_audit::{Actor, Cause};
use residency_domain::{ProgressionLedger, TraineeId};
use residency_persistence::{PersistTransitionResult, Persistence, PersistenceError};
use thiserror::Error;
use tracing::{debug, warn};

/// Ledger storage as seen by the application services.
pub trait LedgerRepository {
    /// Loads a trainee's ledger, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    fn load_ledger(
        &mut self,
        trainee_id: &TraineeId,
    ) -> Result<Option<ProgressionLedger>, PersistenceError>;

    /// Stores a newly opened ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the trainee already has a ledger or the write fails.
    fn create_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError>;

    /// Stores a transition of an existing ledger.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::VersionConflict` if the ledger changed since
    /// it was loaded.
    fn save_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError>;
}

impl LedgerRepository for Persistence {
    fn load_ledger(
        &mut self,
        trainee_id: &TraineeId,
    ) -> Result<Option<ProgressionLedger>, PersistenceError> {
        self.get_ledger(trainee_id)
    }

    fn create_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        Self::create_ledger(self, result)
    }

    fn save_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        Self::save_ledger(self, result)
    }
}

/// Errors from a ledger read-modify-write.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    /// The trainee has no ledger.
    #[error("No progression ledger exists for trainee '{trainee_id}'")]
    LedgerNotFound {
        /// The trainee that was looked up.
        trainee_id: String,
    },
    /// The command was rejected by the ledger's rules.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// The ledger could not be read or written.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// Every attempt lost a race with another writer.
    #[error("Ledger for trainee '{trainee_id}' kept changing; gave up after {attempts} attempts")]
    Contended {
        /// The trainee whose ledger kept changing.
        trainee_id: String,
        /// How many attempts were made.
        attempts: u32,
    },
}

/// The result of a ledger mutation.
#[derive(Debug, Clone)]
pub struct LedgerMutation {
    /// The ledger as it stands after the mutation.
    pub ledger: ProgressionLedger,
    /// What the command did.
    pub outcome: TransitionOutcome,
    /// Storage IDs of the write, or `None` if the command changed nothing
    /// and no write was made.
    pub stored: Option<PersistTransitionResult>,
}

/// Opens and stores a new ledger.
///
/// # Errors
///
/// Returns an error if the trainee already has a ledger, the start year or
/// label is invalid, or the write fails.
pub fn open_ledger<R: LedgerRepository>(
    repository: &mut R,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<LedgerMutation, LedgerStoreError> {
    let existing: Option<ProgressionLedger> = match &command {
        Command::OpenLedger { trainee_id, .. } => repository.load_ledger(trainee_id)?,
        _ => None,
    };

    let result: TransitionResult = apply_open(existing.as_ref(), command, actor, cause)?;
    let stored: PersistTransitionResult = repository.create_ledger(&result)?;

    Ok(LedgerMutation {
        ledger: result.new_ledger,
        outcome: result.outcome,
        stored: Some(stored),
    })
}

/// Applies a command to a trainee's stored ledger.
///
/// No-op outcomes are returned without writing anything, so they produce no
/// audit event and do not bump the version.
///
/// # Arguments
///
/// * `repository` - The ledger storage
/// * `trainee_id` - The trainee whose ledger to mutate
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `max_attempts` - Upper bound on attempts for idempotent commands
///
/// # Errors
///
/// Returns an error if:
/// - The trainee has no ledger
/// - The command violates a ledger invariant
/// - The write fails, or loses every race for idempotent commands
pub fn mutate_ledger<R: LedgerRepository>(
    repository: &mut R,
    trainee_id: &TraineeId,
    command: &Command,
    actor: &Actor,
    cause: &Cause,
    max_attempts: u32,
) -> Result<LedgerMutation, LedgerStoreError> {
    let attempts: u32 = if command.is_idempotent() {
        max_attempts.max(1)
    } else {
        1
    };

    for attempt in 1..=attempts {
        let Some(ledger) = repository.load_ledger(trainee_id)? else {
            return Err(LedgerStoreError::LedgerNotFound {
                trainee_id: trainee_id.value().to_string(),
            });
        };

        let result: TransitionResult =
            apply(&ledger, command.clone(), actor.clone(), cause.clone())?;

        if result.outcome.is_noop() {
            debug!(
                trainee_id = %trainee_id,
                command = command.name(),
                "Command left ledger unchanged; nothing persisted"
            );
            return Ok(LedgerMutation {
                ledger: result.new_ledger,
                outcome: result.outcome,
                stored: None,
            });
        }

        match repository.save_ledger(&result) {
            Ok(stored) => {
                return Ok(LedgerMutation {
                    ledger: result.new_ledger,
                    outcome: result.outcome,
                    stored: Some(stored),
                });
            }
            Err(PersistenceError::VersionConflict { expected, .. }) if attempts > 1 => {
                warn!(
                    trainee_id = %trainee_id,
                    command = command.name(),
                    attempt,
                    expected,
                    "Ledger changed during update; retrying"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(LedgerStoreError::Contended {
        trainee_id: trainee_id.value().to_string(),
        attempts,
    })
}

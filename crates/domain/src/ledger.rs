// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The per-trainee progression ledger.
//!
//! A ledger holds the ordered history of a trainee's year-stages. The
//! history is append-only: promotion closes the last entry and appends the
//! next stage. The only in-place edits allowed are form slot writes and
//! the start/end markers of the current entry.

use crate::error::DomainError;
use crate::form_kind::{FormId, FormKind, FormLinks};
use crate::link_policy::{LinkOutcome, LinkPolicy, UnlinkOutcome};
use crate::stage::{StageStatus, TrainingStage};
use crate::validation::{
    validate_academic_year_label, validate_program_start_year, validate_stage_marker,
    validate_trainee_id,
};
use serde::{Deserialize, Serialize};

/// Stable identifier of a trainee.
///
/// The identifier is owned by the trainee identity store; the ledger only
/// needs it to be stable and unique.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TraineeId {
    value: String,
}

impl TraineeId {
    /// Creates a trainee id from its external representation.
    ///
    /// Surrounding whitespace is removed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTraineeId` if the value is empty, too
    /// long, or contains whitespace.
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        validate_trainee_id(trimmed)?;
        Ok(Self {
            value: trimmed.to_string(),
        })
    }

    /// Returns the identifier value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for TraineeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// One training year within a ledger's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearStage {
    stage: TrainingStage,
    academic_year_label: String,
    start_label: Option<String>,
    end_label: Option<String>,
    status: StageStatus,
    form_links: FormLinks,
}

impl YearStage {
    /// Opens a new stage: in progress, no markers, every slot empty.
    #[must_use]
    pub const fn open(stage: TrainingStage, academic_year_label: String) -> Self {
        Self {
            stage,
            academic_year_label,
            start_label: None,
            end_label: None,
            status: StageStatus::InProgress,
            form_links: FormLinks::empty(),
        }
    }

    /// Rebuilds a stage from stored fields.
    #[must_use]
    pub const fn restore(
        stage: TrainingStage,
        academic_year_label: String,
        start_label: Option<String>,
        end_label: Option<String>,
        status: StageStatus,
        form_links: FormLinks,
    ) -> Self {
        Self {
            stage,
            academic_year_label,
            start_label,
            end_label,
            status,
            form_links,
        }
    }

    /// Returns the training year of this entry.
    #[must_use]
    pub const fn stage(&self) -> TrainingStage {
        self.stage
    }

    /// Returns the academic year label.
    #[must_use]
    pub fn academic_year_label(&self) -> &str {
        &self.academic_year_label
    }

    /// Returns the optional start marker.
    #[must_use]
    pub fn start_label(&self) -> Option<&str> {
        self.start_label.as_deref()
    }

    /// Returns the optional end marker.
    #[must_use]
    pub fn end_label(&self) -> Option<&str> {
        self.end_label.as_deref()
    }

    /// Returns the stage status.
    #[must_use]
    pub const fn status(&self) -> StageStatus {
        self.status
    }

    /// Returns the ten form slots.
    #[must_use]
    pub const fn form_links(&self) -> &FormLinks {
        &self.form_links
    }
}

/// The progression record of one trainee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionLedger {
    /// Storage identifier. `None` until the ledger has been persisted.
    ledger_id: Option<i64>,
    trainee_id: TraineeId,
    program_start_year: String,
    /// Never empty.
    history: Vec<YearStage>,
    /// Version the ledger was loaded at. Writes are conditioned on it.
    version: i64,
    last_modified: Option<String>,
}

impl ProgressionLedger {
    /// Opens a new ledger with a single in-progress `Year1` entry.
    ///
    /// # Arguments
    ///
    /// * `trainee_id` - The owning trainee
    /// * `program_start_year` - The year the trainee entered training
    /// * `academic_year_label` - Display label of the first academic year
    ///
    /// # Errors
    ///
    /// Returns an error if the start year or label is invalid.
    pub fn open(
        trainee_id: TraineeId,
        program_start_year: &str,
        academic_year_label: &str,
    ) -> Result<Self, DomainError> {
        let program_start_year: &str = program_start_year.trim();
        validate_program_start_year(program_start_year)?;
        validate_academic_year_label(academic_year_label)?;

        Ok(Self {
            ledger_id: None,
            trainee_id,
            program_start_year: program_start_year.to_string(),
            history: vec![YearStage::open(
                TrainingStage::Year1,
                academic_year_label.trim().to_string(),
            )],
            version: 0,
            last_modified: None,
        })
    }

    /// Rebuilds a ledger from storage, checking its structural invariants.
    ///
    /// The history must start at `Year1`, advance one stage at a time with
    /// no repeats, and every entry but the last must be completed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CorruptLedger` if the history breaks an invariant.
    pub fn restore(
        ledger_id: i64,
        trainee_id: TraineeId,
        program_start_year: String,
        history: Vec<YearStage>,
        version: i64,
        last_modified: Option<String>,
    ) -> Result<Self, DomainError> {
        validate_history(&trainee_id, &history)?;
        Ok(Self {
            ledger_id: Some(ledger_id),
            trainee_id,
            program_start_year,
            history,
            version,
            last_modified,
        })
    }

    /// Returns the storage identifier, if persisted.
    #[must_use]
    pub const fn ledger_id(&self) -> Option<i64> {
        self.ledger_id
    }

    /// Returns the owning trainee.
    #[must_use]
    pub const fn trainee_id(&self) -> &TraineeId {
        &self.trainee_id
    }

    /// Returns the program start year.
    #[must_use]
    pub fn program_start_year(&self) -> &str {
        &self.program_start_year
    }

    /// Returns the history in chronological order.
    #[must_use]
    pub fn history(&self) -> &[YearStage] {
        &self.history
    }

    /// Returns the version the ledger was loaded at.
    #[must_use]
    pub const fn version(&self) -> i64 {
        self.version
    }

    /// Returns the timestamp of the most recent stored mutation.
    #[must_use]
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Returns the current stage.
    ///
    /// This is always the stage of the last history entry.
    #[must_use]
    pub fn current_stage(&self) -> TrainingStage {
        self.history
            .last()
            .map_or(TrainingStage::Year1, YearStage::stage)
    }

    /// Returns the history entry for a stage.
    #[must_use]
    pub fn stage(&self, stage: TrainingStage) -> Option<&YearStage> {
        self.history.iter().find(|entry| entry.stage == stage)
    }

    /// Returns true if the history has an entry for a stage.
    #[must_use]
    pub fn has_stage(&self, stage: TrainingStage) -> bool {
        self.stage(stage).is_some()
    }

    /// Returns the number of filled slots across the whole history.
    #[must_use]
    pub fn linked_form_count(&self) -> usize {
        self.history
            .iter()
            .map(|entry| entry.form_links.linked_count())
            .sum()
    }

    fn stage_mut(&mut self, stage: TrainingStage) -> Result<&mut YearStage, DomainError> {
        let trainee_id: String = self.trainee_id.value().to_string();
        self.history
            .iter_mut()
            .find(|entry| entry.stage == stage)
            .ok_or(DomainError::StageNotFound { trainee_id, stage })
    }

    /// Writes a form reference into a stage's slot.
    ///
    /// # Arguments
    ///
    /// * `stage` - The stage the form belongs to
    /// * `kind` - The form kind, selecting the slot
    /// * `form_id` - The form to reference
    /// * `policy` - What to do if the slot holds a different form
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ledger has no entry for `stage`
    /// - The slot holds a different form and `policy` is `RejectExisting`
    pub fn link_form(
        &mut self,
        stage: TrainingStage,
        kind: FormKind,
        form_id: FormId,
        policy: LinkPolicy,
    ) -> Result<LinkOutcome, DomainError> {
        let trainee_id: String = self.trainee_id.value().to_string();
        let entry: &mut YearStage = self.stage_mut(stage)?;

        match (entry.form_links.get(kind), policy) {
            (Some(existing), _) if existing == form_id => Ok(LinkOutcome::AlreadyLinked),
            (Some(existing), LinkPolicy::RejectExisting) => Err(DomainError::SlotOccupied {
                trainee_id,
                stage,
                kind,
                existing,
            }),
            (Some(previous), LinkPolicy::Overwrite) => {
                entry.form_links.set(kind, form_id);
                Ok(LinkOutcome::Replaced { previous })
            }
            (None, _) => {
                entry.form_links.set(kind, form_id);
                Ok(LinkOutcome::Linked)
            }
        }
    }

    /// Clears a slot if, and only if, it still references `form_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StageNotFound` if the ledger has no entry for `stage`.
    pub fn unlink_form(
        &mut self,
        stage: TrainingStage,
        kind: FormKind,
        form_id: FormId,
    ) -> Result<UnlinkOutcome, DomainError> {
        let entry: &mut YearStage = self.stage_mut(stage)?;

        match entry.form_links.get(kind) {
            None => Ok(UnlinkOutcome::NotLinked),
            Some(current) if current != form_id => Ok(UnlinkOutcome::HeldByOther { current }),
            Some(_) => {
                entry.form_links.clear(kind);
                Ok(UnlinkOutcome::Cleared)
            }
        }
    }

    /// Closes the current stage and opens the next one.
    ///
    /// # Arguments
    ///
    /// * `next_academic_year_label` - Display label of the new stage's academic year
    ///
    /// # Returns
    ///
    /// The newly opened stage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The current stage is `Year4`
    /// - The label is invalid
    /// - The next stage is already present in the history
    pub fn promote(&mut self, next_academic_year_label: &str) -> Result<TrainingStage, DomainError> {
        let current: TrainingStage = self.current_stage();
        let Some(next) = current.successor() else {
            return Err(DomainError::TerminalStage {
                trainee_id: self.trainee_id.value().to_string(),
            });
        };

        validate_academic_year_label(next_academic_year_label)?;

        if self.has_stage(next) {
            return Err(DomainError::CorruptLedger {
                trainee_id: self.trainee_id.value().to_string(),
                reason: format!("{next} already present while current stage is {current}"),
            });
        }

        if let Some(last) = self.history.last_mut() {
            last.status = StageStatus::Completed;
        }
        self.history.push(YearStage::open(
            next,
            next_academic_year_label.trim().to_string(),
        ));

        Ok(next)
    }

    /// Updates the start and end markers of the current stage.
    ///
    /// Blank markers are stored as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a marker is too long.
    pub fn update_current_markers(
        &mut self,
        start_label: Option<&str>,
        end_label: Option<&str>,
    ) -> Result<TrainingStage, DomainError> {
        let start_label: Option<&str> = start_label.map(str::trim).filter(|s| !s.is_empty());
        let end_label: Option<&str> = end_label.map(str::trim).filter(|s| !s.is_empty());
        validate_stage_marker(start_label)?;
        validate_stage_marker(end_label)?;

        let current: TrainingStage = self.current_stage();
        let entry: &mut YearStage = self.stage_mut(current)?;
        entry.start_label = start_label.map(ToString::to_string);
        entry.end_label = end_label.map(ToString::to_string);

        Ok(current)
    }
}

/// Checks the ordering and status invariants of a stored history.
fn validate_history(trainee_id: &TraineeId, history: &[YearStage]) -> Result<(), DomainError> {
    let corrupt = |reason: String| DomainError::CorruptLedger {
        trainee_id: trainee_id.value().to_string(),
        reason,
    };

    let Some(first) = history.first() else {
        return Err(corrupt(String::from("history is empty")));
    };

    if first.stage != TrainingStage::Year1 {
        return Err(corrupt(format!("history starts at {}", first.stage)));
    }

    for pair in history.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if previous.stage.successor() != Some(next.stage) {
            return Err(corrupt(format!(
                "{} is followed by {}",
                previous.stage, next.stage
            )));
        }
        if previous.status != StageStatus::Completed {
            return Err(corrupt(format!(
                "{} is {} but is not the current stage",
                previous.stage, previous.status
            )));
        }
    }

    Ok(())
}

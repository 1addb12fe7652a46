// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use residency::CoreError;
use residency_domain::DomainError;
use residency_persistence::PersistenceError;
use thiserror::Error;

use crate::ledger_store::LedgerStoreError;

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A domain rule was violated.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A form of the same kind already exists for the trainee and year.
    #[error("Form already exists: {message}")]
    DuplicateForm {
        /// The ID of the form that is already recorded.
        existing_form_id: i64,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A progression ledger already exists for the trainee.
    #[error("A progression ledger already exists for trainee '{trainee_id}'")]
    LedgerAlreadyExists {
        /// The trainee owning the existing ledger.
        trainee_id: String,
    },
    /// Promotion was attempted from the final stage.
    #[error("Trainee '{trainee_id}' is already at final stage")]
    TerminalStage {
        /// The trainee whose ledger is at `Year4`.
        trainee_id: String,
    },
    /// The ledger changed underneath the request.
    #[error("Ledger for trainee '{trainee_id}' was modified concurrently: {message}")]
    ConcurrentModification {
        /// The trainee whose ledger changed.
        trainee_id: String,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidTraineeId(msg) => ApiError::InvalidInput {
            field: String::from("trainee_id"),
            message: msg,
        },
        DomainError::InvalidProgramStartYear(msg) => ApiError::InvalidInput {
            field: String::from("program_start_year"),
            message: msg,
        },
        DomainError::InvalidAcademicYearLabel(msg) => ApiError::InvalidInput {
            field: String::from("academic_year_label"),
            message: msg,
        },
        DomainError::InvalidStageMarker(msg) => ApiError::InvalidInput {
            field: String::from("stage_marker"),
            message: msg,
        },
        DomainError::InvalidStage(label) => ApiError::InvalidInput {
            field: String::from("training_year"),
            message: format!("Unknown training stage '{label}'"),
        },
        DomainError::InvalidStageStatus(label) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown stage status '{label}'"),
        },
        DomainError::InvalidFormKind(label) => ApiError::InvalidInput {
            field: String::from("kind"),
            message: format!("Unknown evaluation form kind '{label}'"),
        },
        DomainError::InvalidLinkPolicy(label) => ApiError::InvalidInput {
            field: String::from("link_policy"),
            message: format!("Unknown relink policy '{label}'"),
        },
        DomainError::InvalidFormId(id) => ApiError::InvalidInput {
            field: String::from("form_id"),
            message: format!("Form id must be a positive integer, got {id}"),
        },
        DomainError::LedgerAlreadyExists { trainee_id } => {
            ApiError::LedgerAlreadyExists { trainee_id }
        }
        DomainError::StageNotFound { trainee_id, stage } => ApiError::ResourceNotFound {
            resource_type: String::from("Year stage"),
            message: format!("Trainee '{trainee_id}' has no {stage} entry"),
        },
        DomainError::TerminalStage { trainee_id } => ApiError::TerminalStage { trainee_id },
        DomainError::SlotOccupied {
            trainee_id,
            stage,
            kind,
            existing,
        } => ApiError::DomainRuleViolation {
            rule: String::from("single_form_per_slot"),
            message: format!(
                "The {kind} slot of {stage} for trainee '{trainee_id}' already holds form {existing}"
            ),
        },
        DomainError::CorruptLedger { trainee_id, reason } => ApiError::Internal {
            message: format!("Ledger for trainee '{trainee_id}' is inconsistent: {reason}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UnexpectedCommand(name) => ApiError::Internal {
            message: format!("Command {name} was routed to the wrong transition"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::LedgerAlreadyExists { trainee_id } => {
            ApiError::LedgerAlreadyExists { trainee_id }
        }
        PersistenceError::VersionConflict {
            trainee_id,
            expected,
        } => ApiError::ConcurrentModification {
            trainee_id,
            message: format!("expected version {expected}"),
        },
        PersistenceError::DuplicateForm { existing_form_id } => ApiError::DuplicateForm {
            existing_form_id,
            message: format!("form {existing_form_id} is already recorded"),
        },
        PersistenceError::EventNotFound(event_id) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit event"),
            message: format!("Audit event {event_id} does not exist"),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

/// Translates a ledger store error into an API error.
#[must_use]
pub fn translate_store_error(err: LedgerStoreError) -> ApiError {
    match err {
        LedgerStoreError::LedgerNotFound { trainee_id } => ApiError::ResourceNotFound {
            resource_type: String::from("Progression ledger"),
            message: format!("No progression ledger exists for trainee '{trainee_id}'"),
        },
        LedgerStoreError::Core(core_err) => translate_core_error(core_err),
        LedgerStoreError::Persistence(persistence_err) => {
            translate_persistence_error(persistence_err)
        }
        LedgerStoreError::Contended {
            trainee_id,
            attempts,
        } => ApiError::ConcurrentModification {
            trainee_id,
            message: format!("gave up after {attempts} attempts"),
        },
    }
}

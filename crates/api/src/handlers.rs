// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application services behind the HTTP surface.
//!
//! Each function validates its input, runs the core transition or store
//! operation, and translates every lower-layer error into an `ApiError`.

use residency::{Command, TransitionOutcome};
use residency_audit::{Actor, AuditEvent, Cause};
use residency_domain::{FormId, FormKind, ProgressionLedger, TraineeId, TrainingStage};
use residency_persistence::{EvaluationFormData, Persistence, PersistenceError};
use tracing::info;

use crate::config::ServiceConfig;
use crate::error::{
    ApiError, translate_domain_error, translate_persistence_error, translate_store_error,
};
use crate::guard::{check_no_duplicate, duplicate_form_error};
use crate::ledger_store::{LedgerMutation, mutate_ledger, open_ledger as store_open_ledger};
use crate::linkage::{LinkageReport, UnlinkReport, link_form, unlink_form};
use crate::request_response::{
    AuditEventInfo, AuditTimelineResponse, CreateFormRequest, CreateFormResponse,
    DeleteFormResponse, FormResponse, LedgerResponse, ListFormsResponse, OpenLedgerRequest,
    PromoteRequest, PromoteResponse, UpdateStageDetailsRequest,
};

fn parse_trainee_id(value: &str) -> Result<TraineeId, ApiError> {
    TraineeId::new(value).map_err(translate_domain_error)
}

fn parse_form_id(value: i64) -> Result<FormId, ApiError> {
    FormId::new(value).map_err(translate_domain_error)
}

fn stored_version(mutation: &LedgerMutation) -> Option<i64> {
    mutation.stored.map(|stored| stored.version)
}

// ============================================================================
// Ledgers
// ============================================================================

/// Opens a progression ledger for a trainee.
///
/// The new ledger has a single in-progress `Year1` entry with every form
/// slot empty.
///
/// # Errors
///
/// Returns an error if:
/// - The trainee ID, start year or academic year label is invalid
/// - The trainee already has a ledger
/// - The write fails
pub fn open_ledger(
    persistence: &mut Persistence,
    request: &OpenLedgerRequest,
    actor: Actor,
    cause: Cause,
) -> Result<LedgerResponse, ApiError> {
    let trainee_id: TraineeId = parse_trainee_id(&request.trainee_id)?;

    let command: Command = Command::OpenLedger {
        trainee_id: trainee_id.clone(),
        program_start_year: request.program_start_year.clone(),
        academic_year_label: request.academic_year_label.clone(),
    };

    let mutation: LedgerMutation =
        store_open_ledger(persistence, command, actor, cause).map_err(translate_store_error)?;

    info!(trainee_id = %trainee_id, "Opened progression ledger");

    Ok(LedgerResponse::from_ledger(
        &mutation.ledger,
        stored_version(&mutation),
    ))
}

/// Returns a trainee's ledger with its full history and form links.
///
/// # Errors
///
/// Returns an error if the trainee ID is invalid, the trainee has no
/// ledger, or the ledger cannot be read.
pub fn get_ledger(
    persistence: &mut Persistence,
    trainee_id: &str,
) -> Result<LedgerResponse, ApiError> {
    let trainee_id: TraineeId = parse_trainee_id(trainee_id)?;

    let ledger: ProgressionLedger = persistence
        .get_ledger(&trainee_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Progression ledger"),
            message: format!("No progression ledger exists for trainee '{trainee_id}'"),
        })?;

    Ok(LedgerResponse::from_ledger(&ledger, None))
}

/// Replaces the start and end markers of a trainee's current stage.
///
/// # Errors
///
/// Returns an error if the trainee has no ledger, a marker is too long, or
/// the write fails.
pub fn update_stage_details(
    persistence: &mut Persistence,
    config: &ServiceConfig,
    trainee_id: &str,
    request: &UpdateStageDetailsRequest,
    actor: &Actor,
    cause: &Cause,
) -> Result<LedgerResponse, ApiError> {
    let trainee_id: TraineeId = parse_trainee_id(trainee_id)?;

    let command: Command = Command::UpdateStageDetails {
        start_label: request.start_label.clone(),
        end_label: request.end_label.clone(),
    };

    let mutation: LedgerMutation = mutate_ledger(
        persistence,
        &trainee_id,
        &command,
        actor,
        cause,
        config.max_link_attempts,
    )
    .map_err(translate_store_error)?;

    Ok(LedgerResponse::from_ledger(
        &mutation.ledger,
        stored_version(&mutation),
    ))
}

/// Closes a trainee's current stage and opens the next one.
///
/// Promotion is a single persisted write and is never retried.
///
/// # Errors
///
/// Returns an error if:
/// - The trainee has no ledger
/// - The trainee is already at `Year4`
/// - The academic year label is invalid
/// - The ledger changed since it was read, or the write fails
pub fn promote(
    persistence: &mut Persistence,
    request: &PromoteRequest,
    actor: &Actor,
    cause: &Cause,
) -> Result<PromoteResponse, ApiError> {
    let trainee_id: TraineeId = parse_trainee_id(&request.trainee_id)?;

    let command: Command = Command::Promote {
        next_academic_year_label: request.next_academic_year_label.clone(),
    };

    let mutation: LedgerMutation =
        mutate_ledger(persistence, &trainee_id, &command, actor, cause, 1)
            .map_err(translate_store_error)?;

    let (TransitionOutcome::Promoted { from, to }, Some(stored)) =
        (mutation.outcome, mutation.stored)
    else {
        return Err(ApiError::Internal {
            message: format!(
                "Promotion of trainee '{trainee_id}' produced {:?}",
                mutation.outcome
            ),
        });
    };

    info!(
        trainee_id = %trainee_id,
        from = %from,
        to = %to,
        event_id = stored.event_id,
        "Promoted trainee"
    );

    Ok(PromoteResponse {
        trainee_id: trainee_id.value().to_string(),
        from,
        to,
        stage_count: mutation.ledger.history().len(),
        version: stored.version,
        event_id: stored.event_id,
        message: format!("Promoted trainee '{trainee_id}' from {from} to {to}"),
    })
}

// ============================================================================
// Evaluation Forms
// ============================================================================

/// Creates an evaluation form and records it in the trainee's ledger.
///
/// The form is rejected if one of the same kind already exists for the
/// trainee and training year. Once the form is stored, linkage failures are
/// reported in the response and never fail the request.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `config` - Supplies the relink policy and retry bound
/// * `kind` - The form kind from the request path
/// * `request` - The form creation request
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The kind, trainee ID, training year or fields are invalid
/// - A form of this kind already exists for the trainee and year
/// - The form cannot be stored
pub fn create_form(
    persistence: &mut Persistence,
    config: &ServiceConfig,
    kind: &str,
    request: &CreateFormRequest,
    actor: &Actor,
    cause: &Cause,
) -> Result<CreateFormResponse, ApiError> {
    let kind: FormKind = kind.parse().map_err(translate_domain_error)?;
    let trainee_id: TraineeId = parse_trainee_id(&request.trainee_id)?;
    let training_year: TrainingStage = request
        .training_year
        .parse()
        .map_err(translate_domain_error)?;

    let fields: serde_json::Value = match &request.fields {
        serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
        serde_json::Value::Object(_) => request.fields.clone(),
        _ => {
            return Err(ApiError::InvalidInput {
                field: String::from("fields"),
                message: String::from("Form fields must be a JSON object"),
            });
        }
    };

    check_no_duplicate(persistence, &trainee_id, training_year, kind)?;

    let form: EvaluationFormData = persistence
        .insert_form(kind, &trainee_id, training_year, &fields)
        .map_err(|e| match e {
            PersistenceError::DuplicateForm { existing_form_id } => {
                duplicate_form_error(existing_form_id, &trainee_id, training_year, kind)
            }
            other => translate_persistence_error(other),
        })?;

    let linkage: LinkageReport = link_form(
        persistence,
        config,
        &trainee_id,
        training_year,
        kind,
        form.form_id,
        actor,
        cause,
    );

    Ok(CreateFormResponse {
        form_id: form.form_id,
        kind,
        trainee_id: trainee_id.value().to_string(),
        training_year,
        linkage,
    })
}

/// Returns one evaluation form.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the form does not exist, or the
/// lookup fails.
pub fn get_form(persistence: &mut Persistence, form_id: i64) -> Result<FormResponse, ApiError> {
    let form_id: FormId = parse_form_id(form_id)?;

    persistence
        .get_form(form_id)
        .map_err(translate_persistence_error)?
        .map(FormResponse::from)
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Evaluation form"),
            message: format!("Form {form_id} does not exist"),
        })
}

/// Lists every evaluation form recorded for a trainee.
///
/// # Errors
///
/// Returns an error if the trainee ID is invalid or the lookup fails.
pub fn list_forms(
    persistence: &mut Persistence,
    trainee_id: &str,
) -> Result<ListFormsResponse, ApiError> {
    let trainee_id: TraineeId = parse_trainee_id(trainee_id)?;

    let forms: Vec<FormResponse> = persistence
        .list_forms_for_trainee(&trainee_id)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(FormResponse::from)
        .collect();

    Ok(ListFormsResponse {
        trainee_id: trainee_id.value().to_string(),
        forms,
    })
}

/// Deletes an evaluation form and clears its ledger back-reference.
///
/// The back-reference is cleared only if the slot still holds this form.
/// Failing to clear it is reported, never surfaced as an error.
///
/// # Errors
///
/// Returns an error if the ID is invalid, the form does not exist, or the
/// delete fails.
pub fn delete_form(
    persistence: &mut Persistence,
    config: &ServiceConfig,
    form_id: i64,
    actor: &Actor,
    cause: &Cause,
) -> Result<DeleteFormResponse, ApiError> {
    let form_id: FormId = parse_form_id(form_id)?;

    let form: EvaluationFormData = persistence
        .delete_form(form_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Evaluation form"),
            message: format!("Form {form_id} does not exist"),
        })?;

    info!(
        form_id = form_id.value(),
        kind = %form.kind,
        trainee_id = %form.trainee_id,
        "Deleted evaluation form"
    );

    let unlink: UnlinkReport = unlink_form(
        persistence,
        config,
        &form.trainee_id,
        form.training_year,
        form.kind,
        form.form_id,
        actor,
        cause,
    );

    Ok(DeleteFormResponse {
        form: FormResponse::from(form),
        unlink,
    })
}

// ============================================================================
// Audit
// ============================================================================

/// Returns every audit event recorded for a trainee, oldest first.
///
/// # Errors
///
/// Returns an error if the trainee ID is invalid or the events cannot be read.
pub fn get_audit_timeline(
    persistence: &mut Persistence,
    trainee_id: &str,
) -> Result<AuditTimelineResponse, ApiError> {
    let trainee_id: TraineeId = parse_trainee_id(trainee_id)?;

    let events: Vec<AuditEvent> = persistence
        .get_audit_timeline(&trainee_id)
        .map_err(translate_persistence_error)?;

    Ok(AuditTimelineResponse {
        trainee_id: trainee_id.value().to_string(),
        events: events.into_iter().map(AuditEventInfo::from).collect(),
    })
}

/// Returns one audit event.
///
/// # Errors
///
/// Returns an error if the event does not exist or cannot be read.
pub fn get_audit_event(
    persistence: &mut Persistence,
    event_id: i64,
) -> Result<AuditEventInfo, ApiError> {
    persistence
        .get_audit_event(event_id)
        .map(AuditEventInfo::from)
        .map_err(translate_persistence_error)
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use std::collections::BTreeMap;

use residency_audit::{Actor, AuditEvent, Cause};
use residency_domain::{
    FormId, FormKind, ProgressionLedger, StageStatus, TrainingStage, YearStage,
};
use residency_persistence::EvaluationFormData;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::linkage::{LinkageReport, UnlinkReport};

/// Who is making a mutating request and why.
///
/// Recorded on the audit event of every ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditAttribution {
    /// The operator performing the request.
    pub actor_id: String,
    /// An identifier for the triggering request or ticket.
    pub cause_id: String,
    /// A description of why the request was made.
    pub cause_description: String,
}

impl AuditAttribution {
    /// Converts the attribution into audit types.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor or cause ID is blank.
    pub fn to_audit(&self) -> Result<(Actor, Cause), ApiError> {
        let actor_id: &str = self.actor_id.trim();
        if actor_id.is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("actor_id"),
                message: String::from("Actor id cannot be empty"),
            });
        }
        let cause_id: &str = self.cause_id.trim();
        if cause_id.is_empty() {
            return Err(ApiError::InvalidInput {
                field: String::from("cause_id"),
                message: String::from("Cause id cannot be empty"),
            });
        }

        Ok((
            Actor::new(actor_id.to_string(), String::from("operator")),
            Cause::new(cause_id.to_string(), self.cause_description.clone()),
        ))
    }
}

// ============================================================================
// Ledgers
// ============================================================================

/// API request to open a progression ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenLedgerRequest {
    /// The trainee the ledger belongs to.
    pub trainee_id: String,
    /// The year the trainee entered the program (e.g. `1402`).
    pub program_start_year: String,
    /// Display label of the first academic year.
    pub academic_year_label: String,
    /// Audit attribution.
    #[serde(flatten)]
    pub attribution: AuditAttribution,
}

/// API request to update the current stage's markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStageDetailsRequest {
    /// New start marker. Absent or blank clears it.
    #[serde(default)]
    pub start_label: Option<String>,
    /// New end marker. Absent or blank clears it.
    #[serde(default)]
    pub end_label: Option<String>,
    /// Audit attribution.
    #[serde(flatten)]
    pub attribution: AuditAttribution,
}

/// API request to promote a trainee to the next stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoteRequest {
    /// The trainee to promote.
    pub trainee_id: String,
    /// Display label of the academic year the new stage covers.
    pub next_academic_year_label: String,
    /// Audit attribution.
    #[serde(flatten)]
    pub attribution: AuditAttribution,
}

/// One year-stage of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearStageInfo {
    /// The training year.
    pub stage: TrainingStage,
    /// The training year's record label.
    pub stage_label: String,
    /// The academic year label.
    pub academic_year_label: String,
    /// Optional start marker.
    pub start_label: Option<String>,
    /// Optional end marker.
    pub end_label: Option<String>,
    /// Whether the stage is in progress or completed.
    pub status: StageStatus,
    /// All ten slots, keyed by form kind.
    pub form_links: BTreeMap<FormKind, Option<FormId>>,
}

impl From<&YearStage> for YearStageInfo {
    fn from(entry: &YearStage) -> Self {
        Self {
            stage: entry.stage(),
            stage_label: entry.stage().record_label().to_string(),
            academic_year_label: entry.academic_year_label().to_string(),
            start_label: entry.start_label().map(ToString::to_string),
            end_label: entry.end_label().map(ToString::to_string),
            status: entry.status(),
            form_links: entry.form_links().iter().collect(),
        }
    }
}

/// API response describing a full ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerResponse {
    /// The owning trainee.
    pub trainee_id: String,
    /// The year the trainee entered the program.
    pub program_start_year: String,
    /// The stage of the last history entry.
    pub current_stage: TrainingStage,
    /// The stored version.
    pub version: i64,
    /// Timestamp of the most recent stored mutation.
    pub last_modified: Option<String>,
    /// The history in chronological order.
    pub history: Vec<YearStageInfo>,
}

impl LedgerResponse {
    /// Builds a response from a ledger, overriding the version if a write
    /// has moved it past the loaded value.
    #[must_use]
    pub fn from_ledger(ledger: &ProgressionLedger, version: Option<i64>) -> Self {
        Self {
            trainee_id: ledger.trainee_id().value().to_string(),
            program_start_year: ledger.program_start_year().to_string(),
            current_stage: ledger.current_stage(),
            version: version.unwrap_or_else(|| ledger.version()),
            last_modified: ledger.last_modified().map(ToString::to_string),
            history: ledger.history().iter().map(YearStageInfo::from).collect(),
        }
    }
}

/// API response for a successful promotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoteResponse {
    /// The promoted trainee.
    pub trainee_id: String,
    /// The stage that was closed.
    pub from: TrainingStage,
    /// The stage that was opened.
    pub to: TrainingStage,
    /// The number of history entries after promotion.
    pub stage_count: usize,
    /// The ledger's version after promotion.
    pub version: i64,
    /// The audit event recording the promotion.
    pub event_id: i64,
    /// A success message.
    pub message: String,
}

// ============================================================================
// Evaluation Forms
// ============================================================================

/// API request to create an evaluation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFormRequest {
    /// The trainee the form is about.
    pub trainee_id: String,
    /// The training year the form belongs to.
    pub training_year: String,
    /// Kind-specific payload, stored verbatim. Must be a JSON object.
    #[serde(default)]
    pub fields: serde_json::Value,
    /// Audit attribution.
    #[serde(flatten)]
    pub attribution: AuditAttribution,
}

/// API response for a successful form creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFormResponse {
    /// The created form's ID.
    pub form_id: FormId,
    /// The created form's kind.
    pub kind: FormKind,
    /// The trainee the form is about.
    pub trainee_id: String,
    /// The training year the form belongs to.
    pub training_year: TrainingStage,
    /// What happened when the form was recorded in the ledger.
    pub linkage: LinkageReport,
}

/// API response describing one evaluation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormResponse {
    /// The form's ID.
    pub form_id: FormId,
    /// The form's kind.
    pub kind: FormKind,
    /// The trainee the form is about.
    pub trainee_id: String,
    /// The training year the form belongs to.
    pub training_year: TrainingStage,
    /// Kind-specific payload.
    pub fields: serde_json::Value,
    /// When the form was created.
    pub created_at: String,
}

impl From<EvaluationFormData> for FormResponse {
    fn from(form: EvaluationFormData) -> Self {
        Self {
            form_id: form.form_id,
            kind: form.kind,
            trainee_id: form.trainee_id.value().to_string(),
            training_year: form.training_year,
            fields: form.fields,
            created_at: form.created_at,
        }
    }
}

/// API response listing a trainee's forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFormsResponse {
    /// The trainee.
    pub trainee_id: String,
    /// The trainee's forms, oldest first.
    pub forms: Vec<FormResponse>,
}

/// API response for a form deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFormResponse {
    /// The deleted form.
    pub form: FormResponse,
    /// What happened to the ledger's back-reference.
    pub unlink: UnlinkReport,
}

// ============================================================================
// Audit
// ============================================================================

/// One audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    /// The event's storage ID.
    pub event_id: Option<i64>,
    /// The trainee whose ledger changed.
    pub trainee_id: Option<String>,
    /// The actor's ID.
    pub actor_id: String,
    /// The actor's type.
    pub actor_type: String,
    /// The cause's ID.
    pub cause_id: String,
    /// The cause's description.
    pub cause_description: String,
    /// The action name.
    pub action: String,
    /// Additional action details.
    pub details: Option<String>,
    /// The ledger before the transition.
    pub before: String,
    /// The ledger after the transition.
    pub after: String,
}

impl From<AuditEvent> for AuditEventInfo {
    fn from(event: AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            trainee_id: event.trainee_id.map(|id| id.value().to_string()),
            actor_id: event.actor.id,
            actor_type: event.actor.actor_type,
            cause_id: event.cause.id,
            cause_description: event.cause.description,
            action: event.action.name,
            details: event.action.details,
            before: event.before.data,
            after: event.after.data,
        }
    }
}

/// API response for a trainee's audit timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTimelineResponse {
    /// The trainee.
    pub trainee_id: String,
    /// Events oldest first.
    pub events: Vec<AuditEventInfo>,
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evaluation form queries.

use diesel::SqliteConnection;
use diesel::prelude::*;
use residency_domain::{FormId, FormKind, TraineeId, TrainingStage};

use crate::data_models::EvaluationFormData;
use crate::diesel_schema::evaluation_forms;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = evaluation_forms)]
pub(crate) struct EvaluationFormRow {
    form_id: i64,
    form_kind: String,
    trainee_id: String,
    training_year: String,
    fields_json: String,
    created_at: String,
}

impl EvaluationFormRow {
    pub(crate) fn into_data(self) -> Result<EvaluationFormData, PersistenceError> {
        let reconstruction = |e: residency_domain::DomainError| {
            PersistenceError::ReconstructionError(format!("form {}: {e}", self.form_id))
        };

        Ok(EvaluationFormData {
            form_id: FormId::new(self.form_id).map_err(reconstruction)?,
            kind: self.form_kind.parse().map_err(reconstruction)?,
            trainee_id: TraineeId::new(&self.trainee_id).map_err(reconstruction)?,
            training_year: self.training_year.parse().map_err(reconstruction)?,
            fields: serde_json::from_str(&self.fields_json)?,
            created_at: self.created_at,
        })
    }
}

/// Finds the form of a kind recorded for a trainee and training year.
///
/// There is at most one, enforced by the `(trainee_id, training_year,
/// form_kind)` unique index.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_form(
    conn: &mut SqliteConnection,
    trainee_id: &TraineeId,
    training_year: TrainingStage,
    kind: FormKind,
) -> Result<Option<EvaluationFormData>, PersistenceError> {
    evaluation_forms::table
        .filter(evaluation_forms::trainee_id.eq(trainee_id.value()))
        .filter(evaluation_forms::training_year.eq(training_year.as_str()))
        .filter(evaluation_forms::form_kind.eq(kind.as_str()))
        .select(EvaluationFormRow::as_select())
        .first::<EvaluationFormRow>(conn)
        .optional()?
        .map(EvaluationFormRow::into_data)
        .transpose()
}

/// Retrieves a form by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn get_form(
    conn: &mut SqliteConnection,
    form_id: FormId,
) -> Result<Option<EvaluationFormData>, PersistenceError> {
    evaluation_forms::table
        .filter(evaluation_forms::form_id.eq(form_id.value()))
        .select(EvaluationFormRow::as_select())
        .first::<EvaluationFormRow>(conn)
        .optional()?
        .map(EvaluationFormRow::into_data)
        .transpose()
}

/// Lists every form recorded for a trainee, ordered by training year, kind and ID.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_forms_for_trainee(
    conn: &mut SqliteConnection,
    trainee_id: &TraineeId,
) -> Result<Vec<EvaluationFormData>, PersistenceError> {
    let rows: Vec<EvaluationFormRow> = evaluation_forms::table
        .filter(evaluation_forms::trainee_id.eq(trainee_id.value()))
        .order((
            evaluation_forms::training_year.asc(),
            evaluation_forms::form_kind.asc(),
            evaluation_forms::form_id.asc(),
        ))
        .select(EvaluationFormRow::as_select())
        .load::<EvaluationFormRow>(conn)?;

    rows.into_iter().map(EvaluationFormRow::into_data).collect()
}

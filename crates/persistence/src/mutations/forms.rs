// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Evaluation form mutations.

use diesel::SqliteConnection;
use diesel::prelude::*;
use residency_domain::{FormId, FormKind, TraineeId, TrainingStage};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::EvaluationFormData;
use crate::diesel_schema::evaluation_forms;
use crate::error::{PersistenceError, is_unique_violation};
use crate::mutations::current_timestamp;
use crate::queries::forms::{find_form, get_form};

/// Inserts a new evaluation form.
///
/// The unique index on `(trainee_id, training_year, form_kind)` is the
/// authority on duplicates: a concurrent insert that loses the race is
/// reported the same way as a sequential duplicate.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `kind` - The form kind
/// * `trainee_id` - The trainee the form is about
/// * `training_year` - The stage the form belongs to
/// * `fields` - Kind-specific payload, stored verbatim
///
/// # Errors
///
/// Returns `PersistenceError::DuplicateForm` carrying the existing form's ID
/// if one is already recorded, or another error if the insert fails.
pub fn insert_form(
    conn: &mut SqliteConnection,
    kind: FormKind,
    trainee_id: &TraineeId,
    training_year: TrainingStage,
    fields: &serde_json::Value,
) -> Result<EvaluationFormData, PersistenceError> {
    let fields_json: String = serde_json::to_string(fields)?;
    let created_at: String = current_timestamp()?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let inserted = diesel::insert_into(evaluation_forms::table)
            .values((
                evaluation_forms::form_kind.eq(kind.as_str()),
                evaluation_forms::trainee_id.eq(trainee_id.value()),
                evaluation_forms::training_year.eq(training_year.as_str()),
                evaluation_forms::fields_json.eq(&fields_json),
                evaluation_forms::created_at.eq(&created_at),
            ))
            .execute(conn);

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                let existing: Option<EvaluationFormData> =
                    find_form(conn, trainee_id, training_year, kind)?;
                return Err(existing.map_or_else(
                    || PersistenceError::DatabaseError(e.to_string()),
                    |form| PersistenceError::DuplicateForm {
                        existing_form_id: form.form_id.value(),
                    },
                ));
            }
            Err(e) => return Err(e.into()),
        }

        let raw_id: i64 = get_last_insert_rowid(conn)?;
        let form_id: FormId = FormId::new(raw_id)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;

        info!(
            form_id = raw_id,
            kind = %kind,
            trainee_id = %trainee_id,
            stage = %training_year,
            "Inserted evaluation form"
        );

        Ok(EvaluationFormData {
            form_id,
            kind,
            trainee_id: trainee_id.clone(),
            training_year,
            fields: fields.clone(),
            created_at: created_at.clone(),
        })
    })
}

/// Deletes an evaluation form.
///
/// # Returns
///
/// The deleted form, or `None` if no form had that ID.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_form(
    conn: &mut SqliteConnection,
    form_id: FormId,
) -> Result<Option<EvaluationFormData>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let Some(existing) = get_form(conn, form_id)? else {
            return Ok(None);
        };

        diesel::delete(
            evaluation_forms::table.filter(evaluation_forms::form_id.eq(form_id.value())),
        )
        .execute(conn)?;

        debug!(form_id = form_id.value(), "Deleted evaluation form");
        Ok(Some(existing))
    })
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! One form per kind per trainee per training year.
//!
//! The check here gives callers an early, descriptive rejection. The unique
//! index on the forms table stays the authority: an insert that races past
//! this check is rejected by storage with the same error.

use residency_domain::{FormKind, TraineeId, TrainingStage};
use residency_persistence::{EvaluationFormData, Persistence};
use tracing::info;

use crate::error::{ApiError, translate_persistence_error};

/// Rejects creation of a form whose slot is already taken.
///
/// Applies identically to all ten form kinds.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `trainee_id` - The trainee the new form is about
/// * `training_year` - The stage the new form belongs to
/// * `kind` - The new form's kind
///
/// # Errors
///
/// Returns `ApiError::DuplicateForm` carrying the existing form's ID, or an
/// internal error if the lookup fails.
pub fn check_no_duplicate(
    persistence: &mut Persistence,
    trainee_id: &TraineeId,
    training_year: TrainingStage,
    kind: FormKind,
) -> Result<(), ApiError> {
    let existing: Option<EvaluationFormData> = persistence
        .find_form(trainee_id, training_year, kind)
        .map_err(translate_persistence_error)?;

    match existing {
        None => Ok(()),
        Some(form) => {
            info!(
                trainee_id = %trainee_id,
                stage = %training_year,
                kind = %kind,
                existing_form_id = form.form_id.value(),
                "Rejected duplicate form submission"
            );
            Err(duplicate_form_error(
                form.form_id.value(),
                trainee_id,
                training_year,
                kind,
            ))
        }
    }
}

/// Builds the conflict error for an occupied `(trainee, year, kind)` triple.
#[must_use]
pub fn duplicate_form_error(
    existing_form_id: i64,
    trainee_id: &TraineeId,
    training_year: TrainingStage,
    kind: FormKind,
) -> ApiError {
    ApiError::DuplicateForm {
        existing_form_id,
        message: format!(
            "{kind} {existing_form_id} is already recorded for trainee '{trainee_id}' in {training_year}"
        ),
    }
}

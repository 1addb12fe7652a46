// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Maximum length of a trainee identifier.
pub const MAX_TRAINEE_ID_LEN: usize = 64;

/// Maximum length of an academic year label.
pub const MAX_ACADEMIC_YEAR_LABEL_LEN: usize = 32;

/// Maximum length of a start or end marker.
pub const MAX_STAGE_MARKER_LEN: usize = 64;

/// Validates a trainee identifier.
///
/// # Arguments
///
/// * `trainee_id` - The identifier to validate (already trimmed)
///
/// # Errors
///
/// Returns an error if the identifier is empty, too long, or contains
/// whitespace or control characters.
pub fn validate_trainee_id(trainee_id: &str) -> Result<(), DomainError> {
    if trainee_id.is_empty() {
        return Err(DomainError::InvalidTraineeId(String::from(
            "Trainee id cannot be empty",
        )));
    }

    if trainee_id.chars().count() > MAX_TRAINEE_ID_LEN {
        return Err(DomainError::InvalidTraineeId(format!(
            "Trainee id cannot exceed {MAX_TRAINEE_ID_LEN} characters"
        )));
    }

    if trainee_id
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/')
    {
        return Err(DomainError::InvalidTraineeId(format!(
            "Trainee id '{trainee_id}' contains whitespace or reserved characters"
        )));
    }

    Ok(())
}

/// Validates the calendar year a trainee entered the program.
///
/// The year is a four digit label (e.g. `1402`).
///
/// # Errors
///
/// Returns an error if the value is not exactly four ASCII digits.
pub fn validate_program_start_year(program_start_year: &str) -> Result<(), DomainError> {
    if program_start_year.len() != 4 || !program_start_year.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::InvalidProgramStartYear(format!(
            "'{program_start_year}' must be a four digit year"
        )));
    }
    Ok(())
}

/// Validates an academic year display label.
///
/// # Errors
///
/// Returns an error if the label is blank or too long.
pub fn validate_academic_year_label(label: &str) -> Result<(), DomainError> {
    if label.trim().is_empty() {
        return Err(DomainError::InvalidAcademicYearLabel(String::from(
            "Academic year label cannot be empty",
        )));
    }

    if label.chars().count() > MAX_ACADEMIC_YEAR_LABEL_LEN {
        return Err(DomainError::InvalidAcademicYearLabel(format!(
            "Academic year label cannot exceed {MAX_ACADEMIC_YEAR_LABEL_LEN} characters"
        )));
    }

    Ok(())
}

/// Validates an optional start or end marker.
///
/// # Errors
///
/// Returns an error if the marker is too long.
pub fn validate_stage_marker(marker: Option<&str>) -> Result<(), DomainError> {
    match marker {
        Some(value) if value.chars().count() > MAX_STAGE_MARKER_LEN => {
            Err(DomainError::InvalidStageMarker(format!(
                "Stage marker cannot exceed {MAX_STAGE_MARKER_LEN} characters"
            )))
        }
        _ => Ok(()),
    }
}

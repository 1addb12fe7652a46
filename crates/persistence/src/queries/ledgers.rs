// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Progression ledger reconstruction.
//!
//! A ledger is spread over three tables: the ledger row, one row per
//! year stage, and one row per filled form slot. Reconstruction reads all
//! three and rebuilds the domain value through `ProgressionLedger::restore`,
//! so a stored history that breaks the ordering invariants is reported
//! instead of silently served.

use diesel::SqliteConnection;
use diesel::prelude::*;
use residency_domain::{
    FormId, FormKind, FormLinks, ProgressionLedger, StageStatus, TraineeId, TrainingStage,
    YearStage,
};

use crate::diesel_schema::{progression_ledgers, stage_form_links, year_stages};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = progression_ledgers)]
struct LedgerRow {
    ledger_id: i64,
    program_start_year: String,
    current_stage: String,
    version: i64,
    last_modified: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = year_stages)]
struct YearStageRow {
    year_stage_id: i64,
    stage: String,
    academic_year_label: String,
    start_label: Option<String>,
    end_label: Option<String>,
    status: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = stage_form_links)]
struct FormLinkRow {
    year_stage_id: i64,
    form_kind: String,
    form_id: i64,
}

fn reconstruction_error(err: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::ReconstructionError(err.to_string())
}

/// Looks up the storage ID of a trainee's ledger.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_ledger_id(
    conn: &mut SqliteConnection,
    trainee_id: &TraineeId,
) -> Result<Option<i64>, PersistenceError> {
    Ok(progression_ledgers::table
        .filter(progression_ledgers::trainee_id.eq(trainee_id.value()))
        .select(progression_ledgers::ledger_id)
        .first::<i64>(conn)
        .optional()?)
}

/// Looks up the storage ID of one stage of a ledger.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_year_stage_id(
    conn: &mut SqliteConnection,
    ledger_id: i64,
    stage: TrainingStage,
) -> Result<Option<i64>, PersistenceError> {
    Ok(year_stages::table
        .filter(year_stages::ledger_id.eq(ledger_id))
        .filter(year_stages::stage.eq(stage.as_str()))
        .select(year_stages::year_stage_id)
        .first::<i64>(conn)
        .optional()?)
}

/// Loads and reconstructs a trainee's ledger.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `trainee_id` - The trainee whose ledger to load
///
/// # Returns
///
/// `None` if the trainee has no ledger.
///
/// # Errors
///
/// Returns an error if the query fails or the stored ledger is inconsistent.
pub fn get_ledger(
    conn: &mut SqliteConnection,
    trainee_id: &TraineeId,
) -> Result<Option<ProgressionLedger>, PersistenceError> {
    let Some(ledger_row) = progression_ledgers::table
        .filter(progression_ledgers::trainee_id.eq(trainee_id.value()))
        .select(LedgerRow::as_select())
        .first::<LedgerRow>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let stage_rows: Vec<YearStageRow> = year_stages::table
        .filter(year_stages::ledger_id.eq(ledger_row.ledger_id))
        .order(year_stages::stage_ordinal.asc())
        .select(YearStageRow::as_select())
        .load::<YearStageRow>(conn)?;

    let stage_ids: Vec<i64> = stage_rows.iter().map(|row| row.year_stage_id).collect();
    let link_rows: Vec<FormLinkRow> = stage_form_links::table
        .filter(stage_form_links::year_stage_id.eq_any(&stage_ids))
        .select(FormLinkRow::as_select())
        .load::<FormLinkRow>(conn)?;

    let mut history: Vec<YearStage> = Vec::with_capacity(stage_rows.len());
    for row in stage_rows {
        let pairs: Vec<(FormKind, FormId)> = link_rows
            .iter()
            .filter(|link| link.year_stage_id == row.year_stage_id)
            .map(|link| -> Result<(FormKind, FormId), PersistenceError> {
                let kind: FormKind = link.form_kind.parse().map_err(reconstruction_error)?;
                let form_id: FormId = FormId::new(link.form_id).map_err(reconstruction_error)?;
                Ok((kind, form_id))
            })
            .collect::<Result<_, _>>()?;
        let form_links: FormLinks = FormLinks::from_pairs(pairs).map_err(reconstruction_error)?;

        let stage: TrainingStage = row.stage.parse().map_err(reconstruction_error)?;
        let status: StageStatus = row.status.parse().map_err(reconstruction_error)?;

        history.push(YearStage::restore(
            stage,
            row.academic_year_label,
            row.start_label,
            row.end_label,
            status,
            form_links,
        ));
    }

    let ledger: ProgressionLedger = ProgressionLedger::restore(
        ledger_row.ledger_id,
        trainee_id.clone(),
        ledger_row.program_start_year,
        history,
        ledger_row.version,
        Some(ledger_row.last_modified),
    )
    .map_err(reconstruction_error)?;

    if ledger.current_stage().as_str() != ledger_row.current_stage {
        return Err(PersistenceError::ReconstructionError(format!(
            "stored current stage {} does not match history ending at {}",
            ledger_row.current_stage,
            ledger.current_stage()
        )));
    }

    Ok(Some(ledger))
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Progression ledger writes.
//!
//! Every write covers the ledger row, its year stages, its form links and
//! the audit event in one transaction. Updates are conditioned on the
//! version the ledger was read at; a mismatch means another writer got
//! there first and nothing is written.

use diesel::SqliteConnection;
use diesel::prelude::*;
use residency::TransitionResult;
use residency_domain::{FormId, FormKind, ProgressionLedger, YearStage};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{progression_ledgers, stage_form_links, year_stages};
use crate::error::{PersistenceError, is_unique_violation};
use crate::mutations::{PersistTransitionResult, current_timestamp, persist_audit_event};
use crate::queries::ledgers::find_year_stage_id;

/// Inserts a newly opened ledger.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The `OpenLedger` transition to persist
///
/// # Errors
///
/// Returns `PersistenceError::LedgerAlreadyExists` if the trainee already
/// has a ledger, or another error if any write fails.
pub fn create_ledger(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let ledger: &ProgressionLedger = &result.new_ledger;
    let last_modified: String = current_timestamp()?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let inserted = diesel::insert_into(progression_ledgers::table)
            .values((
                progression_ledgers::trainee_id.eq(ledger.trainee_id().value()),
                progression_ledgers::program_start_year.eq(ledger.program_start_year()),
                progression_ledgers::current_stage.eq(ledger.current_stage().as_str()),
                progression_ledgers::version.eq(0_i64),
                progression_ledgers::last_modified.eq(&last_modified),
            ))
            .execute(conn);

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(PersistenceError::LedgerAlreadyExists {
                    trainee_id: ledger.trainee_id().value().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        let ledger_id: i64 = get_last_insert_rowid(conn)?;
        sync_history(conn, ledger_id, ledger.history())?;
        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        info!(
            ledger_id,
            event_id,
            trainee_id = %ledger.trainee_id(),
            "Created progression ledger"
        );

        Ok(PersistTransitionResult {
            ledger_id,
            version: 0,
            event_id,
        })
    })
}

/// Persists a transition of an already stored ledger.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The transition to persist; its ledger carries the version it was read at
///
/// # Errors
///
/// Returns `PersistenceError::VersionConflict` if the stored version moved
/// since the ledger was read, or another error if any write fails.
pub fn save_ledger(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<PersistTransitionResult, PersistenceError> {
    let ledger: &ProgressionLedger = &result.new_ledger;
    let Some(ledger_id) = ledger.ledger_id() else {
        return Err(PersistenceError::NotFound(format!(
            "Ledger for trainee '{}' has not been stored",
            ledger.trainee_id()
        )));
    };
    let expected: i64 = ledger.version();
    let last_modified: String = current_timestamp()?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            progression_ledgers::table
                .filter(progression_ledgers::ledger_id.eq(ledger_id))
                .filter(progression_ledgers::version.eq(expected)),
        )
        .set((
            progression_ledgers::version.eq(expected + 1),
            progression_ledgers::current_stage.eq(ledger.current_stage().as_str()),
            progression_ledgers::last_modified.eq(&last_modified),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(PersistenceError::VersionConflict {
                trainee_id: ledger.trainee_id().value().to_string(),
                expected,
            });
        }

        sync_history(conn, ledger_id, ledger.history())?;
        let event_id: i64 = persist_audit_event(conn, &result.audit_event)?;

        info!(
            ledger_id,
            event_id,
            version = expected + 1,
            trainee_id = %ledger.trainee_id(),
            action = %result.audit_event.action.name,
            "Saved progression ledger"
        );

        Ok(PersistTransitionResult {
            ledger_id,
            version: expected + 1,
            event_id,
        })
    })
}

/// Writes every history entry and its form links.
///
/// Existing stage rows are updated in place and new ones inserted. Links
/// of each stage are replaced wholesale.
fn sync_history(
    conn: &mut SqliteConnection,
    ledger_id: i64,
    history: &[YearStage],
) -> Result<(), PersistenceError> {
    for entry in history {
        let year_stage_id: i64 = upsert_year_stage(conn, ledger_id, entry)?;

        diesel::delete(
            stage_form_links::table.filter(stage_form_links::year_stage_id.eq(year_stage_id)),
        )
        .execute(conn)?;

        let links: Vec<(FormKind, FormId)> = entry.form_links().linked().collect();
        for (kind, form_id) in &links {
            diesel::insert_into(stage_form_links::table)
                .values((
                    stage_form_links::year_stage_id.eq(year_stage_id),
                    stage_form_links::form_kind.eq(kind.as_str()),
                    stage_form_links::form_id.eq(form_id.value()),
                ))
                .execute(conn)?;
        }

        debug!(
            ledger_id,
            stage = %entry.stage(),
            links = links.len(),
            "Synced year stage"
        );
    }
    Ok(())
}

fn upsert_year_stage(
    conn: &mut SqliteConnection,
    ledger_id: i64,
    entry: &YearStage,
) -> Result<i64, PersistenceError> {
    if let Some(year_stage_id) = find_year_stage_id(conn, ledger_id, entry.stage())? {
        diesel::update(year_stages::table.filter(year_stages::year_stage_id.eq(year_stage_id)))
            .set((
                year_stages::academic_year_label.eq(entry.academic_year_label()),
                year_stages::start_label.eq(entry.start_label()),
                year_stages::end_label.eq(entry.end_label()),
                year_stages::status.eq(entry.status().as_str()),
            ))
            .execute(conn)?;
        return Ok(year_stage_id);
    }

    diesel::insert_into(year_stages::table)
        .values((
            year_stages::ledger_id.eq(ledger_id),
            year_stages::stage.eq(entry.stage().as_str()),
            year_stages::stage_ordinal.eq(i32::from(entry.stage().ordinal())),
            year_stages::academic_year_label.eq(entry.academic_year_label()),
            year_stages::start_label.eq(entry.start_label()),
            year_stages::end_label.eq(entry.end_label()),
            year_stages::status.eq(entry.status().as_str()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

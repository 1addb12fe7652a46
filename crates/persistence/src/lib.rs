// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the residency progression ledger.
//!
//! This crate stores progression ledgers, evaluation forms and audit events
//! in `SQLite` through Diesel.
//!
//! ## Storage-level guarantees
//!
//! - At most one ledger per trainee (`UNIQUE(trainee_id)`)
//! - At most one history entry per stage (`UNIQUE(ledger_id, stage)`)
//! - At most one form per slot (`UNIQUE(year_stage_id, form_kind)`)
//! - At most one form per kind per trainee per year
//!   (`UNIQUE(trainee_id, training_year, form_kind)`)
//!
//! Ledger writes are conditioned on the version the ledger was read at.
//! The ledger row, its stages, its links and the audit event of one
//! transition are written in a single transaction.
//!
//! ## Testing
//!
//! `Persistence::new_in_memory()` gives every caller its own shared-cache
//! in-memory database, so tests never observe each other's rows.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use residency::TransitionResult;
use residency_audit::AuditEvent;
use residency_domain::{FormId, FormKind, ProgressionLedger, TraineeId, TrainingStage};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::EvaluationFormData;
pub use error::PersistenceError;
pub use mutations::PersistTransitionResult;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for ledgers, evaluation forms and audit events.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Ledgers
    // ========================================================================

    /// Loads a trainee's ledger.
    ///
    /// # Returns
    ///
    /// `None` if the trainee has no ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored ledger is inconsistent.
    pub fn get_ledger(
        &mut self,
        trainee_id: &TraineeId,
    ) -> Result<Option<ProgressionLedger>, PersistenceError> {
        queries::ledgers::get_ledger(&mut self.conn, trainee_id)
    }

    /// Stores a newly opened ledger and its audit event.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::LedgerAlreadyExists` if the trainee already
    /// has a ledger.
    pub fn create_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::create_ledger(&mut self.conn, result)
    }

    /// Stores a transition of an existing ledger and its audit event.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::VersionConflict` if the ledger changed since
    /// it was loaded.
    pub fn save_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        mutations::save_ledger(&mut self.conn, result)
    }

    // ========================================================================
    // Evaluation Forms
    // ========================================================================

    /// Inserts an evaluation form.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::DuplicateForm` if a form of this kind already
    /// exists for the trainee and training year.
    pub fn insert_form(
        &mut self,
        kind: FormKind,
        trainee_id: &TraineeId,
        training_year: TrainingStage,
        fields: &serde_json::Value,
    ) -> Result<EvaluationFormData, PersistenceError> {
        mutations::insert_form(&mut self.conn, kind, trainee_id, training_year, fields)
    }

    /// Finds the form of a kind recorded for a trainee and training year.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_form(
        &mut self,
        trainee_id: &TraineeId,
        training_year: TrainingStage,
        kind: FormKind,
    ) -> Result<Option<EvaluationFormData>, PersistenceError> {
        queries::forms::find_form(&mut self.conn, trainee_id, training_year, kind)
    }

    /// Retrieves a form by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_form(
        &mut self,
        form_id: FormId,
    ) -> Result<Option<EvaluationFormData>, PersistenceError> {
        queries::forms::get_form(&mut self.conn, form_id)
    }

    /// Lists all forms recorded for a trainee.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_forms_for_trainee(
        &mut self,
        trainee_id: &TraineeId,
    ) -> Result<Vec<EvaluationFormData>, PersistenceError> {
        queries::forms::list_forms_for_trainee(&mut self.conn, trainee_id)
    }

    /// Deletes a form, returning it if it existed.
    ///
    /// Ledger slots referencing the form are not touched here.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_form(
        &mut self,
        form_id: FormId,
    ) -> Result<Option<EvaluationFormData>, PersistenceError> {
        mutations::delete_form(&mut self.conn, form_id)
    }

    // ========================================================================
    // Audit Event Queries
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the event is not found or cannot be deserialized.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Retrieves a trainee's audit events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if events cannot be retrieved or deserialized.
    pub fn get_audit_timeline(
        &mut self,
        trainee_id: &TraineeId,
    ) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::get_audit_timeline(&mut self.conn, trainee_id)
    }
}

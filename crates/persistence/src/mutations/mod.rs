// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write paths for ledgers, forms and audit events.

pub mod audit;
pub mod forms;
pub mod ledgers;

pub use audit::persist_audit_event;
pub use forms::{delete_form, insert_form};
pub use ledgers::{create_ledger, save_ledger};

use crate::error::PersistenceError;
use time::OffsetDateTime;

/// Result of persisting a ledger transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// The ledger's storage ID.
    pub ledger_id: i64,
    /// The ledger's version after the write.
    pub version: i64,
    /// The ID of the audit event recording the transition.
    pub event_id: i64,
}

/// Formats the current UTC time for storage.
pub(crate) fn current_timestamp() -> Result<String, PersistenceError> {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Iso8601::DEFAULT)
        .map_err(|e| PersistenceError::SerializationError(format!("Failed to format timestamp: {e}")))
}

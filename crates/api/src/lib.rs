// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application services for the residency progression ledger.
//!
//! This crate sits between the HTTP server and the lower layers. It owns:
//!
//! - the ledger read-modify-write loop with bounded optimistic retries
//! - the duplicate-submission guard shared by all ten form kinds
//! - the best-effort linkage protocol that records created forms in the
//!   ledger and clears them again on deletion
//! - request/response types and the `ApiError` contract

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

mod config;
mod error;
mod guard;
mod handlers;
mod ledger_store;
mod linkage;
mod request_response;

#[cfg(test)]
mod tests;

pub use config::{DEFAULT_MAX_LINK_ATTEMPTS, ServiceConfig};
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
    translate_store_error,
};
pub use guard::{check_no_duplicate, duplicate_form_error};
pub use handlers::{
    create_form, delete_form, get_audit_event, get_audit_timeline, get_form, get_ledger,
    list_forms, open_ledger, promote, update_stage_details,
};
pub use ledger_store::{LedgerMutation, LedgerRepository, LedgerStoreError, mutate_ledger};
pub use linkage::{LinkageReport, UnlinkReport, link_form, unlink_form};
pub use request_response::{
    AuditAttribution, AuditEventInfo, AuditTimelineResponse, CreateFormRequest,
    CreateFormResponse, DeleteFormResponse, FormResponse, LedgerResponse, ListFormsResponse,
    OpenLedgerRequest, PromoteRequest, PromoteResponse, UpdateStageDetailsRequest,
    YearStageInfo,
};

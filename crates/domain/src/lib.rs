// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod error;
mod form_kind;
mod ledger;
mod link_policy;
mod stage;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use form_kind::{FormId, FormKind, FormLinks};
pub use ledger::{ProgressionLedger, TraineeId, YearStage};
pub use link_policy::{LinkOutcome, LinkPolicy, UnlinkOutcome};
pub use stage::{StageStatus, TrainingStage};
pub use validation::{
    MAX_ACADEMIC_YEAR_LABEL_LEN, MAX_STAGE_MARKER_LEN, MAX_TRAINEE_ID_LEN,
    validate_academic_year_label, validate_program_start_year, validate_stage_marker,
    validate_trainee_id,
};

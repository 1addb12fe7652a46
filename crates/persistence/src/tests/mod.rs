// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod audit_tests;
mod form_tests;
mod ledger_tests;

use crate::{PersistTransitionResult, Persistence};
use residency::{Command, TransitionResult, apply, apply_open};
use residency_audit::{Actor, Cause};
use residency_domain::{FormId, ProgressionLedger, TraineeId};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("test-actor"), String::from("system"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn trainee(id: &str) -> TraineeId {
    TraineeId::new(id).unwrap()
}

pub fn form(id: i64) -> FormId {
    FormId::new(id).unwrap()
}

/// Opens and stores a ledger for `trainee_id` starting in 1402.
pub fn open_ledger(persistence: &mut Persistence, trainee_id: &str) -> PersistTransitionResult {
    let result: TransitionResult = apply_open(
        None,
        Command::OpenLedger {
            trainee_id: trainee(trainee_id),
            program_start_year: String::from("1402"),
            academic_year_label: String::from("1402-1403"),
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    persistence.create_ledger(&result).unwrap()
}

pub fn load_ledger(persistence: &mut Persistence, trainee_id: &str) -> ProgressionLedger {
    persistence
        .get_ledger(&trainee(trainee_id))
        .unwrap()
        .expect("ledger should exist")
}

/// Applies a command to the stored ledger and saves it.
pub fn apply_and_save(
    persistence: &mut Persistence,
    trainee_id: &str,
    command: Command,
) -> PersistTransitionResult {
    let ledger: ProgressionLedger = load_ledger(persistence, trainee_id);
    let result: TransitionResult =
        apply(&ledger, command, create_test_actor(), create_test_cause()).unwrap();
    persistence.save_ledger(&result).unwrap()
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, apply_open};
use residency_audit::{Actor, Cause};
use residency_domain::{FormId, ProgressionLedger, TraineeId};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin-123"), String::from("admin"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Admin request"))
}

pub fn create_test_trainee() -> TraineeId {
    TraineeId::new("T1").unwrap()
}

pub fn form(id: i64) -> FormId {
    FormId::new(id).unwrap()
}

pub fn create_open_command() -> Command {
    Command::OpenLedger {
        trainee_id: create_test_trainee(),
        program_start_year: String::from("1402"),
        academic_year_label: String::from("1402-1403"),
    }
}

pub fn create_test_ledger() -> ProgressionLedger {
    apply_open(
        None,
        create_open_command(),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
    .new_ledger
}

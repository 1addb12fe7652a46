// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{
    apply_and_save, create_test_actor, create_test_cause, form, load_ledger, open_ledger,
    trainee,
};
use crate::{PersistTransitionResult, Persistence, PersistenceError};
use residency::{Command, TransitionResult, apply, apply_open};
use residency_domain::{
    FormKind, LinkPolicy, ProgressionLedger, StageStatus, TrainingStage, YearStage,
};

fn link(stage: TrainingStage, kind: FormKind, id: i64) -> Command {
    Command::LinkForm {
        stage,
        kind,
        form_id: form(id),
        policy: LinkPolicy::RejectExisting,
    }
}

fn promote(label: &str) -> Command {
    Command::Promote {
        next_academic_year_label: String::from(label),
    }
}

#[test]
fn test_missing_ledger_returns_none() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.get_ledger(&trainee("nobody")).unwrap().is_none());
}

#[test]
fn test_created_ledger_round_trips() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let stored: PersistTransitionResult = open_ledger(&mut persistence, "T1");
    assert_eq!(stored.version, 0);

    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    assert_eq!(ledger.ledger_id(), Some(stored.ledger_id));
    assert_eq!(ledger.program_start_year(), "1402");
    assert_eq!(ledger.current_stage(), TrainingStage::Year1);
    assert_eq!(ledger.history().len(), 1);
    assert_eq!(ledger.version(), 0);
    assert!(ledger.last_modified().is_some());

    let first: &YearStage = &ledger.history()[0];
    assert_eq!(first.academic_year_label(), "1402-1403");
    assert_eq!(first.status(), StageStatus::InProgress);
    assert!(first.form_links().is_empty());
}

#[test]
fn test_second_ledger_for_same_trainee_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");

    let duplicate: TransitionResult = apply_open(
        None,
        Command::OpenLedger {
            trainee_id: trainee("T1"),
            program_start_year: String::from("1403"),
            academic_year_label: String::from("1403-1404"),
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    let result = persistence.create_ledger(&duplicate);
    assert_eq!(
        result,
        Err(PersistenceError::LedgerAlreadyExists {
            trainee_id: String::from("T1")
        })
    );

    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    assert_eq!(ledger.program_start_year(), "1402");
    assert_eq!(
        persistence.get_audit_timeline(&trainee("T1")).unwrap().len(),
        1
    );
}

#[test]
fn test_links_and_markers_are_stored() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");

    apply_and_save(&mut persistence, "T1", link(TrainingStage::Year1, FormKind::C, 12));
    apply_and_save(&mut persistence, "T1", link(TrainingStage::Year1, FormKind::R, 40));
    let saved: PersistTransitionResult = apply_and_save(
        &mut persistence,
        "T1",
        Command::UpdateStageDetails {
            start_label: Some(String::from("1402/07/01")),
            end_label: None,
        },
    );
    assert_eq!(saved.version, 3);

    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    let year_1: &YearStage = ledger.stage(TrainingStage::Year1).unwrap();
    assert_eq!(year_1.form_links().get(FormKind::C), Some(form(12)));
    assert_eq!(year_1.form_links().get(FormKind::R), Some(form(40)));
    assert_eq!(year_1.form_links().get(FormKind::D), None);
    assert_eq!(year_1.start_label(), Some("1402/07/01"));
    assert_eq!(year_1.end_label(), None);
    assert_eq!(ledger.version(), 3);
}

#[test]
fn test_unlink_removes_stored_link() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");
    apply_and_save(&mut persistence, "T1", link(TrainingStage::Year1, FormKind::E, 5));

    apply_and_save(
        &mut persistence,
        "T1",
        Command::UnlinkForm {
            stage: TrainingStage::Year1,
            kind: FormKind::E,
            form_id: form(5),
        },
    );

    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    assert_eq!(ledger.linked_form_count(), 0);
}

#[test]
fn test_promotion_preserves_closed_stages() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");
    apply_and_save(&mut persistence, "T1", link(TrainingStage::Year1, FormKind::C, 1));
    apply_and_save(&mut persistence, "T1", promote("1403-1404"));
    apply_and_save(&mut persistence, "T1", link(TrainingStage::Year2, FormKind::C, 2));

    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    assert_eq!(ledger.current_stage(), TrainingStage::Year2);
    assert_eq!(ledger.history().len(), 2);

    let year_1: &YearStage = &ledger.history()[0];
    assert_eq!(year_1.stage(), TrainingStage::Year1);
    assert_eq!(year_1.status(), StageStatus::Completed);
    assert_eq!(year_1.form_links().get(FormKind::C), Some(form(1)));

    let year_2: &YearStage = &ledger.history()[1];
    assert_eq!(year_2.stage(), TrainingStage::Year2);
    assert_eq!(year_2.status(), StageStatus::InProgress);
    assert_eq!(year_2.academic_year_label(), "1403-1404");
    assert_eq!(year_2.form_links().get(FormKind::C), Some(form(2)));
}

#[test]
fn test_full_progression_reaches_year_4() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");
    for label in ["1403-1404", "1404-1405", "1405-1406"] {
        apply_and_save(&mut persistence, "T1", promote(label));
    }

    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    let stages: Vec<TrainingStage> = ledger.history().iter().map(YearStage::stage).collect();
    assert_eq!(stages, TrainingStage::ALL.to_vec());
    assert_eq!(ledger.version(), 3);
}

#[test]
fn test_stale_write_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");

    let first_reader: ProgressionLedger = load_ledger(&mut persistence, "T1");
    let second_reader: ProgressionLedger = load_ledger(&mut persistence, "T1");

    let first: TransitionResult = apply(
        &first_reader,
        promote("1403-1404"),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    persistence.save_ledger(&first).unwrap();

    let second: TransitionResult = apply(
        &second_reader,
        promote("1403-1404"),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    let result = persistence.save_ledger(&second);

    assert_eq!(
        result,
        Err(PersistenceError::VersionConflict {
            trainee_id: String::from("T1"),
            expected: 0
        })
    );

    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    assert_eq!(ledger.history().len(), 2);
    assert_eq!(ledger.version(), 1);
}

#[test]
fn test_rejected_write_records_no_audit_event() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");
    let stale: ProgressionLedger = load_ledger(&mut persistence, "T1");
    apply_and_save(&mut persistence, "T1", link(TrainingStage::Year1, FormKind::C, 1));

    let result: TransitionResult = apply(
        &stale,
        link(TrainingStage::Year1, FormKind::D, 2),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();
    assert!(persistence.save_ledger(&result).is_err());

    assert_eq!(
        persistence.get_audit_timeline(&trainee("T1")).unwrap().len(),
        2
    );
    let ledger: ProgressionLedger = load_ledger(&mut persistence, "T1");
    assert_eq!(
        ledger
            .stage(TrainingStage::Year1)
            .unwrap()
            .form_links()
            .get(FormKind::D),
        None
    );
}

#[test]
fn test_saving_unstored_ledger_fails() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let result: TransitionResult = apply_open(
        None,
        Command::OpenLedger {
            trainee_id: trainee("T1"),
            program_start_year: String::from("1402"),
            academic_year_label: String::from("1402-1403"),
        },
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert!(matches!(
        persistence.save_ledger(&result),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_ledgers_are_scoped_per_trainee() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");
    open_ledger(&mut persistence, "T2");
    apply_and_save(&mut persistence, "T2", promote("1403-1404"));

    assert_eq!(
        load_ledger(&mut persistence, "T1").current_stage(),
        TrainingStage::Year1
    );
    assert_eq!(
        load_ledger(&mut persistence, "T2").current_stage(),
        TrainingStage::Year2
    );
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{apply_and_save, load_ledger, open_ledger, trainee};
use crate::{EvaluationFormData, Persistence, PersistenceError};
use residency::Command;
use residency_domain::{FormKind, LinkPolicy, TrainingStage};
use serde_json::json;

#[test]
fn test_insert_and_get_form() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let fields: serde_json::Value = json!({"score": 18, "evaluator": "Dr. Karimi"});

    let inserted: EvaluationFormData = persistence
        .insert_form(FormKind::C, &trainee("T1"), TrainingStage::Year1, &fields)
        .unwrap();
    assert!(inserted.form_id.value() > 0);

    let loaded: EvaluationFormData = persistence.get_form(inserted.form_id).unwrap().unwrap();
    assert_eq!(loaded.kind, FormKind::C);
    assert_eq!(loaded.trainee_id, trainee("T1"));
    assert_eq!(loaded.training_year, TrainingStage::Year1);
    assert_eq!(loaded.fields, fields);
}

#[test]
fn test_duplicate_form_reports_existing_id() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let first: EvaluationFormData = persistence
        .insert_form(FormKind::D, &trainee("T1"), TrainingStage::Year2, &json!({}))
        .unwrap();

    let result = persistence.insert_form(
        FormKind::D,
        &trainee("T1"),
        TrainingStage::Year2,
        &json!({"attempt": 2}),
    );

    assert_eq!(
        result,
        Err(PersistenceError::DuplicateForm {
            existing_form_id: first.form_id.value()
        })
    );
    assert_eq!(
        persistence.list_forms_for_trainee(&trainee("T1")).unwrap().len(),
        1
    );
}

#[test]
fn test_same_kind_in_other_year_or_trainee_is_allowed() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    persistence
        .insert_form(FormKind::K, &trainee("T1"), TrainingStage::Year1, &json!({}))
        .unwrap();
    persistence
        .insert_form(FormKind::K, &trainee("T1"), TrainingStage::Year2, &json!({}))
        .unwrap();
    persistence
        .insert_form(FormKind::K, &trainee("T2"), TrainingStage::Year1, &json!({}))
        .unwrap();
    persistence
        .insert_form(FormKind::R, &trainee("T1"), TrainingStage::Year1, &json!({}))
        .unwrap();

    assert_eq!(
        persistence.list_forms_for_trainee(&trainee("T1")).unwrap().len(),
        3
    );
    assert_eq!(
        persistence.list_forms_for_trainee(&trainee("T2")).unwrap().len(),
        1
    );
}

#[test]
fn test_find_form_by_slot() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let inserted: EvaluationFormData = persistence
        .insert_form(FormKind::G, &trainee("T1"), TrainingStage::Year3, &json!({}))
        .unwrap();

    let found: Option<EvaluationFormData> = persistence
        .find_form(&trainee("T1"), TrainingStage::Year3, FormKind::G)
        .unwrap();
    assert_eq!(found.map(|f| f.form_id), Some(inserted.form_id));

    assert!(
        persistence
            .find_form(&trainee("T1"), TrainingStage::Year1, FormKind::G)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_delete_form_returns_deleted_row() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let inserted: EvaluationFormData = persistence
        .insert_form(FormKind::H, &trainee("T1"), TrainingStage::Year1, &json!({}))
        .unwrap();

    let deleted: Option<EvaluationFormData> = persistence.delete_form(inserted.form_id).unwrap();
    assert_eq!(deleted, Some(inserted.clone()));
    assert!(persistence.get_form(inserted.form_id).unwrap().is_none());
    assert!(persistence.delete_form(inserted.form_id).unwrap().is_none());
}

#[test]
fn test_deleted_slot_can_be_filled_again() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let first: EvaluationFormData = persistence
        .insert_form(FormKind::I, &trainee("T1"), TrainingStage::Year1, &json!({}))
        .unwrap();
    persistence.delete_form(first.form_id).unwrap();

    let second: EvaluationFormData = persistence
        .insert_form(FormKind::I, &trainee("T1"), TrainingStage::Year1, &json!({}))
        .unwrap();
    assert_ne!(first.form_id, second.form_id);
}

#[test]
fn test_deleting_form_leaves_ledger_links_alone() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");
    let inserted: EvaluationFormData = persistence
        .insert_form(FormKind::J, &trainee("T1"), TrainingStage::Year1, &json!({}))
        .unwrap();
    apply_and_save(
        &mut persistence,
        "T1",
        Command::LinkForm {
            stage: TrainingStage::Year1,
            kind: FormKind::J,
            form_id: inserted.form_id,
            policy: LinkPolicy::RejectExisting,
        },
    );

    persistence.delete_form(inserted.form_id).unwrap();

    let links = *load_ledger(&mut persistence, "T1")
        .stage(TrainingStage::Year1)
        .unwrap()
        .form_links();
    assert_eq!(links.get(FormKind::J), Some(inserted.form_id));
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use residency_domain::{FormId, FormKind, TrainingStage};
use residency_persistence::Persistence;
use serde_json::json;

use super::helpers::{
    create_form_request, create_test_actor, create_test_cause, form, load_ledger,
    open_test_ledger, submit_form, trainee,
};
use crate::{
    ApiError, CreateFormRequest, CreateFormResponse, DeleteFormResponse, FormResponse,
    LinkageReport, ListFormsResponse, ServiceConfig, UnlinkReport, create_form, delete_form,
    get_form, link_form, list_forms,
};

fn slot(persistence: &mut Persistence, stage: TrainingStage, kind: FormKind) -> Option<FormId> {
    load_ledger(persistence, "T1")
        .stage(stage)
        .and_then(|entry| entry.form_links().get(kind))
}

// ============================================================================
// Creation and linkage
// ============================================================================

#[test]
fn test_created_form_is_linked_to_its_stage() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    open_test_ledger(&mut persistence, "T1");

    let response: CreateFormResponse = submit_form(&mut persistence, &config, "form_c", "T1", "year_1");

    assert_eq!(response.kind, FormKind::C);
    assert_eq!(response.training_year, TrainingStage::Year1);
    assert_eq!(response.linkage, LinkageReport::Linked);
    assert_eq!(
        slot(&mut persistence, TrainingStage::Year1, FormKind::C),
        Some(response.form_id)
    );
}

#[test]
fn test_stage_accepts_record_label() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    open_test_ledger(&mut persistence, "T1");

    let response: CreateFormResponse = submit_form(&mut persistence, &config, "R", "T1", "سال اول");

    assert_eq!(response.training_year, TrainingStage::Year1);
    assert_eq!(response.linkage, LinkageReport::Linked);
}

#[test]
fn test_form_without_ledger_is_kept_but_not_linked() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();

    let response: CreateFormResponse = submit_form(&mut persistence, &config, "form_d", "T1", "year_1");

    assert_eq!(response.linkage, LinkageReport::NoLedger);
    assert!(get_form(&mut persistence, response.form_id.value()).is_ok());
}

#[test]
fn test_form_for_missing_stage_leaves_ledger_unchanged() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    open_test_ledger(&mut persistence, "T1");

    let response: CreateFormResponse = submit_form(&mut persistence, &config, "form_e", "T1", "year_3");

    assert_eq!(response.linkage, LinkageReport::NoMatchingStage);
    let ledger = load_ledger(&mut persistence, "T1");
    assert_eq!(ledger.version(), 0);
    assert_eq!(ledger.linked_form_count(), 0);
    assert_eq!(
        persistence.get_audit_timeline(&trainee("T1")).unwrap().len(),
        1
    );
}

// ============================================================================
// Duplicate guard
// ============================================================================

#[test]
fn test_duplicate_form_is_rejected_with_existing_id() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    open_test_ledger(&mut persistence, "T1");
    let first: CreateFormResponse = submit_form(&mut persistence, &config, "form_c", "T1", "year_1");

    let result = create_form(
        &mut persistence,
        &config,
        "form_c",
        &create_form_request("T1", "year_1"),
        &create_test_actor(),
        &create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DuplicateForm { existing_form_id, .. }) if existing_form_id == first.form_id.value()
    ));
    assert_eq!(
        slot(&mut persistence, TrainingStage::Year1, FormKind::C),
        Some(first.form_id)
    );
    assert_eq!(
        list_forms(&mut persistence, "T1").unwrap().forms.len(),
        1
    );
}

#[test]
fn test_guard_applies_to_every_form_kind() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    open_test_ledger(&mut persistence, "T1");

    for kind in FormKind::ALL {
        let first: CreateFormResponse =
            submit_form(&mut persistence, &config, kind.as_str(), "T1", "year_1");
        assert_eq!(first.linkage, LinkageReport::Linked, "{kind}");

        let second = create_form(
            &mut persistence,
            &config,
            kind.as_str(),
            &create_form_request("T1", "year_1"),
            &create_test_actor(),
            &create_test_cause(),
        );
        assert!(
            matches!(second, Err(ApiError::DuplicateForm { existing_form_id, .. }) if existing_form_id == first.form_id.value()),
            "{kind} accepted a duplicate"
        );
    }

    assert_eq!(load_ledger(&mut persistence, "T1").linked_form_count(), 10);
}

#[test]
fn test_same_kind_in_different_years_is_allowed() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();

    submit_form(&mut persistence, &config, "form_k", "T1", "year_1");
    submit_form(&mut persistence, &config, "form_k", "T1", "year_2");

    assert_eq!(list_forms(&mut persistence, "T1").unwrap().forms.len(), 2);
}

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn test_unknown_kind_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let result = create_form(
        &mut persistence,
        &ServiceConfig::default(),
        "form_a",
        &create_form_request("T1", "year_1"),
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "kind"
    ));
}

#[test]
fn test_unknown_training_year_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let result = create_form(
        &mut persistence,
        &ServiceConfig::default(),
        "form_c",
        &create_form_request("T1", "year_5"),
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "training_year"
    ));
}

#[test]
fn test_fields_must_be_an_object() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let request: CreateFormRequest = CreateFormRequest {
        fields: json!([1, 2, 3]),
        ..create_form_request("T1", "year_1")
    };

    let result = create_form(
        &mut persistence,
        &ServiceConfig::default(),
        "form_c",
        &request,
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "fields"
    ));
    assert!(list_forms(&mut persistence, "T1").unwrap().forms.is_empty());
}

#[test]
fn test_missing_fields_are_stored_as_empty_object() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let request: CreateFormRequest = CreateFormRequest {
        fields: serde_json::Value::Null,
        ..create_form_request("T1", "year_1")
    };

    let created: CreateFormResponse = create_form(
        &mut persistence,
        &ServiceConfig::default(),
        "form_f",
        &request,
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap();

    let stored: FormResponse = get_form(&mut persistence, created.form_id.value()).unwrap();
    assert_eq!(stored.fields, json!({}));
}

// ============================================================================
// Reads
// ============================================================================

#[test]
fn test_get_form_returns_payload() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let created: CreateFormResponse =
        submit_form(&mut persistence, &ServiceConfig::default(), "form_g", "T1", "year_2");

    let stored: FormResponse = get_form(&mut persistence, created.form_id.value()).unwrap();
    assert_eq!(stored.kind, FormKind::G);
    assert_eq!(stored.trainee_id, "T1");
    assert_eq!(stored.training_year, TrainingStage::Year2);
    assert_eq!(stored.fields, json!({"score": 17}));
}

#[test]
fn test_get_unknown_form_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(matches!(
        get_form(&mut persistence, 77),
        Err(ApiError::ResourceNotFound { .. })
    ));
    assert!(matches!(
        get_form(&mut persistence, 0),
        Err(ApiError::InvalidInput { .. })
    ));
}

#[test]
fn test_list_forms_is_scoped_to_trainee() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    submit_form(&mut persistence, &config, "form_c", "T1", "year_1");
    submit_form(&mut persistence, &config, "form_d", "T1", "year_1");
    submit_form(&mut persistence, &config, "form_c", "T2", "year_1");

    let response: ListFormsResponse = list_forms(&mut persistence, "T1").unwrap();
    assert_eq!(response.trainee_id, "T1");
    assert_eq!(response.forms.len(), 2);
    assert!(response.forms.iter().all(|f| f.trainee_id == "T1"));
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn test_delete_form_clears_back_reference() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    open_test_ledger(&mut persistence, "T1");
    let created: CreateFormResponse = submit_form(&mut persistence, &config, "form_h", "T1", "year_1");

    let response: DeleteFormResponse = delete_form(
        &mut persistence,
        &config,
        created.form_id.value(),
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap();

    assert_eq!(response.form.form_id, created.form_id);
    assert_eq!(response.unlink, UnlinkReport::Cleared);
    assert_eq!(slot(&mut persistence, TrainingStage::Year1, FormKind::H), None);
    assert!(matches!(
        get_form(&mut persistence, created.form_id.value()),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_deleted_slot_accepts_a_new_form() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    open_test_ledger(&mut persistence, "T1");
    let first: CreateFormResponse = submit_form(&mut persistence, &config, "form_i", "T1", "year_1");
    delete_form(
        &mut persistence,
        &config,
        first.form_id.value(),
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap();

    let second: CreateFormResponse = submit_form(&mut persistence, &config, "form_i", "T1", "year_1");
    assert_eq!(second.linkage, LinkageReport::Linked);
    assert_eq!(
        slot(&mut persistence, TrainingStage::Year1, FormKind::I),
        Some(second.form_id)
    );
}

#[test]
fn test_delete_leaves_slot_held_by_other_form() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();

    let orphan: CreateFormResponse = submit_form(&mut persistence, &config, "form_j", "T1", "year_1");
    assert_eq!(orphan.linkage, LinkageReport::NoLedger);
    open_test_ledger(&mut persistence, "T1");
    link_form(
        &mut persistence,
        &config,
        &trainee("T1"),
        TrainingStage::Year1,
        FormKind::J,
        form(999),
        &create_test_actor(),
        &create_test_cause(),
    );

    let response: DeleteFormResponse = delete_form(
        &mut persistence,
        &config,
        orphan.form_id.value(),
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap();

    assert_eq!(
        response.unlink,
        UnlinkReport::HeldByOther { current: form(999) }
    );
    assert_eq!(
        slot(&mut persistence, TrainingStage::Year1, FormKind::J),
        Some(form(999))
    );
}

#[test]
fn test_delete_without_ledger_reports_no_ledger() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let config: ServiceConfig = ServiceConfig::default();
    let created: CreateFormResponse = submit_form(&mut persistence, &config, "form_c", "T1", "year_1");

    let response: DeleteFormResponse = delete_form(
        &mut persistence,
        &config,
        created.form_id.value(),
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap();

    assert_eq!(response.unlink, UnlinkReport::NoLedger);
}

#[test]
fn test_delete_unknown_form_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let result = delete_form(
        &mut persistence,
        &ServiceConfig::default(),
        5,
        &create_test_actor(),
        &create_test_cause(),
    );
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

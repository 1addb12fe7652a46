// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use residency::CoreError;
use residency_domain::{DomainError, FormKind, TrainingStage};
use residency_persistence::PersistenceError;

use super::helpers::form;
use crate::{
    ApiError, AuditAttribution, LedgerStoreError, translate_core_error, translate_domain_error,
    translate_persistence_error, translate_store_error,
};

#[test]
fn test_slot_occupied_is_a_rule_violation() {
    let err: ApiError = translate_domain_error(DomainError::SlotOccupied {
        trainee_id: String::from("T1"),
        stage: TrainingStage::Year2,
        kind: FormKind::C,
        existing: form(4),
    });
    assert!(matches!(
        err,
        ApiError::DomainRuleViolation { ref rule, .. } if rule == "single_form_per_slot"
    ));
}

#[test]
fn test_corrupt_ledger_is_internal() {
    let err: ApiError = translate_core_error(CoreError::DomainViolation(
        DomainError::CorruptLedger {
            trainee_id: String::from("T1"),
            reason: String::from("history is empty"),
        },
    ));
    assert!(matches!(err, ApiError::Internal { .. }));
}

#[test]
fn test_unknown_stage_names_training_year_field() {
    let err: ApiError = translate_domain_error(DomainError::InvalidStage(String::from("year_5")));
    assert_eq!(
        err,
        ApiError::InvalidInput {
            field: String::from("training_year"),
            message: String::from("Unknown training stage 'year_5'"),
        }
    );
}

#[test]
fn test_duplicate_form_keeps_existing_id() {
    let err: ApiError =
        translate_persistence_error(PersistenceError::DuplicateForm { existing_form_id: 42 });
    assert!(matches!(
        err,
        ApiError::DuplicateForm {
            existing_form_id: 42,
            ..
        }
    ));
}

#[test]
fn test_version_conflict_is_concurrent_modification() {
    let err: ApiError = translate_persistence_error(PersistenceError::VersionConflict {
        trainee_id: String::from("T1"),
        expected: 3,
    });
    assert!(matches!(err, ApiError::ConcurrentModification { .. }));
}

#[test]
fn test_database_failure_is_internal() {
    let err: ApiError =
        translate_persistence_error(PersistenceError::DatabaseError(String::from("disk I/O")));
    assert!(matches!(err, ApiError::Internal { .. }));
}

#[test]
fn test_missing_ledger_is_not_found() {
    let err: ApiError = translate_store_error(LedgerStoreError::LedgerNotFound {
        trainee_id: String::from("T1"),
    });
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_contention_is_concurrent_modification() {
    let err: ApiError = translate_store_error(LedgerStoreError::Contended {
        trainee_id: String::from("T1"),
        attempts: 3,
    });
    assert!(err.to_string().contains("3 attempts"));
}

#[test]
fn test_attribution_requires_actor_and_cause() {
    let mut attribution: AuditAttribution = AuditAttribution {
        actor_id: String::from("  "),
        cause_id: String::from("req-1"),
        cause_description: String::new(),
    };
    assert!(matches!(
        attribution.to_audit(),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "actor_id"
    ));

    attribution.actor_id = String::from("admin-1");
    attribution.cause_id = String::new();
    assert!(matches!(
        attribution.to_audit(),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "cause_id"
    ));

    attribution.cause_id = String::from("req-1");
    let (actor, cause) = attribution.to_audit().unwrap();
    assert_eq!(actor.id, "admin-1");
    assert_eq!(cause.id, "req-1");
}

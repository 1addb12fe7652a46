// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::{apply_and_save, form, open_ledger, trainee};
use crate::{PersistTransitionResult, Persistence, PersistenceError};
use residency::Command;
use residency_audit::AuditEvent;
use residency_domain::{FormKind, LinkPolicy, TrainingStage};

#[test]
fn test_open_writes_audit_event() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let stored: PersistTransitionResult = open_ledger(&mut persistence, "T1");

    let event: AuditEvent = persistence.get_audit_event(stored.event_id).unwrap();
    assert_eq!(event.event_id, Some(stored.event_id));
    assert_eq!(event.action.name, "OpenLedger");
    assert_eq!(event.actor.id, "test-actor");
    assert_eq!(event.cause.id, "test-cause");
    assert_eq!(event.before.data, "ledger=none");
    assert!(event.after.data.contains("current_stage=year_1"));
    assert_eq!(event.trainee_id, Some(trainee("T1")));
}

#[test]
fn test_unknown_event_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert_eq!(
        persistence.get_audit_event(999),
        Err(PersistenceError::EventNotFound(999))
    );
}

#[test]
fn test_timeline_is_ordered_and_scoped() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    open_ledger(&mut persistence, "T1");
    open_ledger(&mut persistence, "T2");
    apply_and_save(
        &mut persistence,
        "T1",
        Command::LinkForm {
            stage: TrainingStage::Year1,
            kind: FormKind::F,
            form_id: form(3),
            policy: LinkPolicy::RejectExisting,
        },
    );
    apply_and_save(
        &mut persistence,
        "T1",
        Command::Promote {
            next_academic_year_label: String::from("1403-1404"),
        },
    );

    let timeline: Vec<AuditEvent> = persistence.get_audit_timeline(&trainee("T1")).unwrap();
    let names: Vec<&str> = timeline.iter().map(|e| e.action.name.as_str()).collect();
    assert_eq!(names, vec!["OpenLedger", "LinkForm", "Promote"]);
    assert!(timeline.windows(2).all(|w| w[0].event_id < w[1].event_id));

    assert_eq!(
        persistence.get_audit_timeline(&trainee("T2")).unwrap().len(),
        1
    );
}

#[test]
fn test_timeline_of_unknown_trainee_is_empty() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(
        persistence
            .get_audit_timeline(&trainee("nobody"))
            .unwrap()
            .is_empty()
    );
}

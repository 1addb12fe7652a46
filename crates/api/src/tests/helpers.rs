// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use residency::{Command, TransitionResult, apply};
use residency_audit::{Actor, Cause};
use residency_domain::{FormId, ProgressionLedger, TraineeId};
use residency_persistence::{PersistTransitionResult, Persistence, PersistenceError};

use crate::{
    AuditAttribution, CreateFormRequest, CreateFormResponse, LedgerRepository, LedgerResponse,
    OpenLedgerRequest, PromoteRequest, PromoteResponse, ServiceConfig, create_form, open_ledger,
    promote,
};

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("admin-123"), String::from("operator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn create_test_attribution() -> AuditAttribution {
    AuditAttribution {
        actor_id: String::from("admin-123"),
        cause_id: String::from("api-req-456"),
        cause_description: String::from("API request"),
    }
}

pub fn trainee(id: &str) -> TraineeId {
    TraineeId::new(id).unwrap()
}

pub fn form(id: i64) -> FormId {
    FormId::new(id).unwrap()
}

pub fn create_open_request(trainee_id: &str) -> OpenLedgerRequest {
    OpenLedgerRequest {
        trainee_id: String::from(trainee_id),
        program_start_year: String::from("1402"),
        academic_year_label: String::from("1402-1403"),
        attribution: create_test_attribution(),
    }
}

pub fn create_form_request(trainee_id: &str, training_year: &str) -> CreateFormRequest {
    CreateFormRequest {
        trainee_id: String::from(trainee_id),
        training_year: String::from(training_year),
        fields: serde_json::json!({"score": 17}),
        attribution: create_test_attribution(),
    }
}

pub fn open_test_ledger(persistence: &mut Persistence, trainee_id: &str) -> LedgerResponse {
    open_ledger(
        persistence,
        &create_open_request(trainee_id),
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
}

pub fn submit_form(
    persistence: &mut Persistence,
    config: &ServiceConfig,
    kind: &str,
    trainee_id: &str,
    training_year: &str,
) -> CreateFormResponse {
    create_form(
        persistence,
        config,
        kind,
        &create_form_request(trainee_id, training_year),
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap()
}

pub fn promote_trainee(persistence: &mut Persistence, trainee_id: &str, label: &str) -> PromoteResponse {
    promote(
        persistence,
        &PromoteRequest {
            trainee_id: String::from(trainee_id),
            next_academic_year_label: String::from(label),
            attribution: create_test_attribution(),
        },
        &create_test_actor(),
        &create_test_cause(),
    )
    .unwrap()
}

pub fn load_ledger(persistence: &mut Persistence, trainee_id: &str) -> ProgressionLedger {
    persistence.get_ledger(&trainee(trainee_id)).unwrap().unwrap()
}

/// Ledger storage that lets another writer slip in before each of the
/// first `interferences` saves.
pub struct InterferingRepository {
    pub inner: Persistence,
    pub interferences: u32,
    pub saves_attempted: u32,
}

impl InterferingRepository {
    pub fn new(inner: Persistence, interferences: u32) -> Self {
        Self {
            inner,
            interferences,
            saves_attempted: 0,
        }
    }
}

impl LedgerRepository for InterferingRepository {
    fn load_ledger(
        &mut self,
        trainee_id: &TraineeId,
    ) -> Result<Option<ProgressionLedger>, PersistenceError> {
        self.inner.get_ledger(trainee_id)
    }

    fn create_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        self.inner.create_ledger(result)
    }

    fn save_ledger(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        self.saves_attempted += 1;
        if self.interferences > 0 {
            self.interferences -= 1;
            let fresh: ProgressionLedger = self
                .inner
                .get_ledger(result.new_ledger.trainee_id())?
                .expect("ledger should exist");
            let other: TransitionResult = apply(
                &fresh,
                Command::UpdateStageDetails {
                    start_label: Some(format!("interference {}", self.saves_attempted)),
                    end_label: None,
                },
                Actor::new(String::from("other-writer"), String::from("operator")),
                create_test_cause(),
            )
            .expect("interfering update should apply");
            self.inner.save_ledger(&other)?;
        }
        self.inner.save_ledger(result)
    }
}

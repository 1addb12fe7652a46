// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use residency_domain::{FormId, FormKind, TraineeId, TrainingStage};
use serde::{Deserialize, Serialize};

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// A stored evaluation form document.
///
/// Only identity, trainee and training year are interpreted. The
/// kind-specific fields are kept as an opaque JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationFormData {
    pub form_id: FormId,
    pub kind: FormKind,
    pub trainee_id: TraineeId,
    pub training_year: TrainingStage,
    pub fields: serde_json::Value,
    pub created_at: String,
}

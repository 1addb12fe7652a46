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
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use residency_api::{
    ApiError, AuditAttribution, AuditEventInfo, AuditTimelineResponse, CreateFormRequest,
    CreateFormResponse, DeleteFormResponse, FormResponse, LedgerResponse, ListFormsResponse,
    OpenLedgerRequest, PromoteRequest, PromoteResponse, ServiceConfig, UpdateStageDetailsRequest,
    create_form, delete_form, get_audit_event, get_audit_timeline, get_form, get_ledger,
    list_forms, open_ledger, promote, update_stage_details,
};
use residency_domain::LinkPolicy;
use residency_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Residency Server - HTTP server for the residency progression ledger
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// What linking a different form into an occupied slot does (reject or overwrite)
    #[arg(long, default_value = "reject", value_parser = parse_link_policy)]
    relink_policy: LinkPolicy,

    /// Attempts for idempotent ledger writes that lose an optimistic-concurrency race
    #[arg(long, default_value_t = residency_api::DEFAULT_MAX_LINK_ATTEMPTS)]
    max_link_attempts: u32,
}

fn parse_link_policy(value: &str) -> Result<LinkPolicy, String> {
    value.parse::<LinkPolicy>().map_err(|e| e.to_string())
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for ledgers, forms and audit events.
    persistence: Arc<Mutex<Persistence>>,
    /// Relink policy and retry bound.
    config: ServiceConfig,
}

// ============================================================================
// Errors
// ============================================================================

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// The already recorded form, for duplicate submissions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    existing_form_id: Option<i64>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// The already recorded form, for duplicate submissions.
    existing_form_id: Option<i64>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            existing_form_id: self.existing_form_id,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let (status, existing_form_id): (StatusCode, Option<i64>) = match &err {
            ApiError::InvalidInput { .. } | ApiError::TerminalStage { .. } => {
                (StatusCode::BAD_REQUEST, None)
            }
            ApiError::ResourceNotFound { .. } => (StatusCode::NOT_FOUND, None),
            ApiError::DomainRuleViolation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, None),
            ApiError::DuplicateForm {
                existing_form_id, ..
            } => (StatusCode::CONFLICT, Some(*existing_form_id)),
            ApiError::LedgerAlreadyExists { .. } | ApiError::ConcurrentModification { .. } => {
                (StatusCode::CONFLICT, None)
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        Self {
            status,
            message: err.to_string(),
            existing_form_id,
        }
    }
}

// ============================================================================
// Ledgers
// ============================================================================

/// Handler for POST /ledgers endpoint.
async fn handle_open_ledger(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<OpenLedgerRequest>,
) -> Result<(StatusCode, Json<LedgerResponse>), HttpError> {
    info!(
        trainee_id = %req.trainee_id,
        actor_id = %req.attribution.actor_id,
        "Handling open_ledger request"
    );

    let (actor, cause) = req.attribution.to_audit()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: LedgerResponse = open_ledger(&mut persistence, &req, actor, cause)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/ledgers/{trainee_id}` endpoint.
async fn handle_get_ledger(
    AxumState(app_state): AxumState<AppState>,
    Path(trainee_id): Path<String>,
) -> Result<Json<LedgerResponse>, HttpError> {
    info!(trainee_id = %trainee_id, "Handling get_ledger request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LedgerResponse = get_ledger(&mut persistence, &trainee_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/ledgers/{trainee_id}/stage_details` endpoint.
async fn handle_update_stage_details(
    AxumState(app_state): AxumState<AppState>,
    Path(trainee_id): Path<String>,
    Json(req): Json<UpdateStageDetailsRequest>,
) -> Result<Json<LedgerResponse>, HttpError> {
    info!(trainee_id = %trainee_id, "Handling update_stage_details request");

    let (actor, cause) = req.attribution.to_audit()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: LedgerResponse = update_stage_details(
        &mut persistence,
        &app_state.config,
        &trainee_id,
        &req,
        &actor,
        &cause,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST /promote endpoint.
async fn handle_promote(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<PromoteRequest>,
) -> Result<Json<PromoteResponse>, HttpError> {
    info!(
        trainee_id = %req.trainee_id,
        actor_id = %req.attribution.actor_id,
        "Handling promote request"
    );

    let (actor, cause) = req.attribution.to_audit()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: PromoteResponse = promote(&mut persistence, &req, &actor, &cause)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Evaluation Forms
// ============================================================================

/// Handler for POST `/forms/{kind}` endpoint.
///
/// Shares its path segment with the form ID routes; here it names the kind.
/// Linkage problems are reported in the response body and never change the
/// status of a stored form.
async fn handle_create_form(
    AxumState(app_state): AxumState<AppState>,
    Path(kind): Path<String>,
    Json(req): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<CreateFormResponse>), HttpError> {
    info!(
        kind = %kind,
        trainee_id = %req.trainee_id,
        training_year = %req.training_year,
        "Handling create_form request"
    );

    let (actor, cause) = req.attribution.to_audit()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: CreateFormResponse = create_form(
        &mut persistence,
        &app_state.config,
        &kind,
        &req,
        &actor,
        &cause,
    )?;
    drop(persistence);

    if !response.linkage.is_recorded() {
        warn!(
            form_id = response.form_id.value(),
            linkage = ?response.linkage,
            "Form stored without ledger back-reference"
        );
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/forms/{form_id}` endpoint.
async fn handle_get_form(
    AxumState(app_state): AxumState<AppState>,
    Path(form_id): Path<i64>,
) -> Result<Json<FormResponse>, HttpError> {
    info!(form_id, "Handling get_form request");

    let mut persistence = app_state.persistence.lock().await;
    let response: FormResponse = get_form(&mut persistence, form_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for DELETE `/forms/{form_id}` endpoint.
///
/// Audit attribution is taken from the query string.
async fn handle_delete_form(
    AxumState(app_state): AxumState<AppState>,
    Path(form_id): Path<i64>,
    Query(attribution): Query<AuditAttribution>,
) -> Result<Json<DeleteFormResponse>, HttpError> {
    info!(
        form_id,
        actor_id = %attribution.actor_id,
        "Handling delete_form request"
    );

    let (actor, cause) = attribution.to_audit()?;

    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteFormResponse =
        delete_form(&mut persistence, &app_state.config, form_id, &actor, &cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/trainees/{trainee_id}/forms` endpoint.
async fn handle_list_forms(
    AxumState(app_state): AxumState<AppState>,
    Path(trainee_id): Path<String>,
) -> Result<Json<ListFormsResponse>, HttpError> {
    info!(trainee_id = %trainee_id, "Handling list_forms request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ListFormsResponse = list_forms(&mut persistence, &trainee_id)?;
    drop(persistence);

    Ok(Json(response))
}

// ============================================================================
// Audit
// ============================================================================

/// Handler for GET `/audit/trainees/{trainee_id}` endpoint.
async fn handle_get_audit_timeline(
    AxumState(app_state): AxumState<AppState>,
    Path(trainee_id): Path<String>,
) -> Result<Json<AuditTimelineResponse>, HttpError> {
    info!(trainee_id = %trainee_id, "Handling get_audit_timeline request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AuditTimelineResponse = get_audit_timeline(&mut persistence, &trainee_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/audit/events/{event_id}` endpoint.
async fn handle_get_audit_event(
    AxumState(app_state): AxumState<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<AuditEventInfo>, HttpError> {
    info!(event_id, "Handling get_audit_event request");

    let mut persistence = app_state.persistence.lock().await;
    let response: AuditEventInfo = get_audit_event(&mut persistence, event_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
///
/// `/forms/{form_ref}` is a form kind for POST and a form ID for GET and DELETE.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/ledgers", post(handle_open_ledger))
        .route("/ledgers/{trainee_id}", get(handle_get_ledger))
        .route(
            "/ledgers/{trainee_id}/stage_details",
            post(handle_update_stage_details),
        )
        .route("/promote", post(handle_promote))
        .route(
            "/forms/{form_ref}",
            post(handle_create_form)
                .get(handle_get_form)
                .delete(handle_delete_form),
        )
        .route("/trainees/{trainee_id}/forms", get(handle_list_forms))
        .route("/audit/trainees/{trainee_id}", get(handle_get_audit_timeline))
        .route("/audit/events/{event_id}", get(handle_get_audit_event))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Residency Server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let config: ServiceConfig = ServiceConfig::new(args.relink_policy, args.max_link_attempts);
    info!(
        relink_policy = %config.link_policy,
        max_link_attempts = config.max_link_attempts,
        "Service configuration"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        config,
    };

    let app: Router = build_router(app_state);

    let addr: SocketAddr = SocketAddr::new(args.bind, args.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

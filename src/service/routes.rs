//! Axum routes for the company registry service.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{middleware, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::auth::{self, AuthSubject};
use super::state::ServiceState;
use crate::error::{Error, ErrorResponse};
use crate::store::CompanyStore;
use crate::types::{Company, CompanyId, CreateCompany, UpdateCompany};

// ============================================================================
// Response Types
// ============================================================================

/// Response of the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// A freshly issued access token.
    pub token: String,
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Whether the store answered the health probe.
    pub database: bool,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Always `alive` while the process runs.
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service should receive traffic.
    pub ready: bool,
    /// Whether the store is reachable.
    pub database: bool,
    /// Optional human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ============================================================================
// Route Handlers
// ============================================================================

fn parse_company_id(raw: &str) -> Result<CompanyId, Error> {
    // A malformed id is not decoded into a client error; it surfaces the
    // same way any other unusable store key would.
    CompanyId::from_str(raw).map_err(|e| {
        warn!(company_id = raw, error = %e, "unparsable company id");
        Error::ProcessingFailed
    })
}

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            warn!(error = %rejection, "request body failed to decode");
            Err(Error::InvalidParameters)
        }
    }
}

/// Create a company.
async fn create_company_handler<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Extension(subject): Extension<AuthSubject>,
    payload: Result<Json<CreateCompany>, JsonRejection>,
) -> Result<Json<Company>, Error> {
    let request = decode(payload)?;
    let company = state.registry.create(request).await?;
    debug!(subject = subject.as_str(), company_id = %company.id, "create served");
    Ok(Json(company))
}

/// Partially update a company. Success carries no body.
async fn update_company_handler<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Extension(subject): Extension<AuthSubject>,
    Path(company_id): Path<String>,
    payload: Result<Json<UpdateCompany>, JsonRejection>,
) -> Result<StatusCode, Error> {
    let request = decode(payload)?;
    let id = parse_company_id(&company_id)?;
    state.registry.update(id, request).await?;
    debug!(subject = subject.as_str(), company_id = %id, "update served");
    Ok(StatusCode::OK)
}

/// Soft-delete a company. Success carries no body.
async fn delete_company_handler<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Extension(subject): Extension<AuthSubject>,
    Path(company_id): Path<String>,
) -> Result<StatusCode, Error> {
    let id = parse_company_id(&company_id)?;
    state.registry.delete(id).await?;
    debug!(subject = subject.as_str(), company_id = %id, "delete served");
    Ok(StatusCode::OK)
}

/// Read a company. Unauthenticated.
async fn get_company_handler<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    Path(company_id): Path<String>,
) -> Result<Json<Company>, Error> {
    let id = parse_company_id(&company_id)?;
    let company = state.registry.get(id).await?;
    Ok(Json(company))
}

/// Issue an access token for a random subject.
///
/// Development bootstrap so the mutating endpoints can be exercised without
/// an external identity provider.
async fn issue_token_handler<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<TokenResponse>, Error> {
    let subject = Uuid::new_v4().to_string();
    let token = state.tokens.issue(&subject, state.access_token_duration)?;
    Ok(Json(TokenResponse { token }))
}

/// Health check endpoint (detailed).
async fn health_handler<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Json<HealthResponse> {
    let db_healthy = state.store.is_healthy().await;

    Json(HealthResponse {
        status: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_healthy,
    })
}

/// Liveness probe endpoint. Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 when the store is reachable, 503 otherwise.
async fn readiness_handler<S: CompanyStore + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    if state.store.is_healthy().await {
        Ok(Json(ReadinessResponse {
            ready: true,
            database: true,
            details: None,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                database: false,
                details: Some("store connection failed".to_string()),
            }),
        ))
    }
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("resource not found")),
    )
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the company registry service.
///
/// The read endpoint, token endpoint, and health probes are public; the
/// mutating endpoints sit behind the bearer-token gate.
pub fn create_router<S: CompanyStore + 'static>(state: ServiceState<S>) -> Router {
    let state = Arc::new(state);

    let public = Router::new()
        .route("/api/v1/company/:company_id", get(get_company_handler::<S>))
        .route("/api/v1/token", get(issue_token_handler::<S>))
        .route("/health", get(health_handler::<S>))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler::<S>));

    let protected = Router::new()
        .route("/api/v1/company", post(create_company_handler::<S>))
        .route(
            "/api/v1/company/:company_id",
            patch(update_company_handler::<S>).delete(delete_company_handler::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_bearer::<S>,
        ));

    public
        .merge(protected)
        .fallback(not_found_handler)
        .with_state(state)
}

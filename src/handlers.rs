use crate::config::Config;
use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::lead::{CreateLeadData, Lead, LeadContact};
use crate::mail::{lead_accepted_message, MailService};
use crate::models::{LeadQueryParams, LeadResource};
use crate::repository::{LeadQuery, LeadRepository, Pagination, WriteOutcome};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Lead storage (PostgreSQL or in-memory).
    pub leads: Arc<dyn LeadRepository>,
    /// Notification sender used after a lead is accepted.
    pub mailer: Arc<dyn MailService>,
}

/// Health check endpoint.
///
/// Probes the lead store; reports 503 when it is unreachable.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and storage are healthy"),
        (status = 503, description = "Storage is unreachable")
    ),
    tag = "health"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let storage = state.leads.backend();

    match state.leads.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "storage": storage,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "storage": storage,
                })),
            )
        }
    }
}

/// GET /leads
///
/// Lists leads ordered by id, optionally filtered by status and a search term.
#[utoipa::path(
    get,
    path = "/leads",
    params(LeadQueryParams),
    responses(
        (status = 200, description = "One page of leads", body = [LeadResource]),
        (status = 400, description = "Malformed query string")
    ),
    tag = "leads"
)]
pub async fn query_leads(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<LeadQueryParams>,
) -> Result<Json<Vec<LeadResource>>, AppError> {
    tracing::info!("GET /leads - params: {:?}", params);

    let query = LeadQuery::new(params.status, params.search.as_deref());
    let pagination = Pagination::new(params.page, params.size);

    let leads = state.leads.query_leads(&query, pagination).await?;

    Ok(Json(leads.iter().map(LeadResource::from).collect()))
}

/// GET /leads/:id
#[utoipa::path(
    get,
    path = "/leads/{id}",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "The lead", body = LeadResource),
        (status = 404, description = "No lead with this id")
    ),
    tag = "leads"
)]
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<LeadResource>, AppError> {
    tracing::info!("GET /leads/{}", id);

    let lead = load_lead(&state, id).await?;

    Ok(Json(LeadResource::from(&lead)))
}

/// POST /leads
///
/// Creates a `New` lead from the submitted form.
#[utoipa::path(
    post,
    path = "/leads",
    request_body = CreateLeadData,
    responses(
        (status = 200, description = "The created lead", body = LeadResource),
        (status = 400, description = "Input out of bounds"),
        (status = 409, description = "A lead with the generated id already exists")
    ),
    tag = "leads"
)]
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    ApiJson(data): ApiJson<CreateLeadData>,
) -> Result<Json<LeadResource>, AppError> {
    tracing::info!("POST /leads - category: {}", data.category);

    let data = data.normalize();
    data.validate()?;

    let lead = Lead::new(data);

    match state.leads.create_lead(&lead).await? {
        WriteOutcome::Applied => {
            tracing::info!("Created lead {} priced {}", lead.id(), lead.price());
            Ok(Json(LeadResource::from(&lead)))
        }
        WriteOutcome::Conflict => Err(AppError::Conflict(format!(
            "Lead {} already exists",
            lead.id()
        ))),
        WriteOutcome::NotFound => Err(AppError::InternalError(
            "insert reported a missing lead".to_string(),
        )),
    }
}

/// PUT /leads/:id/accept
///
/// Accepts a `New` lead with the buyer's contact details and notifies sales.
#[utoipa::path(
    put,
    path = "/leads/{id}/accept",
    params(("id" = Uuid, Path, description = "Lead id")),
    request_body = LeadContact,
    responses(
        (status = 200, description = "The accepted lead", body = LeadResource),
        (status = 400, description = "Contact details out of bounds"),
        (status = 404, description = "No lead with this id"),
        (status = 409, description = "The lead changed while being accepted"),
        (status = 422, description = "The lead is not new")
    ),
    tag = "leads"
)]
pub async fn accept_lead(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(contact): ApiJson<LeadContact>,
) -> Result<Json<LeadResource>, AppError> {
    tracing::info!("PUT /leads/{}/accept", id);

    contact.validate()?;

    let mut lead = load_lead(&state, id).await?;
    lead.accept(contact)?;
    save_transition(&state, &lead).await?;

    tracing::info!("Lead {} accepted at price {}", id, lead.price());
    notify_sales(&state, &lead).await;

    Ok(Json(LeadResource::from(&lead)))
}

/// PUT /leads/:id/decline
#[utoipa::path(
    put,
    path = "/leads/{id}/decline",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 200, description = "The declined lead", body = LeadResource),
        (status = 404, description = "No lead with this id"),
        (status = 409, description = "The lead changed while being declined"),
        (status = 422, description = "The lead is not new")
    ),
    tag = "leads"
)]
pub async fn decline_lead(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<LeadResource>, AppError> {
    tracing::info!("PUT /leads/{}/decline", id);

    let mut lead = load_lead(&state, id).await?;
    lead.decline()?;
    save_transition(&state, &lead).await?;

    tracing::info!("Lead {} declined", id);

    Ok(Json(LeadResource::from(&lead)))
}

/// DELETE /leads/:id
///
/// Removes a lead in any status.
#[utoipa::path(
    delete,
    path = "/leads/{id}",
    params(("id" = Uuid, Path, description = "Lead id")),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 404, description = "No lead with this id")
    ),
    tag = "leads"
)]
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    tracing::info!("DELETE /leads/{}", id);

    match state.leads.delete_lead(id).await? {
        WriteOutcome::Applied => Ok(StatusCode::NO_CONTENT),
        WriteOutcome::NotFound | WriteOutcome::Conflict => Err(not_found(id)),
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Lead {} not found", id))
}

async fn load_lead(state: &AppState, id: Uuid) -> Result<Lead, AppError> {
    state.leads.get_lead(id).await?.ok_or_else(|| not_found(id))
}

/// Writes a transitioned lead back, turning the write outcome into an API error.
async fn save_transition(state: &AppState, lead: &Lead) -> Result<(), AppError> {
    match state.leads.update_lead(lead).await? {
        WriteOutcome::Applied => Ok(()),
        WriteOutcome::NotFound => Err(not_found(lead.id())),
        WriteOutcome::Conflict => Err(AppError::Conflict(format!(
            "Lead {} was modified by another request",
            lead.id()
        ))),
    }
}

/// Best effort: a failed notification never fails the acceptance.
async fn notify_sales(state: &AppState, lead: &Lead) {
    let message = lead_accepted_message(&state.config.sales_email_address, lead.price());

    if let Err(e) = state.mailer.send_mail(message).await {
        tracing::warn!("Failed to notify sales about lead {}: {}", lead.id(), e);
    }
}

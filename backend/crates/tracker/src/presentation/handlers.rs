//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::extract::ApiJson;
use platform::config::ConfigStore;
use platform::scheduler::{JobHistory, Scheduler};

use crate::application::{
    AddCertificateInput, AddCertificateUseCase, AddDomainInput, AddDomainUseCase,
    CERTIFICATE_REFRESH_JOB, CertificateCatalog, ClientCatalog, DOMAIN_REFRESH_ALL_JOB,
    DomainCatalog, EditDomainInput, TrackerConfig, TrackerServices,
};
use crate::domain::repository::{CertificateRepository, ClientRepository, DomainRepository};
use crate::error::{TrackerError, TrackerResult};
use crate::presentation::dto::{
    AcceptedResponse, AddClientRequest, AddDomainRequest, CertificateResponse, ClientResponse,
    CreatedResponse, DomainResponse, EditDomainRequest,
};

/// Shared state for tracker handlers
pub struct TrackerAppState<R> {
    pub services: TrackerServices<R>,
    pub config: Arc<ConfigStore>,
    pub scheduler: Arc<Scheduler>,
    pub history: Arc<JobHistory>,
}

impl<R> Clone for TrackerAppState<R> {
    fn clone(&self) -> Self {
        Self {
            services: self.services.clone(),
            config: self.config.clone(),
            scheduler: self.scheduler.clone(),
            history: self.history.clone(),
        }
    }
}

impl<R> TrackerAppState<R> {
    fn tracker_config(&self) -> TrackerResult<Arc<TrackerConfig>> {
        TrackerConfig::from_app(&self.config.snapshot()).map(Arc::new)
    }

    fn fire(&self, job: &'static str) -> TrackerResult<Response> {
        self.scheduler
            .trigger(job)
            .map_err(|e| TrackerError::Internal(e.to_string()))?;

        Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { job })).into_response())
    }
}

/// 200 with the items, 204 when there are none
fn listing<T, U>(items: Vec<T>) -> Response
where
    U: From<T> + serde::Serialize,
{
    if items.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    let body: Vec<U> = items.into_iter().map(U::from).collect();
    (StatusCode::OK, Json(body)).into_response()
}

// ============================================================================
// Domains
// ============================================================================

/// GET /api/get
pub async fn list_domains<R>(State(state): State<TrackerAppState<R>>) -> TrackerResult<Response>
where
    R: DomainRepository + Send + Sync + 'static,
{
    let domains = DomainCatalog::new(state.services.repo.clone()).list().await?;
    Ok(listing::<_, DomainResponse>(domains))
}

/// POST /api/add
pub async fn add_domain<R>(
    State(state): State<TrackerAppState<R>>,
    ApiJson(req): ApiJson<AddDomainRequest>,
) -> TrackerResult<impl IntoResponse>
where
    R: DomainRepository + Send + Sync + 'static,
{
    let use_case = AddDomainUseCase::new(
        state.services.repo.clone(),
        state.services.resolver.clone(),
        state.services.dns.clone(),
        state.tracker_config()?,
    );

    let output = use_case
        .execute(AddDomainInput {
            domain: req.domain,
            client_id: req.client_id,
            notes: req.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: output.id.as_i32(),
            domain: Some(output.domain.to_string()),
            common_name: None,
            expiration: Some(output.expiration),
        }),
    ))
}

/// POST /api/edit
pub async fn edit_domain<R>(
    State(state): State<TrackerAppState<R>>,
    ApiJson(req): ApiJson<EditDomainRequest>,
) -> TrackerResult<impl IntoResponse>
where
    R: DomainRepository + Send + Sync + 'static,
{
    DomainCatalog::new(state.services.repo.clone())
        .edit(EditDomainInput {
            id: req.id,
            client_id: req.client_id,
            notes: req.notes,
        })
        .await?;

    Ok(StatusCode::OK)
}

/// DELETE /api/delete/{id}
pub async fn delete_domain<R>(
    State(state): State<TrackerAppState<R>>,
    Path(id): Path<i32>,
) -> TrackerResult<impl IntoResponse>
where
    R: DomainRepository + Send + Sync + 'static,
{
    DomainCatalog::new(state.services.repo.clone())
        .delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/refreshAll
pub async fn refresh_all_domains<R>(
    State(state): State<TrackerAppState<R>>,
) -> TrackerResult<Response> {
    state.fire(DOMAIN_REFRESH_ALL_JOB)
}

// ============================================================================
// Clients
// ============================================================================

/// GET /api/clientList
pub async fn list_clients<R>(State(state): State<TrackerAppState<R>>) -> TrackerResult<Response>
where
    R: ClientRepository + Send + Sync + 'static,
{
    let clients = ClientCatalog::new(state.services.repo.clone()).list().await?;
    Ok(listing::<_, ClientResponse>(clients))
}

/// POST /api/clientAdd
pub async fn add_client<R>(
    State(state): State<TrackerAppState<R>>,
    ApiJson(req): ApiJson<AddClientRequest>,
) -> TrackerResult<impl IntoResponse>
where
    R: ClientRepository + Send + Sync + 'static,
{
    let id = ClientCatalog::new(state.services.repo.clone())
        .add(&req.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: id.as_i32(),
            domain: None,
            common_name: None,
            expiration: None,
        }),
    ))
}

/// DELETE /api/deleteClient/{id}
pub async fn delete_client<R>(
    State(state): State<TrackerAppState<R>>,
    Path(id): Path<i32>,
) -> TrackerResult<impl IntoResponse>
where
    R: ClientRepository + Send + Sync + 'static,
{
    ClientCatalog::new(state.services.repo.clone())
        .delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Certificates
// ============================================================================

/// POST /api/tlsAddDomain
pub async fn add_certificate<R>(
    State(state): State<TrackerAppState<R>>,
    ApiJson(req): ApiJson<AddDomainRequest>,
) -> TrackerResult<impl IntoResponse>
where
    R: CertificateRepository + Send + Sync + 'static,
{
    let use_case = AddCertificateUseCase::new(
        state.services.repo.clone(),
        state.services.certificates.clone(),
        state.tracker_config()?,
    );

    let output = use_case
        .execute(AddCertificateInput {
            host: req.domain,
            client_id: req.client_id,
            notes: req.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: output.id.as_i32(),
            domain: None,
            common_name: Some(output.common_name),
            expiration: Some(output.expiration),
        }),
    ))
}

/// GET /api/tlsList
pub async fn list_certificates<R>(
    State(state): State<TrackerAppState<R>>,
) -> TrackerResult<Response>
where
    R: CertificateRepository + Send + Sync + 'static,
{
    let certificates = CertificateCatalog::new(state.services.repo.clone())
        .list()
        .await?;
    Ok(listing::<_, CertificateResponse>(certificates))
}

/// DELETE /api/tlsDelete/{id}
pub async fn delete_certificate<R>(
    State(state): State<TrackerAppState<R>>,
    Path(id): Path<i32>,
) -> TrackerResult<impl IntoResponse>
where
    R: CertificateRepository + Send + Sync + 'static,
{
    CertificateCatalog::new(state.services.repo.clone())
        .delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/tlsRefreshAll
pub async fn refresh_all_certificates<R>(
    State(state): State<TrackerAppState<R>>,
) -> TrackerResult<Response> {
    state.fire(CERTIFICATE_REFRESH_JOB)
}

// ============================================================================
// Jobs
// ============================================================================

/// GET /api/jobs
pub async fn job_reports<R>(State(state): State<TrackerAppState<R>>) -> impl IntoResponse {
    Json(state.history.latest())
}

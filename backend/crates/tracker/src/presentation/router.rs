//! Tracker Router

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use auth::domain::repository::SessionRepository;
use auth::{AuthMiddlewareState, require_admin};

use crate::domain::repository::{CertificateRepository, ClientRepository, DomainRepository};
use crate::presentation::handlers::{self, TrackerAppState};

/// Dashboard API routes, mounted under `/api`. Every route sits behind the
/// admin guard.
pub fn tracker_router<R, S>(state: TrackerAppState<R>, guard: AuthMiddlewareState<S>) -> Router
where
    R: DomainRepository + ClientRepository + CertificateRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/get", get(handlers::list_domains::<R>))
        .route("/add", post(handlers::add_domain::<R>))
        .route("/edit", post(handlers::edit_domain::<R>))
        .route("/delete/{id}", delete(handlers::delete_domain::<R>))
        .route("/refreshAll", post(handlers::refresh_all_domains::<R>))
        .route("/clientList", get(handlers::list_clients::<R>))
        .route("/clientAdd", post(handlers::add_client::<R>))
        .route("/deleteClient/{id}", delete(handlers::delete_client::<R>))
        .route("/tlsAddDomain", post(handlers::add_certificate::<R>))
        .route("/tlsList", get(handlers::list_certificates::<R>))
        .route("/tlsDelete/{id}", delete(handlers::delete_certificate::<R>))
        .route("/tlsRefreshAll", post(handlers::refresh_all_certificates::<R>))
        .route("/jobs", get(handlers::job_reports::<R>))
        .route_layer(middleware::from_fn_with_state(guard, require_admin::<S>))
        .with_state(state)
}

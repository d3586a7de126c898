//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors only.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use auth::application::cleanup::SESSION_CLEANUP_JOB;
use auth::{
    AuthConfig, AuthMiddlewareState, EnsureAdminUseCase, PgAuthRepository, SessionCleanupJob,
    auth_router,
};
use axum::Router;
use axum::response::Redirect;
use axum::routing::get;
use platform::config::ConfigStore;
use platform::scheduler::{JobHistory, Scheduler, TracingObserver, Trigger};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker::application::{CertificateFetcher, DnsResolver, Mailer, RegistrySource};
use tracker::infra::http::build_client;
use tracker::infra::{DohResolver, RdapSource, SmtpMailer, TlsCertificateFetcher, WhoisSource};
use tracker::{
    CertificateRefreshJob, DomainRefreshJob, FallbackResolver, NameserverDriftJob, Notifier,
    PgTrackerRepository, RefreshScope, TrackerAppState, TrackerServices, tracker_router,
};

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "api=info,auth=info,tracker=info,platform=info,tower_http=info".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration snapshot; SIGHUP reloads it
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Arc::new(
        ConfigStore::load(&config_path)
            .with_context(|| format!("failed to load configuration from {config_path}"))?,
    );
    let app_config = config.snapshot();
    tracing::info!(config = ?app_config, "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&app_config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Admin bootstrap
    let auth_repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let admin_id = EnsureAdminUseCase::new(auth_repo.clone())
        .execute(&app_config.init_user, &app_config.init_password)
        .await
        .context("failed to bootstrap the admin account")?;
    let auth_config = Arc::new(AuthConfig::from_app(&app_config, admin_id));

    // Network collaborators
    let network = &app_config.network;
    let http = build_client(network)?;
    let registry_sources: Vec<Arc<dyn RegistrySource>> = vec![
        Arc::new(RdapSource::new(http.clone(), network.rdap_base_url.clone())),
        Arc::new(WhoisSource::new(
            network.whois_root_server.clone(),
            network.connect_timeout(),
            network.request_timeout(),
        )),
    ];
    let dns: Arc<dyn DnsResolver> = Arc::new(DohResolver::new(http, network.doh_url.clone()));
    let certificates: Arc<dyn CertificateFetcher> = Arc::new(TlsCertificateFetcher::new(
        network.connect_timeout(),
        network.request_timeout(),
    )?);
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::from_config(&app_config)?);

    let resolver = Arc::new(FallbackResolver::new(registry_sources));
    tracing::info!(
        sources = ?resolver.source_names().collect::<Vec<_>>(),
        "Registry sources in lookup order"
    );

    let services = TrackerServices {
        repo: Arc::new(PgTrackerRepository::new(pool.clone())),
        resolver,
        dns,
        certificates,
        notifier: Notifier::new(mailer),
    };

    // Background jobs
    let schedule = &app_config.schedule;
    let history = Arc::new(JobHistory::new());
    let scheduler = Arc::new(
        Scheduler::new()
            .every(
                schedule.domain_refresh(),
                Arc::new(DomainRefreshJob::new(
                    services.clone(),
                    config.clone(),
                    RefreshScope::DueOnly,
                )),
            )
            .every(
                schedule.nameserver_check(),
                Arc::new(NameserverDriftJob::new(services.clone(), config.clone())),
            )
            .every(
                schedule.certificate_refresh(),
                Arc::new(CertificateRefreshJob::new(services.clone(), config.clone())),
            )
            .every(
                schedule.session_cleanup(),
                Arc::new(SessionCleanupJob::new(auth_repo.clone())),
            )
            .on_demand(Arc::new(DomainRefreshJob::new(
                services.clone(),
                config.clone(),
                RefreshScope::All,
            )))
            .observer(Arc::new(TracingObserver))
            .observer(history.clone())
            .run_on_startup(schedule.run_on_startup),
    );

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    match scheduler.run_now(SESSION_CLEANUP_JOB, Trigger::Scheduled).await {
        Ok(report) if report.is_success() => {}
        Ok(_) => tracing::warn!("Session cleanup failed, continuing anyway"),
        Err(e) => tracing::warn!(error = %e, "Session cleanup not registered"),
    }

    let _workers = scheduler.start();
    tracing::info!(
        jobs = ?scheduler.job_names().collect::<Vec<_>>(),
        "Scheduler started"
    );

    spawn_reload_listener(config.clone());

    // Build router
    let guard = AuthMiddlewareState {
        repo: auth_repo.clone(),
        config: auth_config.clone(),
    };
    let state = TrackerAppState {
        services,
        config: config.clone(),
        scheduler,
        history,
    };

    let api = auth_router(auth_repo, auth_config).merge(tracker_router(state, guard));

    let app = Router::new()
        .nest("/api", api)
        .route("/", get(|| async { Redirect::to("/login/") }))
        .fallback_service(ServeDir::new(&app_config.static_dir))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = app_config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listenAddr {}", app_config.listen_addr))?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Re-read the configuration file on SIGHUP. A failed reload keeps the
/// previous snapshot.
fn spawn_reload_listener(config: Arc<ConfigStore>) {
    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGHUP, reload disabled");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            if let Err(e) = config.reload() {
                tracing::error!(error = %e, "Configuration reload failed, keeping previous");
            }
        }
    });

    #[cfg(not(unix))]
    drop(config);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

pub mod error;
pub mod health;
pub mod pull_request;
pub mod state;
pub mod stats;
pub mod team;
pub mod user;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, middleware, web};
use revassign_assignment::RngSource;
use revassign_directory::{DirectoryStore, MemoryStore, StoreError};
use revassign_service::{ReviewService, ServiceConfig};
use state::AppState;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on any single store call.
    pub store_timeout: Duration,
    /// Fixed seed for reviewer draws; `None` seeds every draw from the OS.
    pub reviewer_seed: Option<u64>,
    /// JSON snapshot to load on start and rewrite on every change.
    pub data_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            store_timeout: Duration::from_secs(2),
            reviewer_seed: None,
            data_file: None,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub const fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    #[must_use]
    pub const fn with_reviewer_seed(mut self, seed: Option<u64>) -> Self {
        self.reviewer_seed = seed;
        self
    }

    #[must_use]
    pub fn with_data_file(mut self, data_file: Option<PathBuf>) -> Self {
        self.data_file = data_file;
        self
    }

    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig::default().with_store_timeout(self.store_timeout)
    }

    /// Build the service this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot file exists but cannot be loaded.
    pub fn build_service(&self) -> Result<ReviewService, StoreError> {
        let store: Arc<dyn DirectoryStore> = match &self.data_file {
            Some(path) => {
                log::info!("Using directory snapshot at {}", path.display());
                Arc::new(MemoryStore::open(path)?)
            }
            None => Arc::new(MemoryStore::new()),
        };

        Ok(ReviewService::new(
            store,
            RngSource::from_seed(self.reviewer_seed),
            &self.service_config(),
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to open directory store: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// # Errors
///
/// Returns an error if the store cannot be opened or the server fails to
/// bind or run
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let RunServerResponse { join_handle, .. } = run_server_with_handle(&config)?;

    join_handle.await.map_err(std::io::Error::other)??;

    Ok(())
}

pub struct RunServerResponse {
    pub handle: actix_web::dev::ServerHandle,
    pub addrs: Vec<std::net::SocketAddr>,
    pub join_handle: JoinHandle<Result<(), std::io::Error>>,
}

/// # Errors
///
/// Returns an error if the store cannot be opened or the server fails to bind
pub fn run_server_with_handle(config: &ServerConfig) -> Result<RunServerResponse, ServerError> {
    let service = config.build_service()?;

    Ok(run_service_with_handle(config, service)?)
}

/// Serve an already built service.
///
/// # Errors
///
/// Returns an error if the server fails to bind
pub fn run_service_with_handle(
    config: &ServerConfig,
    service: ReviewService,
) -> std::io::Result<RunServerResponse> {
    log::info!("Starting revassign server on {}:{}", config.host, config.port);

    let state = web::Data::new(AppState::new(service));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?;

    let addrs = server.addrs();
    let server = server.run();
    let handle = server.handle();

    let join_handle = tokio::spawn(server);

    Ok(RunServerResponse {
        handle,
        addrs,
        join_handle,
    })
}

/// Register every API route.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/team/add", web::post().to(team::add))
        .route("/team/get", web::get().to(team::get))
        .route("/users/setIsActive", web::post().to(user::set_is_active))
        .route("/users/getReview", web::get().to(user::get_review))
        .route("/pullRequest/create", web::post().to(pull_request::create))
        .route("/pullRequest/merge", web::post().to(pull_request::merge))
        .route("/pullRequest/reassign", web::post().to(pull_request::reassign))
        .route("/stats", web::get().to(stats::all))
        .route("/stats/reviewers", web::get().to(stats::reviewers))
        .route("/stats/prs", web::get().to(stats::pull_requests))
        .route("/health", web::get().to(health::health))
        .route("/ready", web::get().to(health::ready));
}

//! HTTP server wiring
//!
//! Builds the router around a shared [`RankService`], serves it, and runs the
//! periodic parse batch next to it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::pipeline::ParsePipeline;
use crate::service::RankService;
use crate::storage::SharedRankRepository;

use super::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: RankService,

    /// Server start time
    pub start_time: Instant,

    /// Contributor address comes from `X-Forwarded-For` rather than the peer
    pub trust_forwarded_for: bool,
}

impl AppState {
    pub fn new(service: RankService) -> Self {
        Self {
            service,
            start_time: Instant::now(),
            trust_forwarded_for: false,
        }
    }

    /// Take contributor addresses from the proxy header
    #[must_use]
    pub fn with_forwarded_for(mut self, trust: bool) -> Self {
        self.trust_forwarded_for = trust;
        self
    }
}

// ============================================================================
// Rank Server
// ============================================================================

pub struct RankServer {
    server: ServerConfig,
    state: AppState,
    pipeline: Arc<ParsePipeline>,
    parse_interval: Option<Duration>,
}

impl RankServer {
    pub fn new(repo: SharedRankRepository, config: &Config) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let service = RankService::new(repo.clone(), config.rank.clone())
            .map_err(|e| ServerError::InitError(e.to_string()))?;

        Ok(Self {
            server: config.server.clone(),
            state: AppState::new(service).with_forwarded_for(config.server.trust_forwarded_for),
            pipeline: Arc::new(ParsePipeline::new(repo, config.rank.parse_batch_limit)),
            parse_interval: (config.rank.parse_interval_secs > 0)
                .then(|| Duration::from_secs(config.rank.parse_interval_secs)),
        })
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        build_router(self.state.clone(), &self.server)
    }

    /// Serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.server.bind_address;

        tracing::info!(%addr, "Starting rank server");

        let parser_task = self.start_background_tasks();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        let served = axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ServerError::ServeError(e.to_string()));

        if let Some(task) = parser_task {
            task.abort();
        }
        tracing::info!("Rank server shutdown complete");
        served
    }

    /// Run the parse batch on a fixed interval, unless disabled
    fn start_background_tasks(&self) -> Option<tokio::task::JoinHandle<()>> {
        let Some(period) = self.parse_interval else {
            tracing::info!("Background parse task disabled");
            return None;
        };
        let pipeline = self.pipeline.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let pipeline = pipeline.clone();
                match tokio::task::spawn_blocking(move || pipeline.run_once(Utc::now())).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => tracing::error!(error = %e, "Parse batch failed"),
                    Err(e) => tracing::error!(error = %e, "Parse batch task panicked"),
                }
            }
        });

        tracing::info!(interval_secs = period.as_secs(), "Background parse task started");
        Some(handle)
    }

    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.server.bind_address,
            parse_interval_secs: self.parse_interval.map_or(0, |d| d.as_secs()),
            cors_enabled: self.server.enable_cors,
            request_logging_enabled: self.server.enable_request_logging,
        }
    }
}

/// Router with the optional CORS and request tracing layers applied
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let mut router = create_router(state);

    if server.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    if server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub parse_interval_secs: u64,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    pub fn display(&self) -> String {
        format!(
            "Rank Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Parse Interval: {}\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            if self.parse_interval_secs == 0 {
                "disabled".to_string()
            } else {
                format!("{}s", self.parse_interval_secs)
            },
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

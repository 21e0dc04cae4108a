use std::any::Any;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use iris_types::{ErrorBody, RuntimeConfig};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::AppResult;
use crate::modules::static_files::{serve_static, StaticFiles};
use crate::modules::ConfigProvider;
use crate::proxy::common::client_builder::build_http_client;
use crate::proxy::common::SecretScrubber;
use crate::proxy::handlers;
use crate::proxy::middleware::api_guard;
use crate::proxy::providers::PollSettings;

/// Axum application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigProvider>,
    pub http_client: reqwest::Client,
    pub poll: PollSettings,
    pub static_files: Arc<StaticFiles>,
}

impl FromRef<AppState> for Arc<StaticFiles> {
    fn from_ref(state: &AppState) -> Self {
        state.static_files.clone()
    }
}

/// Build the full router: guarded proxy endpoints under `/api/`, health
/// checks, and the static file fallback.
pub fn build_proxy_router(state: AppState, max_body_bytes: usize) -> Router {
    let config = state.config.clone();

    let api_routes = Router::<AppState>::new()
        .route("/api/", any(handlers::handle_generation))
        .route("/api/*path", any(handlers::handle_generation))
        .route_layer(middleware::from_fn_with_state(config.clone(), api_guard))
        .layer(DefaultBodyLimit::max(max_body_bytes));

    Router::<AppState>::new()
        .route("/health", get(handlers::handle_health))
        .route("/healthz", get(handlers::handle_health))
        .merge(api_routes)
        .fallback(serve_static)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            panic_response(&config, panic.as_ref())
        }))
}

fn panic_response(config: &ConfigProvider, panic: &(dyn Any + Send)) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    let scrubber = config
        .try_snapshot()
        .map(|snapshot| SecretScrubber::from_config(&snapshot))
        .unwrap_or_default();
    tracing::error!("Request handler panicked: {}", scrubber.scrub(detail));

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new("Server error"))).into_response()
}

/// Configuration for starting the Axum server
pub struct ServerStartConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub max_body_bytes: usize,
    pub request_timeout: u64,
    pub poll: PollSettings,
}

impl ServerStartConfig {
    /// Port (unless given on the command line) and body ceiling come from the
    /// startup snapshot and stay fixed for the life of the process.
    pub fn from_snapshot(
        snapshot: &RuntimeConfig,
        host: String,
        port: Option<u16>,
        public_dir: PathBuf,
        request_timeout: u64,
    ) -> AppResult<Self> {
        let port = match port {
            Some(port) => port,
            None => snapshot.port()?,
        };
        Ok(Self {
            host,
            port,
            public_dir,
            max_body_bytes: snapshot.max_body_bytes()?,
            request_timeout,
            poll: PollSettings::default(),
        })
    }
}

/// Axum server instance
pub struct AxumServer {
    config: ServerStartConfig,
    provider: Arc<ConfigProvider>,
}

impl AxumServer {
    pub fn new(config: ServerStartConfig, provider: Arc<ConfigProvider>) -> Self {
        Self { config, provider }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub fn router(&self) -> AppResult<Router> {
        let state = AppState {
            config: self.provider.clone(),
            http_client: build_http_client(self.config.request_timeout)?,
            poll: self.config.poll,
            static_files: Arc::new(StaticFiles::new(&self.config.public_dir)),
        };
        Ok(build_proxy_router(state, self.config.max_body_bytes))
    }

    /// Bind, serve, and drain in-flight requests once `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router()?;
        let addr = self.address();

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Camera Iris listening on http://{}", listener.local_addr()?);
        tracing::info!("Serving static files from {}", self.config.public_dir.display());

        axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
        tracing::info!("Server stopped");
        Ok(())
    }
}

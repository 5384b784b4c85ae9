//! HTTP API server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{
    require_auth, Clock, PostgresUserStore, SessionAuthenticator, SessionHandle, SessionManager,
    SystemClock, UserStore,
};
use crate::config::{AuthConfig, Config};
use crate::error::Result;

use super::routes;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub auth_config: Arc<AuthConfig>,
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionManager,
    pub clock: Arc<dyn Clock>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: Config, users: Arc<dyn UserStore>) -> Self {
        let sessions = SessionManager::new(config.session.idle_timeout_minutes);
        Self {
            auth_config: Arc::new(config.auth.clone()),
            config,
            users,
            sessions,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Authenticator for one request presenting `session_id`
    pub fn authenticator(&self, session_id: Option<String>) -> SessionAuthenticator<SessionHandle> {
        SessionAuthenticator::new(
            self.auth_config.clone(),
            self.users.clone(),
            self.sessions.handle(session_id),
        )
        .with_clock(self.clock.clone())
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let users = PostgresUserStore::connect(&config).await?;
    let state = Arc::new(AppState::new(config, Arc::new(users)));

    spawn_session_cleanup(state.sessions.clone());

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drop idle sessions
fn spawn_session_cleanup(sessions: SessionManager) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            sessions.cleanup_expired().await;
        }
    });
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Router {
    let protected = Router::new()
        .route("/api/me", get(routes::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .merge(protected)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

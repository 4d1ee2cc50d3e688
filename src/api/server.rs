//! HTTP API server

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::accounts::{AccountStore, MemoryAccountStore};
use crate::auth::{require_auth, CookiePolicy, TokenIssuer};
use crate::config::{Config, MediaProvider};
use crate::error::{Error, Result};
use crate::media::{self, MediaUploader};
use crate::session::SessionController;

use super::routes;

/// Upper bound for multipart bodies carrying profile images
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub sessions: SessionController,
    pub cookies: CookiePolicy,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Assemble state from validated configuration and explicit collaborators
    pub fn new(
        config: Config,
        store: Arc<dyn AccountStore>,
        uploader: Arc<dyn MediaUploader>,
    ) -> Result<Self> {
        config.validate()?;
        let token_config = config.auth.token_config();
        let sessions = SessionController::new(
            store,
            uploader,
            TokenIssuer::new(&token_config),
            config.auth.bcrypt_cost,
        );
        let cookies = CookiePolicy::new(&token_config, config.auth.secure_cookies);
        Ok(Self {
            config,
            sessions,
            cookies,
        })
    }

    /// In-memory account store plus the configured media provider
    pub fn from_config(config: Config) -> Result<Self> {
        let uploader = media::uploader_from_config(&config.media)?;
        Self::new(config, Arc::new(MemoryAccountStore::new()), uploader)
    }
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    tokio::fs::create_dir_all(&config.server.staging_dir).await?;
    let state = Arc::new(AppState::from_config(config)?);

    let app = create_router(state)?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|e| Error::Config(format!("Invalid cors_origin: {}", e)))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Result<Router> {
    let protected = Router::new()
        .route("/logout", post(routes::logout))
        .route("/change-password", post(routes::change_password))
        .route("/current-user", get(routes::current_user))
        .route("/user", get(routes::current_user).patch(routes::update_account))
        .route("/update-account", patch(routes::update_account))
        .route("/avatar", patch(routes::update_avatar))
        .route("/update-user-avatar", patch(routes::update_avatar))
        .route("/cover-image", patch(routes::update_cover_image))
        .route("/update-user-coverImage", patch(routes::update_cover_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let users = Router::new()
        .route("/register", post(routes::register))
        .route("/login", post(routes::login))
        .route("/refresh-token", post(routes::refresh_token))
        .route("/new-access-token", post(routes::refresh_token))
        .merge(protected)
        .method_not_allowed_fallback(routes::method_not_allowed);

    let mut router = Router::new()
        .route("/api/v1/health", get(routes::health))
        .method_not_allowed_fallback(routes::method_not_allowed)
        .nest("/api/v1/users", users)
        .fallback(routes::not_found);

    let media = &state.config.media;
    if media.provider == MediaProvider::Local
        && media.public_base_url.starts_with('/')
        && media.public_base_url.len() > 1
    {
        router = router.nest_service(
            media.public_base_url.trim_end_matches('/'),
            ServeDir::new(&media.local_dir),
        );
    }

    let cors = cors_layer(state.config.server.cors_origin.as_deref())?;

    Ok(router
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

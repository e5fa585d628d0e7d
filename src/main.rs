use axum::{response::Redirect, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickthink::{
    api, broadcast,
    categories::CategoryPool,
    config::{ServerConfig, Timing},
    state::AppState,
    validation::{DictionaryValidator, WordValidator},
    ws,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickthink=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuickThink...");

    let config = ServerConfig::from_env();
    let timing = Timing::from_env();

    // Without a word list only the structural checks apply
    let validator: Arc<dyn WordValidator> = match &config.dictionary_path {
        Some(path) => match DictionaryValidator::load(path) {
            Ok(dictionary) => Arc::new(dictionary),
            Err(e) => {
                tracing::warn!("{}. Falling back to structural word checks.", e);
                Arc::new(DictionaryValidator::structural())
            }
        },
        None => {
            tracing::info!("No DICTIONARY_PATH set, using structural word checks");
            Arc::new(DictionaryValidator::structural())
        }
    };

    let state = Arc::new(AppState::with_parts(
        timing,
        Arc::new(CategoryPool::builtin()),
        validator,
    ));

    // Drop rooms nobody has been attached to for a while
    broadcast::spawn_idle_room_reaper(
        state.clone(),
        config.reaper_interval,
        config.room_idle_timeout,
    );

    let static_dir = &config.static_dir;
    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/api", api::router())
        .route("/", get(|| async { Redirect::temporary("/tv") }))
        .route_service("/tv", ServeFile::new(static_dir.join("tv.html")))
        .route_service(
            "/controller",
            ServeFile::new(static_dir.join("controller.html")),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

//! HTTP server: router, shared context, and lifecycle.

use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use ottstream_db::pool::DbPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::pool::TaskPool;

pub mod auth;
pub mod error;
pub mod routes_playback;
pub mod routes_stream;
pub mod routes_videos;

/// Shared application context, cloned into every handler.
#[derive(Clone)]
pub struct AppContext {
    pub db: DbPool,
    pub config: Arc<Config>,
    /// Worker pool for blocking work (chunked delivery, thumbnails).
    pub tasks: Arc<TaskPool>,
}

/// Create the Axum router with all routes.
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let web_dir = ctx.config.server.web_dir.clone();

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/check", get(auth::auth_check))
        .route("/api/videos", get(routes_videos::list_videos))
        .route("/api/videos/:id", get(routes_videos::video_detail))
        .route("/api/videos/:id/stream", get(routes_stream::stream_video))
        .route("/api/videos/:id/thumbnail", get(routes_stream::thumbnail))
        .route("/api/users/me/history", get(routes_playback::get_history))
        .route("/api/users/me/progress", post(routes_playback::post_progress))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    if let Some(dir) = web_dir {
        if dir.exists() {
            tracing::info!("Serving web UI from {:?}", dir);
            app = app.fallback_service(ServeDir::new(&dir).append_index_html_on_directories(true));
        }
    }

    app
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server and block until shutdown.
pub async fn start_server(config: Config, db: DbPool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let tasks = Arc::new(TaskPool::new(config.server.workers)?);

    let ctx = AppContext {
        db,
        config: Arc::new(config),
        tasks: Arc::clone(&tasks),
    };

    schedule_thumbnail_backfill(&ctx);

    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tasks.shutdown();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Queue thumbnail generation for every video that lacks one.
fn schedule_thumbnail_backfill(ctx: &AppContext) {
    if !crate::thumbs::tools_available() {
        tracing::warn!("ffmpeg/ffprobe not found, skipping thumbnail backfill");
        return;
    }

    let conn = match ctx.db.get() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("thumbnail backfill: {}", e);
            return;
        }
    };

    let missing = match ottstream_db::queries::thumbnails::videos_without_thumbnail(&conn) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("thumbnail backfill: {}", e);
            return;
        }
    };
    drop(conn);

    if missing.is_empty() {
        return;
    }

    tracing::info!(count = missing.len(), "queueing thumbnail backfill");
    for (video_id, file_path) in missing {
        let db = ctx.db.clone();
        let thumb_dir = ctx.config.media.thumbnail_dir.clone();
        ctx.tasks.submit(move || {
            let source = std::path::Path::new(&file_path);
            if let Err(e) = crate::thumbs::generate_and_record(&db, video_id, source, &thumb_dir) {
                tracing::warn!(%video_id, "thumbnail generation failed: {}", e);
            }
        });
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

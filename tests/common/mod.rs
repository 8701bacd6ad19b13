//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires an in-memory database, default
//! config, and worker pool into a full [`AppContext`], plus a server
//! constructor that binds Axum to a random port for HTTP-level tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use ottstream::config::Config;
use ottstream::pool::TaskPool;
use ottstream::server::{create_router, AppContext};
use ottstream_db::models::{User, Video};
use ottstream_db::pool::{init_memory_pool, DbPool, PooledConnection};
use ottstream_db::queries::{users, video_files, videos};

pub const TEST_LOGIN: &str = "alice";
pub const TEST_PASSWORD: &str = "secret";

pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub user: User,
    /// Keeps media files written by tests alive for the harness lifetime.
    pub media_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");

        let hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
        let user = {
            let conn = db.get().unwrap();
            users::create_user(&conn, TEST_LOGIN, &hash, "Alice").unwrap()
        };

        let tasks = Arc::new(TaskPool::new(2).expect("failed to start worker pool"));

        let ctx = AppContext {
            db: db.clone(),
            config: Arc::new(Config::default()),
            tasks,
        };

        Self {
            ctx,
            db,
            user,
            media_dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Start the server on a random port and return the harness with
    /// the bound address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    pub fn conn(&self) -> PooledConnection {
        self.db.get().expect("failed to get db connection")
    }

    /// Insert a video backed by a real file containing `data`.
    pub fn create_video_with_file(&self, title: &str, data: &[u8], bitrate_kbps: i64) -> Video {
        let path = self.media_dir.path().join(format!("{}.mp4", title));
        std::fs::write(&path, data).unwrap();

        let conn = self.conn();
        let video = videos::create_video(&conn, title, "", 0, "video/mp4").unwrap();
        video_files::create_video_file(
            &conn,
            video.id,
            path.to_str().unwrap(),
            data.len() as i64,
            bitrate_kbps,
            None,
        )
        .unwrap();
        video
    }
}

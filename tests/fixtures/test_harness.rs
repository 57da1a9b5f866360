/// Test harness owning a temporary database and upload root
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use lab_intake::config::DatabaseConfig;
use lab_intake::database::DatabaseManager;
use lab_intake::http::{self, AppState};
use lab_intake::intake::{IntakeService, RequestStore, UploadLayout};

pub const UPLOAD_DIR: &str = "database/upload";

/// Everything lives under one temporary directory that is removed on drop
pub struct IntakeHarness {
    temp_dir: TempDir,
    pub database: DatabaseManager,
    pub service: IntakeService,
}

impl IntakeHarness {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("create temp dir");
        let database = DatabaseManager::new(&DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("intake.db").display()),
            max_connections: 4,
            auto_migrate: true,
        })
        .await
        .expect("open test database");

        let service = IntakeService::new(
            RequestStore::new(database.pool().clone()),
            UploadLayout::new(temp_dir.path(), UPLOAD_DIR),
        );

        Self {
            temp_dir,
            database,
            service,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a stored relative document path
    pub fn stored(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Serve the router on an ephemeral port; the server stops with the runtime
    pub async fn spawn_server(&self, default_keep_latest: i64) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let state = AppState::new(self.service.clone(), default_keep_latest);

        tokio::spawn(async move {
            let _ = http::serve(listener, state, std::future::pending()).await;
        });

        addr
    }
}

/// File system operations abstraction for testing
///
/// Uploaded documents are written and removed through this trait so that the
/// engine can be exercised against a mocked file system.
///
/// # Examples
///
/// ```rust,no_run
/// use lab_intake::fs::{FileSystemOperations, StandardFileSystem};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let fs_ops: Arc<dyn FileSystemOperations> = Arc::new(StandardFileSystem);
///
///     fs_ops.create_dir_all(Path::new("database/upload/testing_requests/1")).await?;
///     fs_ops
///         .write(Path::new("database/upload/testing_requests/1/Manual_a.pdf"), b"%PDF")
///         .await?;
///
///     if fs_ops.exists(Path::new("database/upload/testing_requests/1/Manual_a.pdf")) {
///         println!("Document was stored");
///     }
///
///     Ok(())
/// }
/// ```
use std::io;
use std::path::Path;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

/// Trait for file system operations that can be mocked in tests
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait::async_trait]
pub trait FileSystemOperations: Send + Sync {
    /// Create a directory and all its parent directories
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Write data to a file, creating or truncating it
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Remove a single file
    async fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;
}

/// Standard implementation backed by `tokio::fs`
pub struct StandardFileSystem;

#[async_trait::async_trait]
impl FileSystemOperations for StandardFileSystem {
    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn remove_file(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

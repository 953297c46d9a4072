//! Coordination between pin mutators and the garbage collector.
//!
//! Pin mutators take the lock in shared mode, so many batches may run at
//! once. A collector takes it in exclusive mode and therefore never sweeps
//! while a batch is in flight.

use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

/// Shared side of the GC lock.
///
/// The returned guard releases the lock when dropped.
#[async_trait::async_trait]
pub trait GcLock: Send + Sync {
    type Guard: Send + 'static;

    async fn read_lock(&self) -> anyhow::Result<Self::Guard>;
}

#[async_trait::async_trait]
impl<T: GcLock + ?Sized> GcLock for Arc<T> {
    type Guard = T::Guard;

    async fn read_lock(&self) -> anyhow::Result<Self::Guard> {
        (**self).read_lock().await
    }
}

/// In-process GC lock.
#[derive(Debug, Clone, Default)]
pub struct GcCoordinator {
    lock: Arc<RwLock<()>>,
}

/// Shared hold on a [`GcCoordinator`].
#[derive(Debug)]
pub struct GcReadGuard {
    _guard: OwnedRwLockReadGuard<()>,
}

impl Drop for GcReadGuard {
    fn drop(&mut self) {
        debug!("gc read lock released");
    }
}

impl GcCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive hold for a collection sweep. Waits for every batch to end.
    pub async fn write_lock(&self) -> OwnedRwLockWriteGuard<()> {
        self.lock.clone().write_owned().await
    }

    /// Exclusive hold if no batch is currently running.
    pub fn try_write_lock(&self) -> Option<OwnedRwLockWriteGuard<()>> {
        self.lock.clone().try_write_owned().ok()
    }
}

#[async_trait::async_trait]
impl GcLock for GcCoordinator {
    type Guard = GcReadGuard;

    async fn read_lock(&self) -> anyhow::Result<GcReadGuard> {
        let guard = self.lock.clone().read_owned().await;
        debug!("gc read lock acquired");
        Ok(GcReadGuard { _guard: guard })
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file_lock::{FileGcLock, FileLockGuard};

#[cfg(not(target_arch = "wasm32"))]
mod file_lock {
    use super::GcLock;
    use anyhow::Context;
    use fs4::fs_std::FileExt;
    use std::fs::{File, OpenOptions};
    use std::path::{Path, PathBuf};
    use tracing::{debug, warn};

    /// Cross-process GC lock backed by an advisory lock on a file.
    ///
    /// Every process sharing a store must use the same lock file path.
    #[derive(Debug, Clone)]
    pub struct FileGcLock {
        path: PathBuf,
    }

    /// Held advisory lock; unlocked on drop.
    #[derive(Debug)]
    pub struct FileLockGuard {
        file: File,
        exclusive: bool,
    }

    impl Drop for FileLockGuard {
        fn drop(&mut self) {
            if let Err(err) = FileExt::unlock(&self.file) {
                warn!("failed to unlock gc lock file: {err}");
            }
            debug!(exclusive = self.exclusive, "gc file lock released");
        }
    }

    impl FileGcLock {
        pub fn new<P: AsRef<Path>>(path: P) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Exclusive hold for a collection sweep.
        pub async fn write_lock(&self) -> anyhow::Result<FileLockGuard> {
            self.acquire(true).await
        }

        async fn acquire(&self, exclusive: bool) -> anyhow::Result<FileLockGuard> {
            let path = self.path.clone();
            tokio::task::spawn_blocking(move || -> anyhow::Result<FileLockGuard> {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&path)
                    .with_context(|| format!("failed to open gc lock file {}", path.display()))?;
                if exclusive {
                    FileExt::lock_exclusive(&file)?;
                } else {
                    FileExt::lock_shared(&file)?;
                }
                debug!(exclusive, "gc file lock acquired");
                Ok(FileLockGuard { file, exclusive })
            })
            .await
            .map_err(|e| anyhow::anyhow!("gc lock task failed: {}", e))?
        }
    }

    #[async_trait::async_trait]
    impl GcLock for FileGcLock {
        type Guard = FileLockGuard;

        async fn read_lock(&self) -> anyhow::Result<FileLockGuard> {
            self.acquire(false).await
        }
    }
}

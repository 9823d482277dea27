//! Object storage boundary

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Object storage interface over a bucket with logical folders.
///
/// `move_object` is copy-then-delete and idempotent: moving a key whose
/// source is already gone succeeds when the destination exists, so a
/// redelivered message can repeat the move safely.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Download an object from the input folder to a local path.
    async fn download(&self, key: &str, local_path: &Path) -> Result<()>;

    /// Upload a local file under the given folder.
    async fn upload(&self, local_path: &Path, key: &str, folder: &str) -> Result<()>;

    /// Relocate an object between logical folders (copy, then delete).
    async fn move_object(&self, key: &str, from_folder: &str, to_folder: &str) -> Result<()>;

    /// Whether an object exists under the given folder.
    async fn exists(&self, folder: &str, key: &str) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

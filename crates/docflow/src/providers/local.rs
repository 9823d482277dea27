//! Filesystem-backed queue and object store
//!
//! Development and test backends with the same semantics the pipeline relies
//! on in production: bounded-wait polling, claim-based visibility timeout
//! with redelivery, and folder-prefixed object keys with idempotent moves.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::config::{ObjectStoreConfig, QueueConfig};
use crate::error::{Error, Result};

use super::object_store::ObjectStore;
use super::queue::{MessageQueue, QueueMessage};

/// Directory-backed message queue.
///
/// A pending message is a `*.msg` file whose content is the body. Receiving
/// claims it by renaming to `*.msg@{millis}`; the renamed file name is the
/// receipt handle. A claim older than the visibility timeout is reclaimed and
/// redelivered. Rename is the claim arbiter, so multiple consumers on one
/// host never receive the same delivery twice.
pub struct LocalMessageQueue {
    dir: PathBuf,
    max_messages: usize,
    wait_time: Duration,
    visibility_timeout: Duration,
}

impl LocalMessageQueue {
    pub fn new(config: &QueueConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.queue_dir)?;
        Ok(Self {
            dir: config.queue_dir.clone(),
            max_messages: config.max_messages.max(1),
            wait_time: Duration::from_secs(config.wait_time_secs),
            visibility_timeout: Duration::from_secs(config.visibility_timeout_secs),
        })
    }

    /// Enqueue a message body; returns the message id. Producer-side helper.
    pub fn send_message(&self, body: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        std::fs::write(self.dir.join(format!("{}.msg", id)), body)?;
        Ok(id)
    }

    fn scan_once(&self) -> Result<Vec<QueueMessage>> {
        let now = unix_millis();
        let visibility = self.visibility_timeout.as_millis();

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut messages = Vec::new();
        for path in paths {
            if messages.len() >= self.max_messages {
                break;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            if let Some((base, claimed_at)) = name.rsplit_once('@') {
                // A claimed delivery; redeliver once the claim expires.
                let Ok(claimed_at) = claimed_at.parse::<u128>() else {
                    continue;
                };
                if now.saturating_sub(claimed_at) >= visibility {
                    if let Some(message) = self.claim(&path, &format!("{}@{}", base, now))? {
                        messages.push(message);
                    }
                }
            } else if name.ends_with(".msg") {
                if let Some(message) = self.claim(&path, &format!("{}@{}", name, now))? {
                    messages.push(message);
                }
            }
        }
        Ok(messages)
    }

    /// Claim by rename; a failed rename means another consumer won.
    fn claim(&self, path: &Path, new_name: &str) -> Result<Option<QueueMessage>> {
        let new_path = self.dir.join(new_name);
        if std::fs::rename(path, &new_path).is_err() {
            return Ok(None);
        }
        let body = std::fs::read_to_string(&new_path)?;
        Ok(Some(QueueMessage {
            body,
            receipt_handle: new_name.to_string(),
        }))
    }
}

#[async_trait]
impl MessageQueue for LocalMessageQueue {
    async fn receive_messages(&self) -> Result<Vec<QueueMessage>> {
        let deadline = Instant::now() + self.wait_time;
        loop {
            let messages = self.scan_once()?;
            if !messages.is_empty() || Instant::now() >= deadline {
                return Ok(messages);
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn delete_message(&self, receipt_handle: &str) -> Result<()> {
        let path = self.dir.join(receipt_handle);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Stale handle: the claim expired and the message was
                // redelivered under a new name.
                tracing::warn!(receipt_handle, "Delete with stale receipt handle");
                Ok(())
            }
            Err(e) => Err(Error::Queue(format!(
                "failed to delete {}: {}",
                receipt_handle, e
            ))),
        }
    }

    fn name(&self) -> &str {
        "local-queue"
    }
}

/// Directory-backed object store with logical folder prefixes.
pub struct LocalObjectStore {
    root: PathBuf,
    input_folder: String,
}

impl LocalObjectStore {
    pub fn new(config: &ObjectStoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.bucket_dir)?;
        Ok(Self {
            root: config.bucket_dir.clone(),
            input_folder: config.input_folder.clone(),
        })
    }

    fn object_path(&self, folder: &str, key: &str) -> PathBuf {
        self.root.join(folder).join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn download(&self, key: &str, local_path: &Path) -> Result<()> {
        let source = self.object_path(&self.input_folder, key);
        if !source.is_file() {
            return Err(Error::ObjectStore(format!(
                "object '{}' not found under '{}'",
                key, self.input_folder
            )));
        }
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&source, local_path).await?;
        Ok(())
    }

    async fn upload(&self, local_path: &Path, key: &str, folder: &str) -> Result<()> {
        let destination = self.object_path(folder, key);
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &destination).await?;
        Ok(())
    }

    async fn move_object(&self, key: &str, from_folder: &str, to_folder: &str) -> Result<()> {
        let source = self.object_path(from_folder, key);
        let destination = self.object_path(to_folder, key);

        if !source.is_file() {
            // Idempotent: a redelivered message may repeat a completed move.
            if destination.is_file() {
                return Ok(());
            }
            return Err(Error::ObjectStore(format!(
                "object '{}' not found under '{}' or '{}'",
                key, from_folder, to_folder
            )));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&source, &destination).await?;
        tokio::fs::remove_file(&source).await?;
        Ok(())
    }

    async fn exists(&self, folder: &str, key: &str) -> Result<bool> {
        Ok(self.object_path(folder, key).is_file())
    }

    fn name(&self) -> &str {
        "local-store"
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

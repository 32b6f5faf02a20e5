//! # ads-storage-local
//!
//! Local filesystem implementations of the media ports.
//! Uploads are content-addressed: the SHA-256 of the bytes picks a sharded
//! directory (`ab/cd/<hash>/`) and the file keeps its original name inside it.

use std::path::PathBuf;

use ads_core::models::{DurableMediaRef, LocalMediaRef};
use ads_core::traits::{BlobStore, MediaSource};
use anyhow::{bail, Context};
use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

pub struct LocalBlobStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix: String = url_prefix.into();
        Self {
            root_path: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// "ab/cd/abcd..." relative to the root.
    fn shard(hash: &str) -> String {
        format!("{}/{}/{}", &hash[0..2], &hash[2..4], hash)
    }

    fn path_for(&self, hash: &str, name: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(hash);
        path.push(name);
        path
    }
}

/// A bare file name: no separators, no traversal, not hidden.
fn validate_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control)
    {
        bail!("invalid media file name: {name:?}");
    }
    Ok(())
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    /// Identical content uploaded under the same name is written once.
    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn put(&self, name: &str, data: Bytes) -> anyhow::Result<DurableMediaRef> {
        validate_name(name)?;

        let hash = format!("{:x}", Sha256::digest(&data));
        let target = self.path_for(&hash, name);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        if fs::try_exists(&target).await? {
            debug!(path = %target.display(), "media already stored");
        } else {
            fs::write(&target, &data)
                .await
                .with_context(|| format!("writing {}", target.display()))?;
            info!(path = %target.display(), "media stored");
        }

        Ok(DurableMediaRef::new(format!(
            "{}/{}/{}",
            self.url_prefix,
            Self::shard(&hash),
            name
        )))
    }
}

/// Reads picked media from the local filesystem. Accepts plain paths and
/// percent-encoded `file://` URIs.
#[derive(Debug, Clone, Default)]
pub struct FsMediaSource;

impl FsMediaSource {
    fn resolve(media: &LocalMediaRef) -> anyhow::Result<PathBuf> {
        let raw = media.as_str();
        if !raw.starts_with("file://") {
            return Ok(PathBuf::from(raw));
        }
        let uri = Url::parse(raw).with_context(|| format!("parsing {raw}"))?;
        uri.to_file_path()
            .map_err(|()| anyhow::anyhow!("not a local file URI: {raw}"))
    }
}

#[async_trait]
impl MediaSource for FsMediaSource {
    async fn read(&self, media: &LocalMediaRef) -> anyhow::Result<Bytes> {
        let path = Self::resolve(media)?;
        let data = fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(Bytes::from(data))
    }
}

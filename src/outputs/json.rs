//! JSON snapshot persistence.
//!
//! The website fetches the snapshot while it may be being replaced, so a
//! write never touches the target in place: the new document goes to a
//! hidden sibling file that is synced and then renamed over the target.
//!
//! # Rollback
//!
//! When any step fails the temporary file is removed and the target is
//! compared with the bytes read before the write started. If they differ
//! the prior bytes are written back, so readers see either the previous
//! snapshot or the new one and never a partial file.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{Error, Result};
use crate::models::Snapshot;

/// Sibling path the snapshot is staged at before the rename.
pub fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "snapshot.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Write `snapshot` to `path` as pretty UTF-8 JSON.
///
/// # Errors
///
/// [`Error::Encode`] if serialization fails (nothing is touched on disk) and
/// [`Error::Persistence`] if the write fails, after the prior file has been
/// restored.
#[instrument(
    level = "info",
    skip_all,
    fields(path = %path.display(), articles = snapshot.articles.len())
)]
pub async fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    let prior = fs::read(path).await.ok();
    let tmp = temp_path(path);

    match write_atomically(&tmp, path, json.as_bytes()).await {
        Ok(()) => {
            info!(bytes = json.len(), status = ?snapshot.status, "wrote snapshot");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "snapshot write failed; rolling back");
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                debug!(error = %cleanup, tmp = %tmp.display(), "no temporary file to remove");
            }
            restore(path, prior.as_deref()).await;
            Err(Error::Persistence {
                path: path.to_path_buf(),
                source: e,
            })
        }
    }
}

async fn write_atomically(tmp: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, path).await
}

async fn restore(path: &Path, prior: Option<&[u8]>) {
    let Some(prior) = prior else {
        debug!("no prior snapshot to restore");
        return;
    };
    match fs::read(path).await {
        Ok(current) if current == prior => debug!("prior snapshot untouched"),
        _ => {
            warn!("prior snapshot changed during failed write; restoring it");
            if let Err(e) = fs::write(path, prior).await {
                error!(error = %e, "failed to restore prior snapshot");
            }
        }
    }
}

/// Read back a previously written snapshot, if one exists and parses.
#[instrument(level = "debug")]
pub async fn read_snapshot(path: &Path) -> Option<Snapshot> {
    let bytes = fs::read(path).await.ok()?;
    match serde_json::from_slice(&bytes) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(error = %e, "existing snapshot is not valid JSON");
            None
        }
    }
}

use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use jackpot_core::MediaSlot;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

/// URL prefix uploaded files are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

const SUFFIX_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub url: String,
}

/// Keep only a short alphanumeric extension from the client's file name.
fn extension_of(file_name: Option<&str>) -> String {
    file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

fn unique_file_name(file_name: Option<&str>) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{millis}-{suffix}{}", extension_of(file_name))
}

/// Write `bytes` into the slot's directory under a fresh name.
pub async fn store(
    uploads_dir: &Path,
    slot: MediaSlot,
    file_name: Option<&str>,
    bytes: Bytes,
) -> std::io::Result<StoredUpload> {
    let dir = uploads_dir.join(slot.dir_name());
    tokio::fs::create_dir_all(&dir).await?;

    let name = unique_file_name(file_name);
    let path = dir.join(&name);
    tokio::fs::write(&path, &bytes).await?;

    let url = format!("{UPLOADS_URL_PREFIX}/{}/{name}", slot.dir_name());
    info!(url = %url, size = bytes.len(), "stored upload");
    Ok(StoredUpload { path, url })
}

/// Map a stored URL back to a file inside `uploads_dir`. URLs pointing
/// anywhere else resolve to `None`.
pub fn resolve(uploads_dir: &Path, url: &str) -> Option<PathBuf> {
    let rel = url.strip_prefix(UPLOADS_URL_PREFIX)?.strip_prefix('/')?;
    let rel = Path::new(rel);
    let mut parts = rel.components().peekable();
    parts.peek()?;
    if !parts.all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(uploads_dir.join(rel))
}

/// Delete the file behind `url`, if it is one of ours and still exists.
pub async fn remove(uploads_dir: &Path, url: &str) {
    let Some(path) = resolve(uploads_dir, url) else {
        warn!(url = %url, "not removing media outside the uploads directory");
        return;
    };
    match tokio::fs::remove_file(&path).await {
        Ok(()) => info!(url = %url, "removed upload"),
        Err(e) if e.kind() == IoErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove upload"),
    }
}

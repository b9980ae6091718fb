//! State file persistence
//!
//! The tracker state is saved as a JSON snapshot when the watcher stops and
//! loaded again on the next start.

use anyhow::{Context, Result};
use buildwatch_core::dto::snapshot::ClientSnapshot;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads the snapshot stored at `path`
///
/// Returns `Ok(None)` when there is no state file yet. A state file that
/// exists but cannot be read or understood is an error.
pub async fn load_snapshot(path: &Path) -> Result<Option<ClientSnapshot>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No state file at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let snapshot = ClientSnapshot::from_json(&text)
        .with_context(|| format!("Failed to load state from {}", path.display()))?;

    info!("Loaded state from {}", path.display());
    Ok(Some(snapshot))
}

/// Writes `snapshot` to `path`
///
/// The data goes to a sibling temporary file first and is then renamed over
/// the target, so an interrupted save never leaves a truncated state file.
pub async fn save_snapshot(path: &Path, snapshot: &ClientSnapshot) -> Result<()> {
    let text = snapshot.to_json()?;
    let tmp = temporary_path(path);

    tokio::fs::write(&tmp, text)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    info!("Saved state to {}", path.display());
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

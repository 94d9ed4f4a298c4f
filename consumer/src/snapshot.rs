//! Diff-snapshot persistence and garbage collection (spec §3, §4.3, §6.3).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bridge_types::FlatElement;

/// Snapshots older than this are eligible for garbage collection by default.
pub const DEFAULT_MAX_AGE_MS: i64 = 60_000;

fn safe_app_name(app: &str) -> String {
    app.replace(['/', ' '], "_")
}

fn snapshot_path(dir: &Path, app: &str, timestamp_ms: i64) -> PathBuf {
    dir.join(format!(
        "desktop-cli-snapshot-{}-{timestamp_ms}.json",
        safe_app_name(app)
    ))
}

/// Writes the flat element list to a temp file keyed by `(app, timestamp)`,
/// then garbage-collects older snapshots for the same app.
pub fn save_snapshot(
    dir: &Path,
    app: &str,
    timestamp_ms: i64,
    flat: &[FlatElement],
    max_age_ms: i64,
) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = snapshot_path(dir, app, timestamp_ms);
    let json = serde_json::to_vec(flat).map_err(io::Error::other)?;
    fs::write(&path, json)?;
    // A gc failure (e.g. a file removed out from under us) doesn't affect the
    // snapshot just written, so it isn't propagated to the caller.
    let _ = gc_snapshots(dir, app, timestamp_ms, max_age_ms);
    Ok(path)
}

/// Reads the snapshot for `(app, timestamp)`, if present.
pub fn load_snapshot(dir: &Path, app: &str, timestamp_ms: i64) -> io::Result<Vec<FlatElement>> {
    let path = snapshot_path(dir, app, timestamp_ms);
    let bytes = fs::read(&path)?;
    serde_json::from_slice(&bytes).map_err(io::Error::other)
}

/// Removes snapshot files for `app` older than `max_age_ms` relative to `now_ms`.
pub fn gc_snapshots(dir: &Path, app: &str, now_ms: i64, max_age_ms: i64) -> io::Result<()> {
    let prefix = format!("desktop-cli-snapshot-{}-", safe_app_name(app));
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(rest) = name.strip_prefix(&prefix) else { continue };
        let Some(ts_str) = rest.strip_suffix(".json") else { continue };
        let Ok(ts) = ts_str.parse::<i64>() else { continue };
        if now_ms.saturating_sub(ts) > max_age_ms {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_types::Role;

    fn sample() -> Vec<FlatElement> {
        vec![FlatElement {
            role: Role::Btn,
            path: "window > btn".to_string(),
            ..FlatElement::default()
        }]
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        save_snapshot(dir.path(), "My App", 1000, &sample(), DEFAULT_MAX_AGE_MS).unwrap();
        let loaded = load_snapshot(dir.path(), "My App", 1000).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn app_name_normalization_replaces_slash_and_space() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_snapshot(dir.path(), "My/App Name", 42, &sample(), DEFAULT_MAX_AGE_MS).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("My_App_Name"));
    }

    #[test]
    fn gc_removes_only_stale_snapshots_for_same_app() {
        let dir = tempfile::tempdir().unwrap();
        save_snapshot(dir.path(), "App", 0, &sample(), DEFAULT_MAX_AGE_MS).unwrap();
        save_snapshot(dir.path(), "Other", 0, &sample(), DEFAULT_MAX_AGE_MS).unwrap();
        // Saving a fresh snapshot 70s later triggers gc of the stale one.
        save_snapshot(dir.path(), "App", 70_000, &sample(), DEFAULT_MAX_AGE_MS).unwrap();

        assert!(load_snapshot(dir.path(), "App", 0).is_err());
        assert!(load_snapshot(dir.path(), "App", 70_000).is_ok());
        assert!(load_snapshot(dir.path(), "Other", 0).is_ok());
    }
}

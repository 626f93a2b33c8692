//! Output directory validation and writability probe

use crate::{McpError, McpResult};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

const PROBE_CONTENTS: &[u8] = b"imagegen write probe";

/// Lexically normalize an absolute path (`.` dropped, `..` applied).
/// Relative paths are rejected without touching the filesystem.
pub fn normalize_absolute(raw: &str) -> McpResult<PathBuf> {
    let path = Path::new(raw);
    if !path.is_absolute() {
        return Err(McpError::InvalidArguments(format!(
            "output_dir must be an absolute path, got '{}'",
            raw
        )));
    }

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

/// Name of the transient probe file, unique per call
pub fn probe_file_name() -> String {
    format!(
        "test-write-{}-{}.tmp",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    )
}

/// Create `dir` if needed and confirm it is writable by writing, reading
/// back and deleting a probe file.
pub async fn ensure_writable(dir: &Path) -> McpResult<()> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        McpError::InvalidArguments(format!(
            "Cannot create output directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let probe = dir.join(probe_file_name());
    debug!("Probing output directory with {}", probe.display());

    let not_writable = |e: std::io::Error| {
        McpError::InvalidArguments(format!(
            "Output directory {} is not writable: {}",
            dir.display(),
            e
        ))
    };

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&probe)
        .await
        .map_err(not_writable)?;
    file.write_all(PROBE_CONTENTS).await.map_err(not_writable)?;
    file.flush().await.map_err(not_writable)?;
    drop(file);

    let read_back = tokio::fs::read(&probe).await;
    // Remove before judging the read so a failed check leaves nothing behind
    let removed = tokio::fs::remove_file(&probe).await;

    let contents = read_back.map_err(not_writable)?;
    if contents != PROBE_CONTENTS {
        return Err(McpError::InvalidArguments(format!(
            "Output directory {} did not return the probe contents",
            dir.display()
        )));
    }
    removed.map_err(not_writable)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_rejected() {
        let err = normalize_absolute("relative/path").unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(_)));
        assert!(err.to_string().contains("absolute"));
    }

    #[cfg(unix)]
    #[test]
    fn dots_are_resolved_lexically() {
        let p = normalize_absolute("/tmp/a/./b/../c").unwrap();
        assert_eq!(p, PathBuf::from("/tmp/a/c"));
    }

    #[test]
    fn probe_name_shape() {
        let name = probe_file_name();
        assert!(name.starts_with("test-write-"));
        assert!(name.ends_with(".tmp"));
        assert_ne!(name, probe_file_name());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writability_checks_on_one_directory_succeed() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();

        for _ in 0..50 {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let dir = dir.clone();
                    tokio::spawn(async move { ensure_writable(&dir).await })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap().unwrap();
            }
        }

        let leftovers: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert!(leftovers.is_empty(), "probe files were not removed");
    }

    #[tokio::test]
    async fn creates_missing_directory_and_cleans_up() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("images");

        ensure_writable(&target).await.unwrap();

        assert!(target.is_dir());
        let leftovers: Vec<_> = std::fs::read_dir(&target).unwrap().collect();
        assert!(leftovers.is_empty(), "probe file was not removed");
    }

    #[tokio::test]
    async fn file_in_the_way_is_reported_as_invalid_arguments() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let err = ensure_writable(&blocker.join("child")).await.unwrap_err();
        assert!(matches!(err, McpError::InvalidArguments(_)));
        assert!(err.to_string().contains("Cannot create output directory"));
    }
}

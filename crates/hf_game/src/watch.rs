//! Modification-time polling for hot-reloadable asset files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Atlas,
    Clips,
    Config,
}

#[derive(Debug)]
struct WatchedFile {
    path: PathBuf,
    kind: AssetKind,
    last_seen_modified: Option<SystemTime>,
}

/// Polled once per frame; changes are returned rather than applied so the
/// caller can reload at a frame boundary.
#[derive(Debug, Default)]
pub struct AssetWatcher {
    files: Vec<WatchedFile>,
}

impl AssetWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watching a path twice is a no-op.
    pub fn watch(&mut self, path: impl Into<PathBuf>, kind: AssetKind) {
        let path = path.into();
        if self.files.iter().any(|f| f.path == path) {
            return;
        }
        let last_seen_modified = modified_time(&path);
        self.files.push(WatchedFile {
            path,
            kind,
            last_seen_modified,
        });
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Files whose mtime moved forward (or which appeared) since the last
    /// poll, in watch order. A deleted file is not reported.
    pub fn poll(&mut self) -> Vec<(AssetKind, PathBuf)> {
        let mut changed = Vec::new();
        for file in &mut self.files {
            let current = modified_time(&file.path);
            let is_newer = match (file.last_seen_modified, current) {
                (Some(old), Some(now)) => now > old,
                (None, Some(_)) => true,
                _ => false,
            };
            if is_newer {
                file.last_seen_modified = current;
                changed.push((file.kind, file.path.clone()));
            }
        }
        changed
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hf_watch_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn newly_created_file_reports_once() {
        let path = temp_file_path("create");
        let _ = fs::remove_file(&path);

        let mut watcher = AssetWatcher::new();
        watcher.watch(&path, AssetKind::Clips);
        assert!(watcher.poll().is_empty(), "missing file should not reload");

        fs::write(&path, "{}").expect("write watched file");
        assert_eq!(watcher.poll(), vec![(AssetKind::Clips, path.clone())]);
        assert!(watcher.poll().is_empty(), "unchanged file reports nothing");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn newer_mtime_is_reported() {
        let path = temp_file_path("touch");
        fs::write(&path, "{}").expect("write watched file");

        let mut watcher = AssetWatcher::new();
        watcher.watch(&path, AssetKind::Atlas);
        watcher.watch(&path, AssetKind::Atlas);
        assert_eq!(watcher.len(), 1);
        assert!(watcher.poll().is_empty());

        let file = fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .expect("open watched file");
        file.set_modified(SystemTime::now() + Duration::from_secs(5))
            .expect("bump mtime");
        let changed = watcher.poll();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].0, AssetKind::Atlas);

        let _ = fs::remove_file(path);
    }
}

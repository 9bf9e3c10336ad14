use anyhow::Result;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, UNIX_EPOCH};
use tokio::sync::mpsc;

use crate::data::FitFileEntry;

pub fn is_fit_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("fit"))
        .unwrap_or(false)
}

/// FIT files in `dir`, newest first
pub fn list_fit_files(dir: &Path) -> Vec<FitFileEntry> {
    let Ok(read_dir) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut entries: Vec<FitFileEntry> = read_dir
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if !is_fit_file(&path) {
                return None;
            }
            let meta = entry.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            let modified = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            Some(FitFileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                size: meta.len(),
                modified,
            })
        })
        .collect();

    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    entries
}

/// Watch `dir` and notify whenever a FIT file in it changes
pub async fn watch_dir(dir: PathBuf, tx: mpsc::Sender<()>) -> Result<()> {
    let (watcher_tx, mut watcher_rx) =
        tokio::sync::mpsc::channel::<notify::Result<notify::Event>>(16);

    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = watcher_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_millis(500)),
    )?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    while let Some(res) = watcher_rx.recv().await {
        let Ok(event) = res else { continue };
        if event.paths.iter().any(|p| is_fit_file(p)) {
            // Give writers a moment to finish
            tokio::time::sleep(Duration::from_millis(100)).await;
            if tx.send(()).await.is_err() {
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_fit_extension() {
        assert!(is_fit_file(Path::new("ride.fit")));
        assert!(is_fit_file(Path::new("RIDE.FIT")));
        assert!(!is_fit_file(Path::new("ride.gpx")));
        assert!(!is_fit_file(Path::new("fit")));
    }

    #[test]
    fn lists_only_fit_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.fit"), b"12345").unwrap();
        std::fs::write(dir.path().join("b.FIT"), b"1").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("folder.fit")).unwrap();

        let files = list_fit_files(dir.path());
        let mut names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["a.fit", "b.FIT"]);

        let a = files.iter().find(|f| f.name == "a.fit").unwrap();
        assert_eq!(a.size, 5);
    }

    #[test]
    fn lists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.fit"), b"1").unwrap();
        std::thread::sleep(Duration::from_millis(1100));
        std::fs::write(dir.path().join("new.fit"), b"2").unwrap();

        let names: Vec<String> = list_fit_files(dir.path()).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["new.fit", "old.fit"]);
    }

    #[tokio::test]
    async fn watch_dir_notifies_on_new_fit_file() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel::<()>(4);
        let watched = dir.path().to_path_buf();
        let handle = tokio::spawn(async move { watch_dir(watched, tx).await });

        // Let the watcher register before touching the directory
        tokio::time::sleep(Duration::from_millis(300)).await;
        std::fs::write(dir.path().join("ride.fit"), b"x").unwrap();

        let notified = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert_eq!(notified.ok().flatten(), Some(()));
        handle.abort();
    }

    #[test]
    fn missing_dir_lists_nothing() {
        assert!(list_fit_files(Path::new("/nonexistent/fitchart")).is_empty());
    }
}

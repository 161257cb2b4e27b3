//! `--watch`: re-run the check whenever one of the watched files changes.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Events arriving within this window after a change are merged into it.
const SETTLE_TIME: Duration = Duration::from_millis(500);

/// Block forever, calling `on_change` after each change to `paths`.
///
/// Parent directories are watched rather than the files themselves, since
/// many editors save by replacing the file.
pub fn watch(paths: &[&Path], mut on_change: impl FnMut()) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.send(res);
    })
    .context("Failed to start file watcher")?;
    configure_polling(&mut watcher);

    let targets = watch_targets(paths);
    let mut directories: Vec<&Path> = targets.iter().filter_map(|t| t.parent()).collect();
    directories.sort();
    directories.dedup();
    for dir in directories {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        log::debug!("Watching {}", dir.display());
    }

    eprintln!("Watching for changes (Ctrl+C to stop)");
    while let Ok(res) = rx.recv() {
        if !is_relevant(&res, &targets) {
            continue;
        }
        while rx.recv_timeout(SETTLE_TIME).is_ok() {}
        on_change();
    }

    Ok(())
}

/// Apply the poll interval. Backends that do not poll ignore it.
fn configure_polling(watcher: &mut impl Watcher) -> bool {
    match watcher.configure(notify::Config::default().with_poll_interval(POLL_INTERVAL)) {
        Ok(applied) => applied,
        Err(e) => {
            log::debug!("Failed to configure file watcher: {}", e);
            false
        }
    }
}

/// Absolute paths of the files to watch. Files whose directory does not
/// exist are skipped.
fn watch_targets(paths: &[&Path]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?;
            let parent = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            match parent.canonicalize() {
                Ok(dir) => Some(dir.join(name)),
                Err(e) => {
                    log::warn!("Not watching {}: {}", path.display(), e);
                    None
                }
            }
        })
        .collect()
}

/// Whether an event creates or modifies one of the targets.
fn is_relevant(res: &notify::Result<Event>, targets: &[PathBuf]) -> bool {
    match res {
        Ok(event) => {
            matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
                && event.paths.iter().any(|p| targets.contains(p))
        }
        Err(e) => {
            log::warn!("File watcher error: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    fn targets() -> Vec<PathBuf> {
        vec![PathBuf::from("/decks/talk.pptx"), PathBuf::from("/decks/config/default.yaml")]
    }

    #[test]
    fn test_relevant_events() {
        let modified = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/decks/talk.pptx"));
        assert!(is_relevant(&Ok(modified), &targets()));

        let created = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/decks/config/default.yaml"));
        assert!(is_relevant(&Ok(created), &targets()));
    }

    #[test]
    fn test_irrelevant_events() {
        let other_file = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/decks/~$talk.pptx"));
        assert!(!is_relevant(&Ok(other_file), &targets()));

        let accessed = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/decks/talk.pptx"));
        assert!(!is_relevant(&Ok(accessed), &targets()));

        assert!(!is_relevant(&Err(notify::Error::generic("boom")), &targets()));
    }

    /// A watcher whose backend answers `configure` with a fixed result.
    struct FixedWatcher(Option<bool>);

    impl Watcher for FixedWatcher {
        fn new<F: notify::EventHandler>(_handler: F, _config: notify::Config) -> notify::Result<Self> {
            Ok(Self(Some(false)))
        }

        fn watch(&mut self, _path: &Path, _mode: RecursiveMode) -> notify::Result<()> {
            Ok(())
        }

        fn unwatch(&mut self, _path: &Path) -> notify::Result<()> {
            Ok(())
        }

        fn configure(&mut self, _config: notify::Config) -> notify::Result<bool> {
            self.0.ok_or_else(|| notify::Error::generic("unsupported option"))
        }

        fn kind() -> notify::WatcherKind {
            notify::WatcherKind::NullWatcher
        }
    }

    #[test]
    fn test_configure_polling() {
        assert!(configure_polling(&mut FixedWatcher(Some(true))));
        assert!(!configure_polling(&mut FixedWatcher(Some(false))));
        assert!(!configure_polling(&mut FixedWatcher(None)));
    }

    #[test]
    fn test_watch_targets_are_absolute() {
        let targets = watch_targets(&[Path::new("Cargo.toml"), Path::new("missing/dir/x.yaml")]);
        assert_eq!(targets.len(), 1);
        assert!(targets[0].is_absolute());
        assert!(targets[0].ends_with("Cargo.toml"));
    }
}

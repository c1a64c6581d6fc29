use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

use crate::domain::entities::{ChangeEvent, ChangeKind};
use crate::domain::value_objects::IgnorePolicy;

/// Errors raised by the filesystem watcher
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    Init(#[source] notify::Error),

    #[error("Failed to watch path {path}: {source}")]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Watcher backend error: {0}")]
    Backend(#[source] notify::Error),
}

impl WatcherError {
    /// Path the error refers to, when known
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Init(_) => None,
            Self::WatchPath { path, .. } => Some(path),
            Self::Backend(error) => error.paths.first().map(PathBuf::as_path),
        }
    }
}

/// What a raw notify event means for the pending set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Classification {
    /// Every path gets the same change kind
    Each(ChangeKind),
    /// Rename with both ends: first path deleted, second added
    Rename,
    /// Rename with an unknown end: decided by whether the path still exists
    RenameUnknown,
    /// Directory events and accesses
    Ignore,
}

pub(crate) fn classify(kind: &EventKind) -> Classification {
    match kind {
        EventKind::Create(CreateKind::Folder) => Classification::Ignore,
        EventKind::Create(_) => Classification::Each(ChangeKind::Add),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => Classification::Each(ChangeKind::Delete),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Classification::Each(ChangeKind::Add),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => Classification::Rename,
        EventKind::Modify(ModifyKind::Name(_)) => Classification::RenameUnknown,
        EventKind::Modify(_) => Classification::Each(ChangeKind::Change),
        EventKind::Remove(RemoveKind::Folder) => Classification::Ignore,
        EventKind::Remove(_) => Classification::Each(ChangeKind::Delete),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Classification::Ignore,
    }
}

/// Path relative to `root` with `/` separators, or `None` outside the root
pub(crate) fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(path, root)?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => return None,
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Turn one notify event into zero or more change events
pub(crate) fn translate(event: &Event, root: &Path, ignore: &IgnorePolicy) -> Vec<ChangeEvent> {
    let kinds: Vec<(ChangeKind, &PathBuf)> = match classify(&event.kind) {
        Classification::Ignore => return Vec::new(),
        Classification::Each(kind) => event
            .paths
            .iter()
            .filter(|path| kind == ChangeKind::Delete || !path.is_dir())
            .map(|path| (kind, path))
            .collect(),
        Classification::Rename => match event.paths.as_slice() {
            [from, to, ..] => {
                let mut renamed = vec![(ChangeKind::Delete, from)];
                if !to.is_dir() {
                    renamed.push((ChangeKind::Add, to));
                }
                renamed
            }
            _ => return Vec::new(),
        },
        Classification::RenameUnknown => event
            .paths
            .iter()
            .filter(|path| !path.is_dir())
            .map(|path| {
                let kind = if path.exists() { ChangeKind::Add } else { ChangeKind::Delete };
                (kind, path)
            })
            .collect(),
    };

    kinds
        .into_iter()
        .filter_map(|(kind, path)| {
            let relative = relative_path(path, root)?;
            if ignore.is_ignored(&relative) {
                trace!(path = %relative, "ignored change");
                return None;
            }
            Some(ChangeEvent::new(kind, relative))
        })
        .collect()
}

/// Recursive watcher over a directory tree
///
/// Events are translated on the notify thread and delivered through an
/// unbounded channel. Dropping the watcher stops delivery and closes the
/// channel.
pub struct FsWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl FsWatcher {
    /// Start watching `root` recursively
    ///
    /// Changes that happened before this call are not reported.
    pub fn start(
        root: &Path,
        ignore: IgnorePolicy,
    ) -> Result<(Self, UnboundedReceiver<Result<ChangeEvent, WatcherError>>), WatcherError> {
        let root = root.canonicalize().map_err(|e| WatcherError::WatchPath {
            path: root.to_path_buf(),
            source: notify::Error::io(e),
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let handler_root = root.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| forward(res, &handler_root, &ignore, &tx),
            Config::default(),
        )
        .map_err(WatcherError::Init)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WatcherError::WatchPath {
                path: root.clone(),
                source: e,
            })?;

        debug!(root = %root.display(), "watching directory");
        Ok((
            Self {
                root,
                _watcher: watcher,
            },
            rx,
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn forward(
    res: Result<Event, notify::Error>,
    root: &Path,
    ignore: &IgnorePolicy,
    tx: &UnboundedSender<Result<ChangeEvent, WatcherError>>,
) {
    // send only fails once the session has stopped listening
    match res {
        Ok(event) => {
            for change in translate(&event, root, ignore) {
                let _ = tx.send(Ok(change));
            }
        }
        Err(e) => {
            let _ = tx.send(Err(WatcherError::Backend(e)));
        }
    }
}

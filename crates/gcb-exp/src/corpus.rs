use std::fmt;
use std::fs;
use std::num::NonZeroU32;
use std::path::{Component, Path, PathBuf};

use gcb_core::errors::{ErrorInfo, HarnessError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// File extension of persisted graph instances.
pub const INSTANCE_EXTENSION: &str = "col";

/// Identity of an instance within a corpus folder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "kebab-case")]
pub enum InstanceKey {
    /// `<folder>/<size>/<trial>.col`
    Sized { size: NonZeroU32, trial: NonZeroU32 },
    /// `<folder>/<file>`
    Named { file: String },
}

impl InstanceKey {
    /// Path of the instance relative to its corpus folder.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            InstanceKey::Sized { size, trial } => {
                PathBuf::from(size.to_string()).join(format!("{trial}.{INSTANCE_EXTENSION}"))
            }
            InstanceKey::Named { file } => PathBuf::from(file),
        }
    }

    pub fn size(&self) -> Option<NonZeroU32> {
        match self {
            InstanceKey::Sized { size, .. } => Some(*size),
            InstanceKey::Named { .. } => None,
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceKey::Sized { size, trial } => write!(f, "{size}/{trial}"),
            InstanceKey::Named { file } => f.write_str(file),
        }
    }
}

/// A persisted graph instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphInstance {
    #[serde(flatten)]
    pub key: InstanceKey,
    pub path: PathBuf,
}

/// Deterministic location of a generated instance: `<root>/<size>/<trial>.col`.
pub fn instance_path(root: &Path, size: NonZeroU32, trial: NonZeroU32) -> PathBuf {
    root.join(InstanceKey::Sized { size, trial }.relative_path())
}

/// Subset of the instance corpus participating in a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusSelector {
    /// Named sub-corpus under the corpus root, e.g. `random` or `reg`.
    pub folder: String,
    /// Restricts a bucketed corpus to a single size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_filter: Option<NonZeroU32>,
}

impl CorpusSelector {
    pub fn new(folder: impl Into<String>, size_filter: Option<NonZeroU32>) -> Self {
        Self {
            folder: folder.into(),
            size_filter,
        }
    }

    /// Resolves the selected folder under `root`, rejecting anything but a plain name.
    pub fn folder_path(&self, root: &Path) -> Result<PathBuf, HarnessError> {
        let mut components = Path::new(&self.folder).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(root.join(&self.folder)),
            _ => Err(HarnessError::Config(
                ErrorInfo::new("corpus-folder-invalid", "folder must be a single path segment")
                    .with_context("folder", self.folder.as_str()),
            )),
        }
    }
}

/// Lists the instances matched by `selector`, in sweep order.
///
/// Bucketed instances come first, ordered numerically by size then trial,
/// followed by flat instances ordered by file name. A size filter excludes
/// flat instances; a missing bucket yields an empty selection.
pub fn select(root: &Path, selector: &CorpusSelector) -> Result<Vec<GraphInstance>, HarnessError> {
    let folder = selector.folder_path(root)?;
    if !folder.is_dir() {
        return Err(HarnessError::Io(
            ErrorInfo::new("corpus-folder-missing", "corpus folder does not exist")
                .with_path(&folder),
        ));
    }

    let mut buckets: Vec<(NonZeroU32, PathBuf)> = Vec::new();
    let mut flat: Vec<GraphInstance> = Vec::new();
    for entry in read_dir_sorted(&folder)? {
        let name = match entry.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if entry.is_dir() {
            if let Some(size) = parse_index(&name) {
                if selector.size_filter.map_or(true, |wanted| wanted == size) {
                    buckets.push((size, entry));
                }
            }
        } else if selector.size_filter.is_none() && is_instance_file(&entry) {
            flat.push(GraphInstance {
                key: InstanceKey::Named { file: name },
                path: entry,
            });
        }
    }
    buckets.sort_by_key(|(size, _)| *size);

    if let Some(size) = selector.size_filter {
        if buckets.is_empty() {
            warn!(folder = %folder.display(), %size, "size bucket not present in corpus");
        }
    }

    let mut instances = Vec::new();
    for (size, dir) in buckets {
        let mut trials = Vec::new();
        for entry in read_dir_sorted(&dir)? {
            if !is_instance_file(&entry) {
                continue;
            }
            let trial = entry
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(parse_index);
            match trial {
                Some(trial) => trials.push(GraphInstance {
                    key: InstanceKey::Sized { size, trial },
                    path: entry,
                }),
                None => debug!(path = %entry.display(), "skipping non-numeric instance file"),
            }
        }
        trials.sort_by(|a, b| a.key.cmp(&b.key));
        instances.extend(trials);
    }
    instances.extend(flat);
    Ok(instances)
}

/// Parses a bucket or trial name written the way `instance_path` writes it.
/// `0500` is rejected so it cannot alias `500`.
fn parse_index(name: &str) -> Option<NonZeroU32> {
    name.parse::<NonZeroU32>()
        .ok()
        .filter(|index| index.to_string() == name)
}

fn is_instance_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some(INSTANCE_EXTENSION)
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
    let entries = fs::read_dir(dir).map_err(|err| HarnessError::io("corpus-read", dir, err))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| HarnessError::io("corpus-read", dir, err))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

//! Stem growth over the git history of a dictionary file.
//!
//! Commits are walked from a starting revision. A commit belongs to the
//! history of a file when the file's blob differs from its blob in every
//! parent, which is the rule `git log <path>` applies. Each such revision is
//! counted with the counter matching the file's format.

use std::collections::{HashMap, VecDeque};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StemcountError;
use crate::options::{DixMode, UniqueOn};
use crate::source::{decode_text, DictionaryFormat};
use crate::Result;

use super::counter::{count_text, CountOptions};

/// Options for sampling a file's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Revision the walk starts from
    pub rev: String,
    /// Criterion for lexc counts
    pub unique_on: UniqueOn,
    /// Tally mode for dix counts
    pub dix_mode: DixMode,
    /// Keep at most this many of the newest entries
    pub limit: Option<usize>,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            rev: "HEAD".to_string(),
            unique_on: UniqueOn::default(),
            dix_mode: DixMode::default(),
            limit: None,
        }
    }
}

impl HistoryOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the walk from `rev` instead of `HEAD`.
    pub fn rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = rev.into();
        self
    }

    /// Set the lexc uniqueness criterion.
    pub fn unique_on(mut self, unique_on: UniqueOn) -> Self {
        self.unique_on = unique_on;
        self
    }

    /// Set the dix tally mode.
    pub fn dix_mode(mut self, mode: DixMode) -> Self {
        self.dix_mode = mode;
        self
    }

    /// Keep only the newest `n` entries.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    fn count_options(&self) -> CountOptions {
        CountOptions::new()
            .unique_on(self.unique_on)
            .dix_mode(self.dix_mode)
    }
}

/// Stem count of a file at one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Full commit id
    pub sha: String,
    /// Author name
    pub author: String,
    /// Commit time, RFC 3339
    pub date: String,
    /// Commit time, seconds since the epoch
    pub timestamp: i64,
    /// Stems counted in this revision of the file
    pub stems: usize,
}

/// History of a dictionary file, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct History {
    /// File path relative to the repository root
    pub path: PathBuf,
    /// Revision the walk started from
    pub rev: String,
    /// Counted revisions, newest first
    pub entries: Vec<HistoryEntry>,
    /// Revisions that touched the file but could not be counted
    pub skipped: usize,
}

impl History {
    /// Stem change of every entry against the one before it in time.
    ///
    /// The oldest entry has no predecessor and reports its full count.
    pub fn deltas(&self) -> Vec<i64> {
        let mut deltas = Vec::with_capacity(self.entries.len());
        for (idx, entry) in self.entries.iter().enumerate() {
            let previous = self.entries.get(idx + 1).map_or(0, |e| e.stems as i64);
            deltas.push(entry.stems as i64 - previous);
        }
        deltas
    }
}

/// Count stems in every revision of `file` that changed it.
///
/// `file` is relative to the repository root, or absolute inside the work
/// tree.
///
/// # Example
///
/// ```rust,ignore
/// use stemcountlib::{stem_history, HistoryOptions};
///
/// let history = stem_history("apertium-kaz", "apertium-kaz.kaz.lexc", HistoryOptions::new())?;
/// for entry in &history.entries {
///     println!("{} {} {}", entry.date, entry.author, entry.stems);
/// }
/// ```
pub fn stem_history(
    repo_path: impl AsRef<Path>,
    file: impl AsRef<Path>,
    options: HistoryOptions,
) -> Result<History> {
    let repo = gix::discover(repo_path.as_ref())
        .map_err(|e| StemcountError::GitError(format!("Failed to discover git repository: {}", e)))?;

    let repo_root = repo
        .work_dir()
        .ok_or_else(|| StemcountError::GitError("Repository has no work directory".to_string()))?
        .to_path_buf();

    let relative = relative_to_root(file.as_ref(), &repo_root)?;
    let format = DictionaryFormat::from_name(&relative.to_string_lossy())?;
    let count_options = options.count_options();

    let start = resolve_commit(&repo, &options.rev)?;

    let mut entries = Vec::new();
    let mut skipped = 0;

    for (id, parents) in ancestry(&repo, start.id)? {
        let commit = find_commit(&repo, id)?;

        let Some(blob) = blob_at(&repo, &commit, &relative)? else {
            continue;
        };

        let mut unchanged = false;
        for parent in &parents {
            let parent = find_commit(&repo, *parent)?;
            if blob_at(&repo, &parent, &relative)? == Some(blob) {
                unchanged = true;
                break;
            }
        }
        if unchanged {
            continue;
        }

        let text = read_blob(&repo, blob)?;
        let stems = match count_text(&text, format, &count_options) {
            Ok(count) => count.stems(),
            Err(e) => {
                warn!(
                    "Unable to count stems for {} in commit {}: {}",
                    relative.display(),
                    id,
                    e
                );
                skipped += 1;
                continue;
            }
        };

        let (author, seconds) = author_of(&commit)?;
        debug!("{} has {} stems at {}", relative.display(), stems, id);
        entries.push(HistoryEntry {
            sha: id.to_string(),
            author,
            date: format_date(seconds),
            timestamp: seconds,
            stems,
        });
    }

    // stable: commits sharing a timestamp keep their ancestry order
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = options.limit {
        entries.truncate(limit);
    }

    info!(
        "Found {} revisions of {} ({} skipped)",
        entries.len(),
        relative.display(),
        skipped
    );

    Ok(History {
        path: relative,
        rev: options.rev,
        entries,
        skipped,
    })
}

/// Commits reachable from `start` with their parents, every commit listed
/// before its ancestors.
fn ancestry(
    repo: &gix::Repository,
    start: gix::ObjectId,
) -> Result<Vec<(gix::ObjectId, Vec<gix::ObjectId>)>> {
    let mut parents_of: HashMap<gix::ObjectId, Vec<gix::ObjectId>> = HashMap::new();
    let mut children: HashMap<gix::ObjectId, usize> = HashMap::new();
    let mut queue = VecDeque::from([start]);

    while let Some(id) = queue.pop_front() {
        if parents_of.contains_key(&id) {
            continue;
        }
        let parents: Vec<gix::ObjectId> = find_commit(repo, id)?
            .parent_ids()
            .map(|p| p.detach())
            .collect();
        for parent in &parents {
            *children.entry(*parent).or_default() += 1;
        }
        queue.extend(parents.iter().copied());
        parents_of.insert(id, parents);
    }

    // Kahn's algorithm from the tip: a commit is emitted after all of its
    // reachable children
    let mut order = Vec::with_capacity(parents_of.len());
    let mut ready = VecDeque::from([start]);
    while let Some(id) = ready.pop_front() {
        let parents = parents_of.remove(&id).unwrap_or_default();
        for parent in &parents {
            if let Some(count) = children.get_mut(parent) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(*parent);
                }
            }
        }
        order.push((id, parents));
    }

    Ok(order)
}

fn find_commit(repo: &gix::Repository, id: gix::ObjectId) -> Result<gix::Commit<'_>> {
    repo.find_commit(id)
        .map_err(|e| StemcountError::GitError(format!("Failed to find commit {}: {}", id, e)))
}

/// Express `file` relative to the work tree root.
fn relative_to_root(file: &Path, repo_root: &Path) -> Result<PathBuf> {
    if file.is_relative() {
        return Ok(file.to_path_buf());
    }

    let root = repo_root
        .canonicalize()
        .unwrap_or_else(|_| repo_root.to_path_buf());
    let file = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());

    file.strip_prefix(&root)
        .map(Path::to_path_buf)
        .map_err(|_| {
            StemcountError::GitError(format!(
                "{} is outside the repository at {}",
                file.display(),
                root.display()
            ))
        })
}

/// Resolve a revision to a commit object
fn resolve_commit<'repo>(repo: &'repo gix::Repository, reference: &str) -> Result<gix::Commit<'repo>> {
    let id = repo
        .rev_parse_single(reference.as_bytes())
        .map_err(|e| StemcountError::GitError(format!("Failed to resolve '{}': {}", reference, e)))?
        .detach();

    repo.find_commit(id).map_err(|e| {
        StemcountError::GitError(format!("Failed to find commit '{}': {}", reference, e))
    })
}

/// Blob id of `path` in the tree of `commit`, if the file exists there.
fn blob_at(
    repo: &gix::Repository,
    commit: &gix::Commit<'_>,
    path: &Path,
) -> Result<Option<gix::ObjectId>> {
    let mut tree = commit
        .tree()
        .map_err(|e| StemcountError::GitError(format!("Failed to get tree for {}: {}", commit.id, e)))?;

    let names: Vec<&std::ffi::OsStr> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect();

    for (idx, name) in names.iter().enumerate() {
        let is_last = idx + 1 == names.len();
        let mut next = None;

        for entry in tree.iter() {
            let entry = entry
                .map_err(|e| StemcountError::GitError(format!("Failed to read tree entry: {}", e)))?;
            if gix::path::from_bstr(entry.filename()).as_os_str() != *name {
                continue;
            }
            next = Some((entry.mode(), entry.oid().to_owned()));
            break;
        }

        let Some((mode, oid)) = next else {
            return Ok(None);
        };

        if is_last {
            return Ok(mode.is_blob().then_some(oid));
        }
        if !mode.is_tree() {
            return Ok(None);
        }

        tree = repo
            .find_object(oid)
            .map_err(|e| StemcountError::GitError(format!("Failed to find tree: {}", e)))?
            .try_into_tree()
            .map_err(|_| StemcountError::GitError("Object is not a tree".to_string()))?;
    }

    Ok(None)
}

/// Read a blob's content as text
fn read_blob(repo: &gix::Repository, oid: gix::ObjectId) -> Result<String> {
    let object = repo
        .find_object(oid)
        .map_err(|e| StemcountError::GitError(format!("Failed to find object {}: {}", oid, e)))?;

    let blob = object
        .try_into_blob()
        .map_err(|_| StemcountError::GitError(format!("Object {} is not a blob", oid)))?;

    Ok(decode_text(blob.data.to_vec()))
}

/// Author name and commit time in seconds since the epoch.
fn author_of(commit: &gix::Commit<'_>) -> Result<(String, i64)> {
    let author = commit
        .author()
        .map_err(|e| StemcountError::GitError(format!("Failed to read author of {}: {}", commit.id, e)))?
        .name
        .to_string();
    let time = commit
        .time()
        .map_err(|e| StemcountError::GitError(format!("Failed to read time of {}: {}", commit.id, e)))?;

    Ok((author, time.seconds))
}

fn format_date(seconds: i64) -> String {
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

//! Change records gathered from a repository's pending work.

use std::fmt;
use std::path::{Path, PathBuf};

use git2::{Delta, Diff, DiffOptions, IndexAddOption, Oid, Repository};

use crate::error::VcsError;

/// Kind of modification a change represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Modified => write!(f, "Modified"),
            ChangeKind::Deleted => write!(f, "Deleted"),
            ChangeKind::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A single file-level modification pending in some repository.
///
/// The path is absolute and optional. A record without a path (a file the
/// collaborator could not materialize) cannot be matched against exclusion
/// globs or repository roots and is dropped during diff computation.
#[derive(Debug, Clone)]
pub struct Change {
    pub path: Option<PathBuf>,
    pub kind: ChangeKind,
    /// Old path for renames (None for non-rename changes).
    pub old_path: Option<PathBuf>,
}

impl Change {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: Some(path.into()),
            kind,
            old_path: None,
        }
    }
}

/// Gather pending changes (staged, unstaged, and untracked) for one
/// repository. Paths come back absolute, joined onto the workdir.
pub fn collect_changes(repo: &Repository) -> Result<Vec<Change>, VcsError> {
    let Some(workdir) = repo.workdir().map(Path::to_path_buf) else {
        return Ok(Vec::new());
    };

    let head_tree = super::diff::resolve_head_tree(repo)?;
    let staged = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(VcsError::DiffFailed)?;

    let mut opts = DiffOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let unstaged = repo
        .diff_index_to_workdir(None, Some(&mut opts))
        .map_err(VcsError::DiffFailed)?;

    let mut changes = Vec::new();
    collect_from_diff(&staged, &workdir, &mut changes);
    collect_from_diff(&unstaged, &workdir, &mut changes);

    // Deduplicate by path; a file both staged and further edited counts once.
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes.dedup_by(|a, b| a.path == b.path);

    Ok(changes)
}

fn collect_from_diff(diff: &Diff<'_>, workdir: &Path, changes: &mut Vec<Change>) {
    for delta_idx in 0..diff.deltas().len() {
        let Some(delta) = diff.get_delta(delta_idx) else {
            continue;
        };
        let kind = match delta.status() {
            Delta::Added | Delta::Untracked => ChangeKind::Added,
            Delta::Deleted => ChangeKind::Deleted,
            Delta::Renamed => ChangeKind::Renamed,
            _ => ChangeKind::Modified,
        };

        let new_path = delta.new_file().path().map(|p| workdir.join(p));
        let old_path = delta.old_file().path().map(|p| workdir.join(p));

        let (path, old_path) = match kind {
            ChangeKind::Renamed => (new_path.clone().or_else(|| old_path.clone()), old_path),
            // Deletions keep the old path so exclusion filters and grouping
            // still see where the file lived.
            ChangeKind::Deleted => (old_path.or(new_path), None),
            _ => (new_path.or(old_path), None),
        };

        if path.is_some() {
            changes.push(Change {
                path,
                kind,
                old_path,
            });
        }
    }
}

/// Stage all changes and create a commit with the given message.
///
/// Uses `index.add_all()` to stage everything (like `git add -A`) and
/// commits on HEAD. Works for fresh repositories too: an unborn HEAD just
/// means the commit has no parents.
pub fn stage_and_commit(repo: &Repository, message: &str) -> Result<Oid, VcsError> {
    let mut index = repo.index().map_err(VcsError::StagingFailed)?;
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .map_err(VcsError::StagingFailed)?;
    index.write().map_err(VcsError::StagingFailed)?;

    let tree_id = index.write_tree().map_err(VcsError::StagingFailed)?;
    let tree = repo.find_tree(tree_id).map_err(VcsError::CommitFailed)?;

    let sig = repo.signature().map_err(VcsError::ConfigError)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(VcsError::CommitFailed)?),
        Err(e)
            if e.code() == git2::ErrorCode::UnbornBranch
                || e.code() == git2::ErrorCode::NotFound =>
        {
            None
        }
        Err(source) => return Err(VcsError::HeadResolution(source)),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(VcsError::CommitFailed)
}

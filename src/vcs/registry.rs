//! Repository records and the ordered repository registry.

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};

use crate::error::VcsError;

const PLACEHOLDER_BRANCH: &str = "main";
const PLACEHOLDER_REVISION: &str = "HEAD";

/// One version-control root and where it currently points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub root: PathBuf,
    pub current_branch: Option<String>,
    pub current_revision: Option<String>,
    /// True for repositories with no commits yet.
    pub fresh: bool,
}

impl RepoInfo {
    /// Synthetic fallback used when no repository is registered for a
    /// project. A plain constructed value; the registry injects at most
    /// one of these.
    pub fn placeholder(project_root: &Path) -> Self {
        Self {
            root: project_root.to_path_buf(),
            current_branch: Some(PLACEHOLDER_BRANCH.to_string()),
            current_revision: Some(PLACEHOLDER_REVISION.to_string()),
            fresh: true,
        }
    }

    /// Read branch, revision, and freshness from an opened repository.
    /// Repositories with an unborn HEAD come back fresh with no branch.
    pub fn from_repository(repo: &Repository) -> Result<Self, VcsError> {
        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();
        match repo.head() {
            Ok(head) => Ok(Self {
                root,
                current_branch: head.shorthand().map(str::to_string),
                current_revision: head.target().map(|oid| oid.to_string()),
                fresh: false,
            }),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(Self {
                    root,
                    current_branch: None,
                    current_revision: None,
                    fresh: true,
                })
            }
            Err(source) => Err(VcsError::HeadResolution(source)),
        }
    }
}

/// Ordered collection of repositories participating in a run.
///
/// Iteration follows registration order; diff grouping and the rendered
/// `Repository:` segments depend on that order being stable.
#[derive(Debug, Default)]
pub struct RepositoryRegistry {
    repos: Vec<RepoInfo>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, repo: RepoInfo) {
        self.repos.push(repo);
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn repositories(&self) -> &[RepoInfo] {
        &self.repos
    }

    /// Owning repository for a path: the registered root that is the
    /// longest prefix of the path. `None` when no root contains it.
    pub fn repository_for_path(&self, path: &Path) -> Option<&RepoInfo> {
        self.repos
            .iter()
            .filter(|repo| path.starts_with(&repo.root))
            .max_by_key(|repo| repo.root.as_os_str().len())
    }
}

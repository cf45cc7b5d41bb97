//! Version-control layer: change records, the repository registry, branch
//! resolution, and diff rendering.

pub mod branch;
pub mod change;
pub mod diff;
pub mod registry;

pub use branch::{FALLBACK_BRANCH, common_branch};
pub use change::{Change, ChangeKind, collect_changes, stage_and_commit};
pub use diff::compute_diff;
pub use registry::{RepoInfo, RepositoryRegistry};

//! Common-branch resolution across the repositories owning a change set.

use tracing::debug;

use super::change::Change;
use super::registry::RepositoryRegistry;
use crate::notify::Notifier;

/// Branch name used when no common branch can be determined.
pub const FALLBACK_BRANCH: &str = "main";

/// Resolve the most common current branch across the changes' owning
/// repositories.
///
/// Every change contributes one vote: the current branch of its owning
/// repository, or an "unknown" vote when the change has no path, no owning
/// repository, or the repository has no current branch. The highest count
/// wins; on equal counts the branch seen first wins. When "unknown" itself
/// wins, the user is warned once and [`FALLBACK_BRANCH`] is returned.
pub fn common_branch(
    changes: &[Change],
    registry: &RepositoryRegistry,
    notifier: &dyn Notifier,
) -> String {
    let mut counts: Vec<(Option<String>, usize)> = Vec::new();
    for change in changes {
        let branch = change
            .path
            .as_deref()
            .and_then(|path| registry.repository_for_path(path))
            .and_then(|repo| repo.current_branch.clone());
        match counts.iter_mut().find(|(candidate, _)| *candidate == branch) {
            Some((_, count)) => *count += 1,
            None => counts.push((branch, 1)),
        }
    }

    let mut winner: Option<(&Option<String>, usize)> = None;
    for (branch, count) in &counts {
        if winner.is_none_or(|(_, best)| *count > best) {
            winner = Some((branch, *count));
        }
    }

    match winner {
        Some((Some(branch), count)) => {
            debug!("Common branch '{branch}' ({count} of {} changes)", changes.len());
            branch.clone()
        }
        _ => {
            notifier.warn(&format!(
                "Could not determine the current branch for the selected changes, \
                 falling back to '{FALLBACK_BRANCH}'"
            ));
            FALLBACK_BRANCH.to_string()
        }
    }
}

//! Unified diff computation, grouped by owning repository.

use std::path::Path;

use git2::{Diff, DiffFormat, DiffOptions, ErrorCode, Repository, Tree};
use tracing::debug;

use super::change::Change;
use super::registry::{RepoInfo, RepositoryRegistry};
use crate::error::VcsError;
use crate::settings::Settings;

/// Compute the unified diff for the given changes, one segment per owning
/// repository.
///
/// Changes are filtered first: a change survives only when it has a path
/// and neither settings scope's exclusion globs match it. Survivors are
/// grouped by repository (see [`group_changes`] for the assignment rules),
/// each group renders as a `Repository: <root>` header followed by the
/// patch text for that repository restricted to the group's paths, and the
/// segments are joined with single newlines in registry order. When the
/// registry is empty a synthetic placeholder rooted at the project owns
/// every change; the registry itself is never modified. Any git2 failure
/// propagates, there is no partial-diff recovery.
pub fn compute_diff(
    changes: &[Change],
    reverse: bool,
    project_root: &Path,
    registry: &RepositoryRegistry,
    settings: &Settings,
) -> Result<String, VcsError> {
    let included: Vec<&Change> = changes
        .iter()
        .filter(|change| match change.path.as_deref() {
            Some(path) => !settings.is_path_excluded(&path.to_string_lossy()),
            None => false,
        })
        .collect();
    if included.len() < changes.len() {
        debug!(
            "Excluded {} of {} changes from the diff",
            changes.len() - included.len(),
            changes.len()
        );
    }

    let placeholder = RepoInfo::placeholder(project_root);
    let groups = group_changes(&included, registry, &placeholder);

    let mut segments = Vec::with_capacity(groups.len());
    for (repo_info, group) in &groups {
        segments.push(render_repository_diff(repo_info, group, reverse)?);
    }
    Ok(segments.join("\n"))
}

/// Assign each change to its owning repository, preserving registry order.
///
/// An empty registry hands everything to the placeholder and a lone
/// repository owns everything unconditionally. With several repositories a
/// change resolves by longest root prefix, and one that resolves to no
/// registered root is dropped; it simply is not part of any repository we
/// can diff.
fn group_changes<'a>(
    changes: &[&'a Change],
    registry: &'a RepositoryRegistry,
    placeholder: &'a RepoInfo,
) -> Vec<(&'a RepoInfo, Vec<&'a Change>)> {
    if changes.is_empty() {
        return Vec::new();
    }
    match registry.repositories() {
        [] => vec![(placeholder, changes.to_vec())],
        [only] => vec![(only, changes.to_vec())],
        repos => {
            let mut groups: Vec<(&RepoInfo, Vec<&Change>)> =
                repos.iter().map(|repo| (repo, Vec::new())).collect();
            for &change in changes {
                let Some(path) = change.path.as_deref() else {
                    continue;
                };
                match registry.repository_for_path(path) {
                    Some(owner) => {
                        if let Some((_, group)) =
                            groups.iter_mut().find(|(repo, _)| repo.root == owner.root)
                        {
                            group.push(change);
                        }
                    }
                    None => debug!(
                        "Dropping change outside all registered roots: {}",
                        path.display()
                    ),
                }
            }
            groups.retain(|(_, group)| !group.is_empty());
            groups
        }
    }
}

/// Render one repository's segment: the header line plus the unified patch
/// for the working tree restricted to the group's paths.
fn render_repository_diff(
    repo_info: &RepoInfo,
    changes: &[&Change],
    reverse: bool,
) -> Result<String, VcsError> {
    let repo = Repository::open(&repo_info.root).map_err(|source| VcsError::OpenRepository {
        path: repo_info.root.clone(),
        source,
    })?;

    let mut opts = DiffOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .reverse(reverse);
    for change in changes {
        for path in [change.path.as_deref(), change.old_path.as_deref()]
            .into_iter()
            .flatten()
        {
            // Pathspecs are relative to the repository root.
            let rel = path.strip_prefix(&repo_info.root).unwrap_or(path);
            opts.pathspec(rel.to_string_lossy().into_owned());
        }
    }

    let head_tree = resolve_head_tree(&repo)?;
    let diff = repo
        .diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut opts))
        .map_err(VcsError::DiffFailed)?;

    let mut text = format!("Repository: {}\n", repo_info.root.display());
    append_patch_text(&diff, &mut text)?;
    Ok(text)
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real
/// failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not
/// found), `Ok(Some(tree))` for repos with a valid HEAD, or
/// `Err(VcsError::DiffFailed)` for real errors such as a corrupt HEAD.
pub(crate) fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, VcsError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(VcsError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(VcsError::DiffFailed)?;
    Ok(Some(tree))
}

/// Append the patch text for a diff. Binary deltas show up as the usual
/// "Binary files ... differ" notes rather than raw content.
fn append_patch_text(diff: &Diff<'_>, text: &mut String) -> Result<(), VcsError> {
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
        true
    })
    .map_err(VcsError::DiffFailed)
}

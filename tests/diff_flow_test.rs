//! Integration tests for diff computation and branch resolution over real
//! temporary repositories.

mod common;

use std::sync::Mutex;

use common::TestRepo;
use scrivener::notify::Notifier;
use scrivener::settings::{AppConfig, ProjectConfig, Settings};
use scrivener::vcs::{
    Change, ChangeKind, RepoInfo, RepositoryRegistry, collect_changes, common_branch, compute_diff,
};

/// Records warnings so tests can assert on their count.
#[derive(Default)]
struct RecordingNotifier {
    warnings: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn count(&self) -> usize {
        self.warnings.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

fn settings_with_globs(app_globs: &[&str], project_globs: &[&str]) -> Settings {
    let app = AppConfig {
        excluded_paths: app_globs.iter().map(|p| p.to_string()).collect(),
        ..AppConfig::default()
    };
    let project = ProjectConfig {
        excluded_paths: project_globs.iter().map(|p| p.to_string()).collect(),
        ..ProjectConfig::default()
    };
    Settings::from_parts(app, project).expect("Invalid settings")
}

/// A repo with one commit in history and one pending file.
fn repo_with_pending(pending: &str) -> TestRepo {
    let test_repo = TestRepo::new();
    test_repo.write("base.txt", "base\n");
    test_repo.commit_all("init");
    test_repo.write(pending, "pending\n");
    test_repo
}

fn registry_of(repos: &[&TestRepo]) -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    for test_repo in repos {
        registry
            .register(RepoInfo::from_repository(&test_repo.repo).expect("Failed to read repo"));
    }
    registry
}

fn header(test_repo: &TestRepo) -> String {
    format!("Repository: {}", test_repo.root().display())
}

// =============================================================================
// MULTI-REPOSITORY GROUPING TESTS
// =============================================================================

#[test]
fn test_two_repositories_render_two_segments_in_registry_order() {
    let r1 = repo_with_pending("one.txt");
    let r2 = repo_with_pending("two.txt");

    let registry = registry_of(&[&r1, &r2]);
    let mut changes = collect_changes(&r1.repo).unwrap();
    changes.extend(collect_changes(&r2.repo).unwrap());

    let settings = settings_with_globs(&[], &[]);
    let diff = compute_diff(&changes, false, &r1.root(), &registry, &settings).unwrap();

    assert_eq!(diff.matches("Repository: ").count(), 2);
    assert!(diff.contains("one.txt"));
    assert!(diff.contains("two.txt"));

    let first = diff.find(&header(&r1)).expect("Missing first repo header");
    let second = diff.find(&header(&r2)).expect("Missing second repo header");
    assert!(first < second, "Segments must follow registry order");
}

#[test]
fn test_registration_order_controls_segment_order() {
    let r1 = repo_with_pending("one.txt");
    let r2 = repo_with_pending("two.txt");

    // Same changes, reversed registration: the segments swap.
    let registry = registry_of(&[&r2, &r1]);
    let mut changes = collect_changes(&r1.repo).unwrap();
    changes.extend(collect_changes(&r2.repo).unwrap());

    let settings = settings_with_globs(&[], &[]);
    let diff = compute_diff(&changes, false, &r1.root(), &registry, &settings).unwrap();

    let first = diff.find(&header(&r2)).expect("Missing first repo header");
    let second = diff.find(&header(&r1)).expect("Missing second repo header");
    assert!(first < second);
}

#[test]
fn test_repository_without_surviving_changes_has_no_segment() {
    let r1 = repo_with_pending("one.txt");
    let r2 = TestRepo::new();
    r2.write("base.txt", "base\n");
    r2.commit_all("init");

    let registry = registry_of(&[&r1, &r2]);
    let changes = collect_changes(&r1.repo).unwrap();

    let settings = settings_with_globs(&[], &[]);
    let diff = compute_diff(&changes, false, &r1.root(), &registry, &settings).unwrap();

    assert_eq!(diff.matches("Repository: ").count(), 1);
    assert!(diff.starts_with(&header(&r1)));
}

#[test]
fn test_change_outside_all_roots_is_dropped_silently() {
    let r1 = repo_with_pending("one.txt");
    let r2 = repo_with_pending("two.txt");

    let registry = registry_of(&[&r1, &r2]);
    let mut changes = collect_changes(&r1.repo).unwrap();
    changes.extend(collect_changes(&r2.repo).unwrap());
    changes.push(Change::new("/nowhere/stray.rs", ChangeKind::Modified));

    let settings = settings_with_globs(&[], &[]);
    let diff = compute_diff(&changes, false, &r1.root(), &registry, &settings).unwrap();

    // The stray change neither errors nor appears.
    assert!(!diff.contains("stray.rs"));
    assert_eq!(diff.matches("Repository: ").count(), 2);
}

// =============================================================================
// EXCLUSION FILTERING TESTS
// =============================================================================

#[test]
fn test_change_survives_only_when_neither_scope_excludes_it() {
    let test_repo = TestRepo::new();
    test_repo.write("base.txt", "base\n");
    test_repo.commit_all("init");
    test_repo.write("app.lock", "locked\n");
    test_repo.write("generated/api.rs", "// generated\n");
    test_repo.write("keep.rs", "fn keep() {}\n");

    let registry = registry_of(&[&test_repo]);
    let changes = collect_changes(&test_repo.repo).unwrap();
    assert_eq!(changes.len(), 3);

    // App scope drops locks, project scope drops generated code; a path
    // matched by either scope stays out of the diff.
    let settings = settings_with_globs(&["**/*.lock"], &["**/generated/**"]);
    let diff = compute_diff(&changes, false, &test_repo.root(), &registry, &settings).unwrap();

    assert!(diff.contains("keep.rs"));
    assert!(!diff.contains("app.lock"));
    assert!(!diff.contains("generated/api.rs"));
}

#[test]
fn test_no_exclusions_keeps_every_change() {
    let test_repo = TestRepo::new();
    test_repo.write("base.txt", "base\n");
    test_repo.commit_all("init");
    test_repo.write("app.lock", "locked\n");
    test_repo.write("keep.rs", "fn keep() {}\n");

    let registry = registry_of(&[&test_repo]);
    let changes = collect_changes(&test_repo.repo).unwrap();

    let settings = settings_with_globs(&[], &[]);
    let diff = compute_diff(&changes, false, &test_repo.root(), &registry, &settings).unwrap();

    assert!(diff.contains("app.lock"));
    assert!(diff.contains("keep.rs"));
}

// =============================================================================
// REVERSE PATCH TESTS
// =============================================================================

#[test]
fn test_reverse_patch_swaps_additions_and_removals() {
    let test_repo = TestRepo::new();
    test_repo.write("file.txt", "before\n");
    test_repo.commit_all("init");
    test_repo.write("file.txt", "after\n");

    let registry = registry_of(&[&test_repo]);
    let changes = collect_changes(&test_repo.repo).unwrap();
    let settings = settings_with_globs(&[], &[]);

    let forward =
        compute_diff(&changes, false, &test_repo.root(), &registry, &settings).unwrap();
    assert!(forward.contains("-before"));
    assert!(forward.contains("+after"));

    let reversed =
        compute_diff(&changes, true, &test_repo.root(), &registry, &settings).unwrap();
    assert!(reversed.contains("+before"));
    assert!(reversed.contains("-after"));
}

// =============================================================================
// PLACEHOLDER REPOSITORY TESTS
// =============================================================================

#[test]
fn test_empty_registry_diffs_through_project_placeholder() {
    let test_repo = repo_with_pending("pending.txt");

    let registry = RepositoryRegistry::new();
    let changes = collect_changes(&test_repo.repo).unwrap();
    let settings = settings_with_globs(&[], &[]);

    let diff = compute_diff(&changes, false, &test_repo.root(), &registry, &settings).unwrap();

    assert!(diff.starts_with(&header(&test_repo)));
    assert!(diff.contains("pending.txt"));
    // Grouping borrowed a placeholder; the registry was not touched.
    assert!(registry.is_empty());
}

// =============================================================================
// BRANCH RESOLUTION TESTS
// =============================================================================

#[test]
fn test_majority_branch_across_real_repositories() {
    let r1 = TestRepo::new();
    r1.write("base.txt", "base\n");
    r1.commit_all("init");
    r1.checkout_branch("feature/login");
    r1.write("a.rs", "a\n");
    r1.write("b.rs", "b\n");

    let r2 = repo_with_pending("c.rs");

    let registry = registry_of(&[&r1, &r2]);
    let mut changes = collect_changes(&r1.repo).unwrap();
    changes.extend(collect_changes(&r2.repo).unwrap());
    assert_eq!(changes.len(), 3);

    let notifier = RecordingNotifier::default();
    let branch = common_branch(&changes, &registry, &notifier);

    assert_eq!(branch, "feature/login");
    assert_eq!(notifier.count(), 0);
}

#[test]
fn test_unresolvable_changes_fall_back_to_main_with_one_warning() {
    let registry = RepositoryRegistry::new();
    let changes = vec![
        Change::new("/nowhere/a.rs", ChangeKind::Modified),
        Change::new("/nowhere/b.rs", ChangeKind::Added),
    ];

    let notifier = RecordingNotifier::default();
    let branch = common_branch(&changes, &registry, &notifier);

    assert_eq!(branch, "main");
    assert_eq!(notifier.count(), 1);
}

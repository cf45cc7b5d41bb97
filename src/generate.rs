//! Generation pipeline: changes to diff to prompt to commit message.
//!
//! Orchestrates change collection, diff rendering, branch resolution,
//! prompt construction, the token budget check, and the completion call.

use std::path::PathBuf;

use async_trait::async_trait;
use dialoguer::Confirm;
use git2::Repository;
use tracing::debug;

use crate::error::{CompletionError, GenerateError, VcsError};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::openai::{ClientConfig, OpenAiClient};
use crate::prompt::construct_prompt;
use crate::settings::Settings;
use crate::tokens::{ModelRegistry, is_prompt_too_large};
use crate::vcs::{
    Change, RepoInfo, RepositoryRegistry, collect_changes, common_branch, compute_diff,
    stage_and_commit,
};

/// Configuration for one generation run, derived from CLI flags.
pub struct GenerateOptions {
    pub project_root: PathBuf,
    /// Additional repository roots beyond the project root.
    pub extra_roots: Vec<PathBuf>,
    pub reverse: bool,
    pub completions: u32,
    pub commit: bool,
}

/// Chat-completion boundary, kept as a trait so the pipeline can run
/// against a fake in tests.
#[async_trait]
pub trait CompletionBackend {
    async fn complete(
        &self,
        model_id: &str,
        temperature: f32,
        prompt: &str,
        completions: u32,
    ) -> Result<String, CompletionError>;
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn complete(
        &self,
        model_id: &str,
        temperature: f32,
        prompt: &str,
        completions: u32,
    ) -> Result<String, CompletionError> {
        self.generate(model_id, temperature, prompt, completions).await
    }
}

/// Run the full generation flow against the configured API, printing the
/// message and optionally committing it.
pub async fn run_generate(
    options: GenerateOptions,
    settings: &Settings,
) -> Result<(), GenerateError> {
    // ── Stage 1: Collect pending changes ──
    let mut registry = RepositoryRegistry::new();
    let changes = gather_changes(&options, &mut registry)?;
    println!(
        "Analyzing {} pending change(s) across {} repository root(s)...",
        changes.len(),
        registry.len()
    );

    // ── Stage 2: Generate the message ──
    let config = ClientConfig::from_settings(settings)?;
    let client = OpenAiClient::new(&config)?;
    let message = generate_message(
        &changes,
        &options,
        settings,
        &registry,
        &client,
        &ConsoleNotifier,
    )
    .await?;

    println!();
    println!("{message}");

    // ── Stage 3: Optional commit ──
    if options.commit {
        apply_commit(&registry, &message)?;
    }

    Ok(())
}

/// Produce a commit message for the given changes. This is the testable
/// core of [`run_generate`]; it never touches the terminal.
pub async fn generate_message(
    changes: &[Change],
    options: &GenerateOptions,
    settings: &Settings,
    registry: &RepositoryRegistry,
    backend: &dyn CompletionBackend,
    notifier: &dyn Notifier,
) -> Result<String, GenerateError> {
    generate_with_model_registry(
        changes,
        options,
        settings,
        registry,
        &ModelRegistry::default(),
        backend,
        notifier,
    )
    .await
}

async fn generate_with_model_registry(
    changes: &[Change],
    options: &GenerateOptions,
    settings: &Settings,
    registry: &RepositoryRegistry,
    models: &ModelRegistry,
    backend: &dyn CompletionBackend,
    notifier: &dyn Notifier,
) -> Result<String, GenerateError> {
    if changes.is_empty() {
        return Err(GenerateError::NoChanges);
    }

    let diff = compute_diff(
        changes,
        options.reverse,
        &options.project_root,
        registry,
        settings,
    )?;
    if diff.trim().is_empty() {
        return Err(GenerateError::AllChangesExcluded);
    }

    let branch = common_branch(changes, registry, notifier);
    let prompt = construct_prompt(settings.prompt_template(), &diff, &branch, settings.locale());
    debug!("Prompt is {} chars on branch '{branch}'", prompt.len());

    // Refuse oversized prompts before anything reaches the network.
    if is_prompt_too_large(&prompt, settings.model_id(), models)? {
        return Err(GenerateError::PromptTooLarge(settings.model_id().to_string()));
    }

    let message = backend
        .complete(
            settings.model_id(),
            settings.temperature(),
            &prompt,
            options.completions,
        )
        .await?;
    Ok(message)
}

/// Open every requested root, record it in the registry, and gather its
/// pending changes.
fn gather_changes(
    options: &GenerateOptions,
    registry: &mut RepositoryRegistry,
) -> Result<Vec<Change>, GenerateError> {
    let mut changes = Vec::new();
    for root in std::iter::once(&options.project_root).chain(options.extra_roots.iter()) {
        let repo = Repository::open(root).map_err(|source| VcsError::OpenRepository {
            path: root.clone(),
            source,
        })?;
        registry.register(RepoInfo::from_repository(&repo)?);
        changes.extend(collect_changes(&repo)?);
    }
    if changes.is_empty() {
        return Err(GenerateError::NoChanges);
    }
    Ok(changes)
}

/// Stage and commit with the generated message, after confirmation.
/// Only applies when exactly one repository is involved.
fn apply_commit(registry: &RepositoryRegistry, message: &str) -> Result<(), GenerateError> {
    if registry.len() != 1 {
        eprintln!(
            "Skipping commit: {} repositories are involved, commit each one separately",
            registry.len()
        );
        return Ok(());
    }

    println!();
    let confirmed = Confirm::new()
        .with_prompt("Create a commit with this message?")
        .default(true)
        .interact()
        .map_err(|_| GenerateError::Cancelled)?;
    if !confirmed {
        println!("Commit skipped");
        return Ok(());
    }

    let root = &registry.repositories()[0].root;
    let repo = Repository::open(root).map_err(|source| VcsError::OpenRepository {
        path: root.clone(),
        source,
    })?;
    let oid = stage_and_commit(&repo, message).map_err(GenerateError::from)?;
    println!("Created commit {oid}");
    Ok(())
}

//! Error types for scrivener modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from settings loading and validation.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid exclusion glob '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error(
        "No API key configured. Set api_key in the config file or the OPENAI_API_KEY environment variable"
    )]
    MissingApiKey,
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Failed to open repository at {path}: {source}")]
    OpenRepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Failed to resolve HEAD: {0}")]
    HeadResolution(#[source] git2::Error),

    #[error("Failed to collect diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Failed to stage changes: {0}")]
    StagingFailed(#[source] git2::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] git2::Error),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),
}

/// Errors from the token budget check.
#[derive(Error, Debug)]
pub enum TokenBudgetError {
    #[error("Failed to load tokenizer encoding '{encoding}': {message}")]
    EncodingUnavailable {
        encoding: &'static str,
        message: String,
    },
}

/// Errors from the OpenAI-compatible API client.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {endpoint} failed: {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error ({status}): {body}")]
    ApiError {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse API response: {0}")]
    ParseFailed(String),

    #[error("No data in response")]
    NoData,

    #[error("Failed to retrieve models from OpenAI API: {0}")]
    ModelListingFailed(String),
}

/// Errors from the end-to-end generation pipeline.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("No changes to commit (working tree is clean)")]
    NoChanges,

    #[error("All changes are excluded by the configured glob patterns")]
    AllChangesExcluded,

    #[error("Prompt exceeds the context window of model '{0}'")]
    PromptTooLarge(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    TokenBudget(#[from] TokenBudgetError),
}

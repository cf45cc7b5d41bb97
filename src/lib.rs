//! scrivener - A CLI tool that generates commit messages from working-tree
//! diffs using an OpenAI-compatible API.
//!
//! # Overview
//!
//! scrivener gathers pending changes across one or more git repositories,
//! renders them as a unified diff grouped per repository, folds the diff
//! into a localized prompt template, checks the prompt against the
//! configured model's context window, and asks a chat-completion API for a
//! commit message.

pub mod error;
pub mod generate;
pub mod notify;
pub mod openai;
pub mod prompt;
pub mod settings;
pub mod tokens;
pub mod vcs;

// Re-export commonly used types
pub use error::{CompletionError, GenerateError, SettingsError, TokenBudgetError, VcsError};
pub use generate::{CompletionBackend, GenerateOptions, generate_message, run_generate};
pub use notify::{ConsoleNotifier, Notifier};
pub use openai::{ClientConfig, ModelInfo, OpenAiClient, verify_configuration};
pub use settings::Settings;
pub use tokens::{ModelDescriptor, ModelRegistry, is_prompt_too_large};
pub use vcs::{Change, ChangeKind, RepoInfo, RepositoryRegistry, compute_diff};

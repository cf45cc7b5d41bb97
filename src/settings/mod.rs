//! Layered configuration: an application scope in the user's config
//! directory and a project scope at the repository root.
//!
//! Both scopes are optional TOML files; a missing file means defaults. The
//! project scope can override the prompt template and contributes its own
//! exclusion globs, which apply in addition to the application-scope ones.

pub mod exclude;
pub mod locale;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::SettingsError;
use exclude::PathExcluder;
use locale::Locale;

/// Default prompt template. `{locale}` and `{diff}` are substituted at
/// prompt-construction time; custom templates may also use `{branch}`.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Write an insightful but concise commit message in a complete sentence in present tense for the following diff without prefacing it with anything. The response must be in the language {locale} and must not exceed 74 characters:\n{diff}";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_MODEL_ID: &str = "gpt-3.5-turbo";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const APP_CONFIG_DIR: &str = "scrivener";
const APP_CONFIG_FILE: &str = "config.toml";
const PROJECT_CONFIG_FILE: &str = ".scrivener.toml";

/// Application-scope configuration (user-wide).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model_id: String,
    pub temperature: f32,
    /// API host override; `None` means the default OpenAI host.
    pub host: Option<String>,
    /// Proxy URL; `None` means a direct connection.
    pub proxy: Option<String>,
    pub timeout_secs: u64,
    pub locale: Locale,
    pub prompt_template: String,
    pub api_key: Option<String>,
    pub excluded_paths: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            host: None,
            proxy: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            locale: Locale::default(),
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            api_key: None,
            excluded_paths: vec!["**/*.lock".to_string()],
        }
    }
}

/// Project-scope configuration (per repository checkout).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub prompt_template: Option<String>,
    pub excluded_paths: Vec<String>,
}

/// Merged view over both scopes, with the exclusion globs already compiled.
pub struct Settings {
    app: AppConfig,
    project: ProjectConfig,
    app_excluder: PathExcluder,
    project_excluder: PathExcluder,
}

impl Settings {
    /// Load both scopes. Missing files fall back to defaults; unreadable or
    /// malformed files are errors.
    pub fn load(project_root: &Path) -> Result<Self, SettingsError> {
        let app: AppConfig = match app_config_path() {
            Some(path) => read_config(&path)?.unwrap_or_default(),
            None => AppConfig::default(),
        };
        let project: ProjectConfig =
            read_config(&project_root.join(PROJECT_CONFIG_FILE))?.unwrap_or_default();
        Self::from_parts(app, project)
    }

    /// Build settings from already-parsed configs, compiling the glob sets.
    pub fn from_parts(app: AppConfig, project: ProjectConfig) -> Result<Self, SettingsError> {
        let app_excluder = PathExcluder::new(&app.excluded_paths)?;
        let project_excluder = PathExcluder::new(&project.excluded_paths)?;
        Ok(Self {
            app,
            project,
            app_excluder,
            project_excluder,
        })
    }

    /// True when either scope's exclusion globs match the path. A change
    /// makes it into the diff only when this returns false.
    pub fn is_path_excluded(&self, path: &str) -> bool {
        self.app_excluder.is_match(path) || self.project_excluder.is_match(path)
    }

    pub fn model_id(&self) -> &str {
        &self.app.model_id
    }

    pub fn temperature(&self) -> f32 {
        self.app.temperature
    }

    pub fn host(&self) -> Option<&str> {
        self.app.host.as_deref()
    }

    pub fn proxy(&self) -> Option<&str> {
        self.app.proxy.as_deref()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.app.timeout_secs
    }

    pub fn locale(&self) -> &Locale {
        &self.app.locale
    }

    /// The project-scope template wins over the application-scope one.
    pub fn prompt_template(&self) -> &str {
        self.project
            .prompt_template
            .as_deref()
            .unwrap_or(&self.app.prompt_template)
    }

    /// API key from the environment or the config file, in that order.
    pub fn api_key(&self) -> Result<String, SettingsError> {
        resolve_api_key(std::env::var(ENV_API_KEY).ok(), self.app.api_key.as_deref())
    }
}

/// Blank values count as unset in both sources.
fn resolve_api_key(
    env_key: Option<String>,
    config_key: Option<&str>,
) -> Result<String, SettingsError> {
    if let Some(key) = env_key
        && !key.trim().is_empty()
    {
        return Ok(key);
    }
    config_key
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(SettingsError::MissingApiKey)
}

fn app_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_CONFIG_DIR).join(APP_CONFIG_FILE))
}

fn read_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, SettingsError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config file at {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(SettingsError::ReadFailed {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let parsed = toml::from_str(&raw).map_err(|source| SettingsError::ParseFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(parsed))
}

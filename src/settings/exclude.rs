//! Glob-based path exclusion.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::SettingsError;

/// A compiled set of exclusion globs for one settings scope.
///
/// Matching follows path-matcher rules rather than substring rules: `*` and
/// `?` stay within a single path segment, `**` crosses segments, and a
/// pattern must cover the entire path. An empty set matches nothing; a lone
/// `**` matches everything.
#[derive(Debug)]
pub struct PathExcluder {
    set: GlobSet,
}

impl PathExcluder {
    pub fn new(patterns: &[String]) -> Result<Self, SettingsError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| SettingsError::InvalidGlob {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|source| SettingsError::InvalidGlob {
                pattern: patterns.join(", "),
                source,
            })?;
        Ok(Self { set })
    }

    /// True when any configured glob matches the full path.
    pub fn is_match(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

impl Default for PathExcluder {
    fn default() -> Self {
        Self {
            set: GlobSet::empty(),
        }
    }
}

//! Locale handling for prompt construction.

use serde::Deserialize;

/// Language names for the tags we expect to see in configs. Region subtags
/// are ignored ("en-US" and "en" both map to "English"); unknown tags pass
/// through verbatim so the API still receives something usable.
static DISPLAY_LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("cs", "Czech"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("zh", "Chinese"),
];

/// A configured language tag such as `en` or `de-AT`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: impl Into<String>) -> Self {
        Locale(tag.into())
    }

    /// Human-readable language name substituted for the `{locale}`
    /// placeholder in prompt templates.
    pub fn display_language(&self) -> &str {
        let primary = self.0.split(['-', '_']).next().unwrap_or(&self.0);
        DISPLAY_LANGUAGES
            .iter()
            .find(|(tag, _)| tag.eq_ignore_ascii_case(primary))
            .map(|(_, name)| *name)
            .unwrap_or(&self.0)
    }

    pub fn as_tag(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

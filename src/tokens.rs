//! Token budget checking against known model context windows.

use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::error::TokenBudgetError;

/// Tokenizer encodings used by the models in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEncoding {
    O200kBase,
    Cl100kBase,
    P50kBase,
    R50kBase,
}

impl TokenEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TokenEncoding::O200kBase => "o200k_base",
            TokenEncoding::Cl100kBase => "cl100k_base",
            TokenEncoding::P50kBase => "p50k_base",
            TokenEncoding::R50kBase => "r50k_base",
        }
    }

    fn load(&self) -> Result<CoreBPE, TokenBudgetError> {
        let bpe = match self {
            TokenEncoding::O200kBase => tiktoken_rs::o200k_base(),
            TokenEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
            TokenEncoding::P50kBase => tiktoken_rs::p50k_base(),
            TokenEncoding::R50kBase => tiktoken_rs::r50k_base(),
        };
        bpe.map_err(|e| TokenBudgetError::EncodingUnavailable {
            encoding: self.name(),
            message: e.to_string(),
        })
    }
}

/// Static metadata for one known model family.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub name: &'static str,
    pub max_context_length: usize,
    pub encoding: TokenEncoding,
}

/// Known models, resolved by substring match against a configured model id.
///
/// Ids from the API carry suffixes ("gpt-4-0613") and custom deployments
/// carry prefixes, so resolution looks for registry names *contained in*
/// the configured id and picks the longest one: "gpt-4-32k-0613" resolves
/// to `gpt-4-32k`, not `gpt-4`.
pub struct ModelRegistry {
    entries: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    pub fn with_entries(entries: Vec<ModelDescriptor>) -> Self {
        Self { entries }
    }

    /// The longest registry name contained in the model id, or `None` when
    /// the id matches nothing we know.
    pub fn resolve(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.entries
            .iter()
            .filter(|descriptor| model_id.contains(descriptor.name))
            .max_by_key(|descriptor| descriptor.name.len())
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        use TokenEncoding::*;
        let entry = |name, max_context_length, encoding| ModelDescriptor {
            name,
            max_context_length,
            encoding,
        };
        Self {
            entries: vec![
                entry("gpt-4o-mini", 128_000, O200kBase),
                entry("gpt-4o", 128_000, O200kBase),
                entry("gpt-4-32k", 32_768, Cl100kBase),
                entry("gpt-4-turbo", 128_000, Cl100kBase),
                entry("gpt-4", 8_192, Cl100kBase),
                entry("gpt-3.5-turbo-16k", 16_384, Cl100kBase),
                entry("gpt-3.5-turbo", 4_096, Cl100kBase),
                entry("text-davinci-003", 4_097, P50kBase),
                entry("text-davinci-002", 4_097, P50kBase),
                entry("davinci", 2_049, R50kBase),
                entry("curie", 2_049, R50kBase),
                entry("babbage", 2_049, R50kBase),
                entry("ada", 2_049, R50kBase),
            ],
        }
    }
}

/// True when the prompt's token count exceeds the matched model's context
/// window. An id that matches no registry entry disables the check; the
/// remote API is the authority for models we know nothing about.
pub fn is_prompt_too_large(
    prompt: &str,
    model_id: &str,
    registry: &ModelRegistry,
) -> Result<bool, TokenBudgetError> {
    let Some(descriptor) = registry.resolve(model_id) else {
        debug!("Model '{model_id}' not in registry, skipping token budget check");
        return Ok(false);
    };
    let bpe = descriptor.encoding.load()?;
    let count = bpe.encode_with_special_tokens(prompt).len();
    debug!(
        "Prompt is {count} tokens against a {} limit for '{}'",
        descriptor.max_context_length, descriptor.name
    );
    Ok(count > descriptor.max_context_length)
}

//! Model-listing response shapes, typed and lenient.
//!
//! Servers claiming OpenAI compatibility disagree about the listing
//! response: the reference shape is an object with a `data` array, but
//! some return a bare array, and many omit per-model fields. The typed
//! shape here is strict; the lenient parsers fill in defaults.

use serde::Deserialize;
use serde_json::Value;

use crate::error::CompletionError;

/// Owner reported when a server omits `owned_by`.
const DEFAULT_OWNER: &str = "system";

/// One available model as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub created: i64,
    pub owned_by: String,
}

/// Reference shape: `{"data": [...]}` with all per-model fields required.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelsPage {
    pub data: Vec<TypedModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TypedModel {
    pub id: String,
    pub created: i64,
    pub owned_by: String,
}

impl From<TypedModel> for ModelInfo {
    fn from(model: TypedModel) -> Self {
        ModelInfo {
            id: model.id,
            created: model.created,
            owned_by: model.owned_by,
        }
    }
}

/// Parse a bare JSON array of model objects, defaulting missing fields.
pub(crate) fn parse_flat_array(body: &str) -> Result<Vec<ModelInfo>, CompletionError> {
    let values: Vec<Value> =
        serde_json::from_str(body).map_err(|e| CompletionError::ParseFailed(e.to_string()))?;
    Ok(values.iter().map(lenient_model).collect())
}

/// Parse `{"data": [...]}` leniently; a missing or non-array `data` is a
/// failure.
pub(crate) fn parse_data_object(body: &str) -> Result<Vec<ModelInfo>, CompletionError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| CompletionError::ParseFailed(e.to_string()))?;
    let data = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or(CompletionError::NoData)?;
    Ok(data.iter().map(lenient_model).collect())
}

fn lenient_model(value: &Value) -> ModelInfo {
    ModelInfo {
        id: value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        created: value.get("created").and_then(Value::as_i64).unwrap_or(0),
        owned_by: value
            .get("owned_by")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_OWNER)
            .to_string(),
    }
}

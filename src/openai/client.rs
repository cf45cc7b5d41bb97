//! HTTP client for chat completion and model listing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::ClientConfig;
use super::models::{ModelInfo, ModelsPage, parse_data_object, parse_flat_array};
use crate::error::CompletionError;

/// Cap on generated tokens per completion request.
const MAX_COMPLETION_TOKENS: u32 = 200;
/// Sampling is tuned through temperature only; the rest stays fixed.
const TOP_P: f32 = 1.0;
const FREQUENCY_PENALTY: f32 = 0.0;
const PRESENCE_PENALTY: f32 = 0.0;
/// Returned when the API answers without any message content.
const EMPTY_RESPONSE_FALLBACK: &str = "API returned an empty response.";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible API.
///
/// One configured `reqwest` client serves both the completion call and
/// every tier of the model-listing fallback, so proxy and timeout settings
/// apply uniformly.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, CompletionError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(proxy_url) = config.proxy.as_deref() {
            let proxy =
                reqwest::Proxy::all(proxy_url).map_err(|source| CompletionError::InvalidProxy {
                    url: proxy_url.to_string(),
                    source,
                })?;
            builder = builder.proxy(proxy);
        }
        let http = builder.build().map_err(CompletionError::ClientBuild)?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
        })
    }

    /// Request a chat completion for the prompt and return the first
    /// choice's content, trimmed. A response without content yields a
    /// fixed placeholder string rather than an error; the API accepted
    /// the request, it just had nothing to say.
    pub async fn generate(
        &self,
        model_id: &str,
        temperature: f32,
        prompt: &str,
        completions: u32,
    ) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: model_id,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            top_p: TOP_P,
            frequency_penalty: FREQUENCY_PENALTY,
            presence_penalty: PRESENCE_PENALTY,
            max_tokens: MAX_COMPLETION_TOKENS,
            n: completions,
        };

        let endpoint = format!("{}/chat/completions", self.base_url);
        debug!("Requesting completion from {endpoint} with model '{model_id}'");
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| CompletionError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;
        let body = check_status(response, &endpoint).await?;

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| CompletionError::ParseFailed(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_else(|| EMPTY_RESPONSE_FALLBACK.to_string());
        Ok(content.trim().to_string())
    }

    /// List available models, negotiating the response shape in a fixed
    /// three-tier sequence.
    ///
    /// 1. the reference shape, strictly typed;
    /// 2. a bare JSON array with lenient per-model fields;
    /// 3. an object whose `data` array is parsed leniently.
    ///
    /// Each tier reissues the GET. When all three fail, the last error is
    /// wrapped in one aggregated failure. This negotiates shapes; it is
    /// not a retry policy and never backs off.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        let typed_err = match self.fetch_models_typed().await {
            Ok(models) => return Ok(models),
            Err(e) => e,
        };
        debug!("Typed model listing failed, trying bare-array shape: {typed_err}");

        let array_err = match self.fetch_models_lenient(parse_flat_array).await {
            Ok(models) => return Ok(models),
            Err(e) => e,
        };
        debug!("Bare-array model listing failed, trying data-object shape: {array_err}");

        let object_err = match self.fetch_models_lenient(parse_data_object).await {
            Ok(models) => return Ok(models),
            Err(e) => e,
        };
        Err(CompletionError::ModelListingFailed(object_err.to_string()))
    }

    async fn fetch_models_typed(&self) -> Result<Vec<ModelInfo>, CompletionError> {
        let body = self.fetch_models_body().await?;
        let page: ModelsPage =
            serde_json::from_str(&body).map_err(|e| CompletionError::ParseFailed(e.to_string()))?;
        Ok(page.data.into_iter().map(ModelInfo::from).collect())
    }

    async fn fetch_models_lenient(
        &self,
        parse: fn(&str) -> Result<Vec<ModelInfo>, CompletionError>,
    ) -> Result<Vec<ModelInfo>, CompletionError> {
        let body = self.fetch_models_body().await?;
        parse(&body)
    }

    async fn fetch_models_body(&self) -> Result<String, CompletionError> {
        let endpoint = format!("{}/models", self.base_url);
        let response = self
            .http
            .get(&endpoint)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|source| CompletionError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;
        check_status(response, &endpoint).await
    }
}

/// Build a client from the given connection parameters and prove it can
/// reach the API by listing models. Any failure along the way is the
/// verification failure.
pub async fn verify_configuration(
    host: Option<&str>,
    api_key: &str,
    proxy: Option<&str>,
    timeout_secs: u64,
) -> Result<(), CompletionError> {
    let config = ClientConfig::new(api_key.to_string(), host, proxy, timeout_secs);
    let client = OpenAiClient::new(&config)?;
    client.list_models().await?;
    Ok(())
}

/// Read the body, converting non-success statuses into API errors.
async fn check_status(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<String, CompletionError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| CompletionError::RequestFailed {
            endpoint: endpoint.to_string(),
            source,
        })?;
    if !status.is_success() {
        return Err(CompletionError::ApiError { status, body });
    }
    Ok(body)
}

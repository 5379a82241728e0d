use crate::prompt::{PromptPlan, Tool};
use crate::traits::PlaceModel;
use crate::SearchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Reads `GEMINI_API_KEY` (or `API_KEY`), `GEMINI_MODEL` and `GEMINI_ENDPOINT`.
    pub fn from_env() -> Result<Self, SearchError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name).and_then(|value| {
                let value = value.trim().to_string();
                if value.is_empty() {
                    None
                } else {
                    Some(value)
                }
            })
        };

        let api_key = read("GEMINI_API_KEY")
            .or_else(|| read("API_KEY"))
            .ok_or(SearchError::MissingCredential)?;

        let mut config = GeminiConfig::new(api_key);
        if let Some(model) = read("GEMINI_MODEL") {
            config.model = model;
        }
        if let Some(endpoint) = read("GEMINI_ENDPOINT") {
            config.endpoint = endpoint;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModelResponse {
    pub text: Option<String>,
    pub candidates: Option<Vec<RawCandidate>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCandidate {
    pub content: Option<RawContent>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContent {
    pub parts: Option<Vec<RawPart>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPart {
    pub text: Option<String>,
    pub thought: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    pub maps: Option<MapsReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsReference {
    pub uri: Option<String>,
    pub title: Option<String>,
    pub place_id: Option<String>,
}

impl RawModelResponse {
    pub fn first_candidate(&self) -> Option<&RawCandidate> {
        self.candidates.as_ref()?.first()
    }

    /// Top-level text when present, otherwise the first candidate's text parts.
    pub fn answer_text(&self) -> Option<String> {
        if let Some(text) = self.text.as_ref().filter(|text| !text.is_empty()) {
            return Some(text.clone());
        }

        let parts = self.first_candidate()?.content.as_ref()?.parts.as_ref()?;
        let joined = parts
            .iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.as_deref())
            .collect::<String>();

        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    pub fn grounding_chunks(&self) -> &[GroundingChunk] {
        self.first_candidate()
            .and_then(|candidate| candidate.grounding_metadata.as_ref())
            .and_then(|metadata| metadata.grounding_chunks.as_deref())
            .unwrap_or_default()
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<WireContent<'a>>,
    tools: Vec<WireTool>,
    tool_config: Option<WireToolConfig>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    google_maps: EmptyObject,
}

#[derive(Debug, Default, Serialize)]
struct EmptyObject {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireToolConfig {
    retrieval_config: WireRetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRetrievalConfig {
    lat_lng: WireLatLng,
}

#[derive(Debug, Serialize)]
struct WireLatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: Option<String>,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_plan(plan: &'a PromptPlan) -> Self {
        let tools = plan
            .tool_config
            .tools
            .iter()
            .map(|tool| match tool {
                Tool::GoogleMaps => WireTool {
                    google_maps: EmptyObject {},
                },
            })
            .collect();

        let tool_config = plan.tool_config.retrieval_bias.map(|location| WireToolConfig {
            retrieval_config: WireRetrievalConfig {
                lat_lng: WireLatLng {
                    latitude: location.latitude,
                    longitude: location.longitude,
                },
            },
        });

        Self {
            contents: vec![WireContent {
                role: "user",
                parts: vec![WirePart {
                    text: &plan.prompt_text,
                }],
            }],
            tools,
            tool_config,
        }
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    generate_url: Url,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, SearchError> {
        let api_key = config.api_key.trim().to_string();
        if api_key.is_empty() {
            return Err(SearchError::MissingCredential);
        }

        let mut endpoint = config.endpoint.trim().to_string();
        if !endpoint.ends_with('/') {
            endpoint.push('/');
        }
        let generate_url = Url::parse(&endpoint)?
            .join(&format!("v1beta/models/{}:generateContent", config.model))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: config.model,
            generate_url,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PlaceModel for GeminiClient {
    async fn generate(&self, plan: &PromptPlan) -> Result<RawModelResponse, SearchError> {
        debug!(
            model = %self.model,
            biased = plan.tool_config.retrieval_bias.is_some(),
            "gemini generateContent request"
        );

        let response = self
            .client
            .post(self.generate_url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_plan(plan))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<ProviderErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|error| error.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        status.to_string()
                    } else {
                        body
                    }
                });

            warn!(status = %status, details = %details, "gemini request failed");
            return Err(SearchError::Provider {
                status: status.as_u16(),
                details,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoLocation, SearchFilters};
    use crate::prompt::build_prompt;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn request_without_location_has_no_tool_config() {
        let plan = build_prompt("Av. Paulista, 1000", &SearchFilters::default(), None);
        let value = serde_json::to_value(GenerateContentRequest::from_plan(&plan))
            .expect("request serializes");

        assert_eq!(value["tools"], json!([{ "googleMaps": {} }]));
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], json!(plan.prompt_text));
        assert!(value.get("toolConfig").is_none());
    }

    #[test]
    fn request_with_location_carries_lat_lng() {
        let location = GeoLocation {
            latitude: -22.9068,
            longitude: -43.1729,
        };
        let plan = build_prompt("Minha localização atual", &SearchFilters::default(), Some(location));
        let value = serde_json::to_value(GenerateContentRequest::from_plan(&plan))
            .expect("request serializes");

        assert_eq!(
            value["toolConfig"],
            json!({ "retrievalConfig": { "latLng": { "latitude": -22.9068, "longitude": -43.1729 } } })
        );
    }

    #[test]
    fn answer_text_falls_back_to_candidate_parts() {
        let raw: RawModelResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "internal", "thought": true },
                    { "text": "**Drogasil** fica a 300m." },
                    { "text": " Aberta 24h." }
                ]}
            }]
        }))
        .expect("response parses");

        assert_eq!(
            raw.answer_text().as_deref(),
            Some("**Drogasil** fica a 300m. Aberta 24h.")
        );
    }

    #[test]
    fn missing_nesting_yields_no_chunks() {
        let raw: RawModelResponse =
            serde_json::from_value(json!({ "candidates": [{ "groundingMetadata": null }] }))
                .expect("response parses");
        assert!(raw.grounding_chunks().is_empty());
        assert_eq!(raw.answer_text(), None);
    }

    #[test]
    fn config_from_lookup_prefers_gemini_key_and_ignores_blanks() {
        let vars = HashMap::from([
            ("GEMINI_API_KEY", "  "),
            ("API_KEY", "fallback-key"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
        ]);
        let config = GeminiConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
            .expect("fallback key is used");

        assert_eq!(config.api_key, "fallback-key");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn config_without_key_is_missing_credential() {
        let error = GeminiConfig::from_lookup(|_| None).expect_err("no key configured");
        assert!(matches!(error, SearchError::MissingCredential));
    }

    #[test]
    fn client_builds_generate_url_from_endpoint() {
        let client = GeminiClient::new(
            GeminiConfig::new("key").with_endpoint("http://127.0.0.1:8080/proxy"),
        )
        .expect("client builds");
        assert_eq!(
            client.generate_url.as_str(),
            "http://127.0.0.1:8080/proxy/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}

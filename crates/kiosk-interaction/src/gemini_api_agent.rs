//! GeminiApiAgent - Direct REST API implementation for Gemini.
//!
//! Calls `models/{model}:generateContent` and supports maps-grounded
//! retrieval through the `googleMaps` tool.

use async_trait::async_trait;
use kiosk_core::answerer::{AnswerRequest, Answerer, Grounding, ModelTier};
use kiosk_core::config::ModelSettings;
use kiosk_core::{KioskError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Answerer implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    base_url: String,
    grounded_model: String,
    general_model: String,
}

impl GeminiApiAgent {
    /// Creates a new agent with the provided API key and model settings.
    pub fn new(api_key: impl Into<String>, models: &ModelSettings) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            grounded_model: models.grounded.clone(),
            general_model: models.general.clone(),
        }
    }

    /// Overrides the API base URL (proxies, regional endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the HTTP client, e.g. one built with a request timeout.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Grounded => &self.grounded_model,
            ModelTier::General => &self.general_model,
        }
    }

    async fn send_request(&self, model: &str, body: &GenerateContentRequest) -> Result<String> {
        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                let retryable = err.is_connect() || err.is_timeout();
                KioskError::Answerer {
                    status: None,
                    // the URL carries the API key
                    message: format!("Gemini API request failed: {}", err.without_url()),
                    retryable,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            KioskError::answerer(format!("Failed to parse Gemini response: {}", err.without_url()))
        })?;

        Ok(extract_text_response(parsed))
    }
}

#[async_trait]
impl Answerer for GeminiApiAgent {
    async fn generate(&self, request: AnswerRequest) -> Result<String> {
        let model = self.model_for(request.tier).to_string();
        let body = GenerateContentRequest::from(&request);
        tracing::debug!(
            "[Gemini] generateContent model={} grounded={}",
            model,
            request.grounding.is_grounded()
        );
        self.send_request(&model, &body).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

impl From<&AnswerRequest> for GenerateContentRequest {
    fn from(request: &AnswerRequest) -> Self {
        let contents = vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: request.contents.clone(),
            }],
        }];

        let system_instruction = request.system_instruction.as_ref().map(|text| Content {
            role: None,
            parts: vec![Part { text: text.clone() }],
        });

        let (tools, tool_config) = match request.grounding {
            Grounding::None => (Vec::new(), None),
            Grounding::Maps => (vec![Tool::google_maps()], None),
            Grounding::MapsAt(position) => (
                vec![Tool::google_maps()],
                Some(ToolConfig {
                    retrieval_config: RetrievalConfig {
                        lat_lng: LatLng {
                            latitude: position.lat,
                            longitude: position.lng,
                        },
                    },
                }),
            ),
        };

        Self {
            contents,
            system_instruction,
            tools,
            tool_config,
        }
    }
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_maps: GoogleMaps,
}

impl Tool {
    fn google_maps() -> Self {
        Self {
            google_maps: GoogleMaps {},
        }
    }
}

#[derive(Serialize)]
struct GoogleMaps {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfig {
    retrieval_config: RetrievalConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrievalConfig {
    lat_lng: LatLng,
}

#[derive(Serialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Joins the text parts of the first candidate.
///
/// A reply without text is not an error; callers decide what an empty
/// answer means for them.
fn extract_text_response(response: GenerateContentResponse) -> String {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        tracing::warn!("[Gemini] response carried no text");
    }
    text
}

fn map_http_error(status: StatusCode, body: String) -> KioskError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    KioskError::Answerer {
        status: Some(status.as_u16()),
        message,
        retryable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_core::Position;
    use serde_json::json;

    #[test]
    fn test_request_body_with_anchored_grounding() {
        let request = AnswerRequest::new("find hospital")
            .with_system_instruction("You are a kiosk")
            .grounded(Grounding::MapsAt(Position::new(28.6415, 77.2197)));

        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "find hospital" }] }],
                "systemInstruction": { "parts": [{ "text": "You are a kiosk" }] },
                "tools": [{ "googleMaps": {} }],
                "toolConfig": {
                    "retrievalConfig": { "latLng": { "latitude": 28.6415, "longitude": 77.2197 } }
                }
            })
        );
    }

    #[test]
    fn test_request_body_without_grounding_omits_tools() {
        let request = AnswerRequest::new("hello");
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert!(body.get("tools").is_none());
        assert!(body.get("toolConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_maps_grounding_has_no_anchor() {
        let request = AnswerRequest::new("name this area").grounded(Grounding::Maps);
        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();

        assert_eq!(body["tools"], json!([{ "googleMaps": {} }]));
        assert!(body.get("toolConfig").is_none());
    }

    #[test]
    fn test_model_selection_by_tier() {
        let agent = GeminiApiAgent::new("key", &ModelSettings::default());
        assert_eq!(agent.model_for(ModelTier::Grounded), "gemini-2.5-flash");
        assert_eq!(agent.model_for(ModelTier::General), "gemini-3-flash-preview");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "City Hospital | " }, { "text": "12 MG Road" }] }
            }]
        }))
        .unwrap();
        assert_eq!(extract_text_response(response), "City Hospital | 12 MG Road");
    }

    #[test]
    fn test_extract_text_without_candidates_is_empty() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(extract_text_response(response), "");
    }

    #[test]
    fn test_map_http_error_parses_envelope() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string());

        match err {
            KioskError::Answerer {
                status,
                message,
                retryable,
            } => {
                assert_eq!(status, Some(429));
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
                assert!(retryable);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_map_http_error_with_plain_body() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "bad".to_string());
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("bad"));
    }
}

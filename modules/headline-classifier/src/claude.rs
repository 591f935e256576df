// Claude-backed stance classifier. Forces a single tool call whose input is
// the verdict, so the answer is always structured.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClassifierError;
use crate::stance::{StanceClassifier, StanceLabel};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const VERDICT_TOOL: &str = "record_stance";
const DEFAULT_MAX_INPUT_CHARS: usize = 1024;

/// The structured answer requested from the model.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct StanceVerdict {
    /// Exactly one of the candidate labels.
    label: String,
    /// Confidence in the chosen label, between 0 and 1.
    confidence: f64,
}

pub struct ClaudeStanceClassifier {
    api_key: String,
    model: String,
    labels: Vec<String>,
    max_input_chars: usize,
    base_url: String,
    http: reqwest::Client,
}

impl ClaudeStanceClassifier {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            labels,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            base_url: ANTHROPIC_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    fn headers(&self) -> Result<HeaderMap, ClassifierError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| ClassifierError::Unavailable(format!("invalid API key: {e}")))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn system_prompt(&self) -> String {
        format!(
            "You classify the stance of a single news headline. \
             Choose exactly one label from: {}. \
             Report your confidence in that label as a number between 0 and 1. \
             Answer only by calling the {VERDICT_TOOL} tool.",
            self.labels.join(", ")
        )
    }

    /// Verdict schema with the label constrained to the candidate set.
    fn verdict_schema(&self) -> serde_json::Value {
        let mut schema = serde_json::to_value(schema_for!(StanceVerdict)).unwrap_or_default();
        if let serde_json::Value::Object(map) = &mut schema {
            map.remove("$schema");
            map.remove("title");
            map.insert(
                "additionalProperties".to_string(),
                serde_json::Value::Bool(false),
            );
        }
        if let Some(label) = schema.pointer_mut("/properties/label") {
            label["enum"] = serde_json::json!(self.labels);
        }
        schema
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            max_tokens: 256,
            temperature: 0.0,
            system: self.system_prompt(),
            messages: vec![WireMessage {
                role: "user".to_string(),
                content: truncate_to_chars(text, self.max_input_chars).to_string(),
            }],
            tools: vec![ToolDefinitionWire {
                name: VERDICT_TOOL.to_string(),
                description: "Record the stance label and confidence for the headline."
                    .to_string(),
                input_schema: self.verdict_schema(),
            }],
            tool_choice: serde_json::json!({ "type": "tool", "name": VERDICT_TOOL }),
        }
    }

    fn parse_verdict(&self, response: ChatResponse) -> Result<StanceLabel, ClassifierError> {
        let input = response
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { name, input, .. } if name == VERDICT_TOOL => Some(input),
                _ => None,
            })
            .ok_or_else(|| ClassifierError::Malformed("no verdict in response".to_string()))?;

        let verdict: StanceVerdict = serde_json::from_value(input)?;

        let label = self
            .labels
            .iter()
            .find(|candidate| candidate.eq_ignore_ascii_case(verdict.label.trim()))
            .ok_or_else(|| {
                ClassifierError::Malformed(format!("unknown label '{}'", verdict.label))
            })?;

        if !(0.0..=1.0).contains(&verdict.confidence) {
            return Err(ClassifierError::Malformed(format!(
                "confidence {} outside [0, 1]",
                verdict.confidence
            )));
        }

        Ok(StanceLabel::new(label.clone(), verdict.confidence))
    }
}

#[async_trait]
impl StanceClassifier for ClaudeStanceClassifier {
    async fn classify(&self, text: &str) -> Result<StanceLabel, ClassifierError> {
        let url = format!("{}/messages", self.base_url);
        let request = self.build_request(text);

        debug!(model = %self.model, chars = text.chars().count(), "Claude stance request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(format!(
                "Claude API error ({status}): {error_text}"
            )));
        }

        let body: ChatResponse = response.json().await?;
        self.parse_verdict(body)
    }
}

/// Longest prefix of `s` with at most `max_chars` characters.
fn truncate_to_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<WireMessage>,
    tools: Vec<ToolDefinitionWire>,
    tool_choice: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ToolDefinitionWire {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    #[allow(dead_code)]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        #[allow(dead_code)]
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

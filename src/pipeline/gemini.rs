//! Gemini implementation of the idea pipeline
//!
//! Talks to the `generateContent` REST endpoint. Analysis and deep dives try
//! the primary model and retry once on the fallback model. Refine uses its
//! own model without fallback, and chat stays on the primary model.
//! Illustration failures are swallowed so the text analysis still lands in
//! the vault.

use crate::config::PipelineConfig;
use crate::error::{IdeaflowError, Result};
use crate::pipeline::{
    parse_analysis, parse_refinement, CaptureInput, ChatTurn, IdeaAnalysis, IdeaPipeline,
    Refinement, EMPTY_EXPANSION,
};
use crate::prompts;
use crate::storage::Idea;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Gemini API client
///
/// # Examples
///
/// ```no_run
/// use ideaflow::config::PipelineConfig;
/// use ideaflow::pipeline::{CaptureInput, GeminiPipeline, IdeaPipeline};
///
/// # async fn example() -> ideaflow::error::Result<()> {
/// let config = PipelineConfig {
///     api_key: Some("secret".to_string()),
///     ..Default::default()
/// };
/// let pipeline = GeminiPipeline::new(config)?;
/// let analysis = pipeline
///     .analyze(CaptureInput::Text("a rooftop garden club".into()), false)
///     .await?;
/// println!("{}", analysis.title);
/// # Ok(())
/// # }
/// ```
pub struct GeminiPipeline {
    client: Client,
    config: PipelineConfig,
    api_key: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    fn first_inline_data(&self) -> Option<&InlineData> {
        self.first_parts()
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }

    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

fn user_content(parts: Vec<Part>) -> Content {
    Content {
        role: Some("user".to_string()),
        parts,
    }
}

/// Earlier turns followed by the new user message
fn chat_contents(history: &[ChatTurn], message: &str) -> Vec<Content> {
    history
        .iter()
        .map(|turn| Content {
            role: Some(turn.role.as_str().to_string()),
            parts: vec![Part::text(turn.text.as_str())],
        })
        .chain(std::iter::once(user_content(vec![Part::text(message)])))
        .collect()
}

/// Response schema shared by the audio and text analysis requests
fn analysis_generation_config() -> serde_json::Value {
    json!({
        "responseMimeType": "application/json",
        "responseSchema": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "transcript": { "type": "STRING" },
                "summary": { "type": "STRING" },
                "actionItems": { "type": "ARRAY", "items": { "type": "STRING" } },
                "tags": { "type": "ARRAY", "items": { "type": "STRING" } },
                "category": { "type": "STRING", "enum": ["Work", "Personal", "Creative", "Other"] },
                "imagePrompt": { "type": "STRING" }
            },
            "required": ["title", "transcript", "summary", "actionItems", "tags", "category", "imagePrompt"]
        }
    })
}

impl GeminiPipeline {
    /// Create a new Gemini pipeline
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` when no API key is configured, or an
    /// error if the HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            IdeaflowError::MissingCredentials(
                "set GEMINI_API_KEY or pipeline.api_key".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ideaflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IdeaflowError::Pipeline(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini pipeline: primary={}, fallback={}",
            config.primary_model,
            config.fallback_model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        )
    }

    async fn generate(&self, model: &str, request: &GenerateRequest) -> Result<GenerateResponse> {
        tracing::debug!(model = %model, "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                IdeaflowError::Pipeline(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(IdeaflowError::Pipeline(format!(
                "Gemini returned error {} for {}: {}",
                status, model, error_text
            ))
            .into());
        }

        response.json::<GenerateResponse>().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            IdeaflowError::Pipeline(format!("Failed to parse Gemini response: {}", e)).into()
        })
    }

    /// Try the primary model, then the fallback model once
    async fn generate_with_fallback(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        match self.generate(&self.config.primary_model, request).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!(
                    "Primary model ({}) failed: {:#}. Falling back to {}",
                    self.config.primary_model,
                    e,
                    self.config.fallback_model
                );
                self.generate(&self.config.fallback_model, request).await
            }
        }
    }

    /// Render an illustration; failures only cost the image
    async fn generate_image(&self, subject: &str) -> Option<String> {
        let request = GenerateRequest {
            contents: vec![user_content(vec![Part::text(prompts::build_image_prompt(
                subject,
            ))])],
            system_instruction: None,
            generation_config: Some(json!({
                "responseModalities": ["IMAGE"],
                "imageConfig": { "aspectRatio": "16:9" }
            })),
        };

        match self.generate(&self.config.image_model, &request).await {
            Ok(response) => match response.first_inline_data() {
                Some(inline) => Some(format!("data:{};base64,{}", inline.mime_type, inline.data)),
                None => {
                    tracing::warn!("Image response contained no image data");
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Image generation failed: {:#}", e);
                None
            }
        }
    }
}

#[async_trait]
impl IdeaPipeline for GeminiPipeline {
    async fn analyze(&self, input: CaptureInput, generate_image: bool) -> Result<IdeaAnalysis> {
        let parts = match &input {
            CaptureInput::Audio { data, mime_type } => {
                tracing::info!("Transcribing & extracting insight...");
                vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.clone(),
                            data: base64::engine::general_purpose::STANDARD.encode(data),
                        }),
                    },
                    Part::text(prompts::build_audio_analysis_prompt()),
                ]
            }
            CaptureInput::Text(text) => {
                tracing::info!("Analyzing your idea...");
                vec![Part::text(prompts::build_text_analysis_prompt(text))]
            }
        };

        let request = GenerateRequest {
            contents: vec![user_content(parts)],
            system_instruction: None,
            generation_config: Some(analysis_generation_config()),
        };

        let response = self.generate_with_fallback(&request).await?;
        let mut analysis = parse_analysis(&response.text(), &input);

        if generate_image {
            tracing::info!("Generating visual identity...");
            analysis.image_url = self.generate_image(&analysis.image_prompt).await;
        }

        Ok(analysis)
    }

    async fn refine(&self, idea: &Idea) -> Result<Refinement> {
        let request = GenerateRequest {
            contents: vec![user_content(vec![Part::text(prompts::build_refine_prompt(
                idea,
            ))])],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(prompts::REFINE_SYSTEM_INSTRUCTION)],
            }),
            generation_config: Some(json!({ "responseMimeType": "application/json" })),
        };

        let response = self
            .generate(&self.config.refine_model, &request)
            .await
            .map_err(|e| {
                tracing::error!(id = %idea.id, "Refine failed: {:#}", e);
                e
            })?;
        parse_refinement(&response.text())
    }

    async fn deep_dive(&self, idea: &Idea) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![user_content(vec![Part::text(
                prompts::build_deep_dive_prompt(idea),
            )])],
            system_instruction: None,
            generation_config: None,
        };

        let text = self.generate_with_fallback(&request).await?.text();
        if text.trim().is_empty() {
            Ok(EMPTY_EXPANSION.to_string())
        } else {
            Ok(text)
        }
    }

    async fn chat(&self, idea: &Idea, history: &[ChatTurn], message: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: chat_contents(history, message),
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::text(prompts::build_chat_system_instruction(idea))],
            }),
            generation_config: None,
        };

        let text = self
            .generate(&self.config.primary_model, &request)
            .await?
            .text();
        if text.trim().is_empty() {
            return Err(IdeaflowError::Pipeline("Empty chat response".to_string()).into());
        }
        Ok(text)
    }
}

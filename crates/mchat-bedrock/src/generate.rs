//! The text-generation seam and its Bedrock implementation.
//!
//! A screening issues at most one generation request. There is no retry and
//! no timeout: the call runs until Bedrock answers or fails. Callers map the
//! outcome to display text with [`resolve_analysis`], which substitutes a
//! fixed notice on failure instead of propagating the error.

use std::future::Future;

use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use mchat_core::models::report::AnalysisStatus;
use mchat_core::models::token_count::TokenCount;

use crate::error::BedrockError;
use crate::prompt::SYSTEM_PROMPT;
use crate::tokens;

/// Shown when the model returns no text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "Unable to generate an analysis at this time.";

/// Shown when the generation call fails.
pub const ERROR_FALLBACK: &str =
    "An error occurred while contacting the AI service. Please try again later.";

pub const DEFAULT_MAX_TOKENS: i32 = 512;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Text returned by one generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub id: Uuid,
    pub model_id: String,
    pub text: String,
    pub usage: TokenCount,
}

/// Anything that turns a prompt into prose.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Generation, BedrockError>> + Send;
}

/// Map a generation outcome to the analysis shown to the user.
pub fn resolve_analysis(outcome: Result<Generation, BedrockError>) -> AnalysisStatus {
    match outcome {
        Ok(generation) if generation.text.trim().is_empty() => {
            warn!(generation_id = %generation.id, "model returned an empty analysis");
            AnalysisStatus::Failed(EMPTY_RESPONSE_FALLBACK.to_string())
        }
        Ok(generation) => AnalysisStatus::Complete(generation.text),
        Err(e) => {
            error!(error = %e, "analysis generation failed");
            AnalysisStatus::Failed(ERROR_FALLBACK.to_string())
        }
    }
}

/// [`TextGenerator`] backed by the Bedrock Converse API.
#[derive(Debug, Clone)]
pub struct BedrockGenerator {
    client: Client,
    model_id: String,
    max_tokens: i32,
    temperature: f32,
}

impl BedrockGenerator {
    pub fn new(config: &aws_config::SdkConfig, model_id: &str) -> Result<Self, BedrockError> {
        if model_id.trim().is_empty() {
            return Err(BedrockError::Config("no model id configured".to_string()));
        }
        Ok(Self {
            client: Client::new(config),
            model_id: model_id.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: i32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn converse(&self, prompt: &str) -> Result<Generation, BedrockError> {
        let generation_id = Uuid::new_v4();
        info!(generation_id = %generation_id, model = %self.model_id, "starting analysis generation");

        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.to_string()))
            .build()
            .map_err(|e| BedrockError::Invocation(e.to_string()))?;

        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(SYSTEM_PROMPT.to_string()))
            .messages(message)
            .inference_config(
                InferenceConfiguration::builder()
                    .max_tokens(self.max_tokens)
                    .temperature(self.temperature)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

        let output_message = response
            .output()
            .and_then(|o| o.as_message().ok())
            .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

        let text = output_message
            .content()
            .iter()
            .filter_map(|block| {
                if let ContentBlock::Text(text) = block {
                    Some(text.as_str())
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        let usage = response
            .usage()
            .map(tokens::extract_token_usage)
            .unwrap_or_default();

        info!(
            generation_id = %generation_id,
            input_tokens = usage.input,
            output_tokens = usage.output,
            "analysis generation complete"
        );

        Ok(Generation {
            id: generation_id,
            model_id: self.model_id.clone(),
            text,
            usage,
        })
    }
}

impl TextGenerator for BedrockGenerator {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<Generation, BedrockError>> + Send {
        self.converse(prompt)
    }
}

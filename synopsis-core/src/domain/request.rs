//! Summarization request domain types

use serde::{Deserialize, Serialize};

use super::document::SourceDocument;

/// Sampling parameters sent alongside the prompt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 6000,
            temperature: 0.5,
            top_p: 0.9,
        }
    }
}

/// Prompt plus generation parameters for one summarization job
///
/// Built once from a [`SourceDocument`] and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizationRequest {
    prompt: String,
    params: GenerationParams,
}

impl SummarizationRequest {
    /// Wraps the transcript in the summarization instruction
    pub fn from_document(document: &SourceDocument, params: GenerationParams) -> Self {
        Self {
            prompt: render_prompt(&document.text),
            params,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }
}

fn render_prompt(transcript: &str) -> String {
    format!(
        "Your task is to create a comprehensive summary of the following transcription.\n\
         The summary should be detailed and approximately 4,000 words in length.\n\
         \n\
         Transcription:\n\
         {}\n\
         \n\
         Summary:",
        transcript
    )
}

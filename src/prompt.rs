//! Instructions and structured-output contracts for each guide operation.

use crate::error::GuideError;
use crate::shape::{
    coding_help_typedef, service_detail_typedef, service_results_typedef, ExplanationMode,
    Language,
};
use crate::types::TypeDef;

/// Free text that is known to be non-blank. Stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputText(String);

impl InputText {
    /// Rejects empty or whitespace-only text. `field` names the input in the error.
    pub fn parse(raw: &str, field: &'static str) -> Result<Self, GuideError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GuideError::EmptyInput { field });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An instruction plus the schema the reply must conform to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub instruction: String,
    pub schema: TypeDef,
}

pub fn build_search_request(query: &InputText, language: Language) -> GenerationRequest {
    let instruction = format!(
        "Identify 3-4 real Indian government, healthcare, or educational digital services \
         matching this query: \"{query}\".\n\
         The response must be written entirely in {language}.\n\
         Target users: Indian citizens looking for help.",
        query = query.as_str(),
    );

    GenerationRequest {
        instruction,
        schema: service_results_typedef(),
    }
}

pub fn build_detail_request(
    service_name: &InputText,
    language: Language,
    mode: ExplanationMode,
) -> GenerationRequest {
    let instruction = format!(
        "Provide a detailed guide for the Indian service: \"{service}\".\n\
         Language: {language}.\n\
         Tone/Mode: {tone}\n\
         Include: an overview, step-by-step application steps, required documents, \
         any known deadlines, and why this service is recommended.",
        service = service_name.as_str(),
        tone = tone_directive(mode),
    );

    GenerationRequest {
        instruction,
        schema: service_detail_typedef(),
    }
}

pub fn build_coding_help_request(input: &InputText, language: Language) -> GenerationRequest {
    let instruction = format!(
        "Help a student understand this technical or coding issue: \"{input}\".\n\
         It may be an error message, a technical term, or a piece of code.\n\
         Explain it plainly in {language} and translate the technical terms into {language}.\n\
         Provide a simplified explanation, a short simplified code example, and the key terms \
         with each meaning translated into {language}.",
        input = input.as_str(),
    );

    GenerationRequest {
        instruction,
        schema: coding_help_typedef(),
    }
}

fn tone_directive(mode: ExplanationMode) -> &'static str {
    match mode {
        ExplanationMode::Professional => {
            "Use formal and precise language suitable for official documentation."
        }
        ExplanationMode::Simple => {
            "Use extremely simple language as if explaining to a beginner. \
             Keep each step short so the steps can be followed one by one."
        }
        ExplanationMode::Story => {
            "Explain the process through a short relatable story of a character \
             using the service, following them from start to finish."
        }
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{FieldDef, TypeDef};

/// Output language for every generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Bengali,
    Telugu,
    Marathi,
    Tamil,
    Urdu,
    Kannada,
    Odia,
    Punjabi,
    Malayalam,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::English,
        Language::Hindi,
        Language::Bengali,
        Language::Telugu,
        Language::Marathi,
        Language::Tamil,
        Language::Urdu,
        Language::Kannada,
        Language::Odia,
        Language::Punjabi,
        Language::Malayalam,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Bengali => "Bengali",
            Language::Telugu => "Telugu",
            Language::Marathi => "Marathi",
            Language::Tamil => "Tamil",
            Language::Urdu => "Urdu",
            Language::Kannada => "Kannada",
            Language::Odia => "Odia",
            Language::Punjabi => "Punjabi",
            Language::Malayalam => "Malayalam",
        }
    }

    /// Locale handed to the browser's speech recognizer. Best effort: browser
    /// support for the Indic locales varies.
    pub fn speech_locale(self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Hindi => "hi-IN",
            Language::Bengali => "bn-IN",
            Language::Telugu => "te-IN",
            Language::Marathi => "mr-IN",
            Language::Tamil => "ta-IN",
            Language::Urdu => "ur-IN",
            Language::Kannada => "kn-IN",
            Language::Odia => "or-IN",
            Language::Punjabi => "pa-IN",
            Language::Malayalam => "ml-IN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseEnumError {
                kind: "language",
                value: s.to_string(),
            })
    }
}

/// Register used when explaining a service. Does not change the detail shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExplanationMode {
    #[default]
    Professional,
    Simple,
    #[serde(rename = "Story-based")]
    Story,
}

impl ExplanationMode {
    pub const ALL: [ExplanationMode; 3] = [
        ExplanationMode::Professional,
        ExplanationMode::Simple,
        ExplanationMode::Story,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExplanationMode::Professional => "Professional",
            ExplanationMode::Simple => "Simple",
            ExplanationMode::Story => "Story-based",
        }
    }
}

impl fmt::Display for ExplanationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExplanationMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("story") {
            return Ok(ExplanationMode::Story);
        }
        ExplanationMode::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseEnumError {
                kind: "explanation mode",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Government,
    Healthcare,
    Education,
    Technical,
}

impl Category {
    pub const NAMES: &'static [&'static str] = &["Government", "Healthcare", "Education", "Technical"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceResult {
    pub name: String,
    pub description: String,
    pub official_url: String,
    pub category: Category,
    pub why_recommended: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    pub overview: String,
    pub steps: Vec<String>,
    pub documents: Vec<String>,
    pub deadlines: String,
    pub recommendation_reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingHelpResponse {
    pub explanation: String,
    pub simplified_code: String,
    pub terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term: String,
    pub meaning: String,
}

// TypeDef for a single ServiceResult
pub fn service_result_typedef() -> TypeDef {
    TypeDef::Object(vec![
        FieldDef::new("name", TypeDef::Text),
        FieldDef::new("description", TypeDef::Text),
        FieldDef::new("officialUrl", TypeDef::Text),
        FieldDef::new("category", TypeDef::OneOf(Category::NAMES)),
        FieldDef::new("whyRecommended", TypeDef::Text),
    ])
}

pub fn service_results_typedef() -> TypeDef {
    TypeDef::list(service_result_typedef())
}

pub fn service_detail_typedef() -> TypeDef {
    TypeDef::Object(vec![
        FieldDef::new("overview", TypeDef::Text),
        FieldDef::new("steps", TypeDef::list(TypeDef::Text)),
        FieldDef::new("documents", TypeDef::list(TypeDef::Text)),
        FieldDef::new("deadlines", TypeDef::Text),
        FieldDef::new("recommendationReason", TypeDef::Text),
    ])
}

pub fn coding_help_typedef() -> TypeDef {
    TypeDef::Object(vec![
        FieldDef::new("explanation", TypeDef::Text),
        FieldDef::new("simplifiedCode", TypeDef::Text),
        FieldDef::new(
            "terms",
            TypeDef::list(TypeDef::Object(vec![
                FieldDef::new("term", TypeDef::Text),
                FieldDef::new("meaning", TypeDef::Text),
            ])),
        ),
    ])
}

//! Civic service and coding-help guide backed by a generative reasoning service.
//!
//! The library builds instructions with structured-output contracts, sends
//! them through a [`ReasoningClient`], and decodes the replies into typed
//! shapes. The [`Guide`] exposes the three operations; [`api`] serves them
//! over HTTP.

pub mod api;
pub mod client;
pub mod codec;
pub mod config;
pub mod decode;
pub mod error;
pub mod guide;
pub mod llm;
pub mod prompt;
pub mod session;
pub mod shape;
pub mod testing;
pub mod types;

pub use config::{load_config, validate_config, Config, ConfigError, LlmBackend, LlmConfig};
pub use decode::DecodeError;
pub use error::GuideError;
pub use guide::Guide;
pub use llm::{build_client, GeminiClient, LlmError, OllamaClient, ReasoningClient};
pub use session::{DetailSession, DetailTicket};
pub use shape::{
    Category, CodingHelpResponse, ExplanationMode, Language, ServiceDetail, ServiceResult, Term,
};

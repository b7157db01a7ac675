//! Test doubles for the reasoning service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::llm::{LlmError, ReasoningClient};
use crate::prompt::GenerationRequest;

#[derive(Default)]
struct StubState {
    queued: VecDeque<Option<String>>,
    default_reply: Option<String>,
    next_error: Option<LlmError>,
    recorded: Vec<GenerationRequest>,
}

/// Deterministic [`ReasoningClient`] for tests.
///
/// Replies come from the queue first, then from the default reply. Every
/// request is recorded for assertions. Clones share state.
///
/// ```rust,ignore
/// let stub = StubClient::with_reply(fixtures::SCHOLARSHIP_RESULTS);
/// let guide = Guide::new(stub.clone());
/// let results = guide.search("Apply for scholarship", Language::English).await?;
/// assert_eq!(stub.recorded().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct StubClient {
    state: Arc<Mutex<StubState>>,
}

fn lock(state: &Mutex<StubState>) -> MutexGuard<'_, StubState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl StubClient {
    /// A stub that answers with no payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub that always answers with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        let stub = Self::new();
        lock(&stub.state).default_reply = Some(reply.into());
        stub
    }

    /// Queue a one-shot reply, used before the default reply.
    pub fn push_reply(&self, reply: Option<&str>) {
        lock(&self.state).queued.push_back(reply.map(str::to_string));
    }

    /// The next call fails with `error`.
    pub fn fail_next(&self, error: LlmError) {
        lock(&self.state).next_error = Some(error);
    }

    pub fn recorded(&self) -> Vec<GenerationRequest> {
        lock(&self.state).recorded.clone()
    }
}

#[async_trait]
impl ReasoningClient for StubClient {
    fn model(&self) -> &str {
        "stub"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, LlmError> {
        let mut state = lock(&self.state);
        state.recorded.push(request.clone());
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }
        if let Some(reply) = state.queued.pop_front() {
            return Ok(reply);
        }
        Ok(state.default_reply.clone())
    }
}

/// Conformant payloads for each shape.
pub mod fixtures {
    pub const SCHOLARSHIP_RESULTS: &str = r#"[
  {
    "name": "National Scholarship Portal",
    "description": "One-stop portal for central and state scholarship schemes.",
    "officialUrl": "https://scholarships.gov.in",
    "category": "Education",
    "whyRecommended": "Most central scholarships are applied for here."
  },
  {
    "name": "PM YASASVI",
    "description": "Scholarship scheme for OBC, EBC and DNT students.",
    "officialUrl": "https://yet.nta.ac.in",
    "category": "Government",
    "whyRecommended": "Covers school and college students from eligible groups."
  }
]"#;

    pub const AYUSHMAN_DETAIL: &str = r#"{
  "overview": "आयुष्मान भारत योजना गरीब परिवारों को मुफ्त इलाज देती है।",
  "steps": [
    "अपनी पात्रता जांचें।",
    "नजदीकी केंद्र पर जाएं।",
    "आधार से पहचान सत्यापित करें।",
    "आयुष्मान कार्ड प्राप्त करें।"
  ],
  "documents": ["आधार कार्ड", "राशन कार्ड"],
  "deadlines": "कोई अंतिम तिथि नहीं है।",
  "recommendationReason": "प्रति परिवार 5 लाख रुपये तक का मुफ्त इलाज।"
}"#;

    pub const TYPE_ERROR_HELP: &str = r#"{
  "explanation": "You tried to read a property from a value that is undefined.",
  "simplifiedCode": "const user = undefined;\nconsole.log(user?.name);",
  "terms": [
    {"term": "TypeError", "meaning": "An error raised when a value has the wrong type."},
    {"term": "property", "meaning": "A named value stored on an object."},
    {"term": "undefined", "meaning": "A variable that has no value yet."}
  ]
}"#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::service_results_typedef;

    fn request() -> GenerationRequest {
        GenerationRequest {
            instruction: "x".to_string(),
            schema: service_results_typedef(),
        }
    }

    #[tokio::test]
    async fn test_queue_before_default() {
        let stub = StubClient::with_reply("default");
        stub.push_reply(Some("first"));
        stub.push_reply(None);

        assert_eq!(stub.generate(&request()).await.unwrap().as_deref(), Some("first"));
        assert_eq!(stub.generate(&request()).await.unwrap(), None);
        assert_eq!(stub.generate(&request()).await.unwrap().as_deref(), Some("default"));
        assert_eq!(stub.recorded().len(), 3);
    }

    #[test]
    fn test_fixtures_are_conformant() {
        use crate::decode::{decode_coding_help, decode_detail, decode_services};

        assert_eq!(decode_services(Some(fixtures::SCHOLARSHIP_RESULTS)).len(), 2);
        assert!(decode_detail(Some(fixtures::AYUSHMAN_DETAIL)).is_ok());
        assert_eq!(decode_coding_help(Some(fixtures::TYPE_ERROR_HELP)).unwrap().terms.len(), 3);
    }
}

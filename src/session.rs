//! Detail view state for one consumer: the selected service, the explanation
//! mode, and the detail currently shown.
//!
//! Whenever the (service, mode) pair changes while a service is selected, a
//! new [`DetailTicket`] is issued and every older ticket becomes stale.
//! Completing a stale ticket is a no-op, so a slow reply for an earlier mode
//! can never overwrite the detail for the current one.

use tracing::debug;

use crate::error::GuideError;
use crate::guide::Guide;
use crate::llm::ReasoningClient;
use crate::shape::{ExplanationMode, Language, ServiceDetail};

/// Identifies one detail request issued by a [`DetailSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub generation: u64,
    pub service_name: String,
    pub mode: ExplanationMode,
}

#[derive(Debug, Default)]
pub struct DetailSession {
    selected: Option<String>,
    mode: ExplanationMode,
    generation: u64,
    detail: Option<ServiceDetail>,
    last_error: Option<String>,
}

impl DetailSession {
    pub fn new(mode: ExplanationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn mode(&self) -> ExplanationMode {
        self.mode
    }

    pub fn detail(&self) -> Option<&ServiceDetail> {
        self.detail.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Select a service. Always issues a fresh ticket, even for the same name.
    pub fn select(&mut self, service_name: impl Into<String>) -> DetailTicket {
        self.selected = Some(service_name.into());
        self.issue()
    }

    /// Change the mode. Returns a ticket only if a refetch is needed.
    pub fn set_mode(&mut self, mode: ExplanationMode) -> Option<DetailTicket> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        self.selected.is_some().then(|| self.issue())
    }

    /// Deselect. Any request in flight becomes stale.
    pub fn clear(&mut self) {
        self.selected = None;
        self.generation += 1;
        self.detail = None;
        self.last_error = None;
    }

    /// Ticket for the current pair, if a service is selected.
    pub fn current_ticket(&self) -> Option<DetailTicket> {
        self.selected.as_ref().map(|name| DetailTicket {
            generation: self.generation,
            service_name: name.clone(),
            mode: self.mode,
        })
    }

    /// Apply the outcome of a ticket's request. Returns `false` if the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: &DetailTicket,
        result: Result<ServiceDetail, GuideError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "ignoring superseded detail response"
            );
            return false;
        }

        match result {
            Ok(detail) => {
                self.detail = Some(detail);
                self.last_error = None;
            }
            Err(e) => {
                self.detail = None;
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    /// Fetch and apply the detail for the current pair.
    pub async fn refresh<C: ReasoningClient>(
        &mut self,
        guide: &Guide<C>,
        language: Language,
    ) -> Option<&ServiceDetail> {
        let ticket = self.current_ticket()?;
        let result = guide
            .get_details(&ticket.service_name, language, ticket.mode)
            .await;
        self.complete(&ticket, result);
        self.detail()
    }

    fn issue(&mut self) -> DetailTicket {
        self.generation += 1;
        self.detail = None;
        self.last_error = None;
        DetailTicket {
            generation: self.generation,
            service_name: self.selected.clone().unwrap_or_default(),
            mode: self.mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeError;
    use crate::testing::{fixtures, StubClient};

    fn detail(overview: &str) -> ServiceDetail {
        ServiceDetail {
            overview: overview.to_string(),
            steps: vec!["one".into()],
            documents: vec![],
            deadlines: String::new(),
            recommendation_reason: String::new(),
        }
    }

    #[test]
    fn test_mode_change_without_selection_issues_nothing() {
        let mut session = DetailSession::default();
        assert_eq!(session.mode(), ExplanationMode::Professional);
        assert!(session.set_mode(ExplanationMode::Simple).is_none());
        assert_eq!(session.mode(), ExplanationMode::Simple);
        assert!(session.current_ticket().is_none());
    }

    #[test]
    fn test_same_mode_issues_nothing() {
        let mut session = DetailSession::new(ExplanationMode::Simple);
        session.select("Ayushman Bharat");
        assert!(session.set_mode(ExplanationMode::Simple).is_none());
    }

    #[test]
    fn test_stale_reply_is_ignored() {
        let mut session = DetailSession::default();
        let professional = session.select("Ayushman Bharat");
        let story = session.set_mode(ExplanationMode::Story).unwrap();
        assert_eq!(story.mode, ExplanationMode::Story);
        assert_eq!(story.service_name, "Ayushman Bharat");

        assert!(session.complete(&story, Ok(detail("story"))));
        assert!(!session.complete(&professional, Ok(detail("professional"))));
        assert_eq!(session.detail().unwrap().overview, "story");
    }

    #[test]
    fn test_failure_clears_detail_and_records_error() {
        let mut session = DetailSession::default();
        let first = session.select("PM Kisan");
        assert!(session.complete(&first, Ok(detail("ok"))));

        let second = session.set_mode(ExplanationMode::Simple).unwrap();
        assert!(session.detail().is_none());
        let failed = Err(GuideError::Decode(DecodeError::EmptyPayload));
        assert!(session.complete(&second, failed));
        assert!(session.detail().is_none());
        assert!(session.last_error().unwrap().contains("empty"));
    }

    #[test]
    fn test_clear_invalidates_in_flight() {
        let mut session = DetailSession::default();
        let ticket = session.select("DigiLocker");
        session.clear();
        assert!(session.selected().is_none());
        assert!(!session.complete(&ticket, Ok(detail("late"))));
        assert!(session.detail().is_none());
    }

    #[tokio::test]
    async fn test_refresh_refetches_on_mode_change() {
        let stub = StubClient::with_reply(fixtures::AYUSHMAN_DETAIL);
        let guide = Guide::new(stub.clone());
        let mut session = DetailSession::default();

        session.select("Ayushman Bharat");
        assert!(session.refresh(&guide, Language::Hindi).await.is_some());
        session.set_mode(ExplanationMode::Story);
        assert!(session.refresh(&guide, Language::Hindi).await.is_some());

        let sent = stub.recorded();
        assert_eq!(sent.len(), 2);
        assert_ne!(sent[0].instruction, sent[1].instruction);
        assert_eq!(sent[0].schema, sent[1].schema);
    }
}

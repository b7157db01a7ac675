//! The three guide entry points: service search, service detail, coding help.

use tracing::{debug, info, instrument};

use crate::decode::{decode_coding_help, decode_detail, decode_services};
use crate::error::GuideError;
use crate::llm::ReasoningClient;
use crate::prompt::{
    build_coding_help_request, build_detail_request, build_search_request, InputText,
};
use crate::shape::{CodingHelpResponse, ExplanationMode, Language, ServiceDetail, ServiceResult};

/// Stateless front over a [`ReasoningClient`]. Every call is independent.
#[derive(Clone)]
pub struct Guide<C> {
    llm: C,
}

impl<C: ReasoningClient> Guide<C> {
    pub fn new(llm: C) -> Self {
        Self { llm }
    }

    pub fn client(&self) -> &C {
        &self.llm
    }

    /// Search for matching services. Undecodable replies look like zero results.
    #[instrument(skip(self), fields(model = self.llm.model()))]
    pub async fn search(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<ServiceResult>, GuideError> {
        let query = InputText::parse(query, "query")?;
        let request = build_search_request(&query, language);

        let payload = self.llm.generate(&request).await?;
        let results = decode_services(payload.as_deref());
        info!(count = results.len(), "service search finished");
        Ok(results)
    }

    #[instrument(skip(self), fields(model = self.llm.model()))]
    pub async fn get_details(
        &self,
        service_name: &str,
        language: Language,
        mode: ExplanationMode,
    ) -> Result<ServiceDetail, GuideError> {
        let service_name = InputText::parse(service_name, "serviceName")?;
        let request = build_detail_request(&service_name, language, mode);

        let payload = self.llm.generate(&request).await?;
        let detail = decode_detail(payload.as_deref())?;
        debug!(steps = detail.steps.len(), documents = detail.documents.len(), "detail decoded");
        Ok(detail)
    }

    #[instrument(skip(self, input), fields(model = self.llm.model(), input_len = input.len()))]
    pub async fn get_coding_help(
        &self,
        input: &str,
        language: Language,
    ) -> Result<CodingHelpResponse, GuideError> {
        let input = InputText::parse(input, "input")?;
        let request = build_coding_help_request(&input, language);

        let payload = self.llm.generate(&request).await?;
        let help = decode_coding_help(payload.as_deref())?;
        debug!(terms = help.terms.len(), "coding help decoded");
        Ok(help)
    }
}

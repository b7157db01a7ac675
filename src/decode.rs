//! Turns raw reasoning-service payloads into typed shapes.
//!
//! Search degrades to an empty list on any decode failure. Detail and coding
//! help have no sensible empty value, so they return a [`DecodeError`].

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::shape::{CodingHelpResponse, ServiceDetail, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("response payload was empty")]
    EmptyPayload,

    #[error("response payload is not valid for the expected shape: {0}")]
    Malformed(String),
}

fn decode<T: DeserializeOwned>(payload: Option<&str>) -> Result<T, DecodeError> {
    let text = payload.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }
    serde_json::from_str(text).map_err(|e| DecodeError::Malformed(e.to_string()))
}

pub fn decode_services(payload: Option<&str>) -> Vec<ServiceResult> {
    match decode(payload) {
        Ok(results) => results,
        Err(e) => {
            warn!(error = %e, "failed to parse services, returning no results");
            Vec::new()
        }
    }
}

pub fn decode_detail(payload: Option<&str>) -> Result<ServiceDetail, DecodeError> {
    decode(payload)
}

pub fn decode_coding_help(payload: Option<&str>) -> Result<CodingHelpResponse, DecodeError> {
    decode(payload)
}

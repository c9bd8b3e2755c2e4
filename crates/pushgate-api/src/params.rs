//! Request parameter utilities: job-name decoding and label-selector
//! parsing.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use thiserror::Error;

use pushgate_store::LabelSet;
use pushgate_store::expfmt;

/// Errors from decoding or parsing request path parameters. All of them
/// are client errors.
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("decoded job name is not valid UTF-8")]
    Utf8,

    #[error("invalid label selector: {0}")]
    Selector(String),
}

/// Decode a URL-safe base64 job name. Padding is optional; a single `=`
/// encodes the empty string (an empty path segment would not route).
pub fn decode_job_name(raw: &str) -> Result<String, ParamError> {
    if raw == "=" {
        return Ok(String::new());
    }
    let engine = if raw.contains('=') {
        &URL_SAFE
    } else {
        &URL_SAFE_NO_PAD
    };
    let bytes = engine
        .decode(raw)
        .map_err(|e| ParamError::Base64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| ParamError::Utf8)
}

/// Parse a label selector of comma-separated `name="value"` pairs into a
/// label set. The empty string yields an empty set.
pub fn parse_label_selector(selector: &str) -> Result<LabelSet, ParamError> {
    expfmt::parse_label_pairs(selector).map_err(|e| ParamError::Selector(e.to_string()))
}

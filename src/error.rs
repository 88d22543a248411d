//! Structured error types for the recto engine.
//!
//! One variant per real failure source: job parsing, font availability,
//! font data, and job selection. Everything that can go wrong inside a
//! generate/export action surfaces as exactly one of these at the
//! orchestration boundary.

use thiserror::Error;

use crate::font::FontKind;

/// The unified error type returned by all public recto API functions.
#[derive(Debug, Error)]
pub enum RectoError {
    /// Job JSON failed to parse as a valid job document.
    #[error("failed to parse job document: {source}\n  Hint: {hint}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A face the selection needs has not finished loading. The caller
    /// should surface "try again shortly" and not cache any sizes.
    #[error("{0} font is not loaded yet; try again shortly")]
    FontNotReady(FontKind),

    /// Generating with zero selected cards. Guarded before the engine runs.
    #[error("no cards selected")]
    EmptySelection,

    /// A font program could not be fetched, parsed, or embedded.
    #[error("font error: {0}")]
    Font(String),
}

impl From<serde_json::Error> for RectoError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the job document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        RectoError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_a_hint() {
        let bad = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        let err: RectoError = bad.into();
        let msg = err.to_string();
        assert!(msg.contains("failed to parse job document"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn font_not_ready_names_the_face() {
        let msg = RectoError::FontNotReady(FontKind::Cjk).to_string();
        assert!(msg.contains("CJK"));
        assert!(msg.contains("try again shortly"));
    }
}

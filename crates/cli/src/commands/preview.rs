//! Offline preview of field coercion.
//!
//! Runs the exact transform the relay applies before writing, so a payload
//! captured from the storefront can be checked without touching Shopify.

use std::io::Read;
use std::path::Path;

use mycopet_core::{TransformError, UpdateRequest, transform_fields};
use thiserror::Error;

/// Errors that can occur while previewing a payload.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The payload could not be read.
    #[error("Failed to read payload: {0}")]
    Io(#[from] std::io::Error),

    /// The payload is not JSON.
    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The relay would reject this payload.
    #[error("{0}")]
    Transform(#[from] TransformError),
}

/// Read a payload and print its typed fields as pretty JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or holds a
/// date field the relay would fail on.
pub fn run(file: &Path) -> Result<(), PreviewError> {
    let raw = if file.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(file)?
    };

    let output = preview(&raw)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }

    Ok(())
}

/// Coerce the payload and render the typed fields.
fn preview(raw: &str) -> Result<String, PreviewError> {
    let request = UpdateRequest::from_json(serde_json::from_str(raw)?);

    if !request.is_actionable() {
        tracing::warn!("Payload has no email or no metafields; the relay would skip it");
    }

    let typed = transform_fields(request.fields())?;
    Ok(serde_json::to_string_pretty(&typed)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_preview_typed_fields() {
        let raw = json!({
            "email": "owner@example.com",
            "metafields": [
                {"key": "pet_weight_kg", "value": "12,5"},
                {"namespace": "custom", "key": "favorite_toy", "value": "ball"}
            ]
        })
        .to_string();

        let output: Value = serde_json::from_str(&preview(&raw).unwrap()).unwrap();
        assert_eq!(
            output,
            json!([
                {"namespace": "profile", "key": "pet_weight_kg", "type": "number_decimal", "value": "12.5"},
                {"namespace": "custom", "key": "favorite_toy", "type": "single_line_text_field", "value": "ball"}
            ])
        );
    }

    #[test]
    fn test_preview_invalid_json() {
        assert!(matches!(preview("{"), Err(PreviewError::Json(_))));
    }

    #[test]
    fn test_preview_invalid_date() {
        let raw = json!({
            "email": "owner@example.com",
            "metafields": [{"key": "pet_date_of_birth", "value": "nope"}]
        })
        .to_string();
        assert!(matches!(preview(&raw), Err(PreviewError::Transform(_))));
    }

    #[test]
    fn test_preview_empty_payload() {
        assert_eq!(preview("{}").unwrap(), "[]");
    }
}

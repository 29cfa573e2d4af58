//! Error types for the converter.
//!
//! Uses the dual-error pattern: `ConverterError` for failures that stop the
//! conversion of one document, and `ParseWarning` for soft diagnostics that
//! are collected on the `Document` while parsing carries on.

use serde::Serialize;
use thiserror::Error;

/// Main error type for the converter library.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The document text is empty or whitespace only.
    #[error("Document '{0}' has no text to parse")]
    EmptyInput(String),

    /// Invalid document identifier.
    #[error("Invalid document id: '{0}'. Expected letters, digits, '_' or '-' (e.g., 2024_INST_5)")]
    InvalidDocumentId(String),

    /// Invalid date format.
    #[error("Invalid date format: '{0}'. Expected YYYY-MM-DD (e.g., 2024-10-03)")]
    InvalidDate(String),

    /// Catalog entry not found.
    #[error("No catalog entry for document '{0}'")]
    UnknownCatalogEntry(String),

    /// Catalog file could not be deserialized.
    #[error("Catalog parsing failed: {0}")]
    Catalog(#[from] serde_yaml_ng::Error),

    /// XML serialization failed.
    #[error("XML serialization failed: {0}")]
    XmlWrite(#[from] quick_xml::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Some documents of a batch could not be converted.
    #[error("{failed} of {total} documents failed to convert")]
    BatchFailed { failed: usize, total: usize },

    /// An XML file breaks the document schema.
    #[error("{path} has {count} schema violation(s)")]
    SchemaViolations { path: String, count: usize },
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, ConverterError>;

/// Non-fatal diagnostics raised while parsing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ParseWarning {
    /// No zone anchor (VISTOS, CONSIDERANDO, RESUELVO) was found; the whole
    /// text was parsed as operative body.
    #[error("No zone anchors found, treating the whole text as operative body")]
    MalformedInput,

    /// A header-shaped line could not be confidently classified and was kept
    /// as article text.
    #[error("Ambiguous structural header on body line {line}: '{text}'")]
    AmbiguousHeader { line: usize, text: String },

    /// A law reference string matched no known reference family.
    #[error("Unrecognized law reference: '{0}'")]
    UnrecognizedReference(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConverterError::InvalidDocumentId("bad id!".to_string());
        assert!(err.to_string().contains("bad id!"));
        assert!(err.to_string().contains("2024_INST_5"));
    }

    #[test]
    fn test_empty_input_display() {
        let err = ConverterError::EmptyInput("2024_INST_5".to_string());
        assert_eq!(err.to_string(), "Document '2024_INST_5' has no text to parse");
    }

    #[test]
    fn test_batch_failed_display() {
        let err = ConverterError::BatchFailed { failed: 2, total: 5 };
        assert_eq!(err.to_string(), "2 of 5 documents failed to convert");
    }

    #[test]
    fn test_ambiguous_header_display() {
        let warning = ParseWarning::AmbiguousHeader {
            line: 4,
            text: "Capítulo IV y los simplificados.".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "Ambiguous structural header on body line 4: 'Capítulo IV y los simplificados.'"
        );
    }
}

//! Configuration constants, parser settings and validation functions.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ConverterError, Result};

/// Namespace of the generated XML documents.
pub const XML_NAMESPACE: &str = "https://leychile.cl/schema/ley/v1";

/// Version of the XML schema the serializer produces.
pub const SCHEMA_VERSION: &str = "1.0";

/// Issuing body recorded as the source identification.
pub const DEFAULT_ISSUER: &str = "Superintendencia de Insolvencia y Reemprendimiento";

/// Maximum number of words an article caption may have.
///
/// "Artículo 13. Responsabilidad. De conformidad..." yields the caption
/// "Responsabilidad"; a longer first sentence is treated as body text.
pub const DEFAULT_CAPTION_MAX_WORDS: usize = 8;

/// Number of leading lines searched for dates and the resolution number when
/// the document has no header zone.
pub const DEFAULT_HEADER_SCAN_LINES: usize = 15;

/// Document id pattern: letters, digits, underscores and hyphens.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DOCUMENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*$").expect("valid regex"));

/// Date pattern: YYYY-MM-DD.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

/// Settings for one parse.
///
/// The defaults match the SUPERIR resolution style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Maximum words in a captured article caption.
    pub caption_max_words: usize,

    /// Lines searched for dates when there is no header zone.
    pub header_scan_lines: usize,

    /// Issuing body, rendered as the source identification.
    pub issuer: String,

    /// Schema version stamped on the document.
    pub schema_version: String,
}

impl ParserConfig {
    /// Override the caption word budget.
    #[must_use]
    pub fn with_caption_max_words(mut self, words: usize) -> Self {
        self.caption_max_words = words;
        self
    }

    /// Override the issuing body.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            caption_max_words: DEFAULT_CAPTION_MAX_WORDS,
            header_scan_lines: DEFAULT_HEADER_SCAN_LINES,
            issuer: DEFAULT_ISSUER.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

/// Validate a document identifier.
///
/// # Examples
/// ```
/// use leychile_converter::config::validate_document_id;
///
/// assert!(validate_document_id("2024_INST_5").is_ok());
/// assert!(validate_document_id("../etc").is_err());
/// ```
pub fn validate_document_id(id: &str) -> Result<()> {
    if DOCUMENT_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(ConverterError::InvalidDocumentId(id.to_string()))
    }
}

/// Validate and parse a date in YYYY-MM-DD format.
///
/// # Examples
/// ```
/// use leychile_converter::config::validate_date;
///
/// assert!(validate_date("2024-10-03").is_ok());
/// assert!(validate_date("2024-13-01").is_err());
/// ```
pub fn validate_date(date_str: &str) -> Result<chrono::NaiveDate> {
    if !DATE_PATTERN.is_match(date_str) {
        return Err(ConverterError::InvalidDate(date_str.to_string()));
    }

    chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| ConverterError::InvalidDate(date_str.to_string()))
}

/// Make a string safe to use as a file name.
///
/// Spaces become underscores; anything that is not alphanumeric, `.`, `-`
/// or `_` is dropped.
///
/// # Examples
/// ```
/// use leychile_converter::config::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Ley 21.000"), "Ley_21.000");
/// assert_eq!(sanitize_filename("Norma de Carácter General/14"), "Norma_de_Carácter_General14");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    name.replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '.')
        .collect()
}

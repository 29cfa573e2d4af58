//! Normalization of legal-reference strings.

use crate::error::ParseWarning;
use crate::patterns::{match_law_reference, LawRefKind};

/// A reference string split into its typed parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawRef {
    /// Reference family.
    pub kind: LawRefKind,

    /// Number token ("20.720", "1-19.653").
    pub number: String,

    /// Article of the referenced norm, when the string names one.
    pub article: Option<String>,

    /// The string as it was stored in the metadata.
    pub original: String,
}

impl LawRef {
    /// Parse a "<type> <number>" reference string.
    ///
    /// # Examples
    /// ```
    /// use leychile_converter::patterns::LawRefKind;
    /// use leychile_converter::xml::LawRef;
    ///
    /// let reference = LawRef::parse("D.S. 181").unwrap();
    /// assert_eq!(reference.kind, LawRefKind::DecretoSupremo);
    /// assert_eq!(reference.number, "181");
    /// assert!(LawRef::parse("Oficio 2542").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (kind, number, article) = match_law_reference(text)?;
        Some(Self {
            kind,
            number,
            article,
            original: text.trim().to_string(),
        })
    }
}

/// Split reference strings into recognized references and the strings no
/// family matched.
pub fn partition_references(references: &[String]) -> (Vec<LawRef>, Vec<String>) {
    let mut recognized = Vec::new();
    let mut unrecognized = Vec::new();
    for reference in references {
        match LawRef::parse(reference) {
            Some(parsed) => recognized.push(parsed),
            None => unrecognized.push(reference.clone()),
        }
    }
    (recognized, unrecognized)
}

/// Parse reference strings for serialization, dropping (and logging) the
/// ones that match no family.
pub fn normalize_references(references: &[String]) -> Vec<LawRef> {
    let (recognized, unrecognized) = partition_references(references);
    for reference in &unrecognized {
        tracing::warn!(reference = %reference, "Dropping unrecognized law reference");
    }
    recognized
}

/// Warnings for the reference strings that will not be serialized.
pub fn reference_warnings(references: &[String]) -> Vec<ParseWarning> {
    partition_references(references)
        .1
        .into_iter()
        .map(ParseWarning::UnrecognizedReference)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_parse_all_families() {
        let cases = [
            ("Ley 20.720", LawRefKind::Ley, "20.720"),
            ("DFL 1-19.653", LawRefKind::Dfl, "1-19.653"),
            ("D.S. 181", LawRefKind::DecretoSupremo, "181"),
            ("NCG 14", LawRefKind::Ncg, "14"),
        ];
        for (text, kind, number) in cases {
            let reference = LawRef::parse(text).unwrap();
            assert_eq!(reference.kind, kind);
            assert_eq!(reference.number, number);
            assert_eq!(reference.original, text);
            assert_eq!(format!("{} {}", reference.kind.as_str(), reference.number), text);
        }
    }

    #[test]
    fn test_parse_with_article() {
        let reference = LawRef::parse("Ley 20.720, artículo 331").unwrap();
        assert_eq!(reference.article.as_deref(), Some("331"));
    }

    #[test]
    fn test_normalize_drops_unknown() {
        let refs = normalize_references(&strings(&["Ley 21.563", "Oficio Superir 2542", "NCG 7"]));
        let rendered: Vec<&str> = refs.iter().map(|r| r.original.as_str()).collect();
        assert_eq!(rendered, vec!["Ley 21.563", "NCG 7"]);
    }

    #[test]
    fn test_reference_warnings() {
        let warnings = reference_warnings(&strings(&["Ley 21.563", "Circular 3"]));
        assert_eq!(
            warnings,
            vec![ParseWarning::UnrecognizedReference("Circular 3".to_string())]
        );
    }
}

//! Document assembler that ties the parsing components together.

use chrono::NaiveDate;

use crate::catalog::CatalogEntry;
use crate::config::ParserConfig;
use crate::error::{ConverterError, ParseWarning, Result};
use crate::hierarchy::build_hierarchy;
use crate::metadata::{extract_metadata, ExtractedMetadata};
use crate::patterns::is_promulgation;
use crate::text::{normalize_input, normalize_text, unwrap_pdf_lines};
use crate::types::{Closing, Document, DocumentType, Metadata, Part, Preamble};
use crate::xml::reference_warnings;
use crate::zones::{split_zones, Zones};

/// Number used when neither the caller, the catalog nor the text gives one.
const UNNUMBERED: &str = "S/N";

/// Caller-supplied facts about the document being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Type of document.
    pub doc_type: DocumentType,

    /// Document number, overriding anything found in the text.
    pub doc_number: Option<String>,

    /// URL the text was obtained from.
    pub source_url: Option<String>,

    /// Publication date, overriding the text and the catalog.
    pub publication_date: Option<NaiveDate>,

    /// Document id; defaults to "<PREFIX>-<number>".
    pub id: Option<String>,
}

impl ParseOptions {
    /// Options for a document of the given type.
    #[must_use]
    pub fn new(doc_type: DocumentType) -> Self {
        Self {
            doc_type,
            doc_number: None,
            source_url: None,
            publication_date: None,
            id: None,
        }
    }

    /// Set the document number.
    #[must_use]
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.doc_number = Some(number.into());
        self
    }

    /// Set the source URL.
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Set the publication date.
    #[must_use]
    pub fn with_publication_date(mut self, date: NaiveDate) -> Self {
        self.publication_date = Some(date);
        self
    }

    /// Set the document id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Parse document text into a `Document`.
///
/// # Arguments
/// * `text` - Raw document text
/// * `options` - Type, number, URL and id supplied by the caller
/// * `catalog` - Catalog entry for the document, if any
/// * `config` - Parser settings
///
/// # Returns
/// The parsed document; soft problems are collected in `Document::warnings`.
/// Only blank input is an error.
///
/// # Examples
/// ```
/// use leychile_converter::assembler::{parse_document, ParseOptions};
/// use leychile_converter::config::ParserConfig;
/// use leychile_converter::types::DocumentType;
///
/// let text = "VISTOS:\nLa Ley N° 20.720.\n\nRESUELVO:\n\nArtículo 1. Texto.\n\nII. NOTIFÍQUESE.";
/// let options = ParseOptions::new(DocumentType::Instructivo).with_number("5");
/// let doc = parse_document(text, &options, None, &ParserConfig::default()).unwrap();
/// assert_eq!(doc.id, "INST-5");
/// assert_eq!(doc.parts.len(), 1);
/// assert_eq!(doc.metadata.law_references, vec!["Ley 20.720"]);
/// ```
pub fn parse_document(
    text: &str,
    options: &ParseOptions,
    catalog: Option<&CatalogEntry>,
    config: &ParserConfig,
) -> Result<Document> {
    if text.trim().is_empty() {
        let label = options
            .id
            .clone()
            .or_else(|| options.doc_number.clone())
            .unwrap_or_else(|| options.doc_type.as_str().to_string());
        return Err(ConverterError::EmptyInput(label));
    }

    let text = normalize_input(text);
    let zones = split_zones(&text);
    let extracted = extract_metadata(&zones, &text, options.doc_type, config);

    let body = unwrap_pdf_lines(&normalize_text(&zones.body));
    let hierarchy = build_hierarchy(&body, config);

    let number = options
        .doc_number
        .clone()
        .or_else(|| catalog.and_then(|entry| entry.doc_number.clone()))
        .or_else(|| extracted.document_number.clone())
        .or_else(|| extracted.resolution_number.clone())
        .unwrap_or_else(|| UNNUMBERED.to_string());

    let mut doc = Document::new(options.doc_type, number);
    if let Some(id) = &options.id {
        doc.id = id.clone();
    }
    doc.schema_version = config.schema_version.clone();
    doc.source_url = options
        .source_url
        .clone()
        .or_else(|| catalog.and_then(|entry| entry.url.clone()));
    doc.promulgation_date = extracted.promulgation_date;
    doc.publication_date = options
        .publication_date
        .or(extracted.publication_date)
        .or_else(|| catalog.and_then(|entry| entry.publication_date));

    doc.metadata = build_metadata(&extracted, catalog, config);
    doc.preamble = build_preamble(&zones);
    doc.body_intro = hierarchy.intro;
    doc.parts = hierarchy.parts;
    doc.closing = build_closing(&hierarchy.deferred_closing, &zones.closing);
    doc.revoked = all_articles_revoked(&doc.parts);

    if !zones.anchors_found {
        tracing::warn!(id = %doc.id, "No zone anchors found, parsing whole text as body");
        doc.warnings.push(ParseWarning::MalformedInput);
    }
    doc.warnings.extend(hierarchy.warnings);
    doc.warnings
        .extend(reference_warnings(&doc.metadata.law_references));

    tracing::debug!(
        id = %doc.id,
        parts = doc.parts.len(),
        warnings = doc.warnings.len(),
        "document assembled"
    );
    Ok(doc)
}

/// Merge extracted metadata with the catalog entry. Catalog values only
/// append to lists or fill missing values.
fn build_metadata(
    extracted: &ExtractedMetadata,
    catalog: Option<&CatalogEntry>,
    config: &ParserConfig,
) -> Metadata {
    let mut metadata = Metadata {
        source_identification: config.issuer.clone(),
        source_number: extracted.resolution_number.clone(),
        ..Metadata::default()
    };

    if let Some(subject) = &extracted.subject {
        metadata.add_subject(subject.clone());
    }
    for reference in &extracted.law_references {
        metadata.add_law_reference(reference.clone());
    }

    if let Some(entry) = catalog {
        for subject in &entry.subjects {
            metadata.add_subject(subject.clone());
        }
        for name in &entry.common_names {
            metadata.add_common_name(name.clone());
        }
        if let Some(category) = &entry.category {
            metadata.add_concept(category.clone());
        }
        if metadata.source_number.is_none() {
            metadata.source_number = entry.resolution_number.clone();
        }
    }

    metadata.title = catalog
        .and_then(|entry| entry.title.clone())
        .or_else(|| extracted.subject.clone())
        .unwrap_or_default();

    metadata
}

fn build_preamble(zones: &Zones) -> Option<Preamble> {
    if !zones.recitals.is_empty() || !zones.grounds.is_empty() {
        return Some(Preamble::Structured {
            recitals: zones.recitals.clone(),
            grounds: zones.grounds.clone(),
        });
    }
    if zones.anchors_found && !zones.header.is_empty() {
        return Some(Preamble::Narrative(zones.header.clone()));
    }
    None
}

/// Closing content in reading order: directive lines found in the body,
/// then the closing zone.
fn build_closing(deferred: &str, closing_zone: &str) -> Option<Closing> {
    let text = [deferred, closing_zone]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        None
    } else if is_promulgation(&text) {
        Some(Closing::Promulgation(text))
    } else {
        Some(Closing::FinalProvisions(text))
    }
}

/// A document counts as revoked when it has articles and every one of them
/// is revoked.
fn all_articles_revoked(parts: &[Part]) -> bool {
    fn visit(parts: &[Part], total: &mut usize, revoked: &mut usize) {
        for part in parts {
            if part.is_article() {
                *total += 1;
                if part.revoked {
                    *revoked += 1;
                }
            }
            visit(&part.children, total, revoked);
        }
    }

    let (mut total, mut revoked) = (0, 0);
    visit(parts, &mut total, &mut revoked);
    total > 0 && total == revoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PartKind;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "RESOLUCIÓN EXENTA N.° 6597
MAT.: APRUEBA NORMA SOBRE FORMALIDADES
SANTIAGO, 11 AGOSTO 2023

VISTOS:
Lo dispuesto en la Ley N° 20.720 y en el D.F.L. N° 1-19.653.

CONSIDERANDO:
Que corresponde dictar normas.

RESUELVO:

TÍTULO I
DISPOSICIONES GENERALES

Artículo 1. Objeto. La presente norma regula las formalidades de las
publicaciones del Boletín Concursal.

Artículo 2. Los procedimientos contemplados en el
Capítulo IV y los simplificados deberán publicarse.

II. NOTIFÍQUESE a los interesados.
III. PUBLÍQUESE en el Diario Oficial.
";

    fn parse(text: &str, options: &ParseOptions, catalog: Option<&CatalogEntry>) -> Document {
        parse_document(text, options, catalog, &ParserConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let options = ParseOptions::new(DocumentType::Instructivo).with_id("2024_INST_5");
        let err = parse_document("  \n\t", &options, None, &ParserConfig::default()).unwrap_err();
        assert!(matches!(err, ConverterError::EmptyInput(id) if id == "2024_INST_5"));
    }

    #[test]
    fn test_full_document() {
        let doc = parse(SAMPLE, &ParseOptions::new(DocumentType::NormaCaracterGeneral), None);

        // No type-specific number in the header, so the resolution number is used
        assert_eq!(doc.number, "6597");
        assert_eq!(doc.id, "NCG-6597");
        assert_eq!(doc.promulgation_date, NaiveDate::from_ymd_opt(2023, 8, 11));
        assert_eq!(doc.metadata.title, "Aprueba norma sobre formalidades");
        assert_eq!(doc.metadata.subjects, vec!["Aprueba norma sobre formalidades"]);
        assert_eq!(doc.metadata.law_references, vec!["Ley 20.720", "DFL 1-19.653"]);
        assert_eq!(doc.metadata.source_number.as_deref(), Some("6597"));
        assert!(doc.warnings.is_empty(), "{:?}", doc.warnings);

        assert_eq!(doc.parts.len(), 1);
        let title = &doc.parts[0];
        assert_eq!(title.kind, PartKind::Title);
        assert_eq!(title.caption.as_deref(), Some("DISPOSICIONES GENERALES"));
        assert_eq!(title.children.len(), 2);
        assert_eq!(title.children[0].caption.as_deref(), Some("Objeto"));
        assert_eq!(
            title.children[0].text,
            "La presente norma regula las formalidades de las publicaciones del Boletín Concursal."
        );
        // Mid-sentence chapter mention stays in the article text
        assert!(title.children[1].text.contains("en el Capítulo IV y los simplificados"));
    }

    #[test]
    fn test_zones_become_preamble_and_closing() {
        let doc = parse(SAMPLE, &ParseOptions::new(DocumentType::Resolucion), None);

        let Some(Preamble::Structured { recitals, grounds }) = &doc.preamble else {
            panic!("expected structured preamble, got {:?}", doc.preamble);
        };
        assert!(recitals.starts_with("Lo dispuesto"));
        assert_eq!(grounds, "Que corresponde dictar normas.");

        let Some(Closing::FinalProvisions(closing)) = &doc.closing else {
            panic!("expected final provisions, got {:?}", doc.closing);
        };
        assert!(closing.contains("II. NOTIFÍQUESE"));
        assert!(closing.contains("III. PUBLÍQUESE"));
        for article in &doc.parts[0].children {
            assert!(!article.text.contains("NOTIFÍQUESE"));
        }
    }

    #[test]
    fn test_no_anchors() {
        let text = "Artículo 1. Texto uno.\n\nArtículo 2. Texto dos.";
        let doc = parse(text, &ParseOptions::new(DocumentType::Ley).with_number("21.000"), None);

        assert_eq!(doc.parts.len(), 2);
        assert!(doc.preamble.is_none());
        assert!(doc.closing.is_none());
        assert_eq!(doc.warnings, vec![ParseWarning::MalformedInput]);
    }

    #[test]
    fn test_number_priority() {
        let text = "INSTRUCTIVO SUPERIR N° 5\nRESOLUCIÓN EXENTA N° 900\n\nRESUELVO:\nArtículo 1. Texto.";
        let config = ParserConfig::default();

        let from_text = ParseOptions::new(DocumentType::Instructivo);
        assert_eq!(parse_document(text, &from_text, None, &config).unwrap().number, "5");

        let entry = CatalogEntry {
            doc_number: Some("7".to_string()),
            ..CatalogEntry::default()
        };
        assert_eq!(
            parse_document(text, &from_text, Some(&entry), &config).unwrap().number,
            "7"
        );

        let explicit = from_text.clone().with_number("8");
        assert_eq!(
            parse_document(text, &explicit, Some(&entry), &config).unwrap().number,
            "8"
        );

        let unnumbered = "RESUELVO:\nArtículo 1. Texto.";
        assert_eq!(
            parse_document(unnumbered, &from_text, None, &config).unwrap().number,
            UNNUMBERED
        );
    }

    #[test]
    fn test_catalog_merge() {
        let entry = CatalogEntry {
            title: Some("Norma sobre formalidades de publicación".to_string()),
            url: Some("https://www.superir.gob.cl/ncg.pdf".to_string()),
            resolution_number: Some("1".to_string()),
            publication_date: NaiveDate::from_ymd_opt(2023, 8, 21),
            subjects: vec![
                "Publicaciones".to_string(),
                "Aprueba norma sobre formalidades".to_string(),
            ],
            common_names: vec!["Norma de publicaciones".to_string()],
            category: Some("Publicaciones".to_string()),
            doc_number: None,
        };
        let doc = parse(SAMPLE, &ParseOptions::new(DocumentType::Resolucion), Some(&entry));

        assert_eq!(doc.metadata.title, "Norma sobre formalidades de publicación");
        assert_eq!(
            doc.metadata.subjects,
            vec!["Aprueba norma sobre formalidades", "Publicaciones"]
        );
        // Category equal to a subject is not repeated as a concept
        assert!(doc.metadata.concepts.is_empty());
        assert_eq!(doc.metadata.common_names, vec!["Norma de publicaciones"]);
        // The text's resolution number wins over the catalog's
        assert_eq!(doc.metadata.source_number.as_deref(), Some("6597"));
        assert_eq!(doc.publication_date, NaiveDate::from_ymd_opt(2023, 8, 21));
        assert_eq!(doc.source_url.as_deref(), Some("https://www.superir.gob.cl/ncg.pdf"));
    }

    #[test]
    fn test_explicit_publication_date_wins() {
        let entry = CatalogEntry {
            publication_date: NaiveDate::from_ymd_opt(2023, 8, 21),
            ..CatalogEntry::default()
        };
        let date = NaiveDate::from_ymd_opt(2023, 8, 30).unwrap();
        let options = ParseOptions::new(DocumentType::Resolucion).with_publication_date(date);

        let doc = parse(SAMPLE, &options, Some(&entry));
        assert_eq!(doc.publication_date, Some(date));
        assert_eq!(doc.promulgation_date, NaiveDate::from_ymd_opt(2023, 8, 11));
    }

    #[test]
    fn test_approving_directive_document() {
        let text = "INSTRUCTIVO SUPERIR N° 2\nSANTIAGO, 3 de octubre de 2024\n\n\
                    VISTOS:\nLa Ley N° 20.720.\n\nRESUELVO:\n\n\
                    I. APRUÉBASE el siguiente Instructivo:\n\n\
                    Artículo 1. El liquidador deberá informar.\n\n\
                    Artículo 2. El informe se presentará por escrito.\n\n\
                    II. NOTIFÍQUESE a los liquidadores.\n\nANÓTESE Y ARCHÍVESE.";
        let doc = parse(text, &ParseOptions::new(DocumentType::Instructivo), None);

        assert_eq!(doc.number, "2");
        assert_eq!(doc.parts.len(), 2);
        let closing = doc.closing.as_ref().map(Closing::text).unwrap_or_default();
        assert!(closing.starts_with("I. APRUÉBASE"));
        assert!(closing.ends_with("ANÓTESE Y ARCHÍVESE."));
    }

    #[test]
    fn test_promulgation_closing() {
        let text = "VISTOS:\nLo aprobado por el Congreso.\n\nRESUELVO:\n\
                    Artículo único. Texto.\n\n\
                    Y por cuanto he tenido a bien aprobarlo y sancionarlo; por tanto promúlguese y llévese a efecto como Ley de la República.";
        let doc = parse(text, &ParseOptions::new(DocumentType::Ley), None);

        assert!(matches!(doc.closing, Some(Closing::Promulgation(_))));
    }

    #[test]
    fn test_revoked_document() {
        let text = "RESUELVO:\nArtículo 1. Derogado.\n\nArtículo 2. (Suprimido)";
        let doc = parse(text, &ParseOptions::new(DocumentType::Resolucion), None);
        assert!(doc.revoked);

        let text = "RESUELVO:\nArtículo 1. Derogado.\n\nArtículo 2. Vigente.";
        let doc = parse(text, &ParseOptions::new(DocumentType::Resolucion), None);
        assert!(!doc.revoked);
    }

    #[test]
    fn test_narrative_preamble() {
        let text = "Teniendo presente lo que sigue.\nRESUELVO:\nArtículo 1. Texto.";
        let doc = parse(text, &ParseOptions::new(DocumentType::Resolucion), None);
        assert_eq!(
            doc.preamble,
            Some(Preamble::Narrative("Teniendo presente lo que sigue.".to_string()))
        );
    }
}

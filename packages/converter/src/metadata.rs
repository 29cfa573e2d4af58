//! Metadata extraction from the header, recitals and grounds zones.

use chrono::NaiveDate;

use crate::config::ParserConfig;
use crate::patterns::{
    find_dates, find_document_number, find_law_references, find_resolution_number,
    is_resolution_line, match_anchor, match_subject_label,
};
use crate::text::capitalize_subject;
use crate::types::DocumentType;
use crate::zones::Zones;

/// Metadata found in the text, before any catalog merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// First date of the header.
    pub promulgation_date: Option<NaiveDate>,

    /// Second, distinct date of the header.
    pub publication_date: Option<NaiveDate>,

    /// Exempt-resolution number.
    pub resolution_number: Option<String>,

    /// Number from the type-specific heading ("INSTRUCTIVO N° 5").
    pub document_number: Option<String>,

    /// Subject line, in sentence case when the source is upper case.
    pub subject: Option<String>,

    /// Distinct law references of the recitals and grounds, as
    /// "<type> <number>".
    pub law_references: Vec<String>,
}

/// Lines searched for header metadata: the header zone, or the first lines
/// of the text up to the first zone anchor when the document has no header.
fn header_area(zones: &Zones, full_text: &str, config: &ParserConfig) -> String {
    if zones.header.is_empty() {
        full_text
            .lines()
            .take(config.header_scan_lines)
            .take_while(|line| match_anchor(line).is_none())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        zones.header.clone()
    }
}

/// Extract the subject: the text after the label plus its continuation
/// lines, up to a blank line, a date, an anchor or a resolution line.
fn extract_subject(header: &str) -> Option<String> {
    let mut lines = header.lines();
    let mut subject = lines.by_ref().find_map(match_subject_label)?;

    for line in lines {
        let line = line.trim();
        if line.is_empty()
            || !find_dates(line).is_empty()
            || match_anchor(line).is_some()
            || is_resolution_line(line)
            || match_subject_label(line).is_some()
        {
            break;
        }
        if !subject.is_empty() {
            subject.push(' ');
        }
        subject.push_str(line);
    }

    let subject = capitalize_subject(&subject);
    (!subject.is_empty()).then_some(subject)
}

/// Render the law references of the recitals and grounds, in order of first
/// appearance.
///
/// # Examples
/// ```
/// use leychile_converter::metadata::extract_law_references;
///
/// let refs = extract_law_references("Ley N° 20.720 y Ley N° 21.563.", "Ley N° 20.720.");
/// assert_eq!(refs, vec!["Ley 20.720", "Ley 21.563"]);
/// ```
pub fn extract_law_references(recitals: &str, grounds: &str) -> Vec<String> {
    let text = format!("{recitals}\n{grounds}");
    let mut refs: Vec<String> = Vec::new();
    for reference in find_law_references(&text) {
        let rendered = reference.render();
        if !refs.contains(&rendered) {
            refs.push(rendered);
        }
    }
    refs
}

/// Extract metadata from split zones.
pub fn extract_metadata(
    zones: &Zones,
    full_text: &str,
    doc_type: DocumentType,
    config: &ParserConfig,
) -> ExtractedMetadata {
    let header = header_area(zones, full_text, config);

    let dates = find_dates(&header);
    let promulgation_date = dates.first().map(|d| d.date);
    let publication_date = dates
        .iter()
        .map(|d| d.date)
        .find(|date| Some(*date) != promulgation_date);

    // Resolutions cited in the recitals are not the document's own number.
    let resolution_number = find_resolution_number(&header);

    let document_number = match doc_type {
        DocumentType::Resolucion => None,
        other => find_document_number(other, &header),
    };

    let metadata = ExtractedMetadata {
        promulgation_date,
        publication_date,
        resolution_number,
        document_number,
        subject: extract_subject(&header),
        law_references: extract_law_references(&zones.recitals, &zones.grounds),
    };

    tracing::debug!(
        resolution = ?metadata.resolution_number,
        date = ?metadata.promulgation_date,
        references = metadata.law_references.len(),
        "metadata extracted"
    );
    metadata
}

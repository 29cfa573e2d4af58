//! Core data types for the converter.
//!
//! These types represent a parsed legal document: its metadata, its preamble
//! and closing zones and the recursive tree of structural parts.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ParseWarning;
use crate::text::append_line;

/// Types of documents the parser handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentType {
    /// Law (ley).
    Ley,

    /// General-character rule (Norma de Carácter General).
    NormaCaracterGeneral,

    /// Instruction (Instructivo).
    Instructivo,

    /// Exempt resolution (Resolución Exenta).
    Resolucion,

    /// Circular.
    Circular,
}

impl DocumentType {
    /// Get the display value used in the XML `tipo` attribute.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ley => "Ley",
            Self::NormaCaracterGeneral => "Norma de Carácter General",
            Self::Instructivo => "Instructivo",
            Self::Resolucion => "Resolución",
            Self::Circular => "Circular",
        }
    }

    /// Get the prefix used to build document ids.
    #[must_use]
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Ley => "LEY",
            Self::NormaCaracterGeneral => "NCG",
            Self::Instructivo => "INST",
            Self::Resolucion => "RES",
            Self::Circular => "CIRC",
        }
    }

    /// Parse from a free-text type tag (CLI flag or catalog value).
    #[must_use]
    pub fn from_tag(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "ley" => Self::Ley,
            "ncg" | "norma" | "norma de carácter general" | "norma de caracter general" => {
                Self::NormaCaracterGeneral
            }
            "instructivo" | "inst" => Self::Instructivo,
            "circular" => Self::Circular,
            _ => Self::Resolucion, // Default
        }
    }
}

/// Kind of a structural part, ordered by containment rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PartKind {
    Book,
    Title,
    Chapter,
    Paragraph,
    Article,
}

impl PartKind {
    /// Containment rank: lower values contain higher ones.
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Book => 0,
            Self::Title => 1,
            Self::Chapter => 2,
            Self::Paragraph => 3,
            Self::Article => 4,
        }
    }

    /// Display name in the source language.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "Libro",
            Self::Title => "Título",
            Self::Chapter => "Capítulo",
            Self::Paragraph => "Párrafo",
            Self::Article => "Artículo",
        }
    }

    /// XML element name.
    #[must_use]
    pub fn xml_tag(&self) -> &'static str {
        match self {
            Self::Book => "libro",
            Self::Title => "titulo",
            Self::Chapter => "capitulo",
            Self::Paragraph => "parrafo",
            Self::Article => "articulo",
        }
    }

    /// Parse a header keyword ("TÍTULO", "Capítulo", "párrafo", ...).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "libro" => Some(Self::Book),
            "título" | "titulo" => Some(Self::Title),
            "capítulo" | "capitulo" => Some(Self::Chapter),
            "párrafo" | "parrafo" => Some(Self::Paragraph),
            "artículo" | "articulo" => Some(Self::Article),
            _ => None,
        }
    }
}

/// A node of the document hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    /// Kind of part.
    pub kind: PartKind,

    /// Identifier, unique within the document.
    pub id: String,

    /// Declared name ("I", "5", "transitorio").
    pub name: String,

    /// Short caption ("Responsabilidad", "DISPOSICIONES GENERALES").
    pub caption: Option<String>,

    /// Body text; paragraphs separated by newlines.
    pub text: String,

    /// Nesting depth (0 = root).
    pub depth: usize,

    /// Whether the part has been revoked.
    pub revoked: bool,

    /// Whether this is a transitory article.
    pub transitory: bool,

    /// Child parts in reading order.
    pub children: Vec<Part>,
}

impl Part {
    /// Create a new part with no text and no children.
    #[must_use]
    pub fn new(kind: PartKind, id: impl Into<String>, name: impl Into<String>, depth: usize) -> Self {
        Self {
            kind,
            id: id.into(),
            name: name.into(),
            caption: None,
            text: String::new(),
            depth,
            revoked: false,
            transitory: false,
            children: Vec::new(),
        }
    }

    /// Set the caption.
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Set the body text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Add a child part.
    #[must_use]
    pub fn with_child(mut self, child: Part) -> Self {
        self.children.push(child);
        self
    }

    /// Whether this part is an article.
    #[must_use]
    pub fn is_article(&self) -> bool {
        self.kind == PartKind::Article
    }

    /// Append a source line to the body text.
    ///
    /// A line that follows a finished sentence starts a new paragraph;
    /// otherwise it continues the current one after a single space.
    pub fn push_line(&mut self, line: &str) {
        append_line(&mut self.text, line);
    }

    /// Iterate over the non-empty paragraphs of the body text.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        split_paragraphs(&self.text)
    }

    /// Title shown in the output: caption, else "<kind> <name>", else
    /// "<kind> <id>".
    ///
    /// # Examples
    /// ```
    /// use leychile_converter::types::{Part, PartKind};
    ///
    /// let article = Part::new(PartKind::Article, "3", "5", 0);
    /// assert_eq!(article.display_title(), "Artículo 5");
    ///
    /// let title = Part::new(PartKind::Title, "1", "I", 0).with_caption("DISPOSICIONES GENERALES");
    /// assert_eq!(title.display_title(), "DISPOSICIONES GENERALES");
    /// ```
    #[must_use]
    pub fn display_title(&self) -> String {
        if let Some(caption) = self.caption.as_deref().filter(|c| !c.is_empty()) {
            return caption.to_string();
        }
        if !self.name.is_empty() {
            return format!("{} {}", self.kind.as_str(), self.name);
        }
        format!("{} {}", self.kind.as_str(), self.id)
    }
}

/// Split text into trimmed, non-empty paragraphs (one per line).
pub fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|p| !p.is_empty())
}

/// Preamble of a document: a single narrative block or the recitals/grounds
/// pair, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Preamble {
    /// Free narrative text preceding the operative body.
    Narrative(String),

    /// "VISTOS" (recitals) and "CONSIDERANDO" (grounds).
    Structured { recitals: String, grounds: String },
}

/// Closing content of a document: a promulgation formula or final
/// provisions, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Closing {
    /// Promulgation formula of a law.
    Promulgation(String),

    /// Closing directives of a resolution (notify, publish, repeal...).
    FinalProvisions(String),
}

impl Closing {
    /// The closing text, whatever its shape.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Promulgation(text) | Self::FinalProvisions(text) => text,
        }
    }
}

/// Document-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Document title.
    pub title: String,

    /// Subject tags (materias).
    pub subjects: Vec<String>,

    /// Concept tags, disjoint from the subjects.
    pub concepts: Vec<String>,

    /// Common-usage names.
    pub common_names: Vec<String>,

    /// Referenced norms as "<type> <number>" strings.
    pub law_references: Vec<String>,

    /// Issuing body.
    pub source_identification: String,

    /// Number of the source document (resolution number).
    pub source_number: Option<String>,
}

impl Metadata {
    /// Add a subject tag, keeping the list free of duplicates.
    ///
    /// An equal concept tag is removed so subjects and concepts stay
    /// disjoint.
    pub fn add_subject(&mut self, subject: impl Into<String>) {
        let subject = subject.into();
        let subject = subject.trim();
        if subject.is_empty() || self.subjects.iter().any(|s| s == subject) {
            return;
        }
        self.concepts.retain(|c| c != subject);
        self.subjects.push(subject.to_string());
    }

    /// Add a concept tag unless it is already a subject or a concept.
    pub fn add_concept(&mut self, concept: impl Into<String>) {
        let concept = concept.into();
        let concept = concept.trim();
        if concept.is_empty()
            || self.subjects.iter().any(|s| s == concept)
            || self.concepts.iter().any(|c| c == concept)
        {
            return;
        }
        self.concepts.push(concept.to_string());
    }

    /// Add a common-usage name, skipping duplicates.
    pub fn add_common_name(&mut self, name: impl Into<String>) {
        push_unique(&mut self.common_names, name.into());
    }

    /// Add a law reference string, skipping duplicates.
    pub fn add_law_reference(&mut self, reference: impl Into<String>) {
        push_unique(&mut self.law_references, reference.into());
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    let value = value.trim();
    if !value.is_empty() && !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// A parsed legal document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Identifier (e.g., "INST-5").
    pub id: String,

    /// Type of document.
    pub doc_type: DocumentType,

    /// Document number (e.g., "5", "14", "21.000").
    pub number: String,

    /// Promulgation (signature) date.
    pub promulgation_date: Option<NaiveDate>,

    /// Publication date.
    pub publication_date: Option<NaiveDate>,

    /// Whether the whole document has been revoked.
    pub revoked: bool,

    /// Schema version of the serialized form.
    pub schema_version: String,

    /// URL the text was obtained from.
    pub source_url: Option<String>,

    /// Document metadata.
    pub metadata: Metadata,

    /// Preamble, if the source had one.
    pub preamble: Option<Preamble>,

    /// Body prose that precedes the first structural part.
    pub body_intro: String,

    /// Top-level parts in reading order.
    pub parts: Vec<Part>,

    /// Closing content, if the source had one.
    pub closing: Option<Closing>,

    /// Soft diagnostics raised while parsing.
    pub warnings: Vec<ParseWarning>,
}

impl Document {
    /// Full title: the metadata title, or "<type> <number>".
    ///
    /// # Examples
    /// ```
    /// use leychile_converter::types::{Document, DocumentType};
    ///
    /// let doc = Document::new(DocumentType::Ley, "21.000");
    /// assert_eq!(doc.full_title(), "Ley 21.000");
    /// ```
    #[must_use]
    pub fn full_title(&self) -> String {
        if self.metadata.title.is_empty() {
            format!("{} {}", self.doc_type.as_str(), self.number)
        } else {
            self.metadata.title.clone()
        }
    }

    /// Default output file stem: "<type>_<number>" with spaces replaced.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{} {}", self.doc_type.as_str(), self.number).replace(' ', "_")
    }

    /// Create an empty document of the given type and number.
    #[must_use]
    pub fn new(doc_type: DocumentType, number: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            id: format!("{}-{}", doc_type.id_prefix(), number),
            doc_type,
            number,
            promulgation_date: None,
            publication_date: None,
            revoked: false,
            schema_version: crate::config::SCHEMA_VERSION.to_string(),
            source_url: None,
            metadata: Metadata::default(),
            preamble: None,
            body_intro: String::new(),
            parts: Vec::new(),
            closing: None,
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_as_str() {
        assert_eq!(DocumentType::Ley.as_str(), "Ley");
        assert_eq!(
            DocumentType::NormaCaracterGeneral.as_str(),
            "Norma de Carácter General"
        );
        assert_eq!(DocumentType::Instructivo.id_prefix(), "INST");
    }

    #[test]
    fn test_document_type_from_tag() {
        assert_eq!(DocumentType::from_tag("ley"), DocumentType::Ley);
        assert_eq!(DocumentType::from_tag("NCG"), DocumentType::NormaCaracterGeneral);
        assert_eq!(DocumentType::from_tag("Instructivo"), DocumentType::Instructivo);
        // Unknown defaults to Resolucion
        assert_eq!(DocumentType::from_tag("oficio"), DocumentType::Resolucion);
    }

    #[test]
    fn test_part_kind_rank_order() {
        assert!(PartKind::Book.rank() < PartKind::Title.rank());
        assert!(PartKind::Title.rank() < PartKind::Chapter.rank());
        assert!(PartKind::Chapter.rank() < PartKind::Paragraph.rank());
        assert!(PartKind::Paragraph.rank() < PartKind::Article.rank());
    }

    #[test]
    fn test_part_kind_from_keyword() {
        assert_eq!(PartKind::from_keyword("TÍTULO"), Some(PartKind::Title));
        assert_eq!(PartKind::from_keyword("Capitulo"), Some(PartKind::Chapter));
        assert_eq!(PartKind::from_keyword("PÁRRAFO"), Some(PartKind::Paragraph));
        assert_eq!(PartKind::from_keyword("inciso"), None);
    }

    #[test]
    fn test_part_push_line_joins_and_breaks() {
        let mut part = Part::new(PartKind::Article, "1", "1", 0);
        part.push_line("Los procedimientos contemplados en el");
        part.push_line("Capítulo IV de la Ley.");
        part.push_line("Segundo inciso.");
        assert_eq!(
            part.text,
            "Los procedimientos contemplados en el Capítulo IV de la Ley.\nSegundo inciso."
        );
        assert_eq!(part.paragraphs().count(), 2);
    }

    #[test]
    fn test_display_title_fallbacks() {
        let with_name = Part::new(PartKind::Article, "7", "5", 1);
        assert_eq!(with_name.display_title(), "Artículo 5");

        let unnamed = Part::new(PartKind::Paragraph, "9", "", 1);
        assert_eq!(unnamed.display_title(), "Párrafo 9");

        let captioned = Part::new(PartKind::Article, "2", "13", 0).with_caption("Responsabilidad");
        assert_eq!(captioned.display_title(), "Responsabilidad");
    }

    #[test]
    fn test_metadata_subjects_and_concepts_disjoint() {
        let mut metadata = Metadata::default();
        metadata.add_concept("Liquidación");
        metadata.add_subject("Fianzas");
        metadata.add_subject("Liquidación");
        metadata.add_subject("Fianzas");
        metadata.add_concept("Fianzas");

        assert_eq!(metadata.subjects, vec!["Fianzas", "Liquidación"]);
        assert!(metadata.concepts.is_empty());
    }

    #[test]
    fn test_document_full_title_and_file_stem() {
        let mut doc = Document::new(DocumentType::Ley, "21.000");
        assert_eq!(doc.id, "LEY-21.000");
        assert_eq!(doc.full_title(), "Ley 21.000");
        assert_eq!(doc.file_stem(), "Ley_21.000");

        doc.metadata.title = "LEY QUE REGULA ALGO".to_string();
        assert_eq!(doc.full_title(), "LEY QUE REGULA ALGO");
    }

    #[test]
    fn test_serde_serialization() {
        assert_eq!(
            serde_json::to_string(&DocumentType::Instructivo).unwrap(),
            "\"Instructivo\""
        );
        assert_eq!(serde_json::to_string(&PartKind::Paragraph).unwrap(), "\"Paragraph\"");

        let mut doc = Document::new(DocumentType::Ley, "21.000");
        doc.preamble = Some(Preamble::Narrative("Teniendo presente.".to_string()));
        doc.warnings.push(ParseWarning::MalformedInput);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["id"], "LEY-21.000");
        assert_eq!(value["preamble"]["Narrative"], "Teniendo presente.");
        assert_eq!(value["warnings"][0], "MalformedInput");
        assert!(value["closing"].is_null());
    }

    #[test]
    fn test_closing_text() {
        let closing = Closing::FinalProvisions("II. NOTIFÍQUESE.".to_string());
        assert_eq!(closing.text(), "II. NOTIFÍQUESE.");
    }
}

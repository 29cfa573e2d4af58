//! Line classification for the operative body.

use crate::patterns::{
    ends_sentence, match_article, match_closing_formula, match_directive, match_header,
    ArticleMatch, HeaderMatch,
};

/// What precedes the line being classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrevLine {
    /// First line of the zone.
    ZoneStart,

    /// A blank line.
    Blank,

    /// A line ending in terminal punctuation.
    Sentence,

    /// A structural header, or an article marker with no text after it.
    Header,

    /// A line that leaves a sentence open.
    Open,
}

impl PrevLine {
    /// Derive the context for the next line from a text line.
    #[must_use]
    pub fn after_text(line: &str) -> Self {
        if line.trim().is_empty() {
            Self::Blank
        } else if ends_sentence(line) {
            Self::Sentence
        } else {
            Self::Open
        }
    }

    /// Whether a header-shaped line may open a new unit after this one.
    #[must_use]
    pub fn allows_promotion(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// Classification of one body line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Header(HeaderMatch),
    Article(ArticleMatch),
    Directive,
    Text,

    /// Header or article shape that cannot be promoted; kept as text.
    AmbiguousHeader,
}

/// Classify a body line given what precedes it.
///
/// A header or article shape only opens a new unit when the previous line
/// does not leave a sentence open. Headers whose caption starts in lower case
/// read as running prose and are never promoted.
///
/// # Examples
/// ```
/// use leychile_converter::hierarchy::{classify_line, LineKind, PrevLine};
///
/// assert!(matches!(classify_line("Capítulo II", PrevLine::Sentence), LineKind::Header(_)));
/// assert_eq!(classify_line("Capítulo II", PrevLine::Open), LineKind::AmbiguousHeader);
/// ```
pub fn classify_line(line: &str, prev: PrevLine) -> LineKind {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }

    if match_directive(line).is_some() || match_closing_formula(line) {
        return LineKind::Directive;
    }

    if let Some(header) = match_header(line) {
        if header.is_ambiguous() || !prev.allows_promotion() {
            return LineKind::AmbiguousHeader;
        }
        return LineKind::Header(header);
    }

    if let Some(article) = match_article(line) {
        if !prev.allows_promotion() {
            return LineKind::AmbiguousHeader;
        }
        return LineKind::Article(article);
    }

    LineKind::Text
}

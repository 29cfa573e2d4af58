//! Text normalization utilities for source documents.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

use crate::patterns::{ends_sentence, is_structural_line, match_article, match_header};

/// Regex pattern for missing space after comma before a word character.
/// Matches "word,word" but not "word, word" or "1,000".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static MISSING_SPACE_AFTER_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-záéíóúñü]),([a-zA-ZáéíóúñüÁÉÍÓÚÑ])").expect("valid regex")
});

/// Runs of spaces and tabs inside a line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INNER_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Normalize raw input text before zone splitting.
///
/// Applies NFC normalization, unifies line endings (CRLF and form feeds
/// become `\n`), replaces non-breaking spaces, collapses runs of spaces and
/// trims trailing whitespace on every line.
///
/// # Examples
/// ```
/// use leychile_converter::text::normalize_input;
///
/// let text = normalize_input("Arti\u{301}culo 1.\r\nTexto\u{a0}\u{a0}uno.  ");
/// assert_eq!(text, "Artículo 1.\nTexto uno.");
/// ```
pub fn normalize_input(text: &str) -> String {
    let text: String = text
        .nfc()
        .map(|c| match c {
            '\u{a0}' | '\u{202f}' => ' ',
            '\u{c}' => '\n',
            c => c,
        })
        .collect();

    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| INNER_WHITESPACE.replace_all(line.trim_end(), " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize common typographical issues in extracted text.
///
/// Fixes a missing space after a comma before a word ("plazo,el" becomes
/// "plazo, el"); numbers such as "1,5" are left alone.
pub fn normalize_text(text: &str) -> String {
    // Loop until no more replacements needed (handles overlapping cases like "a,b,c")
    let mut result = text.to_string();
    loop {
        let replaced = MISSING_SPACE_AFTER_COMMA
            .replace_all(&result, "$1, $2")
            .to_string();
        if replaced == result {
            break;
        }
        result = replaced;
    }
    result
}

/// Whether `next` may be appended to `line` without changing what `line`
/// is recognized as.
fn accepts_continuation(line: &str, next: &str) -> bool {
    if match_article(line).is_some_and(|a| a.rest.is_empty()) {
        return false;
    }
    if match_header(line).is_some_and(|h| h.caption.is_none()) {
        return !next.chars().next().is_some_and(char::is_lowercase);
    }
    true
}

/// Rejoin lines broken by PDF pagination.
///
/// A line that does not end in terminal punctuation is joined with the next
/// one (with exactly one space) unless the next line is blank or opens a new
/// structural unit. Trailing blank lines are dropped. Running it twice gives
/// the same result as running it once.
///
/// # Examples
/// ```
/// use leychile_converter::text::unwrap_pdf_lines;
///
/// let text = "contemplados en el\nCapítulo IV y los simplificados.";
/// assert_eq!(unwrap_pdf_lines(text), "contemplados en el Capítulo IV y los simplificados.");
///
/// let text = "Texto del artículo uno.\nCapítulo II\nNormas especiales";
/// assert_eq!(unwrap_pdf_lines(text), "Texto del artículo uno.\nCapítulo II Normas especiales");
/// ```
pub fn unwrap_pdf_lines(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(last) = lines.last_mut() {
            if !last.is_empty()
                && !line.is_empty()
                && !ends_sentence(last)
                && !is_structural_line(line)
                && accepts_continuation(last, line)
            {
                last.push(' ');
                last.push_str(line);
                continue;
            }
        }
        lines.push(line.to_string());
    }

    // `str::lines` forgets a final empty line, so keeping any would not
    // survive a second pass.
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }

    lines.join("\n")
}

/// Append a source line to paragraph text.
///
/// A line that follows a finished sentence starts a new paragraph (joined
/// with `\n`); otherwise it continues the current one after a single space.
pub fn append_line(text: &mut String, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    if !text.is_empty() {
        let separator = if ends_sentence(text) { '\n' } else { ' ' };
        text.push(separator);
    }
    text.push_str(line);
}

/// Convert a fully upper-case subject to sentence case.
///
/// Mixed-case text is returned unchanged.
///
/// # Examples
/// ```
/// use leychile_converter::text::capitalize_subject;
///
/// assert_eq!(capitalize_subject("FORMALIDADES DE LAS PUBLICACIONES"), "Formalidades de las publicaciones");
/// assert_eq!(capitalize_subject("Formalidades de las Publicaciones"), "Formalidades de las Publicaciones");
/// ```
pub fn capitalize_subject(text: &str) -> String {
    let text = text.trim();
    let has_letters = text.chars().any(char::is_alphabetic);
    let all_upper = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase);

    if !has_letters || !all_upper {
        return text.to_string();
    }

    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

//! Caption rules for articles and containers.

/// Words that open a running sentence rather than a heading.
const SENTENCE_OPENERS: [&str; 14] = [
    "el", "la", "los", "las", "un", "una", "se", "en", "de", "del", "para", "por", "que", "si",
];

/// Abbreviations longer than two letters that are followed by a period in
/// citations ("Res. Ex.", "Art.", "Inc.").
const ABBREVIATIONS: [&str; 10] = [
    "art", "arts", "res", "exta", "inc", "núm", "nro", "dto", "sra", "pág",
];

/// Whether the period at `period` belongs to an abbreviation or a citation
/// rather than closing a sentence.
///
/// Covers one- or two-letter segments ("D.S.", "D.F.L.", "Ex."), known
/// abbreviations, and periods followed by a number or an "N°" marker.
fn is_abbreviation_period(text: &str, period: usize) -> bool {
    let token = text[..period]
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default();
    let segment = token.rsplit('.').next().unwrap_or_default();
    let letters = segment.chars().count();
    if (1..=2).contains(&letters) && segment.chars().all(char::is_alphabetic) {
        return true;
    }
    if ABBREVIATIONS.contains(&segment.to_lowercase().as_str()) {
        return true;
    }

    let next = text[period + 1..].trim_start();
    let mut chars = next.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('N') => matches!(chars.next(), Some('°' | 'º' | '.')),
        _ => false,
    }
}

/// Trait for configurable caption detection.
///
/// Implementations decide which leading text of an article is a caption
/// and which lines following an untitled container are its heading.
pub trait CaptionRule {
    /// Split the text after an article marker into an optional caption and
    /// the body proper.
    fn split_caption(&self, text: &str) -> (Option<String>, String);

    /// Whether a line following an untitled container header is its caption.
    fn is_container_caption(&self, line: &str) -> bool;
}

/// Captions are short phrases closed by a period.
///
/// "Responsabilidad. De conformidad al artículo 338." yields the caption
/// "Responsabilidad"; a first sentence longer than `max_words`, or one that
/// reads like prose, is body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortSentenceCaption {
    max_words: usize,
}

impl ShortSentenceCaption {
    /// Create a rule with the given word budget.
    #[must_use]
    pub fn new(max_words: usize) -> Self {
        Self { max_words }
    }

    fn first_word_opens_sentence(text: &str) -> bool {
        text.split_whitespace()
            .next()
            .is_some_and(|word| SENTENCE_OPENERS.contains(&word.to_lowercase().as_str()))
    }
}

impl Default for ShortSentenceCaption {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CAPTION_MAX_WORDS)
    }
}

impl CaptionRule for ShortSentenceCaption {
    fn split_caption(&self, text: &str) -> (Option<String>, String) {
        let text = text.trim();

        // Only the first period followed by whitespace can close a caption;
        // periods inside "N.° 20.720" are never followed by a space, and
        // citation abbreviations ("D.F.L. N° 1") are skipped.
        let Some(period) = text
            .char_indices()
            .find(|&(i, c)| {
                c == '.'
                    && text[i + 1..].starts_with(char::is_whitespace)
                    && !is_abbreviation_period(text, i)
            })
            .map(|(i, _)| i)
        else {
            return (None, text.to_string());
        };

        let caption = text[..period].trim();
        let body = text[period + 1..].trim();
        let words = caption.split_whitespace().count();

        let starts_sentence = body.chars().next().is_some_and(char::is_uppercase);
        if caption.is_empty()
            || body.is_empty()
            || words > self.max_words
            || !starts_sentence
            || Self::first_word_opens_sentence(caption)
        {
            return (None, text.to_string());
        }

        (Some(caption.to_string()), body.to_string())
    }

    fn is_container_caption(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        let all_caps = line.chars().any(char::is_alphabetic)
            && line
                .chars()
                .filter(|c| c.is_alphabetic())
                .all(char::is_uppercase);
        let short = line.split_whitespace().count() <= self.max_words
            && !crate::patterns::ends_sentence(line);
        all_caps || short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_caption_captured() {
        let rule = ShortSentenceCaption::default();
        let (caption, body) = rule.split_caption("Responsabilidad. De conformidad al artículo 338.");
        assert_eq!(caption.as_deref(), Some("Responsabilidad"));
        assert_eq!(body, "De conformidad al artículo 338.");

        let (caption, _) = rule.split_caption("Ámbito de aplicación. Esta norma se aplica.");
        assert_eq!(caption.as_deref(), Some("Ámbito de aplicación"));
    }

    #[test]
    fn test_citation_period_does_not_split() {
        let rule = ShortSentenceCaption::default();
        let text = "En virtud de lo previsto en el artículo 337 de la Ley N.° 20.720, se interpreta la voz notoria insolvencia.";
        let (caption, body) = rule.split_caption(text);
        assert!(caption.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_citation_abbreviations_do_not_split() {
        let rule = ShortSentenceCaption::default();
        for text in [
            "Conforme al D.F.L. N° 1-19.653, los liquidadores deberán informar.",
            "Según lo dispuesto en el D.S. N° 181, corresponde publicar.",
            "Conforme a la Res. Ex. N° 6597, se dispone.",
            "Se estará al Art. 5 de la Ley.",
        ] {
            let (caption, body) = rule.split_caption(text);
            assert!(caption.is_none(), "{text}");
            assert_eq!(body, text);
        }
    }

    #[test]
    fn test_caption_before_citation_abbreviation() {
        let rule = ShortSentenceCaption::default();
        let (caption, body) =
            rule.split_caption("Publicidad. Conforme al D.S. N° 181, corresponde publicar.");
        assert_eq!(caption.as_deref(), Some("Publicidad"));
        assert_eq!(body, "Conforme al D.S. N° 181, corresponde publicar.");
    }

    #[test]
    fn test_long_first_sentence_is_body() {
        let rule = ShortSentenceCaption::new(3);
        let (caption, _) = rule.split_caption("Obligaciones del liquidador concursal. El liquidador deberá.");
        assert!(caption.is_none());
    }

    #[test]
    fn test_prose_sentence_is_not_caption() {
        let rule = ShortSentenceCaption::default();
        let (caption, body) = rule.split_caption("El liquidador deberá cumplir. Además informará.");
        assert!(caption.is_none());
        assert_eq!(body, "El liquidador deberá cumplir. Además informará.");
    }

    #[test]
    fn test_lowercase_continuation_is_not_caption() {
        let rule = ShortSentenceCaption::default();
        let (caption, _) = rule.split_caption("Plazos. se contarán de días hábiles.");
        assert!(caption.is_none());
    }

    #[test]
    fn test_container_caption() {
        let rule = ShortSentenceCaption::default();
        assert!(rule.is_container_caption("DISPOSICIONES GENERALES"));
        assert!(rule.is_container_caption("Normas especiales"));
        assert!(!rule.is_container_caption("La presente norma regula las formalidades."));
        assert!(!rule.is_container_caption(""));
    }
}

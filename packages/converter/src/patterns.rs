//! Pattern library for Chilean legal text.
//!
//! Every pattern is a compiled `LazyLock<Regex>` static; the functions in this
//! module wrap them and return typed matches. Patterns that recognize a line
//! shape (headers, articles, directives, anchors) are anchored at line start
//! and never match mid-sentence.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::types::{DocumentType, PartKind};

/// Characters that end a sentence for line-joining purposes.
const TERMINAL_PUNCTUATION: [char; 5] = ['.', ':', ';', '?', '!'];

/// Number token shared by every law-reference family: an optional "N°"
/// prefix followed by digits, dots and hyphens, always ending on a digit.
const REF_NUMBER: &str = r"(?:N\s*[.°º]*\s*)?(\d+(?:[.\-]\d+)*)";

/// Ordinal names shared by headers and article markers, from "primero" to
/// "vigésimo noveno". Compound forms come first so "décimo primero" is not
/// cut at "décimo".
const ORDINAL_WORDS: &str = r"(?:d[ée]cimo|vig[ée]simo)(?:\s+(?:primero|segundo|tercero|cuarto|quinto|sexto|s[ée]ptimo|octavo|noveno))?|und[ée]cimo|duod[ée]cimo|primero|segundo|tercero|cuarto|quinto|sexto|s[ée]ptimo|octavo|noveno";

/// Spanish date: "11 de agosto de 2023", "04 SEPTIEMBRE 2024".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s+(?:de\s+)?(enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre)\s+(?:del?\s+)?(\d{4})\b",
    )
    .expect("valid regex")
});

/// "RESOLUCIÓN EXENTA N.° 6597", "RES. EX. N° 123".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static RESOLUTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:RESOLUCI[ÓO]N|RES\.)\s*EX(?:ENTA|\.)\s*N\s*[.°º]*\s*(\d+)")
        .expect("valid regex")
});

/// Ordinal directive: "II. NOTIFÍQUESE", "2°. PUBLÍQUESE", "3.- DÉJASE SIN EFECTO".
///
/// The verb is either a known directive or an accented imperative with an
/// enclitic "-SE".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*([IVXLC]+|\d+\s*[°º]?)(?:\s*[.)\-–]+\s*|\s+)(APRU[ÉE]BASE|NOTIF[ÍI]QUESE|PUBL[ÍI]QUESE|D[ÉE]JASE\s+SIN\s+EFECTO|DER[ÓO]GASE|VIGENCIA|AN[ÓO]TESE|COMUN[ÍI]QUESE|ARCH[ÍI]VESE|REM[ÍI]TASE|T[ÉE]NGASE|INCORP[ÓO]RESE|MODIF[ÍI]CASE|[A-ZÑ]*[ÁÉÍÓÚ][A-ZÑ]*SE)\b",
    )
    .expect("valid regex")
});

/// Unnumbered closing formula: "ANÓTESE, COMUNÍQUESE Y ARCHÍVESE.", or the
/// opening of a law's promulgation formula ("Y por cuanto he tenido a bien...").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CLOSING_FORMULA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:AN[ÓO]TESE|COMUN[ÍI]QUESE|REG[ÍI]STRESE|NOTIF[ÍI]QUESE|T[ÓO]MESE\s+RAZ[ÓO]N|(?i:Y\s+por\s+cuanto|Habi[ée]ndose\s+cumplido))\b",
    )
    .expect("valid regex")
});

/// Structural header: keyword, then a numeral or an ordinal word, then an
/// optional caption.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*((?i:LIBRO|T[ÍI]TULO|CAP[ÍI]TULO|P[ÁA]RRAFO))\s+((?i:PRELIMINAR|FINAL|[ÚU]NICO|{ORDINAL_WORDS})|[IVXLC]+|\d+)\s*[°º]?(?:\s*[.:\-–]\s*|\s+|$)(.*)$",
    ))
    .expect("valid regex")
});

/// Article marker at line start: "Artículo 8°.", "ARTÍCULO 5 bis:",
/// "Artículo transitorio.", "Artículo 1° transitorio.".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?:Art[íi]culo|ART[ÍI]CULO)\s+(\d+|(?i:[úu]nico|{ORDINAL_WORDS}|transitorio))\s*[°º]?(?:\s*(?i:(bis|ter|qu[áa]ter)))?(?:\s+(?i:(transitorios?)))?\s*(?:[.:\-–]+\s*(.*))?$",
    ))
    .expect("valid regex")
});

/// Zone anchors. Upper-case forms may carry trailing text; title-case forms
/// need a colon.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ANCHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:(VISTOS?|CONSIDERANDO|SE\s+RESUELVE|RESUELVO|RESUELVE)\b\s*[:.,]?|(Vistos?|Considerando|Se\s+resuelve|Resuelvo)\s*:)\s*(.*)$",
    )
    .expect("valid regex")
});

/// Subject label: "MAT.:", "MATERIA:", "REF.:".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SUBJECT_LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:MAT(?:ERIA)?|REF)\.?\s*:\s*(.*)$").expect("valid regex")
});

/// Inline article reference: "artículo 5", "art. 3°", or an enumeration
/// after the plural: "artículos 12 y 13", "artículos 4°, 5 bis y 7".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bart(?:[íi]culo(s)?|\.)\s*(\d+(?:\s*[°º])?(?:\s*bis)?(?:\s*(?:,|\by\b|\be\b)\s*\d+(?:\s*[°º])?(?:\s*bis)?)*)\b",
    )
    .expect("valid regex")
});

/// One article number inside a reference list.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ARTICLE_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(?:\s*[°º])?(\s*bis\b)?").expect("valid regex")
});

/// Promulgation formula of a law.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PROMULGATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)prom[úu]lguese|habi[ée]ndose\s+cumplido").expect("valid regex")
});

/// Whole article body marking it as revoked: "Derogado.", "(Suprimido)".
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static REVOKED_BODY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\(?\s*(?:derogad[oa]|suprimid[oa])\s*\)?\s*\.?$").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INSTRUCTIVO_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bINSTRUCTIVO\s+(?:SUPERIR\s+)?N\s*[.°º]*\s*(\d+)").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NCG_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bNORMA\s+DE\s+CAR[ÁA]CTER\s+GENERAL\s+N\s*[.°º]*\s*(\d+)")
        .expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LEY_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*LEY\s+N\s*[.°º]*\s*(\d+(?:\.\d+)*)").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CIRCULAR_NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCIRCULAR\s+N\s*[.°º]*\s*(\d+)").expect("valid regex")
});

/// Families of legal references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LawRefKind {
    /// Ley.
    Ley,

    /// Decreto con Fuerza de Ley.
    Dfl,

    /// Decreto Supremo.
    DecretoSupremo,

    /// Norma de Carácter General.
    Ncg,
}

impl LawRefKind {
    /// All families, in matching priority order.
    pub const ALL: [LawRefKind; 4] = [Self::Dfl, Self::DecretoSupremo, Self::Ncg, Self::Ley];

    /// Rendered type label ("Ley", "DFL", "D.S.", "NCG").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ley => "Ley",
            Self::Dfl => "DFL",
            Self::DecretoSupremo => "D.S.",
            Self::Ncg => "NCG",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::Ley => r"Ley",
            Self::Dfl => r"D\.\s?F\.\s?L\.|DFL|Decreto\s+con\s+Fuerza\s+de\s+Ley",
            Self::DecretoSupremo => r"D\.\s?S\.|Decreto\s+Supremo",
            Self::Ncg => r"NCG|N\.\s?C\.\s?G\.|Normas?\s+de\s+Car[áa]cter\s+General",
        }
    }

    fn patterns(&self) -> &'static LawRefPatterns {
        match self {
            Self::Ley => &LAW_REF_PATTERNS[0],
            Self::Dfl => &LAW_REF_PATTERNS[1],
            Self::DecretoSupremo => &LAW_REF_PATTERNS[2],
            Self::Ncg => &LAW_REF_PATTERNS[3],
        }
    }
}

/// Scanning and anchored regex for one reference family.
struct LawRefPatterns {
    scan: Regex,
    anchored: Regex,
}

#[allow(clippy::expect_used)] // Static regexes built from constant fragments
static LAW_REF_PATTERNS: LazyLock<[LawRefPatterns; 4]> = LazyLock::new(|| {
    [
        LawRefKind::Ley,
        LawRefKind::Dfl,
        LawRefKind::DecretoSupremo,
        LawRefKind::Ncg,
    ]
    .map(|kind| {
        let keyword = kind.keyword();
        LawRefPatterns {
            scan: Regex::new(&format!(r"(?i)\b(?:{keyword})\s*{REF_NUMBER}"))
                .expect("valid regex"),
            anchored: Regex::new(&format!(
                r"(?i)^\s*(?:{keyword})\s*{REF_NUMBER}(?:\s*,?\s*art(?:[íi]culo|\.)\s*(\d+(?:\s*bis)?))?\s*\.?\s*$"
            ))
            .expect("valid regex"),
        }
    })
});

/// A date found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    /// Calendar date.
    pub date: NaiveDate,

    /// Matched source text ("11 de agosto de 2023").
    pub text: String,
}

/// A law reference found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LawRefMatch {
    pub kind: LawRefKind,
    pub number: String,
    start: usize,
    end: usize,
}

impl LawRefMatch {
    /// Render as "<type> <number>".
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} {}", self.kind.as_str(), self.number)
    }
}

/// Classification of a directive verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveVerb {
    Approve,
    Notify,
    Publish,
    RepealPrior,
    EffectiveDate,
    Archive,
    Other,
}

impl DirectiveVerb {
    fn classify(verb: &str) -> Self {
        let verb = verb.to_uppercase();
        if verb.starts_with("APRU") {
            Self::Approve
        } else if verb.starts_with("NOTIF") {
            Self::Notify
        } else if verb.starts_with("PUBL") {
            Self::Publish
        } else if verb.starts_with("DÉJASE")
            || verb.starts_with("DEJASE")
            || verb.starts_with("DER")
        {
            Self::RepealPrior
        } else if verb == "VIGENCIA" {
            Self::EffectiveDate
        } else if verb.starts_with("ARCH")
            || verb.starts_with("ANÓT")
            || verb.starts_with("ANOT")
            || verb.starts_with("COMUN")
        {
            Self::Archive
        } else {
            Self::Other
        }
    }
}

/// An ordinal directive line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch {
    /// Ordinal marker as written ("II", "2°").
    pub ordinal: String,

    /// Verb classification.
    pub verb: DirectiveVerb,

    /// Whether the line approves a body that follows it
    /// ("I. APRUÉBASE el siguiente Instructivo:").
    pub introduces_body: bool,
}

/// A structural header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub kind: PartKind,

    /// Numeral or ordinal word ("I", "2", "PRELIMINAR").
    pub name: String,

    /// Caption on the same line, if any.
    pub caption: Option<String>,
}

impl HeaderMatch {
    /// A caption starting in lower case reads as running prose
    /// ("Capítulo IV y los simplificados"), not a heading.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.caption
            .as_deref()
            .and_then(|c| c.chars().next())
            .is_some_and(char::is_lowercase)
    }
}

/// An article marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMatch {
    /// Declared name ("8", "5 bis", "único", "transitorio").
    pub name: String,

    /// Whether the article is transitory.
    pub transitory: bool,

    /// Text following the marker on the same line.
    pub rest: String,
}

/// Kind of zone anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// VISTOS.
    Recitals,

    /// CONSIDERANDO.
    Grounds,

    /// RESUELVO / SE RESUELVE / RESUELVE.
    Resolution,
}

/// A zone anchor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMatch {
    pub anchor: Anchor,

    /// Text after the anchor on the same line.
    pub rest: String,
}

/// Whether text ends in terminal punctuation.
#[must_use]
pub fn ends_sentence(text: &str) -> bool {
    text.trim_end().ends_with(TERMINAL_PUNCTUATION)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "enero" => 1,
        "febrero" => 2,
        "marzo" => 3,
        "abril" => 4,
        "mayo" => 5,
        "junio" => 6,
        "julio" => 7,
        "agosto" => 8,
        "septiembre" | "setiembre" => 9,
        "octubre" => 10,
        "noviembre" => 11,
        "diciembre" => 12,
        _ => return None,
    };
    Some(month)
}

/// Find every valid date in text, in order. Invalid calendar dates
/// ("31 de febrero de 2024") are skipped.
///
/// # Examples
/// ```
/// use leychile_converter::patterns::find_dates;
///
/// let dates = find_dates("SANTIAGO, 04 SEPTIEMBRE 2024");
/// assert_eq!(dates[0].date.to_string(), "2024-09-04");
/// ```
pub fn find_dates(text: &str) -> Vec<DateMatch> {
    DATE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let day = caps.get(1)?.as_str().parse().ok()?;
            let month = month_number(caps.get(2)?.as_str())?;
            let year = caps.get(3)?.as_str().parse().ok()?;
            let date = NaiveDate::from_ymd_opt(year, month, day)?;
            Some(DateMatch {
                date,
                text: caps.get(0)?.as_str().to_string(),
            })
        })
        .collect()
}

/// Find the first valid date in text.
pub fn find_date(text: &str) -> Option<DateMatch> {
    find_dates(text).into_iter().next()
}

/// Find the first exempt-resolution number.
///
/// # Examples
/// ```
/// use leychile_converter::patterns::find_resolution_number;
///
/// assert_eq!(find_resolution_number("RESOLUCIÓN EXENTA N.° 6597").as_deref(), Some("6597"));
/// assert_eq!(find_resolution_number("RES. EX. N° 22802").as_deref(), Some("22802"));
/// ```
pub fn find_resolution_number(text: &str) -> Option<String> {
    RESOLUTION_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether a line contains an exempt-resolution reference.
#[must_use]
pub fn is_resolution_line(line: &str) -> bool {
    RESOLUTION_PATTERN.is_match(line)
}

/// Find the document number for a document type in its header text.
///
/// Resolutions use the exempt-resolution pattern; the other types look for
/// their own heading ("INSTRUCTIVO N° 5", "NORMA DE CARÁCTER GENERAL N° 14").
pub fn find_document_number(doc_type: DocumentType, text: &str) -> Option<String> {
    let pattern = match doc_type {
        DocumentType::Instructivo => &INSTRUCTIVO_NUMBER_PATTERN,
        DocumentType::NormaCaracterGeneral => &NCG_NUMBER_PATTERN,
        DocumentType::Circular => &CIRCULAR_NUMBER_PATTERN,
        DocumentType::Ley => {
            return text
                .lines()
                .find_map(|line| LEY_NUMBER_PATTERN.captures(line))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string());
        }
        DocumentType::Resolucion => return find_resolution_number(text),
    };
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find law references in document order.
///
/// A longer reference shadows any shorter one it overlaps, so
/// "Decreto con Fuerza de Ley N° 1" is a single DFL reference.
///
/// # Examples
/// ```
/// use leychile_converter::patterns::find_law_references;
///
/// let refs: Vec<String> = find_law_references("Ley N° 20.720 y D.F.L. N° 1-19.653")
///     .iter()
///     .map(|r| r.render())
///     .collect();
/// assert_eq!(refs, vec!["Ley 20.720", "DFL 1-19.653"]);
/// ```
pub fn find_law_references(text: &str) -> Vec<LawRefMatch> {
    let mut candidates: Vec<LawRefMatch> = LawRefKind::ALL
        .iter()
        .flat_map(|kind| {
            kind.patterns().scan.captures_iter(text).filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(LawRefMatch {
                    kind: *kind,
                    number: caps.get(1)?.as_str().to_string(),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
        })
        .collect();

    candidates.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut accepted: Vec<LawRefMatch> = Vec::new();
    for candidate in candidates {
        if accepted.last().is_some_and(|last| candidate.start < last.end) {
            continue;
        }
        accepted.push(candidate);
    }
    accepted
}

/// Match a whole string against the reference families.
///
/// Returns the family, the number and an optional article
/// ("Ley 20.720, artículo 5"), or `None` for free text.
pub fn match_law_reference(text: &str) -> Option<(LawRefKind, String, Option<String>)> {
    LawRefKind::ALL.iter().find_map(|kind| {
        let caps = kind.patterns().anchored.captures(text)?;
        let number = caps.get(1)?.as_str().to_string();
        let article = caps.get(2).map(|m| m.as_str().replace(char::is_whitespace, ""));
        Some((*kind, number, article))
    })
}

/// Match an ordinal directive line.
///
/// # Examples
/// ```
/// use leychile_converter::patterns::{match_directive, DirectiveVerb};
///
/// let directive = match_directive("2°. NOTIFÍQUESE la presente resolución.").unwrap();
/// assert_eq!(directive.verb, DirectiveVerb::Notify);
/// assert!(match_directive("Se notificará a los interesados.").is_none());
/// ```
pub fn match_directive(line: &str) -> Option<DirectiveMatch> {
    let caps = DIRECTIVE_PATTERN.captures(line)?;
    let ordinal = caps.get(1)?.as_str().replace(char::is_whitespace, "");
    let verb = DirectiveVerb::classify(caps.get(2)?.as_str());
    Some(DirectiveMatch {
        ordinal,
        verb,
        introduces_body: verb == DirectiveVerb::Approve && line.trim_end().ends_with(':'),
    })
}

/// Whether a line is an unnumbered closing formula.
#[must_use]
pub fn match_closing_formula(line: &str) -> bool {
    CLOSING_FORMULA_PATTERN.is_match(line)
}

/// Match a structural header line (Libro, Título, Capítulo, Párrafo).
///
/// # Examples
/// ```
/// use leychile_converter::patterns::match_header;
/// use leychile_converter::types::PartKind;
///
/// let header = match_header("PÁRRAFO II Emisión del finiquito").unwrap();
/// assert_eq!(header.kind, PartKind::Paragraph);
/// assert_eq!(header.name, "II");
/// assert_eq!(header.caption.as_deref(), Some("Emisión del finiquito"));
/// assert!(match_header("Los párrafos anteriores").is_none());
/// ```
pub fn match_header(line: &str) -> Option<HeaderMatch> {
    let caps = HEADER_PATTERN.captures(line)?;
    let kind = PartKind::from_keyword(caps.get(1)?.as_str())?;
    let name = caps.get(2)?.as_str().to_string();
    let caption = caps
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .filter(|c| !c.is_empty());
    Some(HeaderMatch {
        kind,
        name,
        caption,
    })
}

/// Match an article marker line.
///
/// # Examples
/// ```
/// use leychile_converter::patterns::match_article;
///
/// let article = match_article("Artículo 8°. En virtud de lo previsto.").unwrap();
/// assert_eq!(article.name, "8");
/// assert_eq!(article.rest, "En virtud de lo previsto.");
/// assert!(match_article("Artículo 331 de la Ley N° 20.720").is_none());
/// ```
pub fn match_article(line: &str) -> Option<ArticleMatch> {
    let caps = ARTICLE_PATTERN.captures(line)?;
    let number = caps.get(1)?.as_str();
    let base = if number.chars().all(|c| c.is_ascii_digit()) {
        number.to_string()
    } else {
        number.to_lowercase()
    };
    let name = match caps.get(2) {
        Some(suffix) => format!("{base} {}", suffix.as_str().to_lowercase()),
        None => base,
    };
    let transitory = caps.get(3).is_some() || name == "transitorio";
    let rest = caps
        .get(4)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(ArticleMatch {
        name,
        transitory,
        rest,
    })
}

/// Match a zone anchor line.
pub fn match_anchor(line: &str) -> Option<AnchorMatch> {
    let caps = ANCHOR_PATTERN.captures(line)?;
    let keyword = caps.get(1).or_else(|| caps.get(2))?.as_str().to_uppercase();
    let anchor = if keyword.starts_with("VISTO") {
        Anchor::Recitals
    } else if keyword.starts_with("CONSIDERANDO") {
        Anchor::Grounds
    } else {
        Anchor::Resolution
    };
    let rest = caps
        .get(3)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    Some(AnchorMatch { anchor, rest })
}

/// Match a subject label line, returning the text after the label.
pub fn match_subject_label(line: &str) -> Option<String> {
    SUBJECT_LABEL_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Find inline article references ("5", "5bis"), de-duplicated in order.
///
/// A plural "artículos" expands its enumeration; a singular reference keeps
/// only its own number.
///
/// # Examples
/// ```
/// use leychile_converter::patterns::find_article_references;
///
/// let refs = find_article_references("según el artículo 5 bis y el artículo 12°, y el artículo 5 bis");
/// assert_eq!(refs, vec!["5bis", "12"]);
///
/// let refs = find_article_references("los artículos 12 y 13 de la Ley");
/// assert_eq!(refs, vec!["12", "13"]);
/// ```
pub fn find_article_references(text: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for caps in ARTICLE_REFERENCE_PATTERN.captures_iter(text) {
        let Some(list) = caps.get(2) else {
            continue;
        };
        let take = if caps.get(1).is_some() { usize::MAX } else { 1 };
        for item in ARTICLE_NUMBER_PATTERN.captures_iter(list.as_str()).take(take) {
            let Some(number) = item.get(1) else {
                continue;
            };
            let reference = match item.get(2) {
                Some(_) => format!("{}bis", number.as_str()),
                None => number.as_str().to_string(),
            };
            if !refs.contains(&reference) {
                refs.push(reference);
            }
        }
    }
    refs
}

/// Whether closing text is a law's promulgation formula.
#[must_use]
pub fn is_promulgation(text: &str) -> bool {
    PROMULGATION_PATTERN.is_match(text)
}

/// Whether an article body only states that it was revoked.
#[must_use]
pub fn is_revoked_body(text: &str) -> bool {
    REVOKED_BODY_PATTERN.is_match(text.trim())
}

/// Whether a line opens a new structural unit: an unambiguous header, an
/// article marker, a directive, a closing formula or a zone anchor.
#[must_use]
pub fn is_structural_line(line: &str) -> bool {
    match_header(line).is_some_and(|h| !h.is_ambiguous())
        || match_article(line).is_some()
        || match_directive(line).is_some()
        || match_closing_formula(line)
        || match_anchor(line).is_some()
}

//! Zone splitting.
//!
//! A resolution reads, in order: a header (number, subject, place and date),
//! the recitals ("VISTOS"), the grounds ("CONSIDERANDO"), the operative body
//! ("RESUELVO") and the closing directives ("II. NOTIFÍQUESE ..."). The
//! splitter walks the lines once with an explicit state machine and routes
//! each line to its zone.

use crate::patterns::{
    ends_sentence, match_anchor, match_article, match_closing_formula, match_directive, Anchor,
};

/// Position of the splitter in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    /// Header lines before any anchor.
    BeforeRecitals,

    /// After "VISTOS".
    InRecitals,

    /// After "CONSIDERANDO".
    InGrounds,

    /// After "RESUELVO", or an article marker ending the grounds.
    InBody,

    /// After the first closing directive. Terminal.
    InDirective,
}

/// The zones of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zones {
    pub header: String,
    pub recitals: String,
    pub grounds: String,
    pub body: String,
    pub closing: String,

    /// Number of directive lines (ordinal directives and closing formulas).
    pub directive_count: usize,

    /// Whether any zone anchor was found.
    pub anchors_found: bool,
}

struct ZoneSplitter {
    state: ZoneState,
    zones: Zones,
    header: Vec<String>,
    recitals: Vec<String>,
    grounds: Vec<String>,
    body: Vec<String>,
    closing: Vec<String>,
    previous_closes: bool,
}

impl ZoneSplitter {
    fn new() -> Self {
        Self {
            state: ZoneState::BeforeRecitals,
            zones: Zones::default(),
            header: Vec::new(),
            recitals: Vec::new(),
            grounds: Vec::new(),
            body: Vec::new(),
            closing: Vec::new(),
            previous_closes: true,
        }
    }

    fn transition(&mut self, next: ZoneState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "zone transition");
            self.state = next;
        }
    }

    fn push(&mut self, line: &str) {
        let zone = match self.state {
            ZoneState::BeforeRecitals => &mut self.header,
            ZoneState::InRecitals => &mut self.recitals,
            ZoneState::InGrounds => &mut self.grounds,
            ZoneState::InBody => &mut self.body,
            ZoneState::InDirective => &mut self.closing,
        };
        zone.push(line.to_string());
    }

    /// Anchors only move forward; an out-of-order anchor is plain text.
    fn anchor_target(&self, anchor: Anchor) -> Option<ZoneState> {
        match (anchor, self.state) {
            (Anchor::Recitals, ZoneState::BeforeRecitals) => Some(ZoneState::InRecitals),
            (Anchor::Grounds, ZoneState::BeforeRecitals | ZoneState::InRecitals) => {
                Some(ZoneState::InGrounds)
            }
            (
                Anchor::Resolution,
                ZoneState::BeforeRecitals | ZoneState::InRecitals | ZoneState::InGrounds,
            ) => Some(ZoneState::InBody),
            _ => None,
        }
    }

    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();

        if self.state == ZoneState::InDirective {
            if match_directive(trimmed).is_some() || match_closing_formula(trimmed) {
                self.zones.directive_count += 1;
            }
            self.push(trimmed);
            return;
        }

        if let Some(anchor) = match_anchor(trimmed) {
            if let Some(next) = self.anchor_target(anchor.anchor) {
                self.zones.anchors_found = true;
                self.transition(next);
                if !anchor.rest.is_empty() {
                    self.push(&anchor.rest);
                }
                self.previous_closes = true;
                return;
            }
        }

        // Directives only close the operative body; numbered items of the
        // recitals ("1° TÉNGASE PRESENTE ...") stay where they are.
        let in_body = self.state == ZoneState::InBody;

        if let Some(directive) = match_directive(trimmed).filter(|_| in_body) {
            self.zones.directive_count += 1;
            self.closing.push(trimmed.to_string());
            if directive.introduces_body {
                self.transition(ZoneState::InBody);
            } else {
                self.transition(ZoneState::InDirective);
            }
            self.previous_closes = true;
            return;
        }

        if in_body && match_closing_formula(trimmed) {
            self.zones.directive_count += 1;
            self.transition(ZoneState::InDirective);
            self.push(trimmed);
            return;
        }

        if matches!(self.state, ZoneState::InRecitals | ZoneState::InGrounds)
            && self.previous_closes
            && match_article(trimmed).is_some()
        {
            tracing::debug!(line = %trimmed, "article marker starts the body without an anchor");
            self.transition(ZoneState::InBody);
        }

        self.push(trimmed);
        self.previous_closes = trimmed.is_empty() || ends_sentence(trimmed);
    }

    fn finish(mut self) -> Zones {
        if !self.zones.anchors_found {
            // Without anchors the header lines are body text too.
            let mut body = std::mem::take(&mut self.header);
            body.append(&mut self.body);
            self.body = body;
        }

        self.zones.header = join_zone(&self.header);
        self.zones.recitals = join_zone(&self.recitals);
        self.zones.grounds = join_zone(&self.grounds);
        self.zones.body = join_zone(&self.body);
        self.zones.closing = join_zone(&self.closing);
        self.zones
    }
}

/// Join zone lines, dropping leading and trailing blank lines.
fn join_zone(lines: &[String]) -> String {
    lines.join("\n").trim_matches('\n').trim().to_string()
}

/// Split normalized document text into zones.
///
/// Never fails: text without any anchor becomes body text, with
/// `anchors_found` left `false`.
///
/// # Examples
/// ```
/// use leychile_converter::zones::split_zones;
///
/// let zones = split_zones("VISTOS:\nLa Ley N° 20.720.\n\nRESUELVO:\nArtículo 1. Texto.\n\nII. NOTIFÍQUESE.");
/// assert_eq!(zones.recitals, "La Ley N° 20.720.");
/// assert_eq!(zones.body, "Artículo 1. Texto.");
/// assert_eq!(zones.closing, "II. NOTIFÍQUESE.");
/// ```
pub fn split_zones(text: &str) -> Zones {
    let mut splitter = ZoneSplitter::new();
    for line in text.lines() {
        splitter.feed(line);
    }
    splitter.finish()
}

//! State machine that turns classified body lines into a part tree.

use super::caption::{CaptionRule, ShortSentenceCaption};
use super::classify::{classify_line, LineKind, PrevLine};
use crate::config::ParserConfig;
use crate::error::ParseWarning;
use crate::patterns::{is_revoked_body, ArticleMatch, HeaderMatch};
use crate::text::append_line;
use crate::types::{Part, PartKind};

/// Position of the builder in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    /// Before the first structural line.
    Intro,

    /// Inside a container, outside any article.
    InContainer,

    /// Filling an article.
    InArticle,

    /// After a directive line. Terminal.
    InDirective,
}

/// Result of building the hierarchy of one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyOutput {
    /// Prose preceding the first structural part.
    pub intro: String,

    /// Root parts in reading order.
    pub parts: Vec<Part>,

    /// Directive lines found in the body, and everything after them.
    pub deferred_closing: String,

    /// Ambiguous header lines kept as text.
    pub warnings: Vec<ParseWarning>,
}

/// Builder that walks body lines and keeps a stack of open containers.
pub struct HierarchyBuilder<C: CaptionRule> {
    caption_rule: C,
    state: BuildState,
    prev: PrevLine,
    next_id: usize,
    intro: String,
    roots: Vec<Part>,
    containers: Vec<Part>,
    article: Option<Part>,
    awaiting_caption: bool,
    deferred: Vec<String>,
    warnings: Vec<ParseWarning>,
}

impl<C: CaptionRule> HierarchyBuilder<C> {
    /// Create a new builder with the given caption rule.
    #[must_use]
    pub fn new(caption_rule: C) -> Self {
        Self {
            caption_rule,
            state: BuildState::Intro,
            prev: PrevLine::ZoneStart,
            next_id: 0,
            intro: String::new(),
            roots: Vec::new(),
            containers: Vec::new(),
            article: None,
            awaiting_caption: false,
            deferred: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Build the hierarchy of an (already unwrapped) body.
    pub fn build(mut self, body: &str) -> HierarchyOutput {
        for (index, line) in body.lines().enumerate() {
            self.feed(index + 1, line);
        }
        self.finish()
    }

    /// Feed one body line (`number` is 1-based).
    pub fn feed(&mut self, number: usize, line: &str) {
        if self.state == BuildState::InDirective {
            self.deferred.push(line.trim().to_string());
            return;
        }

        match classify_line(line, self.prev) {
            LineKind::Blank => {
                self.prev = PrevLine::Blank;
            }
            LineKind::Directive => {
                tracing::debug!(line = number, "directive inside body, truncating");
                self.close_article();
                self.deferred.push(line.trim().to_string());
                self.state = BuildState::InDirective;
            }
            LineKind::Header(header) => {
                self.close_article();
                self.open_container(header);
                self.prev = PrevLine::Header;
            }
            LineKind::Article(article) => {
                self.close_article();
                self.prev = if article.rest.is_empty() {
                    PrevLine::Header
                } else {
                    PrevLine::after_text(line)
                };
                self.open_article(article);
            }
            LineKind::AmbiguousHeader => {
                let text = line.trim().to_string();
                tracing::warn!(line = number, text = %text, "Ambiguous structural header kept as text");
                self.warnings
                    .push(ParseWarning::AmbiguousHeader { line: number, text });
                self.push_text(line);
            }
            LineKind::Text => self.push_text(line),
        }
    }

    /// Close every open unit and return the tree.
    pub fn finish(mut self) -> HierarchyOutput {
        self.close_article();
        while !self.containers.is_empty() {
            self.close_container();
        }
        HierarchyOutput {
            intro: self.intro,
            parts: self.roots,
            deferred_closing: self.deferred.join("\n").trim().to_string(),
            warnings: self.warnings,
        }
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn attach(&mut self, part: Part) {
        match self.containers.last_mut() {
            Some(parent) => parent.children.push(part),
            None => self.roots.push(part),
        }
    }

    fn open_container(&mut self, header: HeaderMatch) {
        // A header closes open containers of the same or a finer rank.
        while self
            .containers
            .last()
            .is_some_and(|open| open.kind.rank() >= header.kind.rank())
        {
            self.close_container();
        }

        let id = self.allocate_id();
        let mut part = Part::new(header.kind, id, header.name, self.containers.len());
        part.caption = header.caption;
        self.awaiting_caption = part.caption.is_none();

        tracing::debug!(kind = ?part.kind, name = %part.name, depth = part.depth, "container opened");
        self.containers.push(part);
        self.state = BuildState::InContainer;
    }

    fn close_container(&mut self) {
        if let Some(part) = self.containers.pop() {
            self.attach(part);
        }
        self.awaiting_caption = false;
    }

    fn open_article(&mut self, article: ArticleMatch) {
        let id = self.allocate_id();
        let mut part = Part::new(PartKind::Article, id, article.name, self.containers.len());
        part.transitory = article.transitory;

        if article.rest.is_empty() {
            self.awaiting_caption = true;
        } else {
            let (caption, body) = self.caption_rule.split_caption(&article.rest);
            part.caption = caption;
            part.push_line(&body);
            self.awaiting_caption = false;
        }

        tracing::debug!(name = %part.name, depth = part.depth, "article opened");
        self.article = Some(part);
        self.state = BuildState::InArticle;
    }

    fn close_article(&mut self) {
        if let Some(mut article) = self.article.take() {
            article.revoked = is_revoked_body(&article.text);
            self.attach(article);
        }
        self.awaiting_caption = false;
        self.state = if self.containers.is_empty() {
            BuildState::Intro
        } else {
            BuildState::InContainer
        };
    }

    fn push_text(&mut self, line: &str) {
        let line = line.trim();

        if let Some(article) = self.article.as_mut() {
            if self.awaiting_caption && article.text.is_empty() {
                let (caption, body) = self.caption_rule.split_caption(line);
                article.caption = caption;
                article.push_line(&body);
            } else {
                article.push_line(line);
            }
            self.awaiting_caption = false;
            self.prev = PrevLine::after_text(line);
            return;
        }

        if let Some(container) = self.containers.last_mut() {
            if self.awaiting_caption
                && container.text.is_empty()
                && self.caption_rule.is_container_caption(line)
            {
                container.caption = Some(line.to_string());
                self.awaiting_caption = false;
                self.prev = PrevLine::Header;
                return;
            }
            container.push_line(line);
            self.awaiting_caption = false;
            self.prev = PrevLine::after_text(line);
            return;
        }

        append_line(&mut self.intro, line);
        self.prev = PrevLine::after_text(line);
    }
}

/// Build the hierarchy of a body with the caption rule from `config`.
///
/// # Examples
/// ```
/// use leychile_converter::config::ParserConfig;
/// use leychile_converter::hierarchy::build_hierarchy;
/// use leychile_converter::types::PartKind;
///
/// let body = "Artículo 1. Text one.\n\nPárrafo II Heading\n\nArtículo 2. Text two.";
/// let output = build_hierarchy(body, &ParserConfig::default());
/// assert_eq!(output.parts.len(), 2);
/// assert_eq!(output.parts[0].kind, PartKind::Article);
/// assert_eq!(output.parts[1].kind, PartKind::Paragraph);
/// assert_eq!(output.parts[1].children[0].name, "2");
/// ```
pub fn build_hierarchy(body: &str, config: &ParserConfig) -> HierarchyOutput {
    HierarchyBuilder::new(ShortSentenceCaption::new(config.caption_max_words)).build(body)
}

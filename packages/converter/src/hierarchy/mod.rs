//! Hierarchy building for the operative body.
//!
//! The body is classified line by line and fed through a state machine that
//! keeps a stack of open containers (Libro, Título, Capítulo, Párrafo) and
//! the article being filled.

mod builder;
mod caption;
mod classify;

pub use builder::{build_hierarchy, HierarchyBuilder, HierarchyOutput};
pub use caption::{CaptionRule, ShortSentenceCaption};
pub use classify::{classify_line, LineKind, PrevLine};

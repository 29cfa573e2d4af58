//! Structural statistics of a part tree.

use serde::Serialize;

use crate::types::{Part, PartKind};

/// Counts of structural parts, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub articles: usize,
    pub books: usize,
    pub titles: usize,
    pub chapters: usize,
    pub paragraphs: usize,
}

impl Statistics {
    /// Count every part of the tree in one traversal.
    ///
    /// # Examples
    /// ```
    /// use leychile_converter::types::{Part, PartKind};
    /// use leychile_converter::xml::Statistics;
    ///
    /// let title = Part::new(PartKind::Title, "1", "I", 0)
    ///     .with_child(Part::new(PartKind::Article, "2", "1", 1))
    ///     .with_child(Part::new(PartKind::Article, "3", "2", 1));
    /// let stats = Statistics::collect(&[title]);
    /// assert_eq!(stats.titles, 1);
    /// assert_eq!(stats.articles, 2);
    /// ```
    #[must_use]
    pub fn collect(parts: &[Part]) -> Self {
        let mut stats = Self::default();
        let mut stack: Vec<&Part> = parts.iter().collect();
        while let Some(part) = stack.pop() {
            match part.kind {
                PartKind::Article => stats.articles += 1,
                PartKind::Book => stats.books += 1,
                PartKind::Title => stats.titles += 1,
                PartKind::Chapter => stats.chapters += 1,
                PartKind::Paragraph => stats.paragraphs += 1,
            }
            stack.extend(part.children.iter());
        }
        stats
    }
}

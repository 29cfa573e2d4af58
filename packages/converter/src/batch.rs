//! Batch conversion of many documents.
//!
//! Each document is parsed, serialized and validated on its own, so a
//! failing document never stops the others. Work is spread over the rayon
//! thread pool; outcomes come back in input order.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::assembler::{parse_document, ParseOptions};
use crate::catalog::Catalog;
use crate::config::ParserConfig;
use crate::error::Result;
use crate::types::{Document, DocumentType};
use crate::xml::{generate_xml, save_xml, validate_xml, SchemaDiagnostic};

/// A document waiting to be converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Document id, also the catalog key.
    pub id: String,

    /// Raw text.
    pub text: String,

    /// Type of document.
    pub doc_type: DocumentType,

    /// Document number, if known.
    pub doc_number: Option<String>,

    /// URL the text was obtained from.
    pub source_url: Option<String>,

    /// Publication date, if known.
    pub publication_date: Option<NaiveDate>,
}

impl SourceDocument {
    /// Create a source document from text.
    #[must_use]
    pub fn new(id: impl Into<String>, doc_type: DocumentType, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            doc_type,
            doc_number: None,
            source_url: None,
            publication_date: None,
        }
    }

    /// Read a source document from a text file; the id is the file stem.
    pub fn from_file(path: &Path, doc_type: DocumentType) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(id, doc_type, text))
    }

    /// Set the document number.
    #[must_use]
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.doc_number = Some(number.into());
        self
    }

    /// Set the source URL.
    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Set the publication date.
    #[must_use]
    pub fn with_publication_date(mut self, date: NaiveDate) -> Self {
        self.publication_date = Some(date);
        self
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            doc_type: self.doc_type,
            doc_number: self.doc_number.clone(),
            source_url: self.source_url.clone(),
            publication_date: self.publication_date,
            id: Some(self.id.clone()),
        }
    }
}

/// A converted document.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The parsed document.
    pub document: Document,

    /// Its XML serialization.
    pub xml: String,

    /// Schema violations of the XML; reported, never fatal.
    pub diagnostics: Vec<SchemaDiagnostic>,

    /// Where the XML was written, if an output directory was given.
    pub output: Option<PathBuf>,
}

/// The outcome of converting one document of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub id: String,
    pub result: Result<Conversion>,
}

/// Shared settings of a batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchContext<'a> {
    pub catalog: &'a Catalog,
    pub config: &'a ParserConfig,

    /// Directory for the XML files; nothing is written when `None`.
    pub output_dir: Option<&'a Path>,
}

/// Parse, serialize, validate and (optionally) save one document.
pub fn convert_one(source: &SourceDocument, ctx: &BatchContext<'_>) -> Result<Conversion> {
    let entry = ctx.catalog.get(&source.id);
    if entry.is_none() && !ctx.catalog.is_empty() {
        tracing::debug!(id = %source.id, "no catalog entry");
    }

    let document = parse_document(&source.text, &source.parse_options(), entry, ctx.config)?;
    let xml = generate_xml(&document)?;
    let diagnostics = validate_xml(&xml)?;

    let output = match ctx.output_dir {
        Some(dir) => Some(save_xml(&document, dir, Some(&source.id))?),
        None => None,
    };

    Ok(Conversion {
        document,
        xml,
        diagnostics,
        output,
    })
}

/// Convert a batch of documents in parallel, calling `on_done` as each
/// document finishes.
pub fn convert_batch_with<F>(
    sources: &[SourceDocument],
    ctx: &BatchContext<'_>,
    on_done: F,
) -> Vec<BatchOutcome>
where
    F: Fn(&BatchOutcome) + Sync,
{
    sources
        .par_iter()
        .map(|source| {
            let outcome = BatchOutcome {
                id: source.id.clone(),
                result: convert_one(source, ctx),
            };
            if let Err(e) = &outcome.result {
                tracing::warn!(id = %outcome.id, error = %e, "Conversion failed");
            }
            on_done(&outcome);
            outcome
        })
        .collect()
}

/// Convert a batch of documents in parallel.
pub fn convert_batch(sources: &[SourceDocument], ctx: &BatchContext<'_>) -> Vec<BatchOutcome> {
    convert_batch_with(sources, ctx, |_| {})
}

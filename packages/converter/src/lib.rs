//! LeyChile Converter - Parse Chilean legal text into structured XML.
//!
//! This crate parses the text of Chilean administrative and legislative
//! documents (exempt resolutions, SUPERIR instructivos, normas de carácter
//! general, laws) into a hierarchical document model and serializes it as
//! namespaced XML.
//!
//! # Example
//!
//! ```
//! use leychile_converter::{generate_xml, parse_document, ParseOptions, ParserConfig};
//! use leychile_converter::types::DocumentType;
//!
//! let text = "VISTOS:\nLa Ley N° 20.720.\n\nRESUELVO:\n\nArtículo 1. Texto.";
//! let options = ParseOptions::new(DocumentType::Instructivo).with_number("5");
//! let doc = parse_document(text, &options, None, &ParserConfig::default()).unwrap();
//! let xml = generate_xml(&doc).unwrap();
//! assert!(xml.contains(r#"tipo="Instructivo""#));
//! ```
//!
//! # Architecture
//!
//! The converter is organized into several modules:
//!
//! - [`config`]: Configuration constants, parser settings and validation
//! - [`types`]: Document model (Document, Part, Metadata, ...)
//! - [`error`]: Error and warning types, Result alias
//! - [`patterns`]: Regex library for dates, numbers, references and headers
//! - [`text`]: Input normalization and PDF line unwrapping
//! - [`zones`]: Header / recitals / grounds / body / closing splitter
//! - [`hierarchy`]: Line classifier and part tree builder
//! - [`metadata`]: Metadata extraction
//! - [`catalog`]: Catalog of known documents
//! - [`assembler`]: Parsing pipeline
//! - [`xml`]: XML serialization and schema validation
//! - [`batch`]: Parallel conversion of many documents
//! - [`cli`]: Command-line interface

pub mod assembler;
pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod metadata;
pub mod patterns;
pub mod text;
pub mod types;
pub mod xml;
pub mod zones;

// Re-export main functions
pub use assembler::{parse_document, ParseOptions};
pub use batch::{convert_batch, convert_one, SourceDocument};
pub use xml::{generate_xml, save_xml, validate_xml};

// Re-export commonly used items
pub use catalog::{Catalog, CatalogEntry};
pub use config::ParserConfig;
pub use error::{ConverterError, ParseWarning, Result};
pub use types::{Closing, Document, DocumentType, Metadata, Part, PartKind, Preamble};

//! Catalog of known documents.
//!
//! The catalog is an immutable lookup table loaded from YAML, keyed by
//! document id. Keys may be written in English or in their Spanish form:
//!
//! ```yaml
//! 2024_INST_5:
//!   titulo_completo: Instructivo sobre formalidades de las publicaciones
//!   resolucion_exenta: "6597"
//!   fecha_publicacion: 2023-08-21
//!   materias: [Publicaciones, Formalidades]
//!   nombres_comunes: [Instructivo de publicaciones]
//!   categoria: Procedimientos concursales
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::validate_document_id;
use crate::error::{ConverterError, Result};

/// Externally supplied metadata for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogEntry {
    /// Full title.
    #[serde(alias = "titulo_completo")]
    pub title: Option<String>,

    /// Source URL.
    pub url: Option<String>,

    /// Exempt-resolution number; used only when the text has none.
    #[serde(alias = "resolucion_exenta", deserialize_with = "scalar_string")]
    pub resolution_number: Option<String>,

    /// Publication date.
    #[serde(alias = "fecha_publicacion")]
    pub publication_date: Option<NaiveDate>,

    /// Subject tags.
    #[serde(alias = "materias")]
    pub subjects: Vec<String>,

    /// Common-usage names.
    #[serde(alias = "nombres_comunes")]
    pub common_names: Vec<String>,

    /// Category, recorded as a concept tag.
    #[serde(alias = "categoria")]
    pub category: Option<String>,

    /// Document number ("5" for Instructivo N° 5).
    #[serde(alias = "doc_numero", deserialize_with = "scalar_string")]
    pub doc_number: Option<String>,
}

/// Accept numbers written without quotes (`resolucion_exenta: 6597`).
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(u64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(text) => text,
        Scalar::Integer(number) => number.to_string(),
    }))
}

/// Immutable table of catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Parse a catalog from YAML text.
    ///
    /// # Examples
    /// ```
    /// use leychile_converter::catalog::Catalog;
    ///
    /// let catalog = Catalog::from_yaml_str("2024_INST_5:\n  materias: [Publicaciones]\n").unwrap();
    /// assert_eq!(catalog.get("2024_INST_5").unwrap().subjects, vec!["Publicaciones"]);
    /// assert!(catalog.get("2024_INST_6").is_none());
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let entries: BTreeMap<String, CatalogEntry> = serde_yaml_ng::from_str(yaml)?;
        for id in entries.keys() {
            validate_document_id(id)?;
        }
        Ok(Self { entries })
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&content)?;
        tracing::debug!(path = %path.display(), entries = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    /// Look up an entry that must exist.
    pub fn require(&self, id: &str) -> Result<&CatalogEntry> {
        self.get(id)
            .ok_or_else(|| ConverterError::UnknownCatalogEntry(id.to_string()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

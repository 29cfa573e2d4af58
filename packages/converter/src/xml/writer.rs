//! XML writer for parsed documents.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::references::normalize_references;
use super::stats::Statistics;
use crate::config::{sanitize_filename, XML_NAMESPACE};
use crate::error::Result;
use crate::patterns::find_article_references;
use crate::types::{split_paragraphs, Closing, Document, Part, Preamble};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Thin event writer over an indented in-memory buffer.
struct XmlEmitter {
    writer: Writer<Vec<u8>>,
}

impl XmlEmitter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn element(name: &str, attrs: &[(&str, &str)]) -> BytesStart<'static> {
        let mut element = BytesStart::new(name.to_string());
        for attr in attrs {
            element.push_attribute(*attr);
        }
        element
    }

    fn declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.writer
            .write_event(Event::Start(Self::element(name, attrs)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        self.writer
            .write_event(Event::Empty(Self::element(name, attrs)))?;
        Ok(())
    }

    /// `<name attrs>text</name>`, or `<name attrs/>` for empty text.
    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        if text.is_empty() {
            return self.empty(name, attrs);
        }
        self.start(name, attrs)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// A container holding one text element per value.
    fn list(&mut self, container: &str, item: &str, values: &[String]) -> Result<()> {
        if values.is_empty() {
            return self.empty(container, &[]);
        }
        self.start(container, &[])?;
        for value in values {
            self.text_element(item, &[], value)?;
        }
        self.end(container)
    }

    /// A container holding one `<inciso>` per paragraph of `text`.
    fn paragraphs(&mut self, container: &str, text: &str) -> Result<()> {
        self.start(container, &[])?;
        for paragraph in split_paragraphs(text) {
            self.text_element("inciso", &[], paragraph)?;
        }
        self.end(container)
    }

    fn into_string(self) -> Result<String> {
        let bytes = self.writer.into_inner();
        String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }
}

fn write_metadata(out: &mut XmlEmitter, doc: &Document) -> Result<()> {
    let metadata = &doc.metadata;
    out.start("metadatos", &[])?;
    out.text_element("titulo", &[], &doc.full_title())?;
    out.list("materias", "materia", &metadata.subjects)?;
    out.list("conceptos", "concepto", &metadata.concepts)?;
    out.list("nombres_uso_comun", "nombre", &metadata.common_names)?;

    let references = normalize_references(&metadata.law_references);
    if references.is_empty() {
        out.empty("leyes_referenciadas", &[])?;
    } else {
        out.start("leyes_referenciadas", &[])?;
        for reference in &references {
            let mut attrs = vec![
                ("tipo", reference.kind.as_str()),
                ("numero", reference.number.as_str()),
            ];
            if let Some(article) = reference.article.as_deref() {
                attrs.push(("articulo", article));
            }
            out.text_element("ley_ref", &attrs, &reference.original)?;
        }
        out.end("leyes_referenciadas")?;
    }

    out.text_element("identificacion_fuente", &[], &metadata.source_identification)?;
    if let Some(number) = metadata.source_number.as_deref() {
        out.text_element("numero_fuente", &[], number)?;
    }
    out.end("metadatos")
}

fn write_preamble(out: &mut XmlEmitter, preamble: &Preamble) -> Result<()> {
    match preamble {
        Preamble::Narrative(text) => out.paragraphs("encabezado", text),
        Preamble::Structured { recitals, grounds } => {
            out.paragraphs("vistos", recitals)?;
            out.paragraphs("considerandos", grounds)
        }
    }
}

fn write_part(out: &mut XmlEmitter, part: &Part) -> Result<()> {
    let tag = part.kind.xml_tag();
    let title = part.display_title();
    let mut attrs = vec![
        ("id", part.id.as_str()),
        ("numero", part.name.as_str()),
        ("titulo", title.as_str()),
        ("derogado", bool_str(part.revoked)),
    ];
    if part.transitory {
        attrs.push(("transitorio", "true"));
    }
    out.start(tag, &attrs)?;

    if part.is_article() {
        out.start("contenido", &[])?;
        let mut paragraphs = part.paragraphs().peekable();
        if paragraphs.peek().is_none() {
            out.empty("inciso", &[])?;
        }
        for paragraph in paragraphs {
            out.text_element("inciso", &[], paragraph)?;
        }
        out.end("contenido")?;
        out.list("referencias", "ref", &find_article_references(&part.text))?;
    } else {
        if !part.text.trim().is_empty() {
            out.paragraphs("contenido", &part.text)?;
        }
        for child in &part.children {
            write_part(out, child)?;
        }
    }

    out.end(tag)
}

fn write_closing(out: &mut XmlEmitter, closing: &Closing) -> Result<()> {
    match closing {
        Closing::Promulgation(text) => out.paragraphs("promulgacion", text),
        Closing::FinalProvisions(text) => out.paragraphs("disposiciones_finales", text),
    }
}

fn write_statistics(out: &mut XmlEmitter, stats: Statistics) -> Result<()> {
    let articles = stats.articles.to_string();
    let books = stats.books.to_string();
    let titles = stats.titles.to_string();
    let chapters = stats.chapters.to_string();
    out.empty(
        "estadisticas",
        &[
            ("articulos", articles.as_str()),
            ("libros", books.as_str()),
            ("titulos", titles.as_str()),
            ("capitulos", chapters.as_str()),
        ],
    )
}

/// Generate the XML serialization of a document.
///
/// # Examples
/// ```
/// use leychile_converter::types::{Document, DocumentType, Part, PartKind};
/// use leychile_converter::xml::generate_xml;
///
/// let mut doc = Document::new(DocumentType::Instructivo, "5");
/// doc.parts.push(Part::new(PartKind::Article, "1", "1", 0).with_text("Texto."));
/// let xml = generate_xml(&doc).unwrap();
/// assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
/// assert!(xml.contains("<inciso>Texto.</inciso>"));
/// ```
pub fn generate_xml(doc: &Document) -> Result<String> {
    let mut out = XmlEmitter::new();
    out.declaration()?;

    let promulgation = doc.promulgation_date.map(|d| d.format(DATE_FORMAT).to_string());
    let publication = doc.publication_date.map(|d| d.format(DATE_FORMAT).to_string());
    let mut attrs = vec![
        ("xmlns", XML_NAMESPACE),
        ("id_norma", doc.id.as_str()),
        ("tipo", doc.doc_type.as_str()),
        ("numero", doc.number.as_str()),
        ("estado", if doc.revoked { "derogada" } else { "vigente" }),
        ("version_esquema", doc.schema_version.as_str()),
    ];
    if let Some(date) = promulgation.as_deref() {
        attrs.push(("fecha_promulgacion", date));
    }
    if let Some(date) = publication.as_deref() {
        attrs.push(("fecha_publicacion", date));
    }
    if let Some(url) = doc.source_url.as_deref() {
        attrs.push(("fuente", url));
    }
    out.start("ley", &attrs)?;

    write_metadata(&mut out, doc)?;
    if let Some(preamble) = &doc.preamble {
        write_preamble(&mut out, preamble)?;
    }
    if !doc.body_intro.trim().is_empty() {
        out.paragraphs("introduccion", &doc.body_intro)?;
    }
    for part in &doc.parts {
        write_part(&mut out, part)?;
    }
    if let Some(closing) = &doc.closing {
        write_closing(&mut out, closing)?;
    }
    write_statistics(&mut out, Statistics::collect(&doc.parts))?;

    out.end("ley")?;

    let mut xml = out.into_string()?;
    xml.push('\n');
    Ok(xml)
}

/// Save a document as an XML file.
///
/// Uses atomic write pattern: writes to temp file, syncs to disk, then renames.
///
/// # Arguments
/// * `doc` - The document to save
/// * `output_dir` - Directory to write into (created if missing)
/// * `filename` - File name; defaults to `<Tipo>_<numero>.xml`
///
/// # Returns
/// Path to the saved file
pub fn save_xml(doc: &Document, output_dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let mut name = sanitize_filename(filename.unwrap_or(&doc.file_stem()));
    if !name.ends_with(".xml") {
        name.push_str(".xml");
    }
    let output_file = output_dir.join(&name);
    let temp_file = output_dir.join(format!(".{name}.tmp"));

    let content = generate_xml(doc)?;

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;
    tracing::debug!(path = %output_file.display(), "XML written");

    Ok(output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentType, PartKind};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn create_test_document() -> Document {
        let mut doc = Document::new(DocumentType::Instructivo, "5");
        doc.promulgation_date = NaiveDate::from_ymd_opt(2024, 10, 3);
        doc.source_url = Some("https://www.superir.gob.cl/instructivo-5.pdf".to_string());
        doc.metadata.title = "Instructivo sobre formalidades".to_string();
        doc.metadata.add_subject("Publicaciones");
        doc.metadata.add_law_reference("Ley 20.720");
        doc.metadata.add_law_reference("Oficio 12");
        doc.metadata.source_identification = "Superintendencia".to_string();
        doc.metadata.source_number = Some("6597".to_string());
        doc.preamble = Some(Preamble::Structured {
            recitals: "Lo dispuesto en la Ley N° 20.720.".to_string(),
            grounds: "Que corresponde.\nQue es necesario.".to_string(),
        });
        doc.parts.push(
            Part::new(PartKind::Title, "1", "I", 0)
                .with_caption("DISPOSICIONES GENERALES")
                .with_child(
                    Part::new(PartKind::Article, "2", "1", 1)
                        .with_caption("Objeto")
                        .with_text("Conforme al artículo 5 bis, se regula.\nSegundo inciso."),
                )
                .with_child(Part::new(PartKind::Article, "3", "2", 1)),
        );
        doc.closing = Some(Closing::FinalProvisions(
            "II. NOTIFÍQUESE a los interesados.".to_string(),
        ));
        doc
    }

    #[test]
    fn test_generate_xml_root() {
        let xml = generate_xml(&create_test_document()).unwrap();
        let parsed = roxmltree::Document::parse(&xml).unwrap();
        let root = parsed.root_element();

        assert_eq!(root.tag_name().name(), "ley");
        assert_eq!(root.tag_name().namespace(), Some(XML_NAMESPACE));
        assert_eq!(root.attribute("id_norma"), Some("INST-5"));
        assert_eq!(root.attribute("tipo"), Some("Instructivo"));
        assert_eq!(root.attribute("estado"), Some("vigente"));
        assert_eq!(root.attribute("fecha_promulgacion"), Some("2024-10-03"));
        assert_eq!(root.attribute("fecha_publicacion"), None);
    }

    #[test]
    fn test_generate_xml_parts() {
        let xml = generate_xml(&create_test_document()).unwrap();

        assert!(xml.contains(r#"<titulo id="1" numero="I" titulo="DISPOSICIONES GENERALES" derogado="false">"#));
        assert!(xml.contains(r#"<articulo id="2" numero="1" titulo="Objeto" derogado="false">"#));
        assert!(xml.contains("<inciso>Segundo inciso.</inciso>"));
        assert!(xml.contains("<ref>5bis</ref>"));
        // Empty article still carries one paragraph
        assert!(xml.contains(r#"titulo="Artículo 2""#));
        assert!(xml.contains("<inciso/>"));
    }

    #[test]
    fn test_generate_xml_zones_and_stats() {
        let xml = generate_xml(&create_test_document()).unwrap();

        assert!(xml.contains("<vistos>"));
        assert!(xml.contains("<inciso>Que es necesario.</inciso>"));
        assert!(!xml.contains("<encabezado>"));
        assert!(xml.contains("<disposiciones_finales>"));
        assert!(!xml.contains("<promulgacion>"));
        assert!(xml.contains(r#"<estadisticas articulos="2" libros="0" titulos="1" capitulos="0"/>"#));
    }

    #[test]
    fn test_generate_xml_drops_unrecognized_reference() {
        let xml = generate_xml(&create_test_document()).unwrap();

        assert!(xml.contains(r#"<ley_ref tipo="Ley" numero="20.720">Ley 20.720</ley_ref>"#));
        assert!(!xml.contains("Oficio 12"));
    }

    #[test]
    fn test_generate_xml_revoked_and_transitory() {
        let mut doc = Document::new(DocumentType::Ley, "21.000");
        doc.revoked = true;
        let mut article = Part::new(PartKind::Article, "1", "transitorio", 0).with_text("Derogado.");
        article.transitory = true;
        article.revoked = true;
        doc.parts.push(article);

        let xml = generate_xml(&doc).unwrap();
        assert!(xml.contains(r#"estado="derogada""#));
        assert!(xml.contains(r#"derogado="true" transitorio="true""#));
        assert!(xml.contains("<materias/>"));
    }

    #[test]
    fn test_generate_xml_escapes_text() {
        let mut doc = Document::new(DocumentType::Resolucion, "1");
        doc.body_intro = "Montos < 100 UF & otros.".to_string();
        let xml = generate_xml(&doc).unwrap();
        assert!(xml.contains("<introduccion>"));
        assert!(xml.contains("Montos &lt; 100 UF &amp; otros."));
    }

    #[test]
    fn test_save_xml_default_name() {
        let doc = create_test_document();
        let temp_dir = tempdir().unwrap();
        let path = save_xml(&doc, temp_dir.path(), None).unwrap();

        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), "Instructivo_5.xml");
        let content = fs::read_to_string(path).unwrap();
        assert!(content.starts_with("<?xml"));
    }

    #[test]
    fn test_save_xml_explicit_name() {
        let doc = Document::new(DocumentType::NormaCaracterGeneral, "14");
        let temp_dir = tempdir().unwrap();
        let path = save_xml(&doc, &temp_dir.path().join("out"), Some("ncg 14")).unwrap();
        assert_eq!(path.file_name().unwrap(), "ncg_14.xml");
    }
}

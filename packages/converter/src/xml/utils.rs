//! Helpers for navigating parsed XML trees.

use roxmltree::Node;

/// Get the tag name without namespace.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use leychile_converter::xml::get_tag_name;
///
/// let xml = r#"<ley xmlns="https://leychile.cl/schema/ley/v1"><articulo/></ley>"#;
/// let doc = Document::parse(xml).unwrap();
/// let articulo = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(articulo), "articulo");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use leychile_converter::xml::find_child;
///
/// let doc = Document::parse("<ley><metadatos/><estadisticas/></ley>").unwrap();
/// assert!(find_child(doc.root_element(), "metadatos").is_some());
/// assert!(find_child(doc.root_element(), "vistos").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && get_tag_name(*child) == tag)
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && get_tag_name(*child) == tag)
}

/// Get the text content of a node, trimmed.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Check if a node is an element with a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Whether a node has non-whitespace text directly inside it.
pub fn has_direct_text(node: Node<'_, '_>) -> bool {
    node.children()
        .any(|child| child.is_text() && child.text().is_some_and(|t| !t.trim().is_empty()))
}

/// 1-based line on which a node starts.
pub fn line_number(node: Node<'_, '_>) -> u32 {
    node.document().text_pos_at(node.range().start).row
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    #[test]
    fn test_get_tag_name_with_namespace() {
        let xml = r#"<ns:ley xmlns:ns="https://leychile.cl/schema/ley/v1"><ns:titulo/></ns:ley>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_tag_name(doc.root_element()), "ley");
    }

    #[test]
    fn test_find_children() {
        let xml = "<materias><materia>A</materia><otro/><materia>B</materia></materias>";
        let doc = Document::parse(xml).unwrap();
        let texts: Vec<String> = find_children(doc.root_element(), "materia")
            .map(get_text)
            .collect();
        assert_eq!(texts, vec!["A", "B"]);
    }

    #[test]
    fn test_get_text_trimmed() {
        let doc = Document::parse("<inciso>  Texto del inciso.  </inciso>").unwrap();
        assert_eq!(get_text(doc.root_element()), "Texto del inciso.");
    }

    #[test]
    fn test_has_tag() {
        let doc = Document::parse("<articulo/>").unwrap();
        assert!(has_tag(doc.root_element(), "articulo"));
        assert!(!has_tag(doc.root_element(), "capitulo"));
    }

    #[test]
    fn test_element_children_and_direct_text() {
        let doc = Document::parse("<contenido>\n  <inciso>uno</inciso>\n  <inciso/>\n</contenido>").unwrap();
        let root = doc.root_element();
        assert_eq!(element_children(root).count(), 2);
        assert!(!has_direct_text(root));
        assert!(has_direct_text(root.first_element_child().unwrap()));
    }

    #[test]
    fn test_line_number() {
        let doc = Document::parse("<ley>\n  <metadatos/>\n\n  <estadisticas/>\n</ley>").unwrap();
        let stats = find_child(doc.root_element(), "estadisticas").unwrap();
        assert_eq!(line_number(doc.root_element()), 1);
        assert_eq!(line_number(stats), 4);
    }
}

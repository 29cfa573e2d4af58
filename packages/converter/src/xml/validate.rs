//! Validation of generated XML against the fixed document schema.
//!
//! The schema is a table of element rules. Each rule names the children an
//! element may hold, the attributes it must carry, the values enumerated
//! attributes may take and the siblings that exclude each other. A document
//! that breaks a rule yields a [`SchemaDiagnostic`]; only XML that is not
//! well-formed is an error.

use roxmltree::{Document, Node};

use super::utils::{element_children, find_child, get_tag_name, has_direct_text, line_number};
use crate::config::XML_NAMESPACE;
use crate::error::Result;

/// A schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDiagnostic {
    /// 1-based line of the offending element.
    pub line: u32,

    /// What is wrong.
    pub message: String,
}

impl std::fmt::Display for SchemaDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Schema rule for one element.
struct ElementRule {
    name: &'static str,

    /// Required parent, for names used in two places (`titulo`).
    parent: Option<&'static str>,

    children: &'static [&'static str],
    required_children: &'static [&'static str],
    required_attributes: &'static [&'static str],
    enumerated: &'static [(&'static str, &'static [&'static str])],
    exclusive: &'static [(&'static str, &'static str)],

    /// Whether the element may hold character data.
    text: bool,
}

impl ElementRule {
    const fn leaf(name: &'static str, parent: Option<&'static str>) -> Self {
        Self {
            name,
            parent,
            children: &[],
            required_children: &[],
            required_attributes: &[],
            enumerated: &[],
            exclusive: &[],
            text: true,
        }
    }

    const fn container(name: &'static str, children: &'static [&'static str]) -> Self {
        Self {
            name,
            parent: None,
            children,
            required_children: &[],
            required_attributes: &[],
            enumerated: &[],
            exclusive: &[],
            text: false,
        }
    }

    const fn part(name: &'static str, children: &'static [&'static str]) -> Self {
        Self {
            name,
            parent: None,
            children,
            required_children: &[],
            required_attributes: &["id", "numero", "titulo", "derogado"],
            enumerated: &[("derogado", BOOLEAN), ("transitorio", BOOLEAN)],
            exclusive: &[],
            text: false,
        }
    }
}

const BOOLEAN: &[&str] = &["true", "false"];
const DOCUMENT_TYPES: &[&str] = &[
    "Ley",
    "Norma de Carácter General",
    "Instructivo",
    "Resolución",
    "Circular",
];
const CONTAINER_CHILDREN: &[&str] = &["contenido", "libro", "titulo", "capitulo", "parrafo", "articulo"];
const PARAGRAPHS: &[&str] = &["inciso"];

const ROOT_RULE: ElementRule = ElementRule {
    name: "ley",
    parent: None,
    children: &[
        "metadatos",
        "encabezado",
        "vistos",
        "considerandos",
        "introduccion",
        "libro",
        "titulo",
        "capitulo",
        "parrafo",
        "articulo",
        "promulgacion",
        "disposiciones_finales",
        "estadisticas",
    ],
    required_children: &["metadatos", "estadisticas"],
    required_attributes: &["id_norma", "tipo", "numero", "estado", "version_esquema"],
    enumerated: &[("estado", &["vigente", "derogada"]), ("tipo", DOCUMENT_TYPES)],
    exclusive: &[
        ("encabezado", "vistos"),
        ("encabezado", "considerandos"),
        ("promulgacion", "disposiciones_finales"),
    ],
    text: false,
};

static RULES: &[ElementRule] = &[
    ROOT_RULE,
    ElementRule {
        required_children: &["titulo", "identificacion_fuente"],
        ..ElementRule::container(
            "metadatos",
            &[
                "titulo",
                "materias",
                "conceptos",
                "nombres_uso_comun",
                "leyes_referenciadas",
                "identificacion_fuente",
                "numero_fuente",
            ],
        )
    },
    ElementRule::leaf("titulo", Some("metadatos")),
    ElementRule::container("materias", &["materia"]),
    ElementRule::leaf("materia", None),
    ElementRule::container("conceptos", &["concepto"]),
    ElementRule::leaf("concepto", None),
    ElementRule::container("nombres_uso_comun", &["nombre"]),
    ElementRule::leaf("nombre", None),
    ElementRule::container("leyes_referenciadas", &["ley_ref"]),
    ElementRule {
        required_attributes: &["tipo", "numero"],
        enumerated: &[("tipo", &["Ley", "DFL", "D.S.", "NCG"])],
        ..ElementRule::leaf("ley_ref", None)
    },
    ElementRule::leaf("identificacion_fuente", None),
    ElementRule::leaf("numero_fuente", None),
    ElementRule::container("encabezado", PARAGRAPHS),
    ElementRule::container("vistos", PARAGRAPHS),
    ElementRule::container("considerandos", PARAGRAPHS),
    ElementRule::container("introduccion", PARAGRAPHS),
    ElementRule::container("promulgacion", PARAGRAPHS),
    ElementRule::container("disposiciones_finales", PARAGRAPHS),
    ElementRule::container("contenido", PARAGRAPHS),
    ElementRule::leaf("inciso", None),
    ElementRule::part("libro", CONTAINER_CHILDREN),
    ElementRule::part("titulo", CONTAINER_CHILDREN),
    ElementRule::part("capitulo", CONTAINER_CHILDREN),
    ElementRule::part("parrafo", CONTAINER_CHILDREN),
    ElementRule {
        required_children: &["contenido"],
        ..ElementRule::part("articulo", &["contenido", "referencias"])
    },
    ElementRule::container("referencias", &["ref"]),
    ElementRule::leaf("ref", None),
    ElementRule {
        required_attributes: &["articulos", "libros", "titulos", "capitulos"],
        ..ElementRule::container("estadisticas", &[])
    },
];

/// Find the rule for an element, preferring one bound to its parent.
fn rule_for(node: Node<'_, '_>) -> Option<&'static ElementRule> {
    let name = get_tag_name(node);
    let parent = node.parent_element().map(get_tag_name);
    RULES
        .iter()
        .find(|rule| rule.name == name && rule.parent.is_some() && rule.parent == parent)
        .or_else(|| {
            RULES
                .iter()
                .find(|rule| rule.name == name && rule.parent.is_none())
        })
}

struct Validator {
    diagnostics: Vec<SchemaDiagnostic>,
}

impl Validator {
    fn report(&mut self, node: Node<'_, '_>, message: String) {
        let line = line_number(node);
        tracing::warn!(line, message = %message, "Schema violation");
        self.diagnostics.push(SchemaDiagnostic { line, message });
    }

    fn check(&mut self, node: Node<'_, '_>) {
        let name = get_tag_name(node);
        let Some(rule) = rule_for(node) else {
            self.report(node, format!("unknown element <{name}>"));
            return;
        };

        if node.tag_name().namespace() != Some(XML_NAMESPACE) {
            self.report(node, format!("<{name}> is outside the {XML_NAMESPACE} namespace"));
        }

        for attribute in rule.required_attributes {
            if node.attribute(*attribute).is_none() {
                self.report(node, format!("<{name}> is missing attribute '{attribute}'"));
            }
        }

        for (attribute, allowed) in rule.enumerated {
            if let Some(value) = node.attribute(*attribute) {
                if !allowed.contains(&value) {
                    self.report(
                        node,
                        format!("<{name}> attribute '{attribute}' has invalid value '{value}'"),
                    );
                }
            }
        }

        if !rule.text && has_direct_text(node) {
            self.report(node, format!("<{name}> may not contain text"));
        }

        for required in rule.required_children {
            if find_child(node, required).is_none() {
                self.report(node, format!("<{name}> is missing child <{required}>"));
            }
        }

        for (first, second) in rule.exclusive {
            if find_child(node, first).is_some() && find_child(node, second).is_some() {
                self.report(
                    node,
                    format!("<{name}> may not contain both <{first}> and <{second}>"),
                );
            }
        }

        for child in element_children(node) {
            let child_name = get_tag_name(child);
            if rule.children.contains(&child_name) {
                self.check(child);
            } else {
                self.report(child, format!("<{child_name}> is not allowed inside <{name}>"));
            }
        }
    }
}

/// Validate XML text against the document schema.
///
/// Returns the list of violations; an empty list means the document is
/// valid. Fails only when the text is not well-formed XML.
///
/// # Examples
/// ```
/// use leychile_converter::types::{Document, DocumentType};
/// use leychile_converter::xml::{generate_xml, validate_xml};
///
/// let xml = generate_xml(&Document::new(DocumentType::Ley, "21.000")).unwrap();
/// assert!(validate_xml(&xml).unwrap().is_empty());
/// assert!(validate_xml("<ley>").is_err());
/// ```
pub fn validate_xml(xml: &str) -> Result<Vec<SchemaDiagnostic>> {
    let doc = Document::parse(xml)?;
    let mut validator = Validator {
        diagnostics: Vec::new(),
    };

    let root = doc.root_element();
    if get_tag_name(root) == ROOT_RULE.name {
        validator.check(root);
    } else {
        validator.report(
            root,
            format!("root element must be <ley>, found <{}>", get_tag_name(root)),
        );
    }

    tracing::debug!(diagnostics = validator.diagnostics.len(), "XML validated");
    Ok(validator.diagnostics)
}

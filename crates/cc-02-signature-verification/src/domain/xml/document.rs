//! # Signed Document Access
//!
//! Parsing, id indexing and small navigation helpers over `roxmltree`.
//! Documents with a DTD are refused by the parser.

use super::algorithms::DSIG_NS;
use crate::domain::errors::SignatureError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use roxmltree::{Document, Node};
use std::collections::HashMap;

/// Attribute names treated as element ids (unqualified only).
pub const ID_ATTRIBUTES: [&str; 3] = ["id", "Id", "ID"];

/// Parse a document. DTDs are rejected.
pub fn parse(text: &str) -> Result<Document<'_>, SignatureError> {
    Document::parse(text).map_err(|e| SignatureError::MalformedDocument(e.to_string()))
}

/// The single `Signature` element of a document.
pub fn single_signature<'a, 'input>(
    doc: &'a Document<'input>,
) -> Result<Node<'a, 'input>, SignatureError> {
    let mut signatures = doc
        .descendants()
        .filter(|n| n.has_tag_name((DSIG_NS, "Signature")));

    match (signatures.next(), signatures.count()) {
        (Some(signature), 0) => Ok(signature),
        (None, _) => Err(SignatureError::SignatureCount(0)),
        (Some(_), rest) => Err(SignatureError::SignatureCount(rest + 1)),
    }
}

/// Every element carrying an id attribute, grouped by id value.
#[derive(Debug)]
pub struct IdIndex<'a, 'input> {
    ids: HashMap<String, Vec<Node<'a, 'input>>>,
}

impl<'a, 'input> IdIndex<'a, 'input> {
    pub fn build(doc: &'a Document<'input>) -> Self {
        let mut ids: HashMap<String, Vec<Node<'a, 'input>>> = HashMap::new();
        for node in doc.descendants().filter(Node::is_element) {
            for attr in node.attributes() {
                if attr.namespace().is_none() && ID_ATTRIBUTES.contains(&attr.name()) {
                    ids.entry(attr.value().to_string()).or_default().push(node);
                }
            }
        }
        Self { ids }
    }

    /// The one element carrying `id`. Missing and duplicated ids both fail.
    pub fn resolve(&self, id: &str) -> Result<Node<'a, 'input>, SignatureError> {
        match self.ids.get(id).map(Vec::as_slice) {
            None | Some([]) => Err(SignatureError::UnresolvedReference(id.to_string())),
            Some([node]) => Ok(*node),
            Some(_) => Err(SignatureError::DuplicateId(id.to_string())),
        }
    }

    /// Number of distinct id values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Id of an element, if it carries one.
#[must_use]
pub fn element_id<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    ID_ATTRIBUTES.iter().find_map(|name| node.attribute(*name))
}

/// Element name as written in the source, prefix included.
#[must_use]
pub fn element_qname<'input>(node: Node<'_, 'input>) -> &'input str {
    let source = &node.document().input_text()[node.range()];
    let name = source.strip_prefix('<').unwrap_or(source);
    let end = name
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(name.len());
    &name[..end]
}

/// First child element in namespace `ns` with local name `name`.
pub fn child<'a, 'input>(node: Node<'a, 'input>, ns: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name((ns, name)))
}

/// All child elements in namespace `ns` with local name `name`.
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    ns: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children().filter(move |c| c.has_tag_name((ns, name)))
}

/// Mandatory XML-DSig child element.
pub fn required_child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, SignatureError> {
    child(node, DSIG_NS, name).ok_or(SignatureError::MissingElement(name))
}

/// Mandatory `Algorithm` attribute.
pub fn algorithm_attribute<'a>(
    node: Node<'a, '_>,
    element: &'static str,
) -> Result<&'a str, SignatureError> {
    node.attribute("Algorithm")
        .ok_or(SignatureError::MissingAttribute {
            element,
            attribute: "Algorithm",
        })
}

/// Concatenated text content of an element.
#[must_use]
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

/// Base64 content of an element, whitespace ignored.
pub fn base64_content(node: Node<'_, '_>, what: &'static str) -> Result<Vec<u8>, SignatureError> {
    let compact: String = text_content(node)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|_| SignatureError::InvalidEncoding(what))
}

/// Drop a leading XML declaration so the text can be embedded in another
/// document.
#[must_use]
pub fn strip_declaration(text: &str) -> &str {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return trimmed[end + 2..].trim_start();
        }
    }
    trimmed
}

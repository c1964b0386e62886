//! # Canonical XML
//!
//! Canonical XML 1.0 (inclusive) and Exclusive XML Canonicalization 1.0
//! over a `roxmltree` document, for a whole document or for the subtree
//! rooted at one element, optionally with one element (the enveloped
//! signature) removed.
//!
//! `roxmltree` has already normalized line endings and attribute values and
//! expanded character references, so serialization only has to re-escape.
//!
//! ## Namespace rendering
//!
//! - Inclusive: every in-scope namespace not already rendered identically by
//!   an output ancestor. At a subtree apex that means all of them, and the
//!   apex also inherits `xml:*` attributes from its ancestors.
//! - Exclusive: only namespaces visibly used by the element name or its
//!   attributes. `InclusiveNamespaces` prefix lists are not supported.

use super::algorithms::CanonicalizationMethod;
use super::document::element_qname;
use roxmltree::{Document, Node, NodeId, NodeType};
use std::collections::{BTreeMap, BTreeSet};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace bindings by prefix (`""` is the default namespace).
type Bindings = BTreeMap<String, String>;

/// Serializes node sets in canonical form.
#[derive(Debug, Clone, Copy)]
pub struct Canonicalizer {
    method: CanonicalizationMethod,
    comments: bool,
    exclude: Option<NodeId>,
}

impl Canonicalizer {
    pub fn new(method: CanonicalizationMethod) -> Self {
        Self {
            method,
            comments: method.with_comments(),
            exclude: None,
        }
    }

    /// Drop comments regardless of method (same-document references).
    #[must_use]
    pub fn without_comments(mut self) -> Self {
        self.comments = false;
        self
    }

    /// Leave `node` and its subtree out of the output.
    #[must_use]
    pub fn excluding(mut self, node: Option<NodeId>) -> Self {
        self.exclude = node;
        self
    }

    /// Canonical form of the whole document.
    #[must_use]
    pub fn document(&self, doc: &Document<'_>) -> String {
        let mut out = String::new();
        let mut after_root = false;

        for node in doc.root().children() {
            if self.is_excluded(node) {
                continue;
            }
            match node.node_type() {
                NodeType::Element => {
                    self.element(node, &Bindings::new(), &[], &mut out);
                    after_root = true;
                }
                NodeType::PI => {
                    self.top_level(node, after_root, &mut out);
                }
                NodeType::Comment if self.comments => {
                    self.top_level(node, after_root, &mut out);
                }
                _ => {}
            }
        }
        out
    }

    /// Canonical form of the subtree rooted at `apex`.
    #[must_use]
    pub fn subtree(&self, apex: Node<'_, '_>) -> String {
        let mut out = String::new();
        if self.is_excluded(apex) {
            return out;
        }
        let inherited = if self.method.is_exclusive() {
            Vec::new()
        } else {
            inherited_xml_attributes(apex)
        };
        self.element(apex, &Bindings::new(), &inherited, &mut out);
        out
    }

    fn is_excluded(&self, node: Node<'_, '_>) -> bool {
        self.exclude == Some(node.id())
    }

    fn top_level(&self, node: Node<'_, '_>, after_root: bool, out: &mut String) {
        if after_root {
            out.push('\n');
        }
        self.leaf(node, out);
        if !after_root {
            out.push('\n');
        }
    }

    fn element(
        &self,
        node: Node<'_, '_>,
        rendered: &Bindings,
        inherited: &[Attr],
        out: &mut String,
    ) {
        let qname = element_qname(node);
        let declarations = if self.method.is_exclusive() {
            exclusive_declarations(node, qname, rendered)
        } else {
            inclusive_declarations(node, rendered)
        };

        let mut attributes: Vec<Attr> = node.attributes().map(|a| Attr::of(node, &a)).collect();
        for attr in inherited {
            if !attributes.iter().any(|a| a.sort_key() == attr.sort_key()) {
                attributes.push(attr.clone());
            }
        }
        attributes.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        out.push('<');
        out.push_str(qname);
        for (prefix, uri) in &declarations {
            if prefix.is_empty() {
                out.push_str(" xmlns=\"");
            } else {
                out.push_str(" xmlns:");
                out.push_str(prefix);
                out.push_str("=\"");
            }
            escape_attribute(uri, out);
            out.push('"');
        }
        for attr in &attributes {
            out.push(' ');
            out.push_str(&attr.qname);
            out.push_str("=\"");
            escape_attribute(&attr.value, out);
            out.push('"');
        }
        out.push('>');

        let mut scope = rendered.clone();
        scope.extend(declarations);

        for child in node.children() {
            if self.is_excluded(child) {
                continue;
            }
            match child.node_type() {
                NodeType::Element => self.element(child, &scope, &[], out),
                NodeType::Text => escape_text(child.text().unwrap_or_default(), out),
                NodeType::Comment if self.comments => self.leaf(child, out),
                NodeType::PI => self.leaf(child, out),
                _ => {}
            }
        }

        out.push_str("</");
        out.push_str(qname);
        out.push('>');
    }

    /// Comments and processing instructions.
    fn leaf(&self, node: Node<'_, '_>, out: &mut String) {
        if node.is_comment() {
            out.push_str("<!--");
            out.push_str(node.text().unwrap_or_default());
            out.push_str("-->");
        } else if let Some(pi) = node.pi() {
            out.push_str("<?");
            out.push_str(pi.target);
            if let Some(value) = pi.value.filter(|v| !v.is_empty()) {
                out.push(' ');
                out.push_str(value);
            }
            out.push_str("?>");
        }
    }
}

// =============================================================================
// NAMESPACES
// =============================================================================

fn in_scope(node: Node<'_, '_>) -> Bindings {
    let mut bindings = Bindings::new();
    for ns in node.namespaces() {
        let prefix = ns.name().unwrap_or_default();
        if prefix == "xml" || (prefix.is_empty() && ns.uri().is_empty()) {
            continue;
        }
        bindings
            .entry(prefix.to_string())
            .or_insert_with(|| ns.uri().to_string());
    }
    bindings
}

fn inclusive_declarations(node: Node<'_, '_>, rendered: &Bindings) -> Bindings {
    let scope = in_scope(node);
    let mut declarations: Bindings = scope
        .iter()
        .filter(|(prefix, uri)| rendered.get(*prefix) != Some(*uri))
        .map(|(p, u)| (p.clone(), u.clone()))
        .collect();

    // Default namespace undeclared below a rendered non-empty default.
    if !scope.contains_key("") && rendered.get("").is_some_and(|uri| !uri.is_empty()) {
        declarations.insert(String::new(), String::new());
    }
    declarations
}

fn exclusive_declarations(node: Node<'_, '_>, qname: &str, rendered: &Bindings) -> Bindings {
    let scope = in_scope(node);

    let mut used = BTreeSet::new();
    used.insert(qname.split_once(':').map_or("", |(p, _)| p).to_string());
    for attr in node.attributes() {
        let qname = attribute_qname(node, &attr);
        if let Some((prefix, _)) = qname.split_once(':') {
            if prefix != "xml" {
                used.insert(prefix.to_string());
            }
        }
    }

    used.into_iter()
        .filter_map(|prefix| {
            let uri = scope.get(&prefix).cloned().unwrap_or_default();
            let current = rendered.get(&prefix).map(String::as_str).unwrap_or_default();
            (current != uri).then_some((prefix, uri))
        })
        .collect()
}

// =============================================================================
// NAMES AND ATTRIBUTES
// =============================================================================

#[derive(Debug, Clone)]
struct Attr {
    namespace: String,
    local: String,
    qname: String,
    value: String,
}

impl Attr {
    fn of(node: Node<'_, '_>, attr: &roxmltree::Attribute<'_, '_>) -> Self {
        Self {
            namespace: attr.namespace().unwrap_or_default().to_string(),
            local: attr.name().to_string(),
            qname: attribute_qname(node, attr),
            value: attr.value().to_string(),
        }
    }

    fn sort_key(&self) -> (&str, &str) {
        (&self.namespace, &self.local)
    }
}

/// Qualified name as written in the source. Several prefixes may be bound
/// to one namespace, so the prefix cannot be recovered from the URI alone.
fn attribute_qname(node: Node<'_, '_>, attr: &roxmltree::Attribute<'_, '_>) -> String {
    match attr.namespace() {
        None => attr.name().to_string(),
        Some(XML_NAMESPACE) => format!("xml:{}", attr.name()),
        Some(uri) => node
            .document()
            .input_text()
            .get(attr.range_qname())
            .filter(|qname| {
                qname
                    .split_once(':')
                    .is_some_and(|(_, local)| local == attr.name())
            })
            .map(str::to_string)
            .or_else(|| {
                node.namespaces()
                    .find(|ns| ns.uri() == uri && ns.name().is_some())
                    .and_then(|ns| ns.name())
                    .map(|prefix| format!("{prefix}:{}", attr.name()))
            })
            .unwrap_or_else(|| attr.name().to_string()),
    }
}

/// `xml:*` attributes of the apex's ancestors, nearest first, that the apex
/// does not set itself.
fn inherited_xml_attributes(apex: Node<'_, '_>) -> Vec<Attr> {
    let mut inherited: Vec<Attr> = Vec::new();
    for ancestor in apex.ancestors().skip(1).filter(Node::is_element) {
        for attr in ancestor.attributes() {
            if attr.namespace() != Some(XML_NAMESPACE) {
                continue;
            }
            let on_apex = apex.attribute((XML_NAMESPACE, attr.name())).is_some();
            let seen = inherited.iter().any(|a| a.local == attr.name());
            if !on_apex && !seen {
                inherited.push(Attr::of(ancestor, &attr));
            }
        }
    }
    inherited
}

// =============================================================================
// ESCAPING
// =============================================================================

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::xml::document::parse;

    fn inclusive(text: &str) -> String {
        let doc = parse(text).unwrap();
        Canonicalizer::new(CanonicalizationMethod::Inclusive).document(&doc)
    }

    #[test]
    fn test_empty_elements_and_attribute_order() {
        assert_eq!(
            inclusive(r#"<a b="2"   a="1"><c/></a>"#),
            r#"<a a="1" b="2"><c></c></a>"#
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            inclusive("<a t=\"x&amp;&lt;&quot;&#9;\">1 &lt; 2 &amp;&gt; 3</a>"),
            "<a t=\"x&amp;&lt;&quot;&#x9;\">1 &lt; 2 &amp;&gt; 3</a>"
        );
    }

    #[test]
    fn test_cdata_becomes_text() {
        assert_eq!(inclusive("<a><![CDATA[<b>]]></a>"), "<a>&lt;b&gt;</a>");
    }

    #[test]
    fn test_declaration_and_comments() {
        let text = "<?xml version=\"1.0\"?>\n<!-- head --><a><!-- in -->x</a>";
        assert_eq!(inclusive(text), "<a>x</a>");

        let doc = parse(text).unwrap();
        let with = Canonicalizer::new(CanonicalizationMethod::InclusiveWithComments).document(&doc);
        assert_eq!(with, "<!-- head -->\n<a><!-- in -->x</a>");
    }

    #[test]
    fn test_redundant_namespace_dropped() {
        assert_eq!(
            inclusive(r#"<a xmlns:p="urn:p"><p:b xmlns:p="urn:p"/></a>"#),
            r#"<a xmlns:p="urn:p"><p:b></p:b></a>"#
        );
    }

    #[test]
    fn test_subtree_carries_namespaces_and_xml_attributes() {
        let doc = parse(r#"<r xmlns="urn:d" xmlns:p="urn:p" xml:lang="en"><p:m id="m1">t</p:m></r>"#)
            .unwrap();
        let target = doc.descendants().find(|n| n.attribute("id") == Some("m1")).unwrap();

        let inclusive = Canonicalizer::new(CanonicalizationMethod::Inclusive).subtree(target);
        assert_eq!(
            inclusive,
            r#"<p:m xmlns="urn:d" xmlns:p="urn:p" id="m1" xml:lang="en">t</p:m>"#
        );

        let exclusive = Canonicalizer::new(CanonicalizationMethod::Exclusive).subtree(target);
        assert_eq!(exclusive, r#"<p:m xmlns:p="urn:p" id="m1">t</p:m>"#);
    }

    #[test]
    fn test_default_namespace_undeclared() {
        assert_eq!(
            inclusive(r#"<a xmlns="urn:a"><b xmlns=""/></a>"#),
            r#"<a xmlns="urn:a"><b xmlns=""></b></a>"#
        );
    }

    #[test]
    fn test_attribute_keeps_its_own_prefix() {
        let text = r#"<a xmlns:p="urn:x" xmlns:q="urn:x"><b q:id="1" p:ref="2"/></a>"#;
        assert_eq!(
            inclusive(text),
            r#"<a xmlns:p="urn:x" xmlns:q="urn:x"><b q:id="1" p:ref="2"></b></a>"#
        );

        let doc = parse(text).unwrap();
        let b = doc.descendants().find(|n| n.has_tag_name("b")).unwrap();
        let exclusive = Canonicalizer::new(CanonicalizationMethod::Exclusive).subtree(b);
        assert_eq!(
            exclusive,
            r#"<b xmlns:p="urn:x" xmlns:q="urn:x" q:id="1" p:ref="2"></b>"#
        );
    }

    #[test]
    fn test_excluded_node_removed() {
        let doc = parse("<a><keep/><drop><x/></drop></a>").unwrap();
        let drop = doc.descendants().find(|n| n.has_tag_name("drop")).unwrap();
        let out = Canonicalizer::new(CanonicalizationMethod::Inclusive)
            .excluding(Some(drop.id()))
            .document(&doc);
        assert_eq!(out, "<a><keep></keep></a>");
    }
}

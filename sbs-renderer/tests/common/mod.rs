//! Shared helpers: fixture loading and a light DOM view over html5ever's parse tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::path::PathBuf;

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()))
}

/// Owned snapshot of an element, enough to assert on nesting.
#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated text of direct text children.
    pub text: String,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Descendants (self excluded) in document order.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        for child in &self.children {
            found.push(child);
            found.extend(child.descendants());
        }
        found
    }

    pub fn find_by_name(&self, name: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.name == name)
            .collect()
    }

    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.has_class(class))
            .collect()
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|el| el.name.as_str()).collect()
    }
}

/// Parse `html` (a fragment or a document) and return the `<html>` element.
pub fn parse_html(html: &str) -> Element {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    let document = convert_children(&dom.document);
    document
        .into_iter()
        .find(|el| el.name == "html")
        .expect("parsed document has an <html> element")
}

fn convert_children(handle: &Handle) -> Vec<Element> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert)
        .collect()
}

fn convert(handle: &Handle) -> Option<Element> {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return None;
    };
    let text = handle
        .children
        .borrow()
        .iter()
        .filter_map(|child| match &child.data {
            NodeData::Text { contents } => Some(contents.borrow().to_string()),
            _ => None,
        })
        .collect();
    Some(Element {
        name: name.local.to_string(),
        attrs: attrs
            .borrow()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect(),
        children: convert_children(handle),
        text,
    })
}

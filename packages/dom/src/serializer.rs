//! HTML serialization of a subtree, for diagnostics and tests.
//!
//! Shadow roots are written as declarative `<template shadowrootmode>`
//! children of their host so a serialized tree shows both the light DOM
//! and the render tree.

use crate::document::{Document, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Serialize `node` (inclusive) to an HTML string.
pub fn to_html(doc: &Document, node: NodeId) -> String {
    let mut buffer = String::new();
    write_node(doc, node, &mut buffer);
    buffer
}

fn write_node(doc: &Document, node: NodeId, buffer: &mut String) {
    match doc.kind(node) {
        Ok(NodeKind::Text(data)) => buffer.push_str(&escape_text(data)),
        Ok(NodeKind::Element {
            local_name,
            attributes,
            shadow_root,
        }) => {
            buffer.push('<');
            buffer.push_str(local_name);
            for attr in attributes {
                buffer.push(' ');
                buffer.push_str(&attr.name);
                if !attr.value.is_empty() {
                    buffer.push_str("=\"");
                    buffer.push_str(&escape_attribute(&attr.value));
                    buffer.push('"');
                }
            }
            buffer.push('>');
            if VOID_ELEMENTS.contains(&local_name.as_str()) {
                return;
            }
            if let Some(shadow) = shadow_root {
                write_node(doc, *shadow, buffer);
            }
            write_children(doc, node, buffer);
            buffer.push_str("</");
            buffer.push_str(local_name);
            buffer.push('>');
        }
        Ok(NodeKind::ShadowRoot { mode, .. }) => {
            buffer.push_str("<template shadowrootmode=\"");
            buffer.push_str(mode.as_str());
            buffer.push_str("\">");
            write_children(doc, node, buffer);
            buffer.push_str("</template>");
        }
        Ok(NodeKind::Document) | Ok(NodeKind::Fragment) => write_children(doc, node, buffer),
        Err(_) => {}
    }
}

fn write_children(doc: &Document, node: NodeId, buffer: &mut String) {
    for &child in doc.children(node) {
        write_node(doc, child, buffer);
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

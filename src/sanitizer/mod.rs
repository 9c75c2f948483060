//! HTML sanitization for article bodies.
//!
//! Feed content is parsed into a DOM with `scraper` (html5ever) and written
//! back out while dropping executable or embedded elements and every
//! attribute outside a small allow-list. html5ever recovers from any input,
//! so sanitization never fails; the worst case is an empty string.

use ego_tree::NodeRef;
use html_escape::{encode_double_quoted_attribute, encode_text};
use scraper::{Html, Node};

/// Elements removed together with their whole subtree.
pub const REMOVED_ELEMENTS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "video", "audio",
];

/// The only attributes that survive sanitization, written in this order.
pub const ALLOWED_ATTRIBUTES: &[&str] = &["src", "href", "alt", "title"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const URL_ATTRIBUTES: &[&str] = &["src", "href"];

/// Sanitize an HTML fragment.
pub fn sanitize(raw_html: &str) -> String {
    if raw_html.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(raw_html);
    let mut out = String::with_capacity(raw_html.len());

    let root = fragment.root_element();
    if let Some(node) = fragment.tree.get(root.id()) {
        for child in node.children() {
            render_node(&mut out, child);
        }
    }

    out
}

fn render_node(out: &mut String, node: NodeRef<Node>) {
    match node.value() {
        Node::Text(text) => out.push_str(&encode_text(&**text)),
        Node::Element(el) => {
            let name = el.name();
            if REMOVED_ELEMENTS.contains(&name) {
                return;
            }

            out.push('<');
            out.push_str(name);
            for &attr in ALLOWED_ATTRIBUTES {
                let Some(value) = el.attr(attr) else {
                    continue;
                };
                if URL_ATTRIBUTES.contains(&attr) && is_script_url(value) {
                    continue;
                }
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&name) {
                return;
            }

            for child in node.children() {
                render_node(out, child);
            }

            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        // Comments, doctypes and processing instructions are dropped.
        _ => {}
    }
}

fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    compact.starts_with("javascript:") || compact.starts_with("vbscript:")
}

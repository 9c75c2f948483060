//! Minimal read-only element tree built from `quick-xml` events.
//!
//! Elements are stored in document order. Every element records the index
//! of its last descendant, so the descendants of element `i` are exactly
//! `i + 1..=end`. Text segments are kept in document order and each element
//! records the span of segments read between its start and end tags, so
//! `text_content` is a slice.

use std::ops::Range;

use html_escape::decode_html_entities;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Nesting limit; deeper documents are rejected as malformed.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("element nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("document has no root element")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct Element {
    /// Qualified name as written, e.g. `content:encoded`.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    end: usize,
    texts: Range<usize>,
}

impl Element {
    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Default)]
pub struct XmlTree {
    elements: Vec<Element>,
    texts: Vec<String>,
}

impl XmlTree {
    pub fn parse(xml: &str) -> Result<Self, TreeError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut tree = XmlTree::default();
        let mut stack: Vec<usize> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(TreeError::TooDeep(MAX_DEPTH));
                    }
                    let idx = tree.push_element(&e);
                    stack.push(idx);
                }
                Ok(Event::Empty(e)) => {
                    tree.push_element(&e);
                }
                Ok(Event::End(_)) => {
                    if let Some(idx) = stack.pop() {
                        tree.elements[idx].end = tree.elements.len() - 1;
                        tree.elements[idx].texts.end = tree.texts.len();
                    }
                }
                Ok(Event::Text(t)) => {
                    if !stack.is_empty() {
                        let raw = String::from_utf8_lossy(&t);
                        tree.texts.push(decode_html_entities(&raw).into_owned());
                    }
                }
                Ok(Event::CData(t)) => {
                    if !stack.is_empty() {
                        tree.texts.push(String::from_utf8_lossy(&t).into_owned());
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(TreeError::Xml(e.to_string())),
                _ => {}
            }
        }

        if let Some(&idx) = stack.last() {
            return Err(TreeError::Unclosed(tree.elements[idx].name.clone()));
        }
        if tree.elements.is_empty() {
            return Err(TreeError::Empty);
        }

        Ok(tree)
    }

    fn push_element(&mut self, e: &BytesStart<'_>) -> usize {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let attrs = e
            .attributes()
            .filter_map(|attr| match attr {
                Ok(attr) => {
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    let raw = String::from_utf8_lossy(&attr.value);
                    Some((key, decode_html_entities(&raw).into_owned()))
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed XML attribute");
                    None
                }
            })
            .collect();

        let idx = self.elements.len();
        let at = self.texts.len();
        self.elements.push(Element {
            name,
            attrs,
            end: idx,
            texts: at..at,
        });
        idx
    }

    pub fn element(&self, idx: usize) -> &Element {
        &self.elements[idx]
    }

    /// Indices of all elements whose local name is one of `names`, in document order.
    pub fn find_all_local(&self, names: &[&str]) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| names.contains(&el.local_name()))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Descendants of `idx` (excluding itself) with the given qualified name.
    pub fn descendants_named<'a>(
        &'a self,
        idx: usize,
        name: &'a str,
    ) -> impl Iterator<Item = usize> + 'a {
        let end = self.elements[idx].end;
        (idx + 1..=end).filter(move |&i| self.elements[i].name == name)
    }

    /// Descendants of `idx` whose local name is `name` under a different
    /// qualified name, e.g. `atom:link` for `link`.
    pub fn descendants_local<'a>(
        &'a self,
        idx: usize,
        name: &'a str,
    ) -> impl Iterator<Item = usize> + 'a {
        let end = self.elements[idx].end;
        (idx + 1..=end).filter(move |&i| {
            let el = &self.elements[i];
            el.name != name && el.local_name() == name
        })
    }

    /// Exact qualified-name matches first, then local-name matches.
    pub fn descendants_matching<'a>(
        &'a self,
        idx: usize,
        name: &'a str,
    ) -> impl Iterator<Item = usize> + 'a {
        self.descendants_named(idx, name)
            .chain(self.descendants_local(idx, name))
    }

    /// Concatenated text of the element and all of its descendants.
    pub fn text_content(&self, idx: usize) -> String {
        self.texts[self.elements[idx].texts.clone()].concat()
    }
}

//! XML document codec for Strata.
//!
//! Converts between XML text and a JSON-like tree ([`serde_json::Value`]),
//! walks that tree into path-addressed leaves, and prunes empty nodes. Pure
//! synchronous; no HTTP or store dependencies.
//!
//! # Tree shape
//!
//! `<Person RefId="7"><Name>Ann</Name><Tag>x</Tag><Tag>y</Tag></Person>`
//! becomes root `Person` with body
//! `{"-RefId": "7", "Name": "Ann", "Tag": ["x", "y"]}`. Attributes carry a
//! leading `-`, repeated siblings collapse into an array, and an element with
//! both attributes and text keeps the text under `#text`.
//!
//! # Quick start
//!
//! ```no_run
//! let doc = strata_xml::parse(b"<Person><Name>Ann</Name></Person>").unwrap();
//! for leaf in doc.leaves() {
//!   println!("{} = {}", leaf.path, leaf.value);
//! }
//! ```

pub mod error;
mod flatten;
mod parse;
mod serialize;
mod strip;

pub use error::{Error, Result};
pub use flatten::Leaf;
use serde_json::{Map, Value};
use strata_core::path::{ATTRIBUTE_PREFIX, TEXT_MARKER};

/// The reserved attribute carrying a document's subject identifier.
pub const REFID_ATTRIBUTE: &str = "RefId";

// ─── Document ────────────────────────────────────────────────────────────────

/// A parsed document: the root element's name and everything beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub root: String,
  pub body: Value,
}

impl Document {
  pub fn new(root: impl Into<String>, body: Value) -> Self {
    Self {
      root: root.into(),
      body,
    }
  }

  /// Split a `{ <root>: <body> }` tree back into a document. Anything other
  /// than an object with exactly one key is rejected.
  pub fn from_value(value: Value) -> Result<Self> {
    let Value::Object(map) = value else {
      return Err(Error::Malformed("tree has no root element".into()));
    };
    if map.len() != 1 {
      return Err(Error::Malformed(format!(
        "tree has {} root elements, expected 1",
        map.len()
      )));
    }
    let Some((root, body)) = map.into_iter().next() else {
      return Err(Error::Malformed("tree has no root element".into()));
    };
    Ok(Self { root, body })
  }

  /// The `{ <root>: <body> }` form.
  pub fn into_value(self) -> Value {
    let mut map = Map::new();
    map.insert(self.root, self.body);
    Value::Object(map)
  }

  /// The root element's `RefId` attribute, if present and non-empty.
  pub fn refid(&self) -> Option<&str> {
    self
      .body
      .get(refid_key())
      .and_then(Value::as_str)
      .filter(|s| !s.is_empty())
  }

  /// Set the root element's `RefId` attribute, turning a text-only root into
  /// an element with attributes if needed.
  pub fn set_refid(&mut self, id: &str) {
    if !self.body.is_object() {
      let mut map = Map::new();
      match std::mem::take(&mut self.body) {
        Value::Null => {}
        Value::String(s) if s.is_empty() => {}
        text => {
          map.insert(TEXT_MARKER.to_owned(), text);
        }
      }
      self.body = Value::Object(map);
    }
    if let Value::Object(map) = &mut self.body {
      map.insert(refid_key(), Value::String(id.to_owned()));
    }
  }

  /// Every leaf of the document in traversal order, addressed by tree-walk
  /// path (`Person.Tags[0]`, `Person.Name.#text`).
  ///
  /// Traversal order is incidental; consumers must not depend on it.
  pub fn leaves(&self) -> Vec<Leaf> { flatten::leaves(&self.root, &self.body) }

  /// Render as XML text.
  pub fn to_xml(&self) -> Result<Vec<u8>> {
    serialize::to_xml(&self.root, &self.body)
  }

  /// Remove empty attributes, empty leaves, and every container left empty
  /// by that, bottom-up. The root element itself always survives.
  pub fn strip_empty(&mut self) { strip::prune_root(&mut self.body) }
}

fn refid_key() -> String { format!("{ATTRIBUTE_PREFIX}{REFID_ATTRIBUTE}") }

// ─── Public API ──────────────────────────────────────────────────────────────

/// Parse an XML document.
pub fn parse(xml: &[u8]) -> Result<Document> { parse::parse_document(xml) }

/// Parse, prune empty nodes, and re-serialize.
pub fn strip_empty_xml(xml: &[u8]) -> Result<Vec<u8>> {
  let mut doc = parse(xml)?;
  doc.strip_empty();
  doc.to_xml()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn refid_read_and_write() {
    let mut doc = parse(br#"<Person RefId="abc"><Name>Ann</Name></Person>"#)
      .unwrap();
    assert_eq!(doc.refid(), Some("abc"));

    doc.set_refid("XYZ");
    assert_eq!(doc.refid(), Some("XYZ"));
    assert_eq!(doc.body["Name"], json!("Ann"));
  }

  #[test]
  fn empty_refid_counts_as_absent() {
    let doc = parse(br#"<Person RefId=""><Name>Ann</Name></Person>"#).unwrap();
    assert_eq!(doc.refid(), None);
  }

  #[test]
  fn set_refid_on_text_only_root_keeps_text() {
    let mut doc = parse(b"<Note>hello</Note>").unwrap();
    doc.set_refid("N1");
    assert_eq!(doc.body, json!({ "#text": "hello", "-RefId": "N1" }));

    let xml = String::from_utf8(doc.to_xml().unwrap()).unwrap();
    assert_eq!(xml, r#"<Note RefId="N1">hello</Note>"#);
  }

  #[test]
  fn from_value_requires_a_single_root() {
    assert!(Document::from_value(json!({ "A": "x" })).is_ok());
    assert!(Document::from_value(json!({ "A": "x", "B": "y" })).is_err());
    assert!(Document::from_value(json!({})).is_err());
    assert!(Document::from_value(json!("x")).is_err());
  }

  #[test]
  fn strip_empty_xml_prunes_nested_empties() {
    let out = strip_empty_xml(b"<a><b></b><c/></a>").unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "<a/>");
  }
}

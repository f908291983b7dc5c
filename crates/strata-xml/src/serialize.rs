//! Tree → XML serializer.
//!
//! Uses `quick-xml`'s writer API. Attribute and text values are escaped by
//! the writer; element names are written verbatim.

use std::io::Cursor;

use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};
use serde_json::{Map, Value};
use strata_core::path::{ATTRIBUTE_PREFIX, TEXT_MARKER, VALUE_MARKER};

use crate::error::{Error, Result};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

pub(crate) fn to_xml(root: &str, body: &Value) -> Result<Vec<u8>> {
  let mut w = Writer::new(Cursor::new(Vec::new()));
  write_element(&mut w, root, body)?;
  Ok(w.into_inner().into_inner())
}

fn write_element(w: &mut XmlWriter, name: &str, value: &Value) -> Result<()> {
  match value {
    Value::Array(items) => {
      for item in items {
        write_element(w, name, item)?;
      }
      Ok(())
    }
    Value::Object(map) => write_object(w, name, map),
    scalar => match scalar_text(scalar) {
      Some(text) if !text.is_empty() => write_text_elem(w, name, &text),
      _ => write_empty(w, BytesStart::new(name)),
    },
  }
}

fn write_object(
  w: &mut XmlWriter,
  name: &str,
  map: &Map<String, Value>,
) -> Result<()> {
  let mut start = BytesStart::new(name);
  let mut text: Option<String> = None;
  let mut children: Vec<(&str, &Value)> = Vec::new();

  for (key, value) in map {
    if let Some(attr) = key.strip_prefix(ATTRIBUTE_PREFIX) {
      let Some(v) = scalar_text(value) else {
        return Err(Error::Malformed(format!(
          "attribute {attr:?} of <{name}> is not a scalar"
        )));
      };
      start.push_attribute((attr, v.as_str()));
    } else if key == VALUE_MARKER || key == TEXT_MARKER {
      text = scalar_text(value).filter(|t| !t.is_empty());
    } else {
      children.push((key, value));
    }
  }

  if text.is_none() && children.is_empty() {
    return write_empty(w, start);
  }

  w.write_event(Event::Start(start))?;
  if let Some(text) = text {
    w.write_event(Event::Text(BytesText::new(&text)))?;
  }
  for (child, value) in children {
    write_element(w, child, value)?;
  }
  w.write_event(Event::End(BytesEnd::new(name)))?;
  Ok(())
}

fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.clone()),
    Value::Null => Some(String::new()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::Array(_) | Value::Object(_) => None,
  }
}

// ─── XML writer helpers ──────────────────────────────────────────────────────

fn write_text_elem(w: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
  w.write_event(Event::Start(BytesStart::new(tag)))?;
  w.write_event(Event::Text(BytesText::new(text)))?;
  w.write_event(Event::End(BytesEnd::new(tag)))?;
  Ok(())
}

fn write_empty(w: &mut XmlWriter, start: BytesStart<'_>) -> Result<()> {
  w.write_event(Event::Empty(start))?;
  Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────

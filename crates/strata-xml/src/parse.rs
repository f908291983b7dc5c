//! XML → tree parser.

use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};
use serde_json::{Map, Value};
use strata_core::path::{ATTRIBUTE_PREFIX, MAX_INDEX, TEXT_MARKER};

use crate::{
  Document,
  error::{Error, Result},
};

/// An element still open on the parse stack.
struct Frame {
  name:     String,
  /// Attributes (as `-name`) followed by child elements in first-seen order.
  content:  Map<String, Value>,
  has_kids: bool,
  text:     String,
}

impl Frame {
  fn open(e: &BytesStart<'_>) -> Result<Self> {
    let name = std::str::from_utf8(e.name().as_ref())?.to_owned();
    let mut content = Map::new();
    for attr in e.attributes() {
      let attr = attr.map_err(quick_xml::Error::from)?;
      let key = std::str::from_utf8(attr.key.as_ref())?;
      let value = attr.unescape_value()?;
      content.insert(
        format!("{ATTRIBUTE_PREFIX}{key}"),
        Value::String(value.into_owned()),
      );
    }
    Ok(Self {
      name,
      content,
      has_kids: false,
      text: String::new(),
    })
  }

  /// Repeated siblings are capped so every index stays addressable when the
  /// document is rebuilt from its triples.
  fn add_child(&mut self, name: String, value: Value) -> Result<()> {
    self.has_kids = true;
    match self.content.get_mut(&name) {
      Some(Value::Array(siblings)) => {
        if siblings.len() > MAX_INDEX {
          return Err(Error::Malformed(format!(
            "<{}> has more than {} <{name}> children",
            self.name,
            MAX_INDEX + 1
          )));
        }
        siblings.push(value);
      }
      Some(existing) => {
        let first = std::mem::take(existing);
        *existing = Value::Array(vec![first, value]);
      }
      None => {
        self.content.insert(name, value);
      }
    }
    Ok(())
  }

  /// Collapse into `(name, value)`. A bare element becomes its text.
  fn close(mut self) -> (String, Value) {
    if self.content.is_empty() && !self.has_kids {
      return (self.name, Value::String(self.text));
    }
    if !self.text.is_empty() {
      self
        .content
        .insert(TEXT_MARKER.to_owned(), Value::String(self.text));
    }
    (self.name, Value::Object(self.content))
  }
}

/// Parse a document with exactly one root element.
pub(crate) fn parse_document(xml: &[u8]) -> Result<Document> {
  let mut reader = Reader::from_reader(xml);
  reader.config_mut().trim_text(true);

  let mut stack: Vec<Frame> = Vec::new();
  let mut root: Option<Document> = None;
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf)? {
      Event::Start(ref e) => {
        if root.is_some() {
          return Err(Error::Malformed("more than one root element".into()));
        }
        stack.push(Frame::open(e)?);
      }
      Event::Empty(ref e) => {
        if root.is_some() {
          return Err(Error::Malformed("more than one root element".into()));
        }
        let (name, value) = Frame::open(e)?.close();
        attach(&mut stack, &mut root, name, value)?;
      }
      Event::End(_) => {
        let frame = stack.pop().ok_or_else(|| {
          Error::Malformed("closing tag without an open element".into())
        })?;
        let (name, value) = frame.close();
        attach(&mut stack, &mut root, name, value)?;
      }
      Event::Text(ref e) => {
        let text = e.unescape()?;
        push_text(&mut stack, &text)?;
      }
      Event::CData(e) => {
        let raw = e.into_inner();
        let text = std::str::from_utf8(&raw)?;
        push_text(&mut stack, text)?;
      }
      Event::Eof => break,
      // Declarations, comments, processing instructions, doctypes.
      _ => {}
    }
    buf.clear();
  }

  if let Some(open) = stack.last() {
    return Err(Error::Malformed(format!("unclosed element <{}>", open.name)));
  }
  root.ok_or_else(|| Error::Malformed("no root element".into()))
}

fn attach(
  stack: &mut [Frame],
  root: &mut Option<Document>,
  name: String,
  value: Value,
) -> Result<()> {
  match stack.last_mut() {
    Some(parent) => parent.add_child(name, value),
    None => {
      *root = Some(Document::new(name, value));
      Ok(())
    }
  }
}

fn push_text(stack: &mut [Frame], text: &str) -> Result<()> {
  match stack.last_mut() {
    Some(frame) => {
      frame.text.push_str(text);
      Ok(())
    }
    None if text.trim().is_empty() => Ok(()),
    None => Err(Error::Malformed("text outside the root element".into())),
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

//! Predicate paths and the "set value at path" primitive.
//!
//! Two path dialects are in play:
//!
//! - **Tree-walk form** (what the flattener emits): `Person.Tags[1]`,
//!   `Person.Name.#text`. A repeated sibling's index is bracketed onto its
//!   segment and element text sits under the trailing `#text` marker.
//! - **Value-path form** (what [`set_path`] consumes and what predicates are
//!   stored as): `Person.Tags.1`, `Person.Name.Value`. Indices are segments
//!   of their own and element text sits under `Value`.
//!
//! Only tree-walk → value-path translation exists. It is not a bijection: a
//! value-path segment such as `2` can be an array index or an element that
//! happens to be named `2`, so no inverse is offered.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// Trailing segment marking element text in tree-walk paths.
pub const TEXT_MARKER: &str = "#text";

/// Trailing segment marking element text in value paths.
pub const VALUE_MARKER: &str = "Value";

/// Prefix distinguishing attribute segments from element segments.
pub const ATTRIBUTE_PREFIX: char = '-';

/// Largest array index [`set_path`] will grow an array to reach. The XML
/// parser refuses documents with more repeated siblings than this addresses.
pub const MAX_INDEX: usize = 1 << 16;

/// Translate a tree-walk path into a value path.
///
/// The trailing text marker is rewritten first (it only anchors at the end of
/// the path), then every `[n]` becomes `.n`. Paths already in value-path form
/// pass through unchanged.
pub fn to_value_path(path: &str) -> String {
  let suffix = format!(".{TEXT_MARKER}");
  let marked = match path.strip_suffix(&suffix) {
    Some(head) => format!("{head}.{VALUE_MARKER}"),
    None => path.to_owned(),
  };
  unbracket(&marked)
}

/// Rewrite every `[digits]` into `.digits`; anything else is copied as is.
fn unbracket(path: &str) -> String {
  let mut out = String::with_capacity(path.len());
  let mut rest = path;

  while let Some(open) = rest.find('[') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    let digits = after.bytes().take_while(u8::is_ascii_digit).count();

    if digits > 0 && after.as_bytes().get(digits) == Some(&b']') {
      out.push('.');
      out.push_str(&after[..digits]);
      rest = &after[digits + 1..];
    } else {
      out.push('[');
      rest = after;
    }
  }

  out.push_str(rest);
  out
}

/// Write `value` at value path `path` inside `root`, creating whatever
/// containers are missing on the way.
///
/// Writes may arrive in any order: arrays grow to fit the addressed index and
/// pad with `null`, and a later write into a `null` slot builds the container
/// it needs. Conflicting shapes (descending through a scalar, naming an array
/// element with a non-numeric segment, overwriting a container with a scalar)
/// are errors whichever write lands first.
pub fn set_path(root: &mut Value, path: &str, value: Value) -> Result<()> {
  let segments: Vec<&str> = path.split('.').collect();
  let Some((last, parents)) = segments.split_last() else {
    return Err(encoding(path, "empty path"));
  };

  let mut node = root;
  for segment in parents {
    node = child_slot(node, segment, path)?;
  }

  let slot = child_slot(node, last, path)?;
  if slot.is_object() || slot.is_array() {
    return Err(encoding(path, "would overwrite a container with a scalar"));
  }
  *slot = value;
  Ok(())
}

/// Borrow the child of `node` named by `segment`, materialising `node` as an
/// array or object first if it is still `null`.
fn child_slot<'a>(
  node: &'a mut Value,
  segment: &str,
  path: &str,
) -> Result<&'a mut Value> {
  let index = parse_index(segment);

  if node.is_null() {
    *node = match index {
      Some(_) => Value::Array(Vec::new()),
      None => Value::Object(Map::new()),
    };
  }

  match node {
    Value::Object(map) => {
      Ok(map.entry(segment.to_owned()).or_insert(Value::Null))
    }
    Value::Array(items) => {
      let Some(i) = index else {
        return Err(encoding(
          path,
          &format!("segment {segment:?} addresses an array"),
        ));
      };
      if i > MAX_INDEX {
        return Err(encoding(path, &format!("index {i} exceeds {MAX_INDEX}")));
      }
      if items.len() <= i {
        items.resize(i + 1, Value::Null);
      }
      Ok(&mut items[i])
    }
    _ => Err(encoding(
      path,
      &format!("segment {segment:?} descends into a scalar"),
    )),
  }
}

/// Whether a value-path segment addresses an array element.
pub fn is_index(segment: &str) -> bool { parse_index(segment).is_some() }

fn parse_index(segment: &str) -> Option<usize> {
  if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  segment.parse().ok()
}

fn encoding(path: &str, reason: &str) -> Error {
  Error::Encoding {
    path:   path.to_owned(),
    reason: reason.to_owned(),
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

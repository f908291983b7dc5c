//! Tree → `(path, value)` leaves.

use serde_json::Value;

/// One leaf of a document: its tree-walk path and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
  pub path:  String,
  pub value: String,
}

pub(crate) fn leaves(root: &str, body: &Value) -> Vec<Leaf> {
  let mut out = Vec::new();
  walk(root.to_owned(), body, &mut out);
  out
}

fn walk(path: String, value: &Value, out: &mut Vec<Leaf>) {
  match value {
    Value::Object(map) => {
      for (key, child) in map {
        walk(format!("{path}.{key}"), child, out);
      }
    }
    Value::Array(items) => {
      for (i, item) in items.iter().enumerate() {
        walk(format!("{path}[{i}]"), item, out);
      }
    }
    Value::String(s) => out.push(Leaf {
      path,
      value: s.clone(),
    }),
    Value::Null => out.push(Leaf {
      path,
      value: String::new(),
    }),
    other => out.push(Leaf {
      path,
      value: other.to_string(),
    }),
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

//! Bottom-up removal of empty nodes.
//!
//! A single recursive pass: children are pruned before their parent decides
//! whether it is now empty, so nesting depth does not matter. Only valid for
//! documents without mixed content.

use serde_json::Value;

/// Prune a root element's body. The root itself is kept and left bare when
/// nothing survives.
pub(crate) fn prune_root(body: &mut Value) {
  if prune(body) {
    *body = Value::Null;
  }
}

/// Prune `value` in place; returns whether nothing is left of it.
fn prune(value: &mut Value) -> bool {
  match value {
    Value::Null => true,
    Value::String(s) => s.is_empty(),
    Value::Bool(_) | Value::Number(_) => false,
    Value::Array(items) => {
      items.retain_mut(|item| !prune(item));
      items.is_empty()
    }
    Value::Object(map) => {
      map.retain(|_, child| !prune(child));
      map.is_empty()
    }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

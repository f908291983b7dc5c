//! The storage atom: one `(subject, predicate, object, context)` record.
//!
//! All four fields are opaque strings. A triple whose object is empty is a
//! *tombstone*: it marks the `(subject, predicate, context)` key as deleted
//! and overrides any earlier value for that key (last write wins).

use serde::{Deserialize, Serialize};

/// A single record in the triple store.
///
/// Field names on the wire are PascalCase (`Subject`, `Predicate`, …) to match
/// the store's JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Triple {
  pub subject:   String,
  pub predicate: String,
  pub object:    String,
  pub context:   String,
}

impl Triple {
  pub fn new(
    subject: impl Into<String>,
    predicate: impl Into<String>,
    object: impl Into<String>,
    context: impl Into<String>,
  ) -> Self {
    Self {
      subject:   subject.into(),
      predicate: predicate.into(),
      object:    object.into(),
      context:   context.into(),
    }
  }

  pub fn is_tombstone(&self) -> bool { self.object.is_empty() }

  /// A copy of this triple with the object cleared, i.e. its delete marker.
  pub fn tombstone(&self) -> Self {
    Self {
      object: String::new(),
      ..self.clone()
    }
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tombstone_clears_only_the_object() {
    let t = Triple::new("ID1", "Person.Name", "Ann", "school1");
    let dead = t.tombstone();
    assert!(dead.is_tombstone());
    assert!(!t.is_tombstone());
    assert_eq!(dead.subject, "ID1");
    assert_eq!(dead.predicate, "Person.Name");
    assert_eq!(dead.context, "school1");
  }

  #[test]
  fn wire_field_names_are_pascal_case() {
    let t = Triple::new("S", "P", "O", "C");
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(
      json,
      serde_json::json!({
        "Subject": "S", "Predicate": "P", "Object": "O", "Context": "C"
      })
    );

    let back: Triple = serde_json::from_value(json).unwrap();
    assert_eq!(back, t);
  }
}

//! Triples → document.
//!
//! The store returns triples in no particular order, so every predicate is
//! replayed independently through [`set_path`], which grows containers on
//! demand. Nothing here assumes a parent is seen before its children or that
//! array elements arrive in index order.

use serde_json::Value;
use strata_core::{
  path::{set_path, to_value_path},
  triple::Triple,
};
use strata_xml::Document;

use crate::{Error, Result};

/// Rebuild the document described by `triples`, skipping tombstones.
///
/// Returns `None` when no live triple remains. All triples are expected to
/// share one subject and context; the caller filters.
pub fn reconstruct<'a, I>(triples: I) -> Result<Option<Document>>
where
  I: IntoIterator<Item = &'a Triple>,
{
  let mut tree = Value::Null;
  let mut live = 0usize;

  for triple in triples.into_iter().filter(|t| !t.is_tombstone()) {
    let path = to_value_path(&triple.predicate);
    set_path(&mut tree, &path, Value::String(triple.object.clone()))
      .map_err(Error::encoding)?;
    live += 1;
  }

  if live == 0 {
    return Ok(None);
  }
  Document::from_value(tree).map(Some).map_err(Error::encoding)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn t(p: &str, o: &str) -> Triple { Triple::new("S", p, o, "C") }

  #[test]
  fn rebuilds_from_shuffled_triples() {
    let triples = [
      t("Person.Tags.1", "y"),
      t("Person.-RefId", "S"),
      t("Person.Phone.Value", "555"),
      t("Person.Tags.0", "x"),
      t("Person.Name", "Ann"),
      t("Person.Phone.-Type", "home"),
    ];
    let doc = reconstruct(&triples).unwrap().unwrap();
    assert_eq!(doc.root, "Person");
    assert_eq!(
      doc.body,
      json!({
        "-RefId": "S",
        "Name": "Ann",
        "Tags": ["x", "y"],
        "Phone": { "-Type": "home", "Value": "555" },
      })
    );
  }

  #[test]
  fn accepts_bracketed_predicates() {
    let triples = [t("R.L[1].A", "b"), t("R.L[0].A", "a"), t("R.N.#text", "n")];
    let doc = reconstruct(&triples).unwrap().unwrap();
    assert_eq!(
      doc.body,
      json!({ "L": [{ "A": "a" }, { "A": "b" }], "N": { "Value": "n" } })
    );
  }

  #[test]
  fn tombstones_are_ignored() {
    let triples = [t("R.A", "1"), t("R.B", "")];
    let doc = reconstruct(&triples).unwrap().unwrap();
    assert_eq!(doc.body, json!({ "A": "1" }));

    let only_dead = [t("R.A", ""), t("R.B", "")];
    assert!(reconstruct(&only_dead).unwrap().is_none());
  }

  #[test]
  fn shape_conflicts_are_encoding_errors() {
    let triples = [t("R.A", "leaf"), t("R.A.B", "deep")];
    assert!(matches!(reconstruct(&triples), Err(Error::Encoding(_))));
  }

  #[test]
  fn several_roots_are_encoding_errors() {
    let triples = [t("R.A", "1"), t("Q.A", "2")];
    assert!(matches!(reconstruct(&triples), Err(Error::Encoding(_))));
  }
}

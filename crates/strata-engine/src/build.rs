//! Document → triples.

use strata_core::{path::to_value_path, triple::Triple};
use strata_xml::Document;

/// One triple per leaf of `doc`, all under `subject` and `context`.
///
/// Predicates are stored as value paths (`Person.Tags.0`), never in the
/// bracketed tree-walk form. An empty leaf yields a tombstone, so submitting
/// an empty element clears that key.
pub fn build_triples(doc: &Document, subject: &str, context: &str) -> Vec<Triple> {
  doc
    .leaves()
    .into_iter()
    .map(|leaf| {
      Triple::new(subject, to_value_path(&leaf.path), leaf.value, context)
    })
    .collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn leaves_become_value_path_triples() {
    let doc = strata_xml::parse(
      br#"<Person RefId="ID1"><Name>Ann</Name><Tags>x</Tags><Tags>y</Tags><Phone Type="home">555</Phone></Person>"#,
    )
    .unwrap();

    let triples = build_triples(&doc, "ID1", "school1");
    let pairs: Vec<(&str, &str)> = triples
      .iter()
      .map(|t| (t.predicate.as_str(), t.object.as_str()))
      .collect();

    assert_eq!(pairs, vec![
      ("Person.-RefId", "ID1"),
      ("Person.Name", "Ann"),
      ("Person.Tags.0", "x"),
      ("Person.Tags.1", "y"),
      ("Person.Phone.-Type", "home"),
      ("Person.Phone.Value", "555"),
    ]);
    assert!(
      triples
        .iter()
        .all(|t| t.subject == "ID1" && t.context == "school1")
    );
  }
}

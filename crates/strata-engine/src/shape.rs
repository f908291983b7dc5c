//! Lining a merge's predicates up with the shapes already stored.
//!
//! The same element flattens to different paths depending on its siblings
//! and attributes: a lone `<Tags>` is `X.Tags` but repeated ones are
//! `X.Tags.0`, `X.Tags.1`; a text-only `<Phone>` is `X.Phone` but one with
//! attributes keeps its text at `X.Phone.Value`. A merge that crosses either
//! boundary would leave both shapes live, and no tree holds both. So before
//! anything is written, every stored and incoming path is widened to the
//! richer shape seen on either side, and stored records whose path moved are
//! relocated.

use std::collections::HashSet;

use strata_core::{
  path::{VALUE_MARKER, is_index, to_value_path},
  triple::Triple,
};

/// The writes a partial merge performs, in order.
#[derive(Debug, Default)]
pub(crate) struct MergePlan {
  /// Tombstones for stored records that are overwritten or relocated, under
  /// their stored predicate.
  pub clear: Vec<Triple>,
  /// Relocated stored records, then the incoming triples.
  pub write: Vec<Triple>,
}

/// Plan merging `incoming` over the live `stored` records of one subject.
pub(crate) fn plan_merge(stored: &[Triple], incoming: &[Triple]) -> MergePlan {
  let (stored_paths, incoming_paths) = widen(
    stored.iter().map(|t| to_value_path(&t.predicate)).collect(),
    incoming.iter().map(|t| t.predicate.clone()).collect(),
  );

  let overwritten: HashSet<&str> =
    incoming_paths.iter().map(String::as_str).collect();

  let mut plan = MergePlan::default();
  for (triple, path) in stored.iter().zip(&stored_paths) {
    if overwritten.contains(path.as_str()) {
      plan.clear.push(triple.tombstone());
    } else if *path != triple.predicate {
      plan.clear.push(triple.tombstone());
      plan.write.push(Triple {
        predicate: path.clone(),
        ..triple.clone()
      });
    }
  }

  plan
    .write
    .extend(incoming.iter().zip(incoming_paths).map(|(triple, path)| {
      Triple {
        predicate: path,
        ..triple.clone()
      }
    }));
  plan
}

/// Rewrite both path sets until no path disagrees with the shapes the
/// combined set implies. Each pass only inserts segments at a position whose
/// shape it just fixed, so this settles within a few passes.
fn widen(
  mut stored: Vec<String>,
  mut incoming: Vec<String>,
) -> (Vec<String>, Vec<String>) {
  loop {
    let shapes = Shapes::collect(stored.iter().chain(&incoming));
    let mut changed = false;
    for path in stored.iter_mut().chain(incoming.iter_mut()) {
      let wide = shapes.widen(path);
      if wide != *path {
        *path = wide;
        changed = true;
      }
    }
    if !changed {
      return (stored, incoming);
    }
  }
}

/// Which path prefixes are arrays (followed by an index somewhere) and which
/// are elements with named children.
#[derive(Default)]
struct Shapes {
  arrays:   HashSet<String>,
  elements: HashSet<String>,
}

impl Shapes {
  fn collect<'a>(paths: impl Iterator<Item = &'a String>) -> Self {
    let mut shapes = Self::default();
    for path in paths {
      let segments: Vec<&str> = path.split('.').collect();
      for (i, next) in segments.iter().enumerate().skip(1) {
        let parent = segments[..i].join(".");
        if is_index(next) {
          shapes.arrays.insert(parent);
        } else {
          shapes.elements.insert(parent);
        }
      }
    }
    shapes
  }

  /// `X.Tags` under an array becomes `X.Tags.0`; a scalar at `X.Phone`
  /// where `X.Phone` has children becomes `X.Phone.Value`.
  fn widen(&self, path: &str) -> String {
    let segments: Vec<&str> = path.split('.').collect();
    let mut out: Vec<&str> = Vec::with_capacity(segments.len() + 2);

    for (i, segment) in segments.iter().copied().enumerate() {
      out.push(segment);
      let next_is_index = segments.get(i + 1).is_some_and(|n| is_index(n));
      if !next_is_index && self.arrays.contains(&out.join(".")) {
        out.push("0");
      }
    }
    if self.elements.contains(&out.join(".")) {
      out.push(VALUE_MARKER);
    }
    out.join(".")
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use super::*;

  fn triples(pairs: &[(&str, &str)]) -> Vec<Triple> {
    pairs
      .iter()
      .map(|(p, o)| Triple::new("S", *p, *o, "C"))
      .collect()
  }

  fn preds(ts: &[Triple]) -> Vec<&str> {
    ts.iter().map(|t| t.predicate.as_str()).collect()
  }

  /// Live state after applying the plan to `stored`.
  fn apply(stored: &[Triple], plan: &MergePlan) -> BTreeMap<String, String> {
    let mut live: BTreeMap<String, String> = stored
      .iter()
      .map(|t| (t.predicate.clone(), t.object.clone()))
      .collect();
    for t in &plan.clear {
      live.remove(&t.predicate);
    }
    for t in &plan.write {
      live.insert(t.predicate.clone(), t.object.clone());
    }
    live
  }

  #[test]
  fn matching_shapes_only_clear_overwritten_keys() {
    let stored =
      triples(&[("P.Name", "Ann"), ("P.Tags.0", "x"), ("P.Tags.1", "y")]);
    let incoming = triples(&[("P.Name", "Bea"), ("P.Tags.0", "q")]);

    let plan = plan_merge(&stored, &incoming);
    assert_eq!(preds(&plan.clear), ["P.Name", "P.Tags.0"]);
    assert!(plan.clear.iter().all(Triple::is_tombstone));
    assert_eq!(preds(&plan.write), ["P.Name", "P.Tags.0"]);
  }

  #[test]
  fn lone_incoming_element_lands_on_index_zero() {
    let stored = triples(&[("P.Tags.0", "x"), ("P.Tags.1", "y")]);
    let incoming = triples(&[("P.Tags", "q")]);

    let plan = plan_merge(&stored, &incoming);
    assert_eq!(
      apply(&stored, &plan),
      BTreeMap::from([
        ("P.Tags.0".to_owned(), "q".to_owned()),
        ("P.Tags.1".to_owned(), "y".to_owned()),
      ])
    );
  }

  #[test]
  fn lone_stored_element_moves_to_index_zero() {
    let stored = triples(&[
      ("P.Tags", "x"),
      ("P.Keep.-k", "v"),
      ("P.Keep.Value", "t"),
    ]);
    let incoming = triples(&[("P.Tags.0", "q"), ("P.Tags.1", "r")]);

    let plan = plan_merge(&stored, &incoming);
    assert_eq!(preds(&plan.clear), ["P.Tags"]);
    assert_eq!(
      apply(&stored, &plan),
      BTreeMap::from([
        ("P.Keep.-k".to_owned(), "v".to_owned()),
        ("P.Keep.Value".to_owned(), "t".to_owned()),
        ("P.Tags.0".to_owned(), "q".to_owned()),
        ("P.Tags.1".to_owned(), "r".to_owned()),
      ])
    );
  }

  #[test]
  fn stored_children_of_a_relocated_element_survive() {
    let stored = triples(&[("P.Ph.-Type", "home"), ("P.Ph.Value", "1")]);
    let incoming = triples(&[("P.Ph.0", "2"), ("P.Ph.1", "3")]);

    let live = apply(&stored, &plan_merge(&stored, &incoming));
    assert_eq!(
      live,
      BTreeMap::from([
        ("P.Ph.0.-Type".to_owned(), "home".to_owned()),
        ("P.Ph.0.Value".to_owned(), "2".to_owned()),
        ("P.Ph.1".to_owned(), "3".to_owned()),
      ])
    );
  }

  #[test]
  fn text_only_element_meets_attributed_one() {
    let stored = triples(&[("P.Ph.-Type", "home"), ("P.Ph.Value", "1")]);
    let incoming = triples(&[("P.Ph", "2")]);
    let live = apply(&stored, &plan_merge(&stored, &incoming));
    assert_eq!(live["P.Ph.Value"], "2");
    assert!(!live.contains_key("P.Ph"));

    let stored = triples(&[("P.Ph", "1")]);
    let incoming = triples(&[("P.Ph.-Type", "work")]);
    let live = apply(&stored, &plan_merge(&stored, &incoming));
    assert_eq!(live["P.Ph.Value"], "1");
    assert_eq!(live["P.Ph.-Type"], "work");
    assert!(!live.contains_key("P.Ph"));
  }

  #[test]
  fn bracketed_stored_predicates_are_rewritten() {
    let stored = triples(&[("P.Tags[0]", "x"), ("P.Tags[1]", "y")]);
    let incoming = triples(&[("P.Name", "Ann")]);

    let plan = plan_merge(&stored, &incoming);
    assert_eq!(
      apply(&stored, &plan),
      BTreeMap::from([
        ("P.Name".to_owned(), "Ann".to_owned()),
        ("P.Tags.0".to_owned(), "x".to_owned()),
        ("P.Tags.1".to_owned(), "y".to_owned()),
      ])
    );
  }
}

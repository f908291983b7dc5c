//! Prefix queries against the triple store.
//!
//! The store indexes each triple under several orderings and answers prefix
//! queries over them. A prefix is written as a space-separated sequence of
//! `c:`, `s:`, `p:` components, each value quoted. The context component is
//! always present and always first, so no query can cross contexts. A
//! trailing bare component (`p:` with no value) asks for "anything here".

use std::fmt;

use crate::triple::Triple;

/// Which index ordering a prefix walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
  /// `c:"…" s:"…" p:…`
  SubjectFirst,
  /// `c:"…" p:"…" s:`
  PredicateFirst,
}

/// A context-scoped key prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPrefix {
  pub context:   String,
  pub subject:   Option<String>,
  pub predicate: Option<String>,
  order:         Order,
}

impl KeyPrefix {
  /// Every triple of `subject` in `context`: `c:"ctx" s:"subject" p:`.
  pub fn subject(context: &str, subject: &str) -> Self {
    Self {
      context:   context.to_owned(),
      subject:   Some(subject.to_owned()),
      predicate: None,
      order:     Order::SubjectFirst,
    }
  }

  /// Exactly one key: `c:"ctx" s:"subject" p:"predicate"`.
  pub fn subject_predicate(
    context: &str,
    subject: &str,
    predicate: &str,
  ) -> Self {
    Self {
      context:   context.to_owned(),
      subject:   Some(subject.to_owned()),
      predicate: Some(predicate.to_owned()),
      order:     Order::SubjectFirst,
    }
  }

  /// Every triple carrying `predicate`, any subject: `c:"ctx" p:"predicate" s:`.
  pub fn predicate(context: &str, predicate: &str) -> Self {
    Self {
      context:   context.to_owned(),
      subject:   None,
      predicate: Some(predicate.to_owned()),
      order:     Order::PredicateFirst,
    }
  }

  /// Whether `triple` falls under this prefix. Quoted components match
  /// exactly; a bare trailing component matches anything.
  pub fn matches(&self, triple: &Triple) -> bool {
    triple.context == self.context
      && self.subject.as_ref().is_none_or(|s| *s == triple.subject)
      && self.predicate.as_ref().is_none_or(|p| *p == triple.predicate)
  }
}

impl fmt::Display for KeyPrefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "c:{}", quote(&self.context))?;
    let (first, second) = match self.order {
      Order::SubjectFirst => (("s", &self.subject), ("p", &self.predicate)),
      Order::PredicateFirst => (("p", &self.predicate), ("s", &self.subject)),
    };
    for (tag, value) in [first, second] {
      match value {
        Some(v) => write!(f, " {tag}:{}", quote(v))?,
        None => {
          write!(f, " {tag}:")?;
          break;
        }
      }
    }
    Ok(())
  }
}

/// Double-quote `s` with backslash escapes, the form the store expects for
/// prefix component values.
pub fn quote(s: &str) -> String {
  let mut out = String::with_capacity(s.len() + 2);
  out.push('"');
  for c in s.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      '\u{07}' => out.push_str("\\a"),
      '\u{08}' => out.push_str("\\b"),
      '\u{0b}' => out.push_str("\\v"),
      '\u{0c}' => out.push_str("\\f"),
      c if c.is_ascii_control() => {
        out.push_str(&format!("\\x{:02x}", c as u32));
      }
      c if c.is_control() => {
        out.push_str(&format!("\\u{:04x}", c as u32));
      }
      c => out.push(c),
    }
  }
  out.push('"');
  out
}

// ─── Tests ────────────────────────────────────────────────────────────────────

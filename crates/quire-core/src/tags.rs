//! Tag normalization and association reconciliation.
//!
//! Tags are stored trimmed and uppercased. Updating a post's tags never
//! rewrites the whole association set; [`TagDiff`] computes the rows to
//! delete and the rows to add so that the stored set matches the desired one.

use std::collections::BTreeSet;

/// Normalize one tag text. Returns `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
  let trimmed = tag.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(trimmed.to_uppercase())
  }
}

/// Normalize, drop blanks and deduplicate. The result is sorted.
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
  I: IntoIterator<Item = T>,
  T: AsRef<str>,
{
  tags
    .into_iter()
    .filter_map(|t| normalize_tag(t.as_ref()))
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// The minimal change set that turns `current` associations into `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDiff<K: Ord> {
  pub to_delete: BTreeSet<K>,
  pub to_add:    BTreeSet<K>,
}

impl<K: Ord + Clone> TagDiff<K> {
  pub fn between(current: &BTreeSet<K>, desired: &BTreeSet<K>) -> Self {
    Self {
      to_delete: current.difference(desired).cloned().collect(),
      to_add:    desired.difference(current).cloned().collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.to_delete.is_empty() && self.to_add.is_empty()
  }
}

//! Relation naming for a Quire installation.
//!
//! A [`Schema`] names the four relations the store uses. Several
//! installations can share one database by choosing different prefixes, and
//! can be routed to different databases by choosing different bind keys. The
//! schema is built once and handed to the store; nothing is registered
//! globally.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result};

/// The four relations of a Quire installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  Post,
  Tag,
  TagPosts,
  UserPosts,
}

impl Table {
  pub const ALL: [Table; 4] =
    [Table::Post, Table::Tag, Table::TagPosts, Table::UserPosts];

  /// The entity name the physical table name is derived from.
  pub fn entity(self) -> &'static str {
    match self {
      Table::Post => "Post",
      Table::Tag => "Tag",
      Table::TagPosts => "Tag_Posts",
      Table::UserPosts => "User_Posts",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.entity())
  }
}

/// Physical table names plus the bind key that routes them to a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
  prefix:     String,
  bind_key:   Option<String>,
  post:       String,
  tag:        String,
  tag_posts:  String,
  user_posts: String,
}

impl Schema {
  /// Build the relation names for `prefix` (defaults to empty) and tag them
  /// with `bind_key`.
  ///
  /// Each table is named `lowercase(prefix) + lowercase(entity)`, so the
  /// unprefixed tables are `post`, `tag`, `tag_posts` and `user_posts`.
  pub fn new(prefix: Option<&str>, bind_key: Option<&str>) -> Result<Self> {
    let prefix = prefix.unwrap_or_default();
    if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
      return Err(Error::InvalidPrefix(prefix.to_owned()));
    }
    let prefix = prefix.to_ascii_lowercase();

    let bind_key = match bind_key {
      Some(k) if k.trim().is_empty() => {
        return Err(Error::InvalidBindKey(k.to_owned()));
      }
      Some(k) => Some(k.to_owned()),
      None => None,
    };

    let name = |t: Table| format!("{prefix}{}", t.entity().to_ascii_lowercase());

    Ok(Self {
      post: name(Table::Post),
      tag: name(Table::Tag),
      tag_posts: name(Table::TagPosts),
      user_posts: name(Table::UserPosts),
      prefix,
      bind_key,
    })
  }

  pub fn prefix(&self) -> &str { &self.prefix }

  pub fn bind_key(&self) -> Option<&str> { self.bind_key.as_deref() }

  pub fn table(&self, table: Table) -> &str {
    match table {
      Table::Post => &self.post,
      Table::Tag => &self.tag,
      Table::TagPosts => &self.tag_posts,
      Table::UserPosts => &self.user_posts,
    }
  }

  /// `(relation, physical name)` pairs in declaration order.
  pub fn tables(&self) -> impl Iterator<Item = (Table, &str)> + '_ {
    Table::ALL.into_iter().map(move |t| (t, self.table(t)))
  }
}

impl Default for Schema {
  fn default() -> Self {
    Self {
      prefix:     String::new(),
      bind_key:   None,
      post:       "post".into(),
      tag:        "tag".into(),
      tag_posts:  "tag_posts".into(),
      user_posts: "user_posts".into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unprefixed_names_are_lowercase_entities() {
    let s = Schema::new(None, None).unwrap();
    assert_eq!(s.table(Table::Post), "post");
    assert_eq!(s.table(Table::Tag), "tag");
    assert_eq!(s.table(Table::TagPosts), "tag_posts");
    assert_eq!(s.table(Table::UserPosts), "user_posts");
    assert_eq!(s, Schema::default());
  }

  #[test]
  fn prefix_is_lowercased_and_prepended() {
    let s = Schema::new(Some("Blog_"), Some("blog")).unwrap();
    assert_eq!(s.prefix(), "blog_");
    assert_eq!(s.bind_key(), Some("blog"));
    let names: Vec<_> = s.tables().map(|(_, n)| n.to_owned()).collect();
    assert_eq!(
      names,
      ["blog_post", "blog_tag", "blog_tag_posts", "blog_user_posts"]
    );
  }

  #[test]
  fn empty_prefix_matches_default() {
    let s = Schema::new(Some(""), None).unwrap();
    assert_eq!(s.table(Table::Post), "post");
  }

  #[test]
  fn rejects_prefix_that_is_not_an_identifier() {
    let err = Schema::new(Some("a; DROP TABLE post"), None).unwrap_err();
    assert!(matches!(err, Error::InvalidPrefix(_)));
    assert!(Schema::new(Some("blog-"), None).is_err());
  }

  #[test]
  fn rejects_blank_bind_key() {
    let err = Schema::new(None, Some("  ")).unwrap_err();
    assert!(matches!(err, Error::InvalidBindKey(_)));
  }
}

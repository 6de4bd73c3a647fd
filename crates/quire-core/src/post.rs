//! Post types, the unit of content in the Quire blog store.
//!
//! A post is written through [`SavePost`] (insert or update, chosen by the
//! store) and read back as a [`PostRecord`], which bundles the post row with
//! its tags and its author.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Auto-assigned post identifier. Identifiers are never reused after a post
/// is deleted.
pub type PostId = i64;

// ─── Stored row ──────────────────────────────────────────────────────────────

/// The columns of a single post row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub post_id:            PostId,
  pub title:              String,
  pub text:               String,
  /// When the post was first published. Preserved across updates unless a
  /// new value is supplied explicitly.
  pub post_date:          DateTime<Utc>,
  /// Refreshed on every save.
  pub last_modified_date: DateTime<Utc>,
  pub draft:              bool,
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A post together with its associations, as returned by the read
/// operations of [`BlogStore`](crate::store::BlogStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
  #[serde(flatten)]
  pub post:    Post,
  /// Normalized (uppercase) tag texts, sorted.
  pub tags:    Vec<String>,
  /// The owning user. Always present for posts written through
  /// `save_post`; `None` only if the association row was removed out of band.
  pub user_id: Option<String>,
}

impl PostRecord {
  pub fn post_id(&self) -> PostId { self.post.post_id }
}

// ─── Write input ─────────────────────────────────────────────────────────────

/// Input to [`BlogStore::save_post`](crate::store::BlogStore::save_post).
///
/// When `post_id` is `None`, or names a post that does not exist, a new post
/// is inserted. Otherwise the existing post is updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavePost {
  pub title:              String,
  pub text:               String,
  pub user_id:            String,
  /// Raw tag texts; normalized by the store before reconciliation.
  pub tags:               Vec<String>,
  pub draft:              bool,
  pub post_date:          Option<DateTime<Utc>>,
  pub last_modified_date: Option<DateTime<Utc>>,
  pub post_id:            Option<PostId>,
}

impl SavePost {
  /// Convenience constructor with all optional fields set to their defaults:
  /// no tags, published, timestamps chosen by the store, insert.
  pub fn new(
    title: impl Into<String>,
    text: impl Into<String>,
    user_id: impl Into<String>,
  ) -> Self {
    Self {
      title:              title.into(),
      text:               text.into(),
      user_id:            user_id.into(),
      tags:               Vec::new(),
      draft:              false,
      post_date:          None,
      last_modified_date: None,
      post_id:            None,
    }
  }

  pub fn with_tags<I, T>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.tags = tags.into_iter().map(Into::into).collect();
    self
  }

  pub fn draft(mut self, draft: bool) -> Self {
    self.draft = draft;
    self
  }

  pub fn posted_at(mut self, at: DateTime<Utc>) -> Self {
    self.post_date = Some(at);
    self
  }

  pub fn modified_at(mut self, at: DateTime<Utc>) -> Self {
    self.last_modified_date = Some(at);
    self
  }

  /// Target an existing post for update.
  pub fn for_post(mut self, post_id: PostId) -> Self {
    self.post_id = Some(post_id);
    self
  }
}

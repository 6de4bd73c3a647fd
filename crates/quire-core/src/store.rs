//! The `BlogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `quire-store-sqlite`).
//! Higher layers (`quire-cli`) depend on this abstraction, not on any
//! concrete backend.

use serde::{Deserialize, Serialize};

use crate::post::{PostId, PostRecord, SavePost};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Filter shared by [`BlogStore::get_posts`] and [`BlogStore::count_posts`].
///
/// The draft filter is exclusive: `include_draft == true` selects drafts
/// only, `false` selects published posts only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
  /// Exact match on the normalized tag text. Blank means no filter.
  pub tag:           Option<String>,
  /// Exact match on the owning user. Blank means no filter.
  pub user_id:       Option<String>,
  pub include_draft: bool,
}

/// Parameters for [`BlogStore::get_posts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostQuery {
  /// Maximum number of posts. `None` or `Some(0)` means no limit.
  pub count:  Option<u32>,
  /// Number of leading posts to skip.
  pub offset: u32,
  /// Newest first when `true`, oldest first otherwise.
  pub recent: bool,
  #[serde(flatten)]
  pub filter: PostFilter,
}

impl Default for PostQuery {
  fn default() -> Self {
    Self {
      count:  Some(10),
      offset: 0,
      recent: true,
      filter: PostFilter::default(),
    }
  }
}

impl PostQuery {
  /// The effective row limit, with zero folded into "unlimited".
  pub fn limit(&self) -> Option<u32> { self.count.filter(|&c| c > 0) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Quire blog store backend.
///
/// Every call completes against the backing store before returning; there is
/// no caching. Writes take `&mut self`: an instance is meant to be owned by
/// one thread (or serialized externally).
pub trait BlogStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert or update a post, reconcile its tags and upsert its author.
  ///
  /// Runs as one unit of work: on error nothing from this call is persisted.
  fn save_post(&mut self, input: SavePost) -> Result<PostId, Self::Error>;

  /// Fetch a post with its tags and author. `None` if the id is unknown.
  fn get_post_by_id(
    &self,
    post_id: PostId,
  ) -> Result<Option<PostRecord>, Self::Error>;

  /// List posts ordered by post date, filtered and paginated by `query`.
  fn get_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>, Self::Error>;

  /// Count the posts matching `filter`.
  fn count_posts(&self, filter: &PostFilter) -> Result<u64, Self::Error>;

  /// Delete a post and, by cascade, its associations. Returns `false` if the
  /// id is unknown.
  fn delete_post(&mut self, post_id: PostId) -> Result<bool, Self::Error>;
}

//! SQL schema for the Quire SQLite store.
//!
//! Rendered per [`Schema`] so that prefixed installations get their own
//! tables. Executed once when a store is constructed; the DDL is idempotent
//! thanks to `IF NOT EXISTS`, but later column changes are not migrated.

use quire_core::schema::{Schema, Table};

/// Connection settings applied before any DDL runs.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// Full DDL for the four relations named by `schema`.
pub fn ddl(schema: &Schema) -> String {
  let post = schema.table(Table::Post);
  let tag = schema.table(Table::Tag);
  let tag_posts = schema.table(Table::TagPosts);
  let user_posts = schema.table(Table::UserPosts);

  format!(
    r#"
-- AUTOINCREMENT keeps deleted ids from being handed out again.
CREATE TABLE IF NOT EXISTS "{post}" (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    title              VARCHAR(256),
    text               TEXT,
    post_date          TEXT,                        -- RFC 3339 UTC, microseconds
    last_modified_date TEXT,                        -- RFC 3339 UTC, microseconds
    draft              SMALLINT NOT NULL DEFAULT 0  -- 1 = draft
);

CREATE TABLE IF NOT EXISTS "{tag}" (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    text VARCHAR(128) NOT NULL                      -- uppercase
);

CREATE TABLE IF NOT EXISTS "{tag_posts}" (
    tag_id  INTEGER NOT NULL
            REFERENCES "{tag}"(id)  ON UPDATE CASCADE ON DELETE CASCADE,
    post_id INTEGER NOT NULL
            REFERENCES "{post}"(id) ON UPDATE CASCADE ON DELETE CASCADE,
    PRIMARY KEY (tag_id, post_id)
);

-- One row per post in practice; save_post maintains that.
CREATE TABLE IF NOT EXISTS "{user_posts}" (
    user_id VARCHAR(128) NOT NULL,
    post_id INTEGER NOT NULL
            REFERENCES "{post}"(id) ON UPDATE CASCADE ON DELETE CASCADE,
    PRIMARY KEY (user_id, post_id)
);

CREATE UNIQUE INDEX IF NOT EXISTS "{tag}_text_idx"         ON "{tag}"(text);
CREATE INDEX        IF NOT EXISTS "{post}_date_idx"        ON "{post}"(post_date);
CREATE INDEX        IF NOT EXISTS "{tag_posts}_tag_idx"    ON "{tag_posts}"(tag_id);
CREATE INDEX        IF NOT EXISTS "{tag_posts}_post_idx"   ON "{tag_posts}"(post_id);
CREATE INDEX        IF NOT EXISTS "{user_posts}_user_idx"  ON "{user_posts}"(user_id);
CREATE INDEX        IF NOT EXISTS "{user_posts}_post_idx"  ON "{user_posts}"(post_id);
"#
  )
}

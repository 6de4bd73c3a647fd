//! Association maintenance for `save_post`.
//!
//! All functions run on the caller's transaction (a `Transaction` derefs to
//! a `Connection`), so a failure anywhere in `save_post` undoes every step.

use std::collections::{BTreeMap, BTreeSet};

use quire_core::{
  post::PostId,
  schema::{Schema, Table},
  tags::TagDiff,
};
use rusqlite::{Connection, ErrorCode, params, params_from_iter};

use crate::{Error, Result};

pub type TagId = i64;

/// Resolve normalized tag texts to ids, inserting the tags not yet stored.
///
/// A unique-constraint collision on insert means another writer created the
/// tag first; it is logged and the id is read back instead.
pub fn ensure_tags(
  conn: &Connection,
  schema: &Schema,
  tags: &[String],
) -> Result<BTreeMap<String, TagId>> {
  let mut ids = lookup_tags(conn, schema, tags)?;

  let missing: Vec<&String> =
    tags.iter().filter(|t| !ids.contains_key(*t)).collect();
  if missing.is_empty() {
    return Ok(ids);
  }

  let table = schema.table(Table::Tag);
  let mut insert =
    conn.prepare(&format!(r#"INSERT INTO "{table}" (text) VALUES (?1)"#))?;
  for text in &missing {
    match insert.execute([text.as_str()]) {
      Ok(_) => {
        ids.insert((*text).clone(), conn.last_insert_rowid());
      }
      Err(e) if is_collision(&e) => {
        tracing::warn!(tag = %text, table, error = %e, "tag insert collided");
      }
      Err(e) => return Err(e.into()),
    }
  }

  if ids.len() < tags.len() {
    ids = lookup_tags(conn, schema, tags)?;
  }

  let unresolved: Vec<&str> = tags
    .iter()
    .filter(|t| !ids.contains_key(*t))
    .map(String::as_str)
    .collect();
  if !unresolved.is_empty() {
    tracing::warn!(?unresolved, table, "tags missing after collision re-read");
    return Err(Error::InvalidData(format!(
      "tags {unresolved:?} could not be stored or read back"
    )));
  }
  Ok(ids)
}

/// Whether an insert failed on a constraint (the unique tag text index, or a
/// trigger aborting the statement) rather than on the database itself.
pub(crate) fn is_collision(e: &rusqlite::Error) -> bool {
  e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation)
}

/// Bring the post's tag associations in line with `desired`.
pub fn sync_tag_posts(
  conn: &Connection,
  schema: &Schema,
  post_id: PostId,
  desired: &BTreeSet<TagId>,
) -> Result<()> {
  let current = current_tag_ids(conn, schema, post_id)?;
  let diff = TagDiff::between(&current, desired);
  if diff.is_empty() {
    return Ok(());
  }

  let table = schema.table(Table::TagPosts);

  if !diff.to_delete.is_empty() {
    let placeholders = placeholders(diff.to_delete.len());
    let sql = format!(
      r#"DELETE FROM "{table}" WHERE post_id = ? AND tag_id IN ({placeholders})"#
    );
    let params = std::iter::once(post_id).chain(diff.to_delete.iter().copied());
    conn.execute(&sql, params_from_iter(params))?;
  }

  if !diff.to_add.is_empty() {
    let mut insert = conn.prepare(&format!(
      r#"INSERT INTO "{table}" (tag_id, post_id) VALUES (?1, ?2)"#
    ))?;
    for tag_id in &diff.to_add {
      insert.execute(params![tag_id, post_id])?;
    }
  }

  tracing::debug!(
    post_id,
    removed = diff.to_delete.len(),
    added = diff.to_add.len(),
    "tag associations reconciled"
  );
  Ok(())
}

/// Create the author row for a post, or reassign it.
pub fn upsert_author(
  conn: &Connection,
  schema: &Schema,
  post_id: PostId,
  user_id: &str,
) -> Result<()> {
  let table = schema.table(Table::UserPosts);
  let changed = conn.execute(
    &format!(r#"UPDATE "{table}" SET user_id = ?1 WHERE post_id = ?2"#),
    params![user_id, post_id],
  )?;
  if changed == 0 {
    conn.execute(
      &format!(r#"INSERT INTO "{table}" (user_id, post_id) VALUES (?1, ?2)"#),
      params![user_id, post_id],
    )?;
  }
  Ok(())
}

/// Tag texts associated with a post, sorted.
pub fn tags_for_post(
  conn: &Connection,
  schema: &Schema,
  post_id: PostId,
) -> Result<Vec<String>> {
  let tag = schema.table(Table::Tag);
  let tag_posts = schema.table(Table::TagPosts);
  let mut stmt = conn.prepare_cached(&format!(
    r#"SELECT t.text
       FROM "{tag_posts}" tp
       INNER JOIN "{tag}" t ON t.id = tp.tag_id
       WHERE tp.post_id = ?1
       ORDER BY t.text ASC"#
  ))?;
  let tags = stmt
    .query_map([post_id], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(tags)
}

fn lookup_tags(
  conn: &Connection,
  schema: &Schema,
  tags: &[String],
) -> Result<BTreeMap<String, TagId>> {
  if tags.is_empty() {
    return Ok(BTreeMap::new());
  }
  let table = schema.table(Table::Tag);
  let placeholders = placeholders(tags.len());
  let mut stmt = conn.prepare(&format!(
    r#"SELECT text, id FROM "{table}" WHERE text IN ({placeholders})"#
  ))?;
  let rows = stmt
    .query_map(params_from_iter(tags), |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<BTreeMap<String, TagId>>>()?;
  Ok(rows)
}

fn current_tag_ids(
  conn: &Connection,
  schema: &Schema,
  post_id: PostId,
) -> Result<BTreeSet<TagId>> {
  let table = schema.table(Table::TagPosts);
  let mut stmt =
    conn.prepare(&format!(r#"SELECT tag_id FROM "{table}" WHERE post_id = ?1"#))?;
  let ids = stmt
    .query_map([post_id], |row| row.get(0))?
    .collect::<rusqlite::Result<BTreeSet<TagId>>>()?;
  Ok(ids)
}

fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

//! [`SqliteStore`], the SQLite implementation of [`BlogStore`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use quire_core::{
  post::{PostId, PostRecord, SavePost},
  schema::{Schema, Table},
  store::{BlogStore, PostFilter, PostQuery},
  tags::{normalize_tag, normalize_tags},
};
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter, types::Value};

use crate::{
  Error, Result,
  binds::Binds,
  encode::{RawPost, encode_draft, encode_dt},
  reconcile,
  schema::{CONNECTION_PRAGMAS, ddl},
};

const MEMORY: &str = ":memory:";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quire blog store backed by one SQLite connection.
///
/// The store owns its connection; it is not `Sync`-shared. Use one store per
/// thread, or serialize access externally.
pub struct SqliteStore {
  conn:   Connection,
  schema: Schema,
}

impl SqliteStore {
  /// Wrap an open connection and create the schema's tables if absent.
  pub fn new(conn: Connection, schema: Schema) -> Result<Self> {
    let store = Self { conn, schema };
    store.init_schema()?;
    Ok(store)
  }

  /// Open (or create) a store at `path`.
  pub fn open(path: impl AsRef<Path>, schema: Schema) -> Result<Self> {
    let conn = Connection::open(path)?;
    Self::new(conn, schema)
  }

  /// Open an in-memory store, useful for testing.
  pub fn open_in_memory(schema: Schema) -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    Self::new(conn, schema)
  }

  /// Open the database `binds` routes `schema` to.
  ///
  /// Fails with [`Error::NoDatabase`] or [`Error::UnboundKey`] before
  /// touching any file when no database is configured for the schema.
  pub fn connect(binds: &Binds, schema: Schema) -> Result<Self> {
    let path = binds.resolve(&schema)?;
    Self::open(path, schema)
  }

  fn init_schema(&self) -> Result<()> {
    self.conn.execute_batch(CONNECTION_PRAGMAS)?;
    self.conn.busy_timeout(Duration::from_secs(5))?;
    let database = self.database();
    if database != MEMORY {
      let _mode: String =
        self.conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    }
    self.conn.execute_batch(&ddl(&self.schema))?;

    tracing::info!(
      database,
      prefix = self.schema.prefix(),
      bind_key = self.schema.bind_key(),
      tables = ?self.schema.tables().map(|(_, name)| name).collect::<Vec<_>>(),
      "blog storage initialized"
    );
    Ok(())
  }

  /// The database file name, or `:memory:` for in-memory databases.
  fn database(&self) -> &str {
    match self.conn.path() {
      Some(path) if !path.is_empty() => path,
      _ => MEMORY,
    }
  }

  #[cfg(test)]
  pub(crate) fn connection(&self) -> &Connection { &self.conn }

  /// The relation names and bind key this store operates on.
  pub fn schema(&self) -> &Schema { &self.schema }

  /// Every stored tag text, sorted, including tags no post references.
  pub fn list_tags(&self) -> Result<Vec<String>> {
    let table = self.schema.table(Table::Tag);
    let mut stmt =
      self.conn.prepare(&format!(r#"SELECT text FROM "{table}" ORDER BY text ASC"#))?;
    let tags = stmt
      .query_map([], |row| row.get(0))?
      .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(tags)
  }

  /// Close the connection, reporting any error SQLite raises while doing so.
  pub fn close(self) -> Result<()> {
    self.conn.close().map_err(|(_, e)| Error::Database(e))
  }

  /// The insert-or-update body of `save_post`, run inside `conn`'s
  /// transaction.
  fn write_post(
    conn: &Connection,
    schema: &Schema,
    input: &SavePost,
    tags: &[String],
  ) -> Result<PostId> {
    let post = schema.table(Table::Post);
    let now = Utc::now();
    let last_modified = encode_dt(input.last_modified_date.unwrap_or(now));

    let existing = match input.post_id {
      Some(id) => conn
        .query_row(
          &format!(r#"SELECT id FROM "{post}" WHERE id = ?1"#),
          [id],
          |row| row.get::<_, PostId>(0),
        )
        .optional()?,
      None => None,
    };

    let post_id = match existing {
      Some(id) => {
        // post_date only moves when the caller supplies a new one.
        conn.execute(
          &format!(
            r#"UPDATE "{post}"
               SET title = ?1,
                   text = ?2,
                   draft = ?3,
                   last_modified_date = ?4,
                   post_date = COALESCE(?5, post_date)
               WHERE id = ?6"#
          ),
          params![
            input.title,
            input.text,
            encode_draft(input.draft),
            last_modified,
            input.post_date.map(encode_dt),
            id,
          ],
        )?;
        id
      }
      None => {
        conn.execute(
          &format!(
            r#"INSERT INTO "{post}" (title, text, post_date, last_modified_date, draft)
               VALUES (?1, ?2, ?3, ?4, ?5)"#
          ),
          params![
            input.title,
            input.text,
            encode_dt(input.post_date.unwrap_or(now)),
            last_modified,
            encode_draft(input.draft),
          ],
        )?;
        conn.last_insert_rowid()
      }
    };

    let tag_ids = reconcile::ensure_tags(conn, schema, tags)?;
    reconcile::sync_tag_posts(conn, schema, post_id, &tag_ids.into_values().collect())?;
    reconcile::upsert_author(conn, schema, post_id, &input.user_id)?;

    Ok(post_id)
  }

  fn load_record(&self, raw: RawPost) -> Result<PostRecord> {
    let tags = reconcile::tags_for_post(&self.conn, &self.schema, raw.post_id)?;
    raw.into_record(tags)
  }

  /// `FROM ... WHERE ...` shared by listing and counting, with its bind
  /// values in placeholder order.
  fn filter_clause(&self, filter: &PostFilter) -> (String, Vec<Value>) {
    let post = self.schema.table(Table::Post);
    let tag = self.schema.table(Table::Tag);
    let tag_posts = self.schema.table(Table::TagPosts);
    let user_posts = self.schema.table(Table::UserPosts);

    let mut sql = format!(r#"FROM "{post}" p WHERE p.draft = ?"#);
    let mut binds = vec![Value::Integer(encode_draft(filter.include_draft))];

    if let Some(tag_text) = filter.tag.as_deref().and_then(normalize_tag) {
      sql.push_str(&format!(
        r#" AND EXISTS (
              SELECT 1
              FROM "{tag_posts}" tp
              INNER JOIN "{tag}" t ON t.id = tp.tag_id
              WHERE tp.post_id = p.id
                AND t.text = ?
            )"#
      ));
      binds.push(Value::Text(tag_text));
    }

    if let Some(user_id) = filter.user_id.as_deref().filter(|u| !u.trim().is_empty()) {
      sql.push_str(&format!(
        r#" AND EXISTS (
              SELECT 1
              FROM "{user_posts}" up
              WHERE up.post_id = p.id
                AND up.user_id = ?
            )"#
      ));
      binds.push(Value::Text(user_id.to_owned()));
    }

    (sql, binds)
  }
}

// ─── BlogStore impl ──────────────────────────────────────────────────────────

impl BlogStore for SqliteStore {
  type Error = Error;

  fn save_post(&mut self, input: SavePost) -> Result<PostId> {
    let tags = normalize_tags(&input.tags);

    let tx = self.conn.transaction()?;
    match Self::write_post(&tx, &self.schema, &input, &tags) {
      Ok(post_id) => {
        tx.commit()?;
        Ok(post_id)
      }
      Err(e) => {
        tracing::error!(
          post_id = ?input.post_id,
          error = %e,
          "save_post failed; rolling back"
        );
        if let Err(rollback) = tx.rollback() {
          tracing::error!(error = %rollback, "rollback failed");
        }
        Err(e)
      }
    }
  }

  fn get_post_by_id(&self, post_id: PostId) -> Result<Option<PostRecord>> {
    let post = self.schema.table(Table::Post);
    let user_posts = self.schema.table(Table::UserPosts);
    let columns = RawPost::COLUMNS;

    let raw = self
      .conn
      .query_row(
        &format!(
          r#"SELECT {columns},
               (SELECT up.user_id FROM "{user_posts}" up WHERE up.post_id = p.id LIMIT 1)
             FROM "{post}" p
             WHERE p.id = ?1"#
        ),
        [post_id],
        RawPost::from_row,
      )
      .optional()?;

    raw.map(|r| self.load_record(r)).transpose()
  }

  fn get_posts(&self, query: &PostQuery) -> Result<Vec<PostRecord>> {
    let user_posts = self.schema.table(Table::UserPosts);
    let columns = RawPost::COLUMNS;
    let (filter_sql, mut binds) = self.filter_clause(&query.filter);
    let direction = if query.recent { "DESC" } else { "ASC" };

    let mut sql = format!(
      r#"SELECT {columns},
           (SELECT up.user_id FROM "{user_posts}" up WHERE up.post_id = p.id LIMIT 1)
         {filter_sql}
         ORDER BY p.post_date {direction}, p.id {direction}"#
    );

    match query.limit() {
      Some(limit) => {
        sql.push_str(" LIMIT ?");
        binds.push(Value::Integer(i64::from(limit)));
      }
      None if query.offset > 0 => sql.push_str(" LIMIT -1"),
      None => {}
    }
    if query.offset > 0 {
      sql.push_str(" OFFSET ?");
      binds.push(Value::Integer(i64::from(query.offset)));
    }

    let mut stmt = self.conn.prepare(&sql)?;
    let raws = stmt
      .query_map(params_from_iter(binds), RawPost::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.into_iter().map(|r| self.load_record(r)).collect()
  }

  fn count_posts(&self, filter: &PostFilter) -> Result<u64> {
    let (filter_sql, binds) = self.filter_clause(filter);
    let count: i64 = self.conn.query_row(
      &format!("SELECT COUNT(*) {filter_sql}"),
      params_from_iter(binds),
      |row| row.get(0),
    )?;
    u64::try_from(count).map_err(|_| Error::InvalidData(format!("post count {count}")))
  }

  fn delete_post(&mut self, post_id: PostId) -> Result<bool> {
    let post = self.schema.table(Table::Post);
    let changed = self
      .conn
      .execute(&format!(r#"DELETE FROM "{post}" WHERE id = ?1"#), [post_id])?;
    Ok(changed > 0)
  }
}

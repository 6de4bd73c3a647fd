//! Encoding and decoding helpers between Rust domain types and the plain
//! column representations stored in SQLite.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so that string order equals chronological order and
//! `ORDER BY post_date` needs no conversion. The draft flag is `0`/`1`.

use chrono::{DateTime, SecondsFormat, Utc};
use quire_core::post::{Post, PostId, PostRecord};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Draft flag ──────────────────────────────────────────────────────────────

pub fn encode_draft(draft: bool) -> i64 { i64::from(draft) }

pub fn decode_draft(v: i64) -> Result<bool> {
  match v {
    0 => Ok(false),
    1 => Ok(true),
    other => Err(Error::InvalidData(format!("draft flag {other}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a post row, with its author joined in.
pub struct RawPost {
  pub post_id:            PostId,
  pub title:              Option<String>,
  pub text:               Option<String>,
  pub post_date:          Option<String>,
  pub last_modified_date: Option<String>,
  pub draft:              i64,
  pub user_id:            Option<String>,
}

impl RawPost {
  /// Post columns in [`RawPost::from_row`] order, with `p` aliasing the post
  /// table. Callers select the author as the seventh column.
  pub const COLUMNS: &'static str = "p.id, p.title, p.text, p.post_date, \
     p.last_modified_date, p.draft";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:            row.get(0)?,
      title:              row.get(1)?,
      text:               row.get(2)?,
      post_date:          row.get(3)?,
      last_modified_date: row.get(4)?,
      draft:              row.get(5)?,
      user_id:            row.get(6)?,
    })
  }

  pub fn into_record(self, tags: Vec<String>) -> Result<PostRecord> {
    let post_date = self
      .post_date
      .as_deref()
      .map(decode_dt)
      .transpose()?
      .ok_or_else(|| {
        Error::InvalidData(format!("post {} has no post_date", self.post_id))
      })?;

    let last_modified_date = self
      .last_modified_date
      .as_deref()
      .map(decode_dt)
      .transpose()?
      .unwrap_or(post_date);

    Ok(PostRecord {
      post: Post {
        post_id: self.post_id,
        title: self.title.unwrap_or_default(),
        text: self.text.unwrap_or_default(),
        post_date,
        last_modified_date,
        draft: decode_draft(self.draft)?,
      },
      tags,
      user_id: self.user_id,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let late = early + chrono::Duration::microseconds(1);
    let (a, b) = (encode_dt(early), encode_dt(late));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(a, "2024-01-01T09:00:00.000000Z");
  }

  #[test]
  fn timestamp_decodes_what_it_encodes() {
    let at = Utc.with_ymd_and_hms(2023, 6, 30, 23, 59, 59).unwrap();
    assert_eq!(decode_dt(&encode_dt(at)).unwrap(), at);
  }

  #[test]
  fn bad_timestamp_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn draft_flag_rejects_other_values() {
    assert!(!decode_draft(0).unwrap());
    assert!(decode_draft(1).unwrap());
    assert!(matches!(decode_draft(2), Err(Error::InvalidData(_))));
  }
}

//! Command surface for the `quire` binary.
//!
//! Parsing lives here rather than in `main.rs` so the commands can be driven
//! against an in-memory store in tests.

use std::{
  io::Read as _,
  path::{Path, PathBuf},
};

use anyhow::{Context as _, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use quire_core::{
  post::{PostId, SavePost},
  store::{BlogStore, PostFilter, PostQuery},
};
use quire_store_sqlite::{SqliteStore, StorageConfig};
use serde_json::{Value, json};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "quire", author, version, about = "Quire blog post storage")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "quire.toml")]
  pub config: PathBuf,

  /// Default database path (overrides the config file).
  #[arg(long, value_name = "FILE")]
  pub database: Option<PathBuf>,

  /// Table name prefix (overrides the config file).
  #[arg(long)]
  pub prefix: Option<String>,

  /// Bind key selecting a database from `[binds]` (overrides the config file).
  #[arg(long)]
  pub bind: Option<String>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Insert a post, or update the post given by --id.
  Save {
    #[arg(long)]
    title:    String,
    /// Post body; `-` reads it from stdin.
    #[arg(long)]
    text:     String,
    #[arg(long)]
    user:     String,
    /// May be repeated.
    #[arg(long = "tag", value_name = "TAG")]
    tags:     Vec<String>,
    #[arg(long)]
    draft:    bool,
    /// RFC 3339 publication time; defaults to now on insert.
    #[arg(long, value_name = "RFC3339")]
    posted:   Option<DateTime<Utc>>,
    /// RFC 3339 modification time; defaults to now.
    #[arg(long, value_name = "RFC3339")]
    modified: Option<DateTime<Utc>>,
    #[arg(long)]
    id:       Option<PostId>,
  },
  /// Print one post.
  Get { id: PostId },
  /// List posts, newest first.
  List {
    /// Maximum number of posts; 0 lists all.
    #[arg(long, default_value_t = 10)]
    count:        u32,
    #[arg(long, default_value_t = 0)]
    offset:       u32,
    #[arg(long)]
    oldest_first: bool,
    #[command(flatten)]
    filter:       FilterArgs,
  },
  /// Count posts.
  Count {
    #[command(flatten)]
    filter: FilterArgs,
  },
  /// Delete a post and its associations.
  Delete { id: PostId },
  /// List every known tag.
  Tags,
  /// Show the table names and bind key in use.
  Tables,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
  #[arg(long)]
  pub tag:    Option<String>,
  #[arg(long)]
  pub user:   Option<String>,
  /// Select drafts instead of published posts.
  #[arg(long)]
  pub drafts: bool,
}

impl From<FilterArgs> for PostFilter {
  fn from(args: FilterArgs) -> Self {
    PostFilter {
      tag:           args.tag,
      user_id:       args.user,
      include_draft: args.drafts,
    }
  }
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// `QUIRE_*` environment variables. Nested keys use `__`, e.g.
/// `QUIRE_BINDS__BLOG`.
pub fn environment() -> config::Environment {
  config::Environment::with_prefix("QUIRE")
    .prefix_separator("_")
    .separator("__")
}

/// Layer the config file, `QUIRE_*` environment variables and command-line
/// overrides, in increasing precedence.
pub fn load_config(cli: &Cli) -> anyhow::Result<StorageConfig> {
  load_config_from(cli, environment())
}

/// [`load_config`] with an explicit environment source.
pub fn load_config_from(
  cli: &Cli,
  env: config::Environment,
) -> anyhow::Result<StorageConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(env)
    .set_override_option(
      "database",
      cli.database.as_deref().map(|p| p.to_string_lossy().into_owned()),
    )?
    .set_override_option("table_prefix", cli.prefix.clone())?
    .set_override_option("bind_key", cli.bind.clone())?
    .build()
    .context("failed to read config file")?;

  let cfg: StorageConfig = settings
    .try_deserialize()
    .context("failed to deserialise StorageConfig")?;

  Ok(cfg.map_paths(|p| expand_tilde(&p)))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Execution ────────────────────────────────────────────────────────────────

/// Run one command against `store` and return its JSON output.
pub fn execute(store: &mut SqliteStore, command: Command) -> anyhow::Result<Value> {
  let out = match command {
    Command::Save { title, text, user, tags, draft, posted, modified, id } => {
      let input = SavePost {
        title,
        text: read_text(text)?,
        user_id: user,
        tags,
        draft,
        post_date: posted,
        last_modified_date: modified,
        post_id: id,
      };
      let post_id = store.save_post(input).context("failed to save post")?;
      tracing::info!(post_id, "post saved");
      json!({ "post_id": post_id })
    }

    Command::Get { id } => match store.get_post_by_id(id)? {
      Some(post) => serde_json::to_value(post)?,
      None => bail!("post {id} not found"),
    },

    Command::List { count, offset, oldest_first, filter } => {
      let query = PostQuery {
        count: Some(count),
        offset,
        recent: !oldest_first,
        filter: filter.into(),
      };
      serde_json::to_value(store.get_posts(&query)?)?
    }

    Command::Count { filter } => {
      json!({ "count": store.count_posts(&filter.into())? })
    }

    Command::Delete { id } => json!({ "deleted": store.delete_post(id)? }),

    Command::Tags => serde_json::to_value(store.list_tags()?)?,

    Command::Tables => serde_json::to_value(store.schema())?,
  };
  Ok(out)
}

fn read_text(text: String) -> anyhow::Result<String> {
  if text != "-" {
    return Ok(text);
  }
  let mut buf = String::new();
  std::io::stdin()
    .read_to_string(&mut buf)
    .context("failed to read post text from stdin")?;
  Ok(buf)
}

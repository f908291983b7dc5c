//! `strata` — store, update, and fetch XML documents as triples.
//!
//! Reads `strata.toml` (or the path given with `--config`), layered under
//! `STRATA_*` environment variables, and talks to the triple store over HTTP.
//!
//! # Usage
//!
//! ```text
//! strata -C school1 store person.xml
//! strata -C school1 fetch --id 0F3A… --strip
//! strata -C school1 merge --id 0F3A… patch.xml
//! STRATA_STORE__BASE_URL=http://store:1324 strata -C school1 find StudentPersonal
//! ```

use std::{
  io::{self, Read, Write},
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use strata_engine::{AllocationMode, Engine, EngineConfig};
use strata_store_http::{HttpStore, StoreConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(author, version, about = "Store XML documents as triples")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "strata.toml")]
  config: PathBuf,

  /// Context every triple is read from and written to.
  #[arg(short = 'C', long, env = "STRATA_CONTEXT")]
  context: String,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Store a new document and print its RefId.
  Store {
    /// Fail instead of reassigning when the document's RefId is taken.
    #[arg(long)]
    advisory: bool,
    /// XML file, or `-` for stdin.
    file:     PathBuf,
  },
  /// Replace every triple of a document.
  Replace {
    #[arg(long)]
    id:   String,
    file: PathBuf,
  },
  /// Merge a document's leaves into a stored document.
  Merge {
    #[arg(long)]
    id:   String,
    file: PathBuf,
  },
  /// Delete a stored document.
  Delete {
    #[arg(long)]
    id: String,
  },
  /// List the RefIds of every document with the given root element.
  Find { relation: String },
  /// Rebuild a stored document and print it.
  Fetch {
    #[arg(long)]
    id:    String,
    /// Drop empty elements and attributes.
    #[arg(long)]
    strip: bool,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the configuration file / environment.
#[derive(Deserialize, Debug, Default)]
struct Settings {
  #[serde(default)]
  store:  StoreConfig,
  #[serde(default)]
  engine: EngineConfig,
}

fn load_settings(path: PathBuf) -> anyhow::Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("STRATA").separator("__"))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr; stdout carries command output only.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = load_settings(cli.config)?;

  let store = HttpStore::new(settings.store)
    .context("failed to build store client")?;
  let engine = Engine::new(store, settings.engine);
  let context = cli.context.as_str();
  let mut stdout = io::stdout().lock();

  match cli.command {
    Command::Store { advisory, file } => {
      let xml = read_input(&file)?;
      let mode = AllocationMode::from_advisory(advisory);
      let id = engine
        .store_document(&xml, mode, context)
        .await
        .context("store failed")?;
      writeln!(stdout, "{id}")?;
    }
    Command::Replace { id, file } => {
      let xml = read_input(&file)?;
      engine
        .update_document_full(&xml, &id, context)
        .await
        .with_context(|| format!("replace of {id} failed"))?;
    }
    Command::Merge { id, file } => {
      let xml = read_input(&file)?;
      engine
        .update_document_partial(&xml, &id, context)
        .await
        .with_context(|| format!("merge into {id} failed"))?;
    }
    Command::Delete { id } => {
      engine
        .delete_document(&id, context)
        .await
        .with_context(|| format!("delete of {id} failed"))?;
    }
    Command::Find { relation } => {
      let ids = engine
        .find_subjects_by_relation(&relation, context)
        .await
        .with_context(|| format!("lookup of {relation} failed"))?;
      for id in ids {
        writeln!(stdout, "{id}")?;
      }
    }
    Command::Fetch { id, strip } => {
      let xml = engine
        .fetch_document(&id, context, strip)
        .await
        .with_context(|| format!("fetch of {id} failed"))?;
      stdout.write_all(&xml)?;
      writeln!(stdout)?;
    }
  }

  Ok(())
}

/// Read a document from `path`, or from stdin when `path` is `-`.
fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
  if path.as_os_str() == "-" {
    let mut buf = Vec::new();
    io::stdin()
      .lock()
      .read_to_end(&mut buf)
      .context("reading stdin")?;
    return Ok(buf);
  }
  std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_definition_is_valid() { Cli::command().debug_assert(); }

  #[test]
  fn parses_store_with_advisory_flag() {
    let cli =
      Cli::try_parse_from(["strata", "-C", "school1", "store", "--advisory", "-"])
        .unwrap();
    assert_eq!(cli.context, "school1");
    assert!(matches!(
      cli.command,
      Command::Store { advisory: true, ref file } if file.as_os_str() == "-"
    ));
  }

  #[test]
  fn fetch_requires_an_id() {
    assert!(Cli::try_parse_from(["strata", "-C", "c", "fetch"]).is_err());
  }

  #[test]
  fn missing_config_file_falls_back_to_defaults() {
    let settings =
      load_settings(PathBuf::from("/nonexistent/strata.toml")).unwrap();
    assert_eq!(settings.engine.allocation_attempts, 3);
    assert!(settings.store.base_url.starts_with("http://"));
  }
}

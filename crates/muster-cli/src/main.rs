//! `muster`: command-line front end and API server for the Muster directory.
//!
//! # Usage
//!
//! ```text
//! muster serve
//! muster list band --group <id> --search brass
//! muster add district '{"name": "Harbour", "code": "D1", "commission_id": "<id>"}'
//! muster update member <id> '{"band_ids": []}'
//! muster delete group <id>
//! ```

mod backend;
mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use muster_core::{
  Id,
  entity::{Cascade, Entity},
};
use muster_sync::Scope;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{backend::Backend, settings::Settings};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "muster", version, about = "Admin console backend for the Muster directory")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "muster.toml")]
  config: PathBuf,

  /// Override the configured cascade policy (`direct` or `transitive`).
  #[arg(long)]
  cascade: Option<Cascade>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the JSON API.
  Serve {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
  },

  /// Print record counts per collection.
  Summary,

  /// List one collection.
  List {
    entity: Entity,
    #[arg(long)]
    commission: Option<Id>,
    #[arg(long)]
    district: Option<Id>,
    #[arg(long)]
    group: Option<Id>,
    #[arg(long)]
    band: Option<Id>,
    /// Case-insensitive substring search.
    #[arg(short, long, default_value = "")]
    search: String,
    /// Print records as JSON.
    #[arg(long)]
    json: bool,
  },

  /// Create a record from a JSON object and print its id.
  Add { entity: Entity, body: String },

  /// Write the fields present in a JSON object to a record.
  Update {
    entity: Entity,
    id:     Id,
    body:   String,
  },

  /// Delete a record.
  Delete { entity: Entity, id: Id },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let mut settings = Settings::load(&cli.config)?;
  if let Some(cascade) = cli.cascade {
    settings.cascade = cascade;
  }

  let backend = Backend::open(&settings.backend).await?;
  let directory = muster_sync::DirectoryStore::new(backend).with_cascade(settings.cascade);

  match cli.command {
    Command::Serve { host, port } => {
      let host = host.unwrap_or(settings.host);
      let port = port.unwrap_or(settings.port);
      commands::serve(directory, &format!("{host}:{port}")).await
    }
    Command::Summary => commands::summary(&directory).await,
    Command::List {
      entity,
      commission,
      district,
      group,
      band,
      search,
      json,
    } => {
      let scope = Scope {
        commission_id: commission,
        district_id:   district,
        group_id:      group,
        band_id:       band,
      };
      commands::list(&directory, entity, &scope, &search, json).await
    }
    Command::Add { entity, body } => commands::add(&directory, entity, &body).await,
    Command::Update { entity, id, body } => {
      commands::update(&directory, entity, id, &body).await
    }
    Command::Delete { entity, id } => commands::delete(&directory, entity, id).await,
  }
}

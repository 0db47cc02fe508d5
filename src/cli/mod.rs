use anyhow::Context;
use clap::Parser;
use log::error;
use std::{path::PathBuf, process::ExitCode};

use crate::{
    catalog::Catalog,
    config::{self, OutputDir},
    domain::track::CanonicalMetadata,
    http::client::HttpClient,
    resolve::{Resolver, error::ResolveError},
    storage::operations::Storage,
};

#[derive(Parser)]
#[command(name = "trackgrab")]
#[command(version = "0.1")]
#[command(about = "Downloads a free KuGou track with its tags and cover art")]
pub struct Cli {
    /// Track URL: a share link with a hash, or a track page
    pub url: String,

    /// Cover image URL to embed instead of looking one up
    #[arg(long)]
    pub cover: Option<String>,

    /// Path to the config TOML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to save the track into, overrides the config file
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Stop after resolving metadata
    #[arg(long)]
    pub resolve_only: bool,

    /// Print resolved metadata as JSON
    #[arg(long)]
    pub json: bool,
}

/// Process exit status. Each fatal failure kind has its own code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Config,
    Extraction,
    NoPlayableStream,
    Download,
}

impl Status {
    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Config => 1,
            Status::Extraction => 2,
            Status::NoPlayableStream => 3,
            Status::Download => 4,
        }
    }
}

impl From<&ResolveError> for Status {
    fn from(err: &ResolveError) -> Self {
        match err {
            ResolveError::Extraction(_) => Status::Extraction,
            ResolveError::NoPlayableStream(_) => Status::NoPlayableStream,
        }
    }
}

/// Entrypoint for CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(execute(&cli).code())
}

fn load_config(cli: &Cli) -> anyhow::Result<config::Config> {
    let mut cfg = match &cli.config {
        Some(path) => config::Config::load(&path.to_string_lossy())?,
        None => config::Config::default(),
    };
    if let Some(dir) = &cli.output_dir {
        cfg.output_dir = OutputDir(dir.clone());
    }
    Ok(cfg)
}

fn execute(cli: &Cli) -> Status {
    let setup = load_config(cli).and_then(|cfg| {
        let catalog = Catalog::new(cfg.catalog.clone()).context("Invalid catalog config")?;
        Ok((cfg, catalog))
    });
    let (cfg, catalog) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            error!("{e:#}");
            return Status::Config;
        }
    };

    let client = HttpClient::new();
    println!("URL: {}", cli.url);

    let resolver = Resolver::new(&client, catalog, cfg.http.clone());
    let metadata = match resolver.resolve(&cli.url, cli.cover.as_deref()) {
        Ok(metadata) => metadata,
        Err(e) => {
            error!("{e}");
            return Status::from(&e);
        }
    };
    print_metadata(&metadata, cli.json);

    if cli.resolve_only {
        return Status::Success;
    }

    let storage = Storage::new(&client, cfg.output_dir.0.clone(), cfg.http.clone());
    match storage.save(&metadata) {
        Ok(saved) => {
            if saved.cover_embedded {
                println!("Embedded cover art.");
            }
            println!(
                "Done. Saved to: {} ({} bytes)",
                saved.path.to_string_lossy(),
                saved.bytes
            );
            Status::Success
        }
        Err(e) => {
            error!(
                "Could not save into {}: {e}",
                storage.output_dir().to_string_lossy()
            );
            Status::Download
        }
    }
}

fn print_metadata(metadata: &CanonicalMetadata, json: bool) {
    if json {
        match serde_json::to_string_pretty(metadata) {
            Ok(text) => println!("{text}"),
            Err(e) => error!("Could not serialize metadata: {e}"),
        }
        return;
    }

    match &metadata.album_id {
        Some(album_id) => println!("Hash: {} | album_id: {album_id}", metadata.hash),
        None => println!("Hash: {}", metadata.hash),
    }
    println!("Title:  {}", metadata.title);
    println!("Artist: {}", metadata.artist);
    println!("Album:  {}", metadata.album);
    match &metadata.cover {
        Some(cover) => println!("Cover:  {} ({})", cover.url, cover.source),
        None => println!("Cover:  none"),
    }
}

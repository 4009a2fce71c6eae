use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gofile_client::{Client, ClientConfig, Region, UploadResult};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{self, Config};

/// Upload a file to gofile.io anonymously and print its download link.
#[derive(Debug, Parser)]
#[command(name = "gofile-upload", version)]
pub struct Args {
    /// File to upload.
    pub file: PathBuf,

    /// Upload server to use instead of asking the service.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Zone for server selection (eu or na).
    #[arg(short, long, value_parser = parse_region)]
    pub region: Option<Region>,

    /// Account or guest token.
    #[arg(long)]
    pub token: Option<String>,

    /// Destination folder id.
    #[arg(long = "folder")]
    pub folder_id: Option<String>,

    /// Server to use if selection fails.
    #[arg(long)]
    pub fallback_server: Option<String>,

    /// Give up on the upload after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Configuration file (defaults to the per-user location).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Do not store the token and folder after uploading.
    #[arg(long)]
    pub no_save: bool,

    /// Log debug output.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_region(code: &str) -> Result<Region, String> {
    Region::from_code(code).ok_or_else(|| format!("unknown region {code:?} (expected eu or na)"))
}

pub async fn run(args: Args) -> anyhow::Result<UploadResult> {
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(config::default_config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let mut client = Client::with_config(ClientConfig {
        upload_timeout: args.timeout.map(Duration::from_secs),
        ..ClientConfig::default()
    })?;
    client.set_region(args.region.or(config.region));
    client.set_token(args.token.clone().unwrap_or_else(|| config.token.clone()));
    client.set_folder_id(
        args.folder_id
            .clone()
            .unwrap_or_else(|| config.folder_id.clone()),
    );

    let server = match &args.server {
        Some(server) => server.clone(),
        None => {
            let fallback = args
                .fallback_server
                .as_deref()
                .unwrap_or(&config.fallback_server);
            choose_server(&client, fallback).await?
        }
    };

    let (progress_tx, mut progress_rx) = mpsc::channel(32);
    let reporter = tokio::spawn(async move {
        while let Some(bytes) = progress_rx.recv().await {
            debug!(bytes, "upload progress");
        }
    });
    let result = client
        .upload_with_progress(&args.file, &server, progress_tx)
        .await;
    let _ = reporter.await;
    let result = result.with_context(|| format!("uploading {}", args.file.display()))?;

    if !args.no_save && store_session(&mut config, &client) {
        config.save_to(&config_path)?;
        info!(path = %config_path.display(), "session saved");
    }

    Ok(result)
}

/// Asks the service for a server, falling back to `fallback` if one is configured.
async fn choose_server(client: &Client, fallback: &str) -> anyhow::Result<String> {
    match client.select_server().await {
        Ok(server) => Ok(server),
        Err(err) if !fallback.is_empty() => {
            warn!(error = %err, fallback, "server selection failed, using fallback server");
            Ok(fallback.to_string())
        }
        Err(err) => Err(anyhow::Error::new(err).context("selecting upload server")),
    }
}

/// Copies the client's session into `config`. Returns true if anything changed.
fn store_session(config: &mut Config, client: &Client) -> bool {
    let token = client.token().unwrap_or_default();
    let folder_id = client.folder_id().unwrap_or_default();
    if config.token == token && config.folder_id == folder_id {
        return false;
    }
    config.token = token.to_string();
    config.folder_id = folder_id.to_string();
    true
}

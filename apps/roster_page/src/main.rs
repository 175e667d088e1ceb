use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use roster_core::{ControllerOptions, RegistrationPage, RosterController, RosterStore};
use shared::protocol::{EventParseError, PageEvent};
use storage::SqliteKeyValueStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod page;

use config::{load_settings, normalize_database_url};
use page::{Flow, OutputMode, Page};

/// Hosts the roster and registration pages, reading one event per line from stdin.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "roster.toml")]
    config: PathBuf,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    seed_url: Option<String>,
    /// Commit views as HTML markup instead of plain text.
    #[arg(long)]
    html: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(database_url) = args.database_url {
        settings.database_url = database_url;
    }
    if let Some(seed_url) = args.seed_url {
        settings.seed_url = Some(seed_url);
    }

    let filter =
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let database_url = normalize_database_url(&settings.database_url);
    let storage = Arc::new(
        SqliteKeyValueStore::new(&database_url)
            .await
            .context("failed to open page storage")?,
    );
    let seed = settings.seed_source()?;
    info!(
        database_url = %database_url,
        seed = %seed.describe(),
        require_query = settings.require_query,
        "roster page starting"
    );

    let store = RosterStore::new(storage.clone(), seed).with_key(settings.roster_key.clone());
    let mut page = Page {
        roster: RosterController::new(
            store,
            ControllerOptions {
                require_query: settings.require_query,
            },
        ),
        registration: RegistrationPage::new(storage).with_key(settings.registration_key.clone()),
        mode: if args.html {
            OutputMode::Html
        } else {
            OutputMode::Text
        },
    };

    let mut out = io::stdout().lock();
    page.start(&mut out).await?;
    out.flush()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let event = match PageEvent::parse_line(&line) {
            Ok(event) => event,
            Err(EventParseError::Empty) => continue,
            Err(err) => {
                writeln!(out, "[page] {err}")?;
                out.flush()?;
                continue;
            }
        };
        let flow = page.handle(event, &mut out).await?;
        out.flush()?;
        if matches!(flow, Flow::Quit) {
            break;
        }
    }

    info!("roster page closed");
    Ok(())
}

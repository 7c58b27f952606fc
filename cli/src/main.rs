//! `catalog`: terminal front end for the book catalog service.

mod args;
mod browse;
mod terminal;
mod transport;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use catalog_core::{BookCatalogClient, BookForm, FormMode, HealthState, Outcome};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command};
use crate::terminal::{TerminalConfirm, TerminalUi};
use crate::transport::ReqwestTransport;

const DEFAULT_LOG_FILTER: &str = "catalog_cli=info,catalog_core=warn";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    match (&dotenv, dotenv_problem(&dotenv)) {
        (Ok(path), _) => debug!(path = %path.display(), "loaded .env"),
        (Err(_), Some(err)) => warn!(error = %err, "ignoring unreadable .env"),
        (Err(_), None) => debug!("no .env file"),
    }

    let cli = Cli::parse();
    let config = cli.client_config();
    info!(base_url = %config.base_url, page_size = config.page_size, "catalog client");

    let http = reqwest::Client::builder()
        .user_agent(concat!("catalog/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let ui = Arc::new(TerminalUi);
    let client = BookCatalogClient::new(
        config,
        ReqwestTransport::new(http),
        ui.clone(),
        Arc::new(TerminalConfirm { assume_yes: cli.yes }),
        ui,
    );

    let ok = match cli.command {
        Command::Health => client.check_health().await == HealthState::Healthy,
        Command::List { page } => client.list_books(page).await.is_ok(),
        Command::Show { id } => client.view_book(id).await.is_ok(),
        Command::Add(fields) => client
            .submit_form(FormMode::Add, &BookForm::from(fields))
            .await
            .is_ok(),
        Command::Edit { id, fields } => match client.load_for_edit(id).await {
            Ok(current) => client
                .submit_form(FormMode::Edit(id), &fields.apply(current))
                .await
                .is_ok(),
            Err(_) => false,
        },
        Command::Delete { id } => match client.delete_book(id).await {
            Ok(Outcome::Declined) => {
                println!("Cancelled");
                true
            }
            Ok(Outcome::Done(())) => true,
            Err(_) => false,
        },
        Command::Stats => client.get_stats().await.is_some(),
        Command::Init => match client.initialize_sample_data().await {
            Ok(Outcome::Declined) => {
                println!("Cancelled");
                true
            }
            Ok(Outcome::Done(summary)) => {
                debug!(?summary, "init finished");
                true
            }
            Err(_) => false,
        },
        Command::Browse => {
            browse::run(&client).await;
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// A missing `.env` is normal; anything else is worth a warning.
fn dotenv_problem<T>(result: &dotenvy::Result<T>) -> Option<&dotenvy::Error> {
    result.as_ref().err().filter(|err| !err.not_found())
}

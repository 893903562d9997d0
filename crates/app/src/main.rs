use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serene_core::catalog::LibraryFilter;
use serene_core::model::PatternDraft;
use services::{AppServices, Clock};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod db;
mod devices;

use cli::{Cli, Command, CustomAction, SettingsAction};

async fn open(cli: &Cli) -> Result<AppServices> {
    // Open + migrate SQLite here so core and services stay storage-agnostic.
    let db_url = db::normalize_sqlite_url(&cli.db_url)?;
    db::prepare_sqlite_file(&db_url)?;
    let app = AppServices::new_sqlite(&db_url, Clock::system())
        .await
        .with_context(|| format!("opening {db_url}"))?;
    Ok(app.with_tick(Duration::from_millis(cli.tick_ms)))
}

async fn run(cli: Cli) -> Result<()> {
    let app = open(&cli).await?;

    match cli.command {
        Command::Library {
            search,
            category,
            difficulty,
        } => commands::library::list(
            &app,
            &LibraryFilter {
                search,
                category,
                difficulty,
            },
        ),
        Command::Categories => commands::library::categories(&app),
        Command::Show { id } => commands::library::show(&app, &id),
        Command::Run(args) => commands::run::run(&app, args.source.as_deref(), args.overrides()).await,
        Command::Custom { action } => match action {
            CustomAction::Save {
                name,
                inhale,
                hold_in,
                exhale,
                hold_out,
                cycles,
            } => {
                let draft = PatternDraft::new(inhale, hold_in, exhale, hold_out, cycles);
                commands::custom::save(&app, &name, draft).await
            }
            CustomAction::List => commands::custom::list(&app).await,
            CustomAction::Delete { name } => commands::custom::delete(&app, &name).await,
        },
        Command::Progress => commands::progress::summary(&app).await,
        Command::History { limit } => commands::progress::history(&app, limit).await,
        Command::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show(&app).await,
            SettingsAction::Set(update) => commands::settings::set(&app, update).await,
            SettingsAction::TestHaptic => commands::settings::test_haptic(&app).await,
            SettingsAction::PreviewSound => commands::settings::preview_sound(&app).await,
        },
        Command::Export { out } => commands::data::export(&app, out).await,
        Command::Clear { yes } => commands::data::clear(&app, yes).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(2);
    }
}

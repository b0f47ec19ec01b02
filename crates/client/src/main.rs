//! Terminal driver for a live encounter session.
//!
//! This binary is the composition root: it loads content, builds the
//! [`EncounterService`](encounter_runtime::EncounterService) and hands stdin
//! to the session loop.
//!
//! ```bash
//! encounter --session table-1 --member aria:Aria:12:15:15:fighter
//! ```

mod args;
mod command;
mod dirs;
mod logging;
mod render;
mod repl;

use anyhow::{Context, Result};
use clap::Parser;
use encounter_content::{CatalogLoader, ConfigLoader, ContentFactory};
use encounter_runtime::{EncounterService, FactNarrator, RuntimeConfig, default_save_dir};

use args::{Cli, default_party};
use repl::Repl;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let session = cli
        .session
        .clone()
        .unwrap_or_else(|| format!("session-{:08x}", rand::random::<u32>()));
    let _guard = logging::setup(&session)?;

    let service = build_service(&cli)?;
    let party = if cli.members.is_empty() {
        default_party()
    } else {
        cli.members.into_iter().map(|member| member.0).collect()
    };
    service
        .sync_party(&session, party)
        .await
        .context("Failed to seed the party")?;

    Repl::new(service, session).run().await
}

fn build_service(cli: &Cli) -> Result<EncounterService> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(dirs::content_dir);
    let factory = ContentFactory::new(&data_dir);
    let (mut combat, mut catalog) = factory
        .load_or_default()
        .with_context(|| format!("Failed to load content from {}", data_dir.display()))?;
    if let Some(path) = &cli.config {
        combat = ConfigLoader::load(path)?;
    }
    if let Some(path) = &cli.catalog {
        catalog = CatalogLoader::load(path)?;
    }

    let mut config = RuntimeConfig {
        combat,
        ..RuntimeConfig::default()
    }
    .with_env()?;
    if let Some(dir) = &cli.save_dir {
        config.save_dir = if dir.eq_ignore_ascii_case("default") {
            default_save_dir()
        } else {
            Some(dir.into())
        };
    }
    if cli.no_persist {
        config.persist = false;
        config.save_dir = None;
    }

    tracing::info!(
        target: "cli",
        data_dir = %data_dir.display(),
        weapons = catalog.weapon_count(),
        enemies = catalog.enemy_count(),
        save_dir = ?config.save_dir,
        "content loaded"
    );

    let service = EncounterService::builder()
        .config(config)
        .catalog(catalog)
        .narrator(FactNarrator)
        .build()?;
    Ok(service)
}

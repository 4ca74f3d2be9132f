use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::core::config::HubConfig;
use crate::core::engine::Shell;
use crate::core::host::{GameHost, HostContext};
use crate::core::prefs::{Preferences, Sound};
use crate::core::registry::{Category, GameRegistry};
use crate::core::score::ScoreStore;
use crate::core::storage::{FileStore, Storage};
use crate::games::create_default_registry;
use crate::logging;

#[derive(Parser)]
#[command(name = "minihub")]
#[command(about = "🕹️ A terminal arcade of quick mini-games")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./minihub.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the arcade, optionally jumping straight into a game
    Play {
        /// Game id (e.g. "snake", "2048")
        game: Option<String>,
    },
    /// List available games
    List {
        /// Only show one category: quick, puzzle or arcade
        #[arg(short, long)]
        category: Option<Category>,

        /// Case-insensitive match on name or description
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Show the best score recorded for every game
    Scores,
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = HubConfig::load(cli.config.as_deref())?;
    logging::init(&config.log_path(), &config.log_filter)?;

    let registry = create_default_registry()?;
    let storage = Storage::new(FileStore::open(config.store_path()).context("opening score store")?);

    match cli.command {
        Some(Commands::List { category, search }) => {
            let games = registry.filter(category, &search);
            if games.is_empty() {
                println!("No games match.");
            }
            for game in games {
                println!("📦 {} ({})", game.name, game.id);
                println!("   {}", game.description);
                println!("   Category: {}", game.category);
                println!();
            }
        }

        Some(Commands::Scores) => {
            let scores = ScoreStore::new(storage);
            println!("🏆 Best scores:");
            println!();
            for game in registry.list_games() {
                println!("  {:<22} {}", game.name, scores.display(game.id));
            }
        }

        Some(Commands::Play { game }) => {
            if let Some(id) = &game {
                if !registry.has_game(id) {
                    eprintln!("❌ Game '{id}' not found");
                    eprintln!("Available games:");
                    for metadata in registry.list_games() {
                        eprintln!("  • {} - {}", metadata.id, metadata.description);
                    }
                    bail!("unknown game '{id}'");
                }
            }
            play(&config, registry, storage, game.as_deref()).await?;
        }

        None => play(&config, registry, storage, None).await?,
    }

    Ok(())
}

async fn play(config: &HubConfig, registry: GameRegistry, storage: Storage, game: Option<&str>) -> Result<()> {
    let prefs = Preferences::load(storage.clone());
    let context = HostContext::new(config.input.swipe(), Sound::new(prefs.sound()), Instant::now());
    let host = GameHost::new(Rc::new(registry), ScoreStore::shared(storage), context);

    info!(games = host.registry().len(), "starting shell");
    let mut shell = Shell::new(host, prefs, config.input.clone(), config.frame_period());
    if let Some(id) = game {
        shell.open(id);
    }
    shell.run().await
}

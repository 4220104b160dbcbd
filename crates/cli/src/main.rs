use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use stockroom_infra::{AppConfig, BackendKind};
use stockroom_inventory::Ledger;
use stockroom_observability::LogFormat;

mod menu;

#[derive(Debug, Parser)]
#[command(name = "stockroom", about = "Interactive stock ledger for tiles and sanitary ware", version)]
struct Cli {
    #[arg(long, value_enum, help = "Where records are kept (defaults to STOCKROOM_BACKEND, then sqlite)")]
    backend: Option<Backend>,
    #[arg(long, help = "SQLite database file (defaults to STOCKROOM_DB)")]
    db: Option<PathBuf>,
    #[arg(long, help = "Directory for product photos (defaults to STOCKROOM_IMAGE_DIR)")]
    image_dir: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Backend {
    Memory,
    Sqlite,
}

impl From<Backend> for BackendKind {
    fn from(value: Backend) -> Self {
        match value {
            Backend::Memory => BackendKind::Memory,
            Backend::Sqlite => BackendKind::Sqlite,
        }
    }
}

impl Cli {
    /// Flags win over the environment.
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(backend) = self.backend {
            config.backend = backend.into();
        }
        if let Some(db) = self.db {
            config.db_path = db;
        }
        if let Some(dir) = self.image_dir {
            config.image_dir = dir;
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    stockroom_infra::load_dotenv();
    let cli = Cli::parse();
    stockroom_observability::init_with(LogFormat::Compact, "warn");

    let config = cli.apply(AppConfig::from_env());
    let store = config
        .open_store()
        .with_context(|| format!("failed to open stock store {}", config.db_path.display()))?;
    let mut ledger = Ledger::open(store).context("failed to load stock records")?;
    let mut images = config.image_store();
    tracing::debug!(records = ledger.len(), backend = ?config.backend, "ledger ready");

    let stdin = io::stdin();
    let mut menu = menu::Menu::new(stdin.lock(), io::stdout());
    menu.run(&mut ledger, &mut images)
        .context("terminal input/output failed")?;
    Ok(())
}

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use leadbot::credentials::Credentials;
use leadbot::{logging, report, twitter, Config, LeadBot, ReplyLedger};

#[derive(Parser)]
#[command(
    name = "leadbot",
    version,
    about = "Find posts asking for content repurposing help and reply to them",
    after_help = "Recommended: start with `find` to review leads manually."
)]
struct Cli {
    #[arg(value_enum, ignore_case = true)]
    mode: Mode,

    /// Config file (defaults to <config dir>/leadbot/config.toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Reply ledger file, overriding `ledger_path` from the config
    #[arg(long)]
    ledger: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// List leads for manual review
    Find,
    /// Run one search-and-reply cycle
    Auto,
    /// Search and reply continuously
    Daemon,
}

impl Mode {
    fn posts_replies(self) -> bool {
        !matches!(self, Mode::Find)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.ledger {
        config.ledger_path = path;
    }

    let credentials = match Credentials::from_env(config.backend, cli.mode.posts_replies()) {
        Ok(credentials) => credentials,
        Err(missing) => {
            eprintln!("{}", missing);
            std::process::exit(1);
        }
    };

    let client = twitter::client_for(&config, credentials);
    let ledger = ReplyLedger::load(&config.ledger_path)?;
    info!(
        mode = ?cli.mode,
        backend = ?config.backend,
        replied_before = ledger.len(),
        "leadbot starting"
    );

    let mut bot = LeadBot::new(client, config, ledger);
    match cli.mode {
        Mode::Find => {
            let found = bot.find_leads().await;
            print!("{}", report::render_leads(&found.leads, found.total_found));
        }
        Mode::Auto => {
            let summary = bot.run_once().await?;
            info!(
                replied = summary.replied,
                failed = summary.failed,
                skipped = summary.skipped,
                sent_today = bot.limiter().sent_today(),
                "Cycle complete"
            );
        }
        Mode::Daemon => bot.run_continuous().await,
    }

    Ok(())
}

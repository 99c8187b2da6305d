//! shala - an interactive shell for the yoga session marketplace API.
//!
//! The access token and the refresh cookie live only in this process, so a
//! session lasts exactly as long as the shell does.

mod shell;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shala_core::config::BASE_URL_ENV;
use shala_core::{ApiClient, AuthStore, Config, CredentialSlot};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shell::{Outcome, Shell};

// ============================================================================
// Constants
// ============================================================================

/// Application name used for the log directory
const APP_NAME: &str = "shala";

const PROMPT: &str = "shala> ";

#[derive(Debug, Parser)]
#[command(name = "shala", version, about = "Interactive client for the shala booking API")]
struct Args {
    /// Backend base URL
    #[arg(long, env = BASE_URL_ENV)]
    base_url: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. debug, shala_core=trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Skip restoring a session on startup
    #[arg(long)]
    no_bootstrap: bool,
}

/// Initialize the tracing subscriber.
///
/// Logs go to a daily file under the user cache directory so they do not
/// interleave with shell output. The guard must outlive the program.
fn init_tracing(default_filter: &str) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("Invalid log filter")?;

    let log_dir = dirs::cache_dir()
        .map(|dir| dir.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(log_dir, "shala.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let _log_guard = init_tracing(&args.log_level)?;

    let mut config = Config::from_env()?;
    if let Some(ref url) = args.base_url {
        config = Config::new(url)?.with_timeout(config.request_timeout);
    }
    info!(base_url = %config.base_url, "shala starting");

    let api = ApiClient::new(&config, CredentialSlot::new())?;
    let store = AuthStore::new(api);
    let shell = Shell::new(store);

    println!("Connected to {}. Type `help` for commands.", config.base_url);
    if !args.no_bootstrap {
        shell.bootstrap().await;
    }

    let handled = run_shell(&shell, BufReader::new(tokio::io::stdin())).await?;

    info!(commands = handled, "shala shutting down");
    Ok(())
}

/// Feed input lines to the shell until `quit` or end of input.
///
/// Returns how many lines were handled.
async fn run_shell<R>(shell: &Shell, input: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;
    loop {
        print!("{}", PROMPT);
        io::stdout().flush()?;

        let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read from stdin")?
        else {
            break;
        };
        handled += 1;

        if shell.execute(&line).await == Outcome::Quit {
            break;
        }
    }
    Ok(handled)
}

//! gust - HTTPie-style HTTP client
//!
//! Logs go to stderr, filtered by `GUST_LOG` (default `warn`), so stdout
//! carries only command output.

use std::io::{self, Write};

use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use gust::constants::LOG_ENV_VAR;
use gust::App;

#[tokio::main]
async fn main() {
    let (non_blocking, guard) = tracing_appender::non_blocking(io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        // exit() skips destructors; flush pending log lines first
        drop(guard);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let input_is_tty = stdin.is_tty();
    let mut app = App::detect()?
        .with_input(Box::new(stdin.lock()), input_is_tty)
        .with_color(io::stdout().is_tty());

    let mut out = io::stdout().lock();
    app.run(args, &mut out).await?;
    out.flush()?;
    Ok(())
}

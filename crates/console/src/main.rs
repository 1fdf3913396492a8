//! `eligo`: command-line console for the eligibility service.
//!
//! # Configuration
//!
//! - `ELIGO_API_URL`: service root (default `http://localhost:8081`)
//! - `ELIGO_REQUEST_TIMEOUT_SECS`: per-request timeout (default 30)
//! - `ELIGO_SESSION_FILE`: where the credential is kept between runs
//!   (default `<state dir>/eligo/session`)
//! - `ELIGO_LOG_FORMAT`: `pretty` or `json`; `RUST_LOG` sets the filter
//!
//! Flags override the environment.

mod cli;
mod commands;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use eligo_client::{ApiGateway, ClientConfig, ReqwestTransport};
use eligo_session::{FileStorage, SessionStore};

use crate::cli::{Cli, Command};
use crate::commands::Console;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.log_format {
        Some(format) => eligo_observability::init_with(format),
        None => eligo_observability::init(),
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(url) = &cli.api_url {
        config = ClientConfig::new(url.as_str())
            .context("invalid --api-url")?
            .with_timeout(config.request_timeout);
    }

    let session_file = match cli.session_file {
        Some(path) => path,
        None => default_session_file()?,
    };
    tracing::debug!(path = %session_file.display(), "using session file");

    let session = Arc::new(SessionStore::new(Arc::new(FileStorage::new(session_file))));
    session
        .restore()
        .await
        .context("failed to restore the saved session")?;

    let transport = ReqwestTransport::new(&config).context("failed to build HTTP client")?;
    let console = Console::new(ApiGateway::new(Arc::new(transport), session));

    let command = with_password(cli.command)?;
    console.run(command, &mut std::io::stdout()).await
}

/// `{state_dir}/eligo/session`, falling back to the local data directory on
/// platforms without a state directory.
fn default_session_file() -> anyhow::Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .context("failed to resolve a state directory; set ELIGO_SESSION_FILE")?;
    Ok(base.join("eligo").join("session"))
}

/// Prompt for the login password when it was not given on the command line.
fn with_password(command: Command) -> anyhow::Result<Command> {
    let username = match command {
        Command::Login {
            username,
            password: None,
        } => username,
        other => return Ok(other),
    };

    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    Ok(Command::Login {
        username,
        password: Some(line.trim_end_matches(['\r', '\n']).to_string()),
    })
}

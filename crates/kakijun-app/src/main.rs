use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kakijun_config::Config;
use tokio::signal;
use tokio_util::sync::CancellationToken;

pub mod controller;
pub mod events;
pub mod logging;
pub mod oneshot;
pub mod profile;
pub mod state;

#[cfg(test)]
mod tests;

use self::controller::AppController;
use self::logging::{LogTarget, init_tracing};
use self::profile::{MAIN_PROFILE, ProfileStore, load_config_file};
use self::state::AppState;

/// Consulta de kanji con diagramas animados de orden de trazos
#[derive(Parser, Debug)]
#[command(name = "kakijun", version)]
struct Cli {
    /// Config file, either a bare config or a saved profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Profile to load from the user config directory
    #[arg(long, default_value = MAIN_PROFILE)]
    profile: String,

    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Stop each animation after this many loops
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    loops: Option<u32>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Save the resolved config as a profile and exit
    #[arg(long, value_name = "NAME")]
    save_profile: Option<String>,

    /// Kanji or search term; starts the interactive UI when omitted
    query: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let store = ProfileStore::user()?;
    let interactive = cli.query.is_none() && atty::is(atty::Stream::Stdout);

    let log_dir = store.log_dir();
    let log_target = if interactive {
        LogTarget::File(&log_dir)
    } else {
        LogTarget::Stderr
    };
    init_tracing(log_target, cli.log_json)?;

    let config = resolve_config(&cli, &store)?;

    if let Some(name) = &cli.save_profile {
        let path = store.save(name, &config)?;
        println!("Perfil guardado en {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let state = Arc::new(AppState::new(config)?);

    if interactive {
        run_interactive(state).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let query = match cli.query {
        Some(query) => query,
        None => read_stdin_query()?,
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let mut stdout = io::stdout();
    let ok = oneshot::run_once(&state, &query, &mut stdout, &cancel).await?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn resolve_config(cli: &Cli, store: &ProfileStore) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => {
            if let Err(e) = store.init() {
                tracing::warn!("Could not initialize profiles in {}: {:#}", store.root().display(), e);
            }
            store.load(&cli.profile)?
        }
    };

    config.apply_env();

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(loops) = cli.loops {
        config.max_loops = Some(loops);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn read_stdin_query() -> anyhow::Result<String> {
    if atty::is(atty::Stream::Stdin) {
        anyhow::bail!("No query given and stdout is not a terminal");
    }

    let mut query = String::new();
    io::stdin().read_to_string(&mut query).context("Failed to read query from stdin")?;
    Ok(query)
}

async fn run_interactive(state: Arc<AppState>) -> anyhow::Result<()> {
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();
    let mut first_error = None;

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            first_error = task_error(result);
        }
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Some(e) = task_error(result) {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn task_error(
    result: Result<anyhow::Result<()>, tokio::task::JoinError>,
) -> Option<anyhow::Error> {
    match result {
        Ok(Ok(())) => {
            tracing::info!("Task exited");
            None
        }
        Ok(Err(e)) => {
            tracing::error!("Task failed: {:#}", e);
            Some(e)
        }
        Err(e) => {
            tracing::error!("Task panicked: {}", e);
            Some(e.into())
        }
    }
}

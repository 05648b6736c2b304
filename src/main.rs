use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitwatch::analysis::CommandAnalyzer;
use gitwatch::command::classify;
use gitwatch::config::Config;
use gitwatch::daemon::{GitMonitor, MonitorOptions};
use gitwatch::datasource::{SystemGitRunner, SystemProcessDataSource};
use gitwatch::logging;
use gitwatch::recorder::JsonlRecorder;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "gitwatch")]
#[command(about = "Record git commands run on this machine by watching the process table")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch for git commands until Ctrl+C (default)
    Run {
        /// Config file to use instead of ~/.config/gitwatch/config.toml
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print how a git command line is classified
    Classify {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Analyse a git command line against a repository and print the result
    Analyze {
        /// Working directory the command ran in
        #[arg(long, default_value = ".")]
        cwd: PathBuf,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    logging::init(config.log_level(), config.log_file.as_deref())?;

    let storage = config.storage_path();
    let mut options = MonitorOptions::from_config(&config);
    options.storage_path = Some(storage.clone());

    let monitor = GitMonitor::new(
        options,
        Arc::new(SystemProcessDataSource::new()),
        Arc::new(SystemGitRunner::with_program(config.git_executable())),
        Arc::new(JsonlRecorder::new(&storage)),
    );

    monitor.start()?;
    info!(storage = %storage.display(), "watching for git commands, press Ctrl+C to stop");

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl+C, stopping");
    }

    monitor.stop().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => run(None).await?,
        Some(Commands::Run { config }) => run(config).await?,
        Some(Commands::Classify { command }) => {
            let raw = command.join(" ");
            match classify(&raw) {
                Some(descriptor) => println!("{}", serde_json::to_string_pretty(&descriptor)?),
                None => println!("not a git command: {}", raw),
            }
        }
        Some(Commands::Analyze { cwd, command }) => {
            let config = Config::load().unwrap_or_else(|err| {
                eprintln!("Warning: {:#}", err);
                Config::default()
            });
            logging::init(config.log_level(), None)?;

            let cwd = cwd
                .canonicalize()
                .with_context(|| format!("Failed to resolve directory: {}", cwd.display()))?;
            let raw = command.join(" ");
            let mut analyzer =
                CommandAnalyzer::new(SystemGitRunner::with_program(config.git_executable()));
            match analyzer.analyze(&raw, &cwd) {
                Some(analysis) => {
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                    println!("{}", gitwatch::analysis::describe(&analysis));
                }
                None => println!("no analysis available for: {}", raw),
            }
        }
    }

    Ok(())
}

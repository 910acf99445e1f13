//! tally — command line for the staking ledger and governance engine.

mod simulate;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tally_staking::StakingConfig;
use tally_params::PARAM_UPDATE_DELAY;
use tally_utils::{format_duration, init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "tally", about = "Staking ledger and governance session tooling")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "TALLY_LOG_LEVEL")]
    log_level: String,

    /// Log format: "human" or "json".
    #[arg(long, default_value = "human", env = "TALLY_LOG_FORMAT")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Load and validate a staking configuration file.
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
    /// Run the reference scenarios and print every event as a JSON line.
    Simulate {
        /// Staking configuration; defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: &Path) -> Result<StakingConfig> {
    let config = StakingConfig::from_toml_file(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    config.validate().context("configuration is invalid")?;
    Ok(config)
}

fn describe(config: &StakingConfig) -> Vec<String> {
    vec![
        format!("owner                       {}", config.owner),
        format!("custody                     {}", config.custody),
        format!("fee                         {}", config.fee),
        format!(
            "withdrawal lock duration    {}",
            format_duration(config.withdrawal_lock_duration)
        ),
        format!(
            "withdrawal unlock duration  {}",
            format_duration(config.withdrawal_unlock_duration)
        ),
        format!(
            "reward maturity duration    {}",
            format_duration(config.reward_maturity_duration)
        ),
        format!("reward share percent        {}", config.reward_share_percent),
        format!(
            "parameter update delay      {}",
            format_duration(PARAM_UPDATE_DELAY)
        ),
    ]
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, &cli.log_level)?;

    match cli.command {
        Command::CheckConfig { config } => {
            let config = load_config(&config)?;
            for line in describe(&config) {
                println!("{line}");
            }
            tracing::info!("configuration is valid");
        }
        Command::Simulate { config } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => StakingConfig::default(),
            };
            for line in simulate::run(&config)? {
                println!("{line}");
            }
        }
    }
    Ok(())
}

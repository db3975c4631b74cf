//! Command-line interface.

mod fetch;
mod plans;
mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use streamflix::config::Config;

#[derive(Parser, Debug)]
#[command(name = "streamflix", version, about = "StreamFlix TMDB gateway and entitlements")]
pub(crate) struct Cli {
    /// Path to a config file (default: ~/.streamflix/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Run the HTTP API server
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Fetch a TMDB resource through the cache and rate limiter
    ///
    /// Resources: trending, popular, tv-popular, tv-top-rated, tv-on-the-air,
    /// tv-airing-today, genre <id>, movie <id>, tv <id>, season <show> <n>,
    /// search <text...>
    Fetch {
        resource: String,
        args: Vec<String>,
        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Show subscription plans and their features
    Plans {
        /// Show a single plan
        #[arg(long)]
        plan: Option<String>,
    },
    /// Check one entitlement for a plan
    Check {
        #[arg(long)]
        plan: String,
        #[command(subcommand)]
        what: CheckTarget,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CheckTarget {
    /// Named feature (download, hd, 4k, exclusive, prioritySupport,
    /// earlyAccess, noAds, multipleDevices)
    Feature { name: String },
    /// Video quality (SD, HD, 4K)
    Quality { quality: String },
    /// Device headroom given the current device count
    Devices { current: u32 },
}

pub(crate) async fn run() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::load().with_context(|| "Failed to load configuration")?,
    };
    streamflix::logging::init(&config.logging);

    match cli.command {
        Command::Serve { port } => serve::cmd_serve(config, port).await,
        Command::Fetch {
            resource,
            args,
            compact,
        } => fetch::cmd_fetch(&config, &resource, &args, compact).await,
        Command::Plans { plan } => plans::cmd_plans(&config, plan.as_deref()),
        Command::Check { plan, what } => plans::cmd_check(&config, &plan, &what),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch_with_args() {
        let cli = Cli::try_parse_from(["streamflix", "fetch", "season", "1399", "2"]).unwrap();
        match cli.command {
            Command::Fetch {
                resource,
                args,
                compact,
            } => {
                assert_eq!(resource, "season");
                assert_eq!(args, vec!["1399", "2"]);
                assert!(!compact);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_feature() {
        let cli = Cli::try_parse_from([
            "streamflix",
            "check",
            "--plan",
            "premium",
            "feature",
            "4k",
        ])
        .unwrap();
        match cli.command {
            Command::Check { plan, what } => {
                assert_eq!(plan, "premium");
                assert_eq!(what, CheckTarget::Feature { name: "4k".into() });
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["streamflix", "plans", "--config", "/tmp/c.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.json")));
    }
}

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::keyboard::Key;
use crate::virtualize::Px;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "infical",
    version,
    about = "Infinite-scroll calendar engine with a terminal renderer",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Calendar config file (TOML).
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Date treated as today, e.g. `2020-03-15` or `-2w`.
    #[arg(long = "today", global = true)]
    pub today: Option<String>,

    /// `on`, `off` or `auto`.
    #[arg(long = "color", default_value = "on", global = true)]
    pub color: String,

    /// Select several dates instead of replacing the selection.
    #[arg(long = "multi", global = true)]
    pub multi: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the built months with their rows and offsets.
    Months,

    /// Render the mounted months as text.
    Show {
        /// Scroll so this date's row is at the top.
        #[arg(long = "at", conflicts_with = "offset")]
        at: Option<String>,

        /// Scroll to this pixel offset.
        #[arg(long = "offset")]
        offset: Option<Px>,
    },

    /// Select each date in turn and print the resulting set.
    Select {
        #[arg(required = true)]
        dates: Vec<String>,

        #[arg(long = "json")]
        json: bool,
    },

    /// Print the scroll offset of a date.
    Offset { date: String },

    /// Replay keyboard navigation, e.g. `down,down,right,enter`.
    Keys {
        #[arg(
            required = true,
            value_delimiter = ',',
            value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<Key>())
        )]
        keys: Vec<Key>,
    },
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = match (quiet, verbose) {
        (q, _) if q >= 2 => "error",
        (1, _) => "warn",
        (_, v) if v >= 3 => "trace",
        (_, 2) => "debug",
        (_, 1) => "info",
        _ => "warn",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "subscriber already installed; keeping it");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_key_list() {
        let cli = GlobalCli::parse_from(["infical", "keys", "down,down,enter"]);
        let Command::Keys { keys } = cli.command else {
            panic!("expected keys command");
        };
        assert_eq!(keys, vec![Key::Down, Key::Down, Key::Enter]);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = GlobalCli::parse_from([
            "infical", "show", "--at", "2020-03-01", "-vv", "--today", "2020-01-01",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.today.as_deref(), Some("2020-01-01"));
        assert!(matches!(
            cli.command,
            Command::Show { at: Some(_), offset: None }
        ));
    }

    #[test]
    fn at_and_offset_conflict() {
        let parsed = GlobalCli::try_parse_from([
            "infical", "show", "--at", "today", "--offset", "10",
        ]);
        assert!(parsed.is_err());
    }
}

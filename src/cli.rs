//! CLI interface for quad.
//!
//! Each subcommand is non-interactive: arguments in, output out. Records and
//! ids go to stdout; confirmations and hints go to stderr, so
//! `id=$(quad trip post ...)` captures just the id.
//!
//! Commands split by board:
//!
//! - `quad trip ...`: travel plans
//! - `quad order ...`: the delivery board
//! - `quad alert ...`: the emergency board
//! - `quad profile ...`: the acting member's profile
//! - `quad history`, `quad match`, `quad score`: views across boards
//!
//! Record ids take a full UUID or unambiguous prefix (e.g. `a3b`).

mod alert;
mod format;
mod history;
mod matches;
mod order;
mod profile;
mod trip;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config::Config;
use crate::identity;
use crate::storage::Storage;

use alert::AlertCommand;
use order::OrderCommand;
use profile::ProfileCommand;
use trip::TripCommand;

/// quad: travel plans, delivery runs, and alerts for your campus.
#[derive(Debug, Parser)]
#[command(name = "quad", version, after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Act as this member (normally a campus email).
    /// Overrides `QUAD_USER` and the `user` config key.
    #[arg(long = "as", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: carrying an order on your way
  1. quad trip post --from "Hostel 1" --to "City Mall" --time "5:00 PM"
     → prints a trip ID (e.g. a3b0fc12) and how many open orders match
  2. quad trip matches a3b
  3. quad order accept 7c1
  4. the poster confirms delivery: quad order complete 7c1

Requesting something:
  quad order post --kind request --item "Notebook" --location "Stationery Shop" --destination "Hostel 4"
  quad match --watch"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Post and browse travel plans.
    Trip {
        #[command(subcommand)]
        command: TripCommand,
    },

    /// Post, accept, and complete delivery orders.
    Order {
        #[command(subcommand)]
        command: OrderCommand,
    },

    /// Raise, list, and resolve emergency alerts.
    #[command(disable_help_subcommand = true)]
    Alert {
        #[command(subcommand)]
        command: AlertCommand,
    },

    /// Set up and view your profile.
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Your trips, completed deliveries, and alerts.
    History {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Smart matches: open orders you could carry on a posted trip.
    ///
    /// Lists every trip with at least one open order whose location
    /// resembles the trip's destination.
    Match {
        /// Only your own trips.
        #[arg(long)]
        mine: bool,

        /// Re-run whenever the boards change, until interrupted.
        #[arg(long, conflicts_with = "json")]
        watch: bool,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Print the similarity score of two place names.
    Score {
        a: String,
        b: String,
    },
}

/// What every command handler gets: config, store, and the `--as` override.
pub(crate) struct Session<'a> {
    pub config: &'a Config,
    pub storage: &'a Storage,
    user_flag: Option<&'a str>,
}

impl Session<'_> {
    /// The acting member, resolved on first need.
    pub fn user(&self) -> Result<String, String> {
        identity::resolve_user(self.user_flag, self.config)
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "dispatching");

    let session = Session {
        config,
        storage,
        user_flag: cli.user.as_deref(),
    };

    match cli.command {
        Command::Trip { command } => trip::run(&session, command),
        Command::Order { command } => order::run(&session, command),
        Command::Alert { command } => alert::run(&session, command),
        Command::Profile { command } => profile::run(&session, command),
        Command::History { json } => history::cmd_history(&session, json),
        Command::Match { mine, watch, json } => {
            if watch {
                matches::cmd_watch(&session, mine)
            } else {
                matches::cmd_match(&session, mine, json)
            }
        }
        Command::Score { a, b } => {
            matches::cmd_score(&a, &b);
            Ok(())
        }
    }
}

/// Trim a free-text argument and reject it if nothing is left.
fn required(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Print `value` as pretty JSON on stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_as_after_subcommand() {
        let cli = Cli::try_parse_from(["quad", "trip", "list", "--as", "asha@campus.edu"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("asha@campus.edu"));
    }

    #[test]
    fn watch_conflicts_with_json() {
        let err = Cli::try_parse_from(["quad", "match", "--watch", "--json"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn required_trims() {
        assert_eq!(required("item", "  Notebook ").unwrap(), "Notebook");
        assert_eq!(required("item", "   ").unwrap_err(), "item must not be empty");
    }
}

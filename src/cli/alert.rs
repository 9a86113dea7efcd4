//! Emergency board commands: sos, help, list, resolve.

use clap::{Subcommand, ValueEnum};

use crate::model::{Alert, AlertKind, AlertStatus, short_id};
use crate::storage::AlertFilter;

use super::format::format_alert;
use super::{Session, print_json, required};

#[derive(Debug, Subcommand)]
pub enum AlertCommand {
    /// Broadcast an SOS to everyone. Prints the alert ID.
    Sos {
        /// Latitude of where you are.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of where you are.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// Ask for help with something less urgent. Prints the alert ID.
    Help {
        #[arg(long, value_enum, default_value_t = HelpKindArg::Medical)]
        kind: HelpKindArg,

        /// What's going on.
        description: String,
    },

    /// List active alerts, newest first.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Mark an alert as resolved.
    Resolve {
        /// Alert ID: full UUID or unambiguous prefix.
        alert: String,
    },
}

/// CLI-facing help kind. SOS has its own subcommand.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HelpKindArg {
    Medical,
    Safety,
    Other,
}

impl HelpKindArg {
    fn to_domain(self) -> AlertKind {
        match self {
            Self::Medical => AlertKind::Medical,
            Self::Safety => AlertKind::Safety,
            Self::Other => AlertKind::Other,
        }
    }
}

pub(super) fn run(session: &Session<'_>, command: AlertCommand) -> Result<(), String> {
    match command {
        AlertCommand::Sos { lat, lon } => cmd_sos(session, lat.zip(lon)),
        AlertCommand::Help { kind, description } => cmd_help(session, kind, &description),
        AlertCommand::List { json } => cmd_list(session, json),
        AlertCommand::Resolve { alert } => cmd_resolve(session, &alert),
    }
}

fn cmd_sos(session: &Session<'_>, coordinates: Option<(f64, f64)>) -> Result<(), String> {
    if let Some((lat, lon)) = coordinates
        && (!(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon))
    {
        return Err(format!("coordinates out of range: {lat}, {lon}"));
    }

    let alert = Alert::sos(&session.user()?, coordinates);
    session
        .storage
        .insert_alert(&alert)
        .map_err(|e| format!("failed to raise SOS: {e}"))?;

    println!("{}", short_id(alert.id));
    if coordinates.is_none() {
        eprintln!("SOS broadcast without location.");
    } else {
        eprintln!("SOS broadcast.");
    }
    Ok(())
}

fn cmd_help(session: &Session<'_>, kind: HelpKindArg, description: &str) -> Result<(), String> {
    let alert = Alert::help(
        &session.user()?,
        kind.to_domain(),
        &required("description", description)?,
    );
    session
        .storage
        .insert_alert(&alert)
        .map_err(|e| format!("failed to post alert: {e}"))?;

    println!("{}", short_id(alert.id));
    Ok(())
}

fn cmd_list(session: &Session<'_>, json: bool) -> Result<(), String> {
    let filter = AlertFilter {
        status: Some(AlertStatus::Active),
        ..AlertFilter::default()
    };
    let alerts = session
        .storage
        .list_alerts(&filter)
        .map_err(|e| format!("failed to list alerts: {e}"))?;

    if json {
        return print_json(&alerts);
    }

    if alerts.is_empty() {
        println!("No active alerts");
        return Ok(());
    }
    for alert in &alerts {
        println!("{}", format_alert(alert));
    }
    Ok(())
}

fn cmd_resolve(session: &Session<'_>, reference: &str) -> Result<(), String> {
    let storage = session.storage;
    let mut alert = storage
        .resolve_alert(reference)
        .and_then(|id| storage.load_alert(id))
        .map_err(|e| format!("failed to load alert: {e}"))?;

    alert.resolve().map_err(|e| e.to_string())?;
    storage
        .update_alert(&alert)
        .map_err(|e| format!("failed to update alert: {e}"))?;

    println!("{}", short_id(alert.id));
    Ok(())
}

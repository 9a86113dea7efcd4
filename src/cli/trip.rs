//! Travel plan commands: post, list, matches.

use clap::{Subcommand, ValueEnum};
use jiff::Timestamp;
use serde::Serialize;
use uuid::Uuid;

use crate::matcher;
use crate::model::{Order, OrderStatus, TravelMode, Trip, short_id};
use crate::storage::{OrderFilter, TripFilter};

use super::format::{format_order, format_trip};
use super::{Session, print_json, required};

#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// Post a travel plan. Prints the trip ID.
    Post {
        /// Where you're leaving from (e.g. "Hostel 1").
        #[arg(long = "from")]
        origin: String,

        /// Where you're heading (e.g. "Airport").
        #[arg(long = "to")]
        destination: String,

        /// When, as free text (e.g. "5:00 PM").
        #[arg(long)]
        time: String,

        #[arg(long, value_enum, default_value_t = ModeArg::Cab)]
        mode: ModeArg,
    },

    /// List travel plans, newest first.
    List {
        /// Only your own trips.
        #[arg(long)]
        mine: bool,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Open orders this trip could carry.
    Matches {
        /// Trip ID: full UUID or unambiguous prefix.
        trip: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

/// CLI-facing travel mode, mapped to the domain `TravelMode`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Cab,
    Auto,
    Walking,
    Bus,
}

impl ModeArg {
    fn to_domain(self) -> TravelMode {
        match self {
            Self::Cab => TravelMode::Cab,
            Self::Auto => TravelMode::Auto,
            Self::Walking => TravelMode::Walking,
            Self::Bus => TravelMode::Bus,
        }
    }
}

pub(super) fn run(session: &Session<'_>, command: TripCommand) -> Result<(), String> {
    match command {
        TripCommand::Post {
            origin,
            destination,
            time,
            mode,
        } => cmd_post(session, &origin, &destination, &time, mode),
        TripCommand::List { mine, json } => cmd_list(session, mine, json),
        TripCommand::Matches { trip, json } => cmd_matches(session, &trip, json),
    }
}

fn cmd_post(
    session: &Session<'_>,
    origin: &str,
    destination: &str,
    time: &str,
    mode: ModeArg,
) -> Result<(), String> {
    let trip = Trip {
        id: Uuid::new_v4(),
        user: session.user()?,
        origin: required("--from", origin)?,
        destination: required("--to", destination)?,
        travel_time: required("--time", time)?,
        mode: mode.to_domain(),
        created_at: Timestamp::now(),
    };

    session
        .storage
        .insert_trip(&trip)
        .map_err(|e| format!("failed to post trip: {e}"))?;

    println!("{}", short_id(trip.id));

    let open = open_orders(session)?;
    let matched = matcher::find_matches(&trip, &open).len();
    if matched > 0 {
        eprintln!(
            "{matched} open order(s) match this trip; see `quad trip matches {}`",
            short_id(trip.id)
        );
    }
    Ok(())
}

fn cmd_list(session: &Session<'_>, mine: bool, json: bool) -> Result<(), String> {
    let filter = TripFilter {
        user: if mine { Some(session.user()?) } else { None },
    };
    let trips = session
        .storage
        .list_trips(&filter)
        .map_err(|e| format!("failed to list trips: {e}"))?;

    if json {
        return print_json(&trips);
    }

    if trips.is_empty() {
        println!("No trips");
        return Ok(());
    }
    for trip in &trips {
        println!("{}", format_trip(trip));
    }
    Ok(())
}

#[derive(Serialize)]
struct TripMatchesView<'a> {
    trip: &'a Trip,
    orders: Vec<&'a Order>,
}

fn cmd_matches(session: &Session<'_>, reference: &str, json: bool) -> Result<(), String> {
    let storage = session.storage;
    let trip = storage
        .resolve_trip(reference)
        .and_then(|id| storage.load_trip(id))
        .map_err(|e| format!("failed to load trip: {e}"))?;

    let open = open_orders(session)?;
    let orders = matcher::find_matches(&trip, &open);

    if json {
        return print_json(&TripMatchesView {
            trip: &trip,
            orders,
        });
    }

    println!("{}", format_trip(&trip));
    if orders.is_empty() {
        println!("  No matching orders");
    }
    for order in orders {
        println!("  {}", format_order(order));
    }
    Ok(())
}

/// Snapshot of every order still waiting for a carrier.
pub(super) fn open_orders(session: &Session<'_>) -> Result<Vec<Order>, String> {
    let filter = OrderFilter {
        status: Some(OrderStatus::Open),
        ..OrderFilter::default()
    };
    session
        .storage
        .list_orders(&filter)
        .map_err(|e| format!("failed to list orders: {e}"))
}

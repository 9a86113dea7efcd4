//! Cross-board views: smart matches, watch mode, and raw scores.

use std::fmt::Write as _;
use std::thread;
use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;
use tracing::{debug, warn};

use crate::matcher::{self, MATCH_THRESHOLD, TripMatches};
use crate::model::{Order, Trip};
use crate::storage::TripFilter;

use super::format::{format_order, format_trip};
use super::trip::open_orders;
use super::{Session, print_json};

#[derive(Serialize)]
struct MatchView<'a> {
    trip: &'a Trip,
    orders: Vec<&'a Order>,
}

pub(super) fn cmd_match(session: &Session<'_>, mine: bool, json: bool) -> Result<(), String> {
    let (trips, orders) = snapshot(session, mine)?;
    let matched = matcher::match_trips(&trips, &orders);

    if json {
        let views: Vec<MatchView<'_>> = matched
            .into_iter()
            .map(|m| MatchView {
                trip: m.trip,
                orders: m.orders,
            })
            .collect();
        return print_json(&views);
    }

    print!("{}", render(&matched));
    Ok(())
}

/// Print matches, then again each time another process writes to the store.
///
/// Runs until the process is interrupted.
pub(super) fn cmd_watch(session: &Session<'_>, mine: bool) -> Result<(), String> {
    let interval = Duration::from_millis(session.config.watch_interval_ms);
    let mut version = session
        .storage
        .data_version()
        .map_err(|e| format!("failed to read store version: {e}"))?;

    loop {
        let (trips, orders) = snapshot(session, mine)?;
        println!("── {} ──", Timestamp::now().strftime("%H:%M:%S"));
        print!("{}", render(&matcher::match_trips(&trips, &orders)));

        loop {
            thread::sleep(interval);
            match session.storage.changes_since(&mut version) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => warn!("failed to poll store: {e}"),
            }
        }
        debug!(version, "boards changed, re-matching");
    }
}

pub(super) fn cmd_score(a: &str, b: &str) {
    let score = matcher::score(a, b);
    let verdict = if score > MATCH_THRESHOLD {
        "match"
    } else {
        "no match"
    };
    println!("{score:.2} ({verdict})");
}

/// Trips and open orders, loaded once per rendering.
fn snapshot(session: &Session<'_>, mine: bool) -> Result<(Vec<Trip>, Vec<Order>), String> {
    let filter = TripFilter {
        user: if mine { Some(session.user()?) } else { None },
    };
    let trips = session
        .storage
        .list_trips(&filter)
        .map_err(|e| format!("failed to list trips: {e}"))?;
    let orders = open_orders(session)?;
    Ok((trips, orders))
}

fn render(matched: &[TripMatches<'_, Trip, Order>]) -> String {
    if matched.is_empty() {
        return "No matches\n".to_string();
    }

    let mut out = String::new();
    for m in matched {
        let _ = writeln!(out, "{}", format_trip(m.trip));
        for order in &m.orders {
            let _ = writeln!(out, "  {}", format_order(order));
        }
    }
    out
}

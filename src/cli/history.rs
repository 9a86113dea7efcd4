//! Activity history: everything the acting member has been part of.

use serde::Serialize;

use crate::model::{Alert, Order, OrderStatus, Trip};
use crate::storage::{AlertFilter, OrderFilter, TripFilter};

use super::format::{format_alert, format_order, format_trip};
use super::{Session, print_json};

/// The member's trips, completed deliveries (posted or carried), and alerts.
#[derive(Debug, Serialize)]
struct History {
    trips: Vec<Trip>,
    orders: Vec<Order>,
    alerts: Vec<Alert>,
}

pub(super) fn cmd_history(session: &Session<'_>, json: bool) -> Result<(), String> {
    let history = load(session)?;

    if json {
        return print_json(&history);
    }

    section("Trips", &history.trips, format_trip);
    section("Deliveries", &history.orders, format_order);
    section("Alerts", &history.alerts, format_alert);
    Ok(())
}

fn section<T>(title: &str, items: &[T], line: fn(&T) -> String) {
    println!("{title} ({})", items.len());
    for item in items {
        println!("  {}", line(item));
    }
}

fn load(session: &Session<'_>) -> Result<History, String> {
    let user = session.user()?;
    let storage = session.storage;

    let trips = storage
        .list_trips(&TripFilter {
            user: Some(user.clone()),
        })
        .map_err(|e| format!("failed to list trips: {e}"))?;

    let orders = storage
        .list_orders(&OrderFilter {
            status: Some(OrderStatus::Completed),
            participant: Some(user.clone()),
            ..OrderFilter::default()
        })
        .map_err(|e| format!("failed to list orders: {e}"))?;

    let alerts = storage
        .list_alerts(&AlertFilter {
            user: Some(user),
            ..AlertFilter::default()
        })
        .map_err(|e| format!("failed to list alerts: {e}"))?;

    Ok(History {
        trips,
        orders,
        alerts,
    })
}

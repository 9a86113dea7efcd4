//! Output formatting for CLI display.

use crate::model::{Alert, Order, OrderKind, Profile, Trip, short_id};

/// The part of an email before `@`, as shown on board cards.
pub(super) fn handle(user: &str) -> &str {
    user.split('@').next().unwrap_or(user)
}

pub(super) fn format_trip(trip: &Trip) -> String {
    format!(
        "{}  {} → {}  [{}, {}]  {}",
        short_id(trip.id),
        trip.origin,
        trip.destination,
        trip.travel_time,
        trip.mode,
        handle(&trip.user),
    )
}

pub(super) fn format_order(order: &Order) -> String {
    let what = match order.kind {
        OrderKind::Trip => "run",
        OrderKind::Request => "want",
    };
    let mut line = format!(
        "{}  [{}] {what}: {} @ {}",
        short_id(order.id),
        order.status,
        order.item,
        order.location,
    );
    if let Some(dest) = &order.destination {
        line.push_str(&format!(" → {dest}"));
    }
    line.push_str(&format!("  ₹{}  {}", order.delivery_fee, handle(&order.user)));
    if let Some(carrier) = &order.accepted_by {
        line.push_str(&format!(" (carried by {})", handle(carrier)));
    }
    line
}

pub(super) fn format_alert(alert: &Alert) -> String {
    let mut line = format!(
        "{}  [{}] {}: {}  {}",
        short_id(alert.id),
        alert.status,
        alert.kind,
        alert.description,
        handle(&alert.user),
    );
    if let (Some(lat), Some(lon)) = (alert.latitude, alert.longitude) {
        line.push_str(&format!(" at {lat:.5}, {lon:.5}"));
    }
    line
}

pub(super) fn format_profile(profile: &Profile) -> String {
    let routes = if profile.frequent_routes.is_empty() {
        "none".to_string()
    } else {
        profile.frequent_routes.join(", ")
    };
    let notifications = if profile.notifications_enabled {
        "on"
    } else {
        "off"
    };
    format!(
        "{}\n  user:          {}\n  diet:          {}\n  routes:        {routes}\n  notifications: {notifications}",
        profile.full_name, profile.user, profile.diet,
    )
}

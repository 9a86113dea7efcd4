//! Delivery board commands: post, list, accept, complete.

use clap::{Subcommand, ValueEnum};
use jiff::Timestamp;
use uuid::Uuid;

use crate::model::{Order, OrderKind, OrderStatus, short_id};
use crate::storage::OrderFilter;

use super::format::format_order;
use super::{Session, print_json, required};

#[derive(Debug, Subcommand)]
pub enum OrderCommand {
    /// Post an order. Prints the order ID.
    Post {
        /// `trip`: you're going and can bring things back.
        /// `request`: you want something brought to you.
        #[arg(long, value_enum)]
        kind: KindArg,

        /// What to bring (e.g. "Notebook", "2x Veg Burger").
        #[arg(long)]
        item: String,

        /// Where to pick it up (e.g. "Stationery Shop").
        #[arg(long)]
        location: String,

        /// Where to drop it off (e.g. "Hostel 4").
        #[arg(long)]
        destination: Option<String>,

        /// Delivery fee in rupees. Defaults to `delivery-fee` from config.
        #[arg(long)]
        fee: Option<u32>,
    },

    /// List orders, newest first. Completed orders are hidden unless `--all`.
    List {
        #[arg(long, value_enum)]
        kind: Option<KindArg>,

        /// Include completed orders.
        #[arg(long)]
        all: bool,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Accept an open order: you'll carry it.
    Accept {
        /// Order ID: full UUID or unambiguous prefix.
        order: String,
    },

    /// Confirm delivery of an order you posted.
    Complete {
        /// Order ID: full UUID or unambiguous prefix.
        order: String,
    },
}

/// CLI-facing order kind, mapped to the domain `OrderKind`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Trip,
    Request,
}

impl KindArg {
    fn to_domain(self) -> OrderKind {
        match self {
            Self::Trip => OrderKind::Trip,
            Self::Request => OrderKind::Request,
        }
    }
}

pub(super) fn run(session: &Session<'_>, command: OrderCommand) -> Result<(), String> {
    match command {
        OrderCommand::Post {
            kind,
            item,
            location,
            destination,
            fee,
        } => cmd_post(session, kind, &item, &location, destination.as_deref(), fee),
        OrderCommand::List { kind, all, json } => cmd_list(session, kind, all, json),
        OrderCommand::Accept { order } => cmd_accept(session, &order),
        OrderCommand::Complete { order } => cmd_complete(session, &order),
    }
}

fn cmd_post(
    session: &Session<'_>,
    kind: KindArg,
    item: &str,
    location: &str,
    destination: Option<&str>,
    fee: Option<u32>,
) -> Result<(), String> {
    let destination = destination
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(String::from);

    let order = Order {
        id: Uuid::new_v4(),
        user: session.user()?,
        kind: kind.to_domain(),
        item: required("--item", item)?,
        location: required("--location", location)?,
        destination,
        delivery_fee: fee.unwrap_or(session.config.delivery_fee),
        status: OrderStatus::Open,
        accepted_by: None,
        created_at: Timestamp::now(),
    };

    session
        .storage
        .insert_order(&order)
        .map_err(|e| format!("failed to post order: {e}"))?;

    println!("{}", short_id(order.id));
    Ok(())
}

fn cmd_list(
    session: &Session<'_>,
    kind: Option<KindArg>,
    all: bool,
    json: bool,
) -> Result<(), String> {
    let filter = OrderFilter {
        exclude_status: if all {
            None
        } else {
            Some(OrderStatus::Completed)
        },
        kind: kind.map(KindArg::to_domain),
        ..OrderFilter::default()
    };
    let orders = session
        .storage
        .list_orders(&filter)
        .map_err(|e| format!("failed to list orders: {e}"))?;

    if json {
        return print_json(&orders);
    }

    if orders.is_empty() {
        println!("No orders");
        return Ok(());
    }
    for order in &orders {
        println!("{}", format_order(order));
    }
    Ok(())
}

fn cmd_accept(session: &Session<'_>, reference: &str) -> Result<(), String> {
    let user = session.user()?;
    let mut order = load(session, reference)?;
    let previous = order.status;

    order.accept(&user).map_err(|e| e.to_string())?;
    session
        .storage
        .update_order(&order, previous)
        .map_err(|e| format!("failed to update order: {e}"))?;

    println!("{}", short_id(order.id));
    eprintln!(
        "Accepted: {} from {}. Fee ₹{} on delivery.",
        order.item, order.location, order.delivery_fee
    );
    Ok(())
}

fn cmd_complete(session: &Session<'_>, reference: &str) -> Result<(), String> {
    let user = session.user()?;
    let mut order = load(session, reference)?;
    let previous = order.status;

    order.complete(&user).map_err(|e| e.to_string())?;
    session
        .storage
        .update_order(&order, previous)
        .map_err(|e| format!("failed to update order: {e}"))?;

    println!("{}", short_id(order.id));
    eprintln!("Delivered: {}", order.item);
    Ok(())
}

fn load(session: &Session<'_>, reference: &str) -> Result<Order, String> {
    let storage = session.storage;
    storage
        .resolve_order(reference)
        .and_then(|id| storage.load_order(id))
        .map_err(|e| format!("failed to load order: {e}"))
}

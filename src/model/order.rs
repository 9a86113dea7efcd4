//! Order types: delivery runs and item requests on the delivery board.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TransitionError, UnknownLabel};

/// A post on the delivery board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user: String,
    pub kind: OrderKind,
    pub item: String,
    /// Where the item is picked up or dropped off.
    pub location: String,
    pub destination: Option<String>,
    /// Fee paid to whoever carries the order, in rupees.
    pub delivery_fee: u32,
    pub status: OrderStatus,
    pub accepted_by: Option<String>,
    pub created_at: Timestamp,
}

/// Which side of the exchange posted the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    /// "I'm heading out, I can bring things back."
    Trip,

    /// "Please bring me something."
    Request,
}

/// Where an order stands in its lifecycle.
///
/// `Open` → `InProgress` (someone accepted it) → `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Order {
    /// Accept the order on behalf of `carrier`.
    pub fn accept(&mut self, carrier: &str) -> Result<(), TransitionError> {
        if self.status != OrderStatus::Open {
            return Err(TransitionError::Order {
                action: "accept",
                status: self.status,
            });
        }
        if self.user == carrier {
            return Err(TransitionError::OwnOrder);
        }
        self.status = OrderStatus::InProgress;
        self.accepted_by = Some(carrier.to_string());
        Ok(())
    }

    /// Mark an accepted order as delivered. Only the poster confirms delivery.
    pub fn complete(&mut self, by: &str) -> Result<(), TransitionError> {
        if self.status != OrderStatus::InProgress {
            return Err(TransitionError::Order {
                action: "complete",
                status: self.status,
            });
        }
        if self.user != by {
            return Err(TransitionError::NotPoster);
        }
        self.status = OrderStatus::Completed;
        Ok(())
    }
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trip => "trip",
            Self::Request => "request",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderKind {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trip" => Ok(Self::Trip),
            "request" => Ok(Self::Request),
            other => Err(UnknownLabel::new("order kind", other)),
        }
    }
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "In Progress" => Ok(Self::InProgress),
            "Completed" => Ok(Self::Completed),
            other => Err(UnknownLabel::new("order status", other)),
        }
    }
}

//! Core data model for quad.
//!
//! Records posted to the three boards (travel, delivery, emergency) plus
//! member profiles. Each record owns a short label vocabulary for its enums;
//! labels are what the store persists and what `--json` output shows.

mod alert;
mod order;
mod profile;
mod trip;

pub use alert::{Alert, AlertKind, AlertStatus};
pub use order::{Order, OrderKind, OrderStatus};
pub use profile::{Diet, Profile};
pub use trip::{TravelMode, Trip};

/// A stored label that doesn't name any variant of the expected enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} label: {label:?}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

impl UnknownLabel {
    pub(crate) fn new(kind: &'static str, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
        }
    }
}

/// An attempt to move a record through its lifecycle out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {action} an order that is {status}")]
    Order {
        action: &'static str,
        status: OrderStatus,
    },

    #[error("cannot accept your own order")]
    OwnOrder,

    #[error("only the poster can complete an order")]
    NotPoster,

    #[error("alert is already resolved")]
    AlertResolved,
}

/// First eight characters of an id, used wherever ids are shown to people.
pub fn short_id(id: uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

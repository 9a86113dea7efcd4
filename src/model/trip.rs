//! Trip types: a member's plan to travel somewhere.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UnknownLabel;

/// A posted travel plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub user: String,
    pub origin: String,
    pub destination: String,
    /// Free text as entered, e.g. "5:00 PM" or "Friday evening".
    pub travel_time: String,
    pub mode: TravelMode,
    pub created_at: Timestamp,
}

/// How the member is getting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TravelMode {
    #[default]
    Cab,
    Auto,
    Walking,
    Bus,
}

impl TravelMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cab => "Cab",
            Self::Auto => "Auto",
            Self::Walking => "Walking",
            Self::Bus => "Bus",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cab" => Ok(Self::Cab),
            "Auto" => Ok(Self::Auto),
            "Walking" => Ok(Self::Walking),
            "Bus" => Ok(Self::Bus),
            other => Err(UnknownLabel::new("travel mode", other)),
        }
    }
}

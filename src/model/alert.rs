//! Alert types: the emergency board.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{TransitionError, UnknownLabel};

/// Description attached to every one-tap SOS.
pub const SOS_DESCRIPTION: &str = "EMERGENCY: User requested immediate help!";

/// A broadcast call for help.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub user: String,
    pub kind: AlertKind,
    pub description: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_sos: bool,
    pub status: AlertStatus,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    #[serde(rename = "SOS")]
    Sos,
    Medical,
    Safety,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl Alert {
    /// A one-tap SOS, optionally carrying the member's coordinates.
    pub fn sos(user: &str, coordinates: Option<(f64, f64)>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.to_string(),
            kind: AlertKind::Sos,
            description: SOS_DESCRIPTION.to_string(),
            latitude: coordinates.map(|(lat, _)| lat),
            longitude: coordinates.map(|(_, lon)| lon),
            is_sos: true,
            status: AlertStatus::Active,
            created_at: Timestamp::now(),
        }
    }

    /// A described request for help without location.
    pub fn help(user: &str, kind: AlertKind, description: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user: user.to_string(),
            kind,
            description: description.to_string(),
            latitude: None,
            longitude: None,
            is_sos: false,
            status: AlertStatus::Active,
            created_at: Timestamp::now(),
        }
    }

    pub fn resolve(&mut self) -> Result<(), TransitionError> {
        if self.status == AlertStatus::Resolved {
            return Err(TransitionError::AlertResolved);
        }
        self.status = AlertStatus::Resolved;
        Ok(())
    }
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sos => "SOS",
            Self::Medical => "Medical",
            Self::Safety => "Safety",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOS" => Ok(Self::Sos),
            "Medical" => Ok(Self::Medical),
            "Safety" => Ok(Self::Safety),
            "Other" => Ok(Self::Other),
            other => Err(UnknownLabel::new("alert kind", other)),
        }
    }
}

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(Self::Active),
            "Resolved" => Ok(Self::Resolved),
            other => Err(UnknownLabel::new("alert status", other)),
        }
    }
}

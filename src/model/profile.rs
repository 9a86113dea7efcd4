//! Member profile, filled in once during setup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownLabel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The member's identity; one profile per user.
    pub user: String,
    pub full_name: String,
    pub diet: Diet,
    /// Places the member travels to often, e.g. "Airport" or "City Mall".
    pub frequent_routes: Vec<String>,
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Diet {
    #[default]
    Veg,
    #[serde(rename = "Non-Veg")]
    NonVeg,
}

impl Diet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Veg => "Veg",
            Self::NonVeg => "Non-Veg",
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Diet {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Veg" => Ok(Self::Veg),
            "Non-Veg" => Ok(Self::NonVeg),
            other => Err(UnknownLabel::new("diet", other)),
        }
    }
}

//! Profile commands: setup, show, notify.

use clap::{Subcommand, ValueEnum};

use crate::model::{Diet, Profile};

use super::format::format_profile;
use super::{Session, print_json, required};

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Create or replace your profile.
    Setup {
        /// Your full name.
        #[arg(long)]
        name: String,

        #[arg(long, value_enum, default_value_t = DietArg::Veg)]
        diet: DietArg,

        /// A place you travel to often. Repeat for several.
        #[arg(long = "route")]
        routes: Vec<String>,

        /// Turn notifications off.
        #[arg(long)]
        no_notify: bool,
    },

    /// Show your profile.
    Show {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Turn notifications on or off.
    Notify {
        #[arg(value_enum)]
        state: Toggle,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DietArg {
    Veg,
    NonVeg,
}

impl DietArg {
    fn to_domain(self) -> Diet {
        match self {
            Self::Veg => Diet::Veg,
            Self::NonVeg => Diet::NonVeg,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

pub(super) fn run(session: &Session<'_>, command: ProfileCommand) -> Result<(), String> {
    match command {
        ProfileCommand::Setup {
            name,
            diet,
            routes,
            no_notify,
        } => cmd_setup(session, &name, diet, &routes, !no_notify),
        ProfileCommand::Show { json } => cmd_show(session, json),
        ProfileCommand::Notify { state } => cmd_notify(session, state),
    }
}

fn cmd_setup(
    session: &Session<'_>,
    name: &str,
    diet: DietArg,
    routes: &[String],
    notify: bool,
) -> Result<(), String> {
    let mut frequent_routes: Vec<String> = Vec::new();
    for route in routes.iter().map(|r| r.trim()).filter(|r| !r.is_empty()) {
        if !frequent_routes.iter().any(|r| r.eq_ignore_ascii_case(route)) {
            frequent_routes.push(route.to_string());
        }
    }

    let profile = Profile {
        user: session.user()?,
        full_name: required("--name", name)?,
        diet: diet.to_domain(),
        frequent_routes,
        notifications_enabled: notify,
    };

    session
        .storage
        .upsert_profile(&profile)
        .map_err(|e| format!("failed to save profile: {e}"))?;

    eprintln!("Profile saved for {}", profile.user);
    Ok(())
}

fn cmd_show(session: &Session<'_>, json: bool) -> Result<(), String> {
    let profile = load(session)?;
    if json {
        return print_json(&profile);
    }
    println!("{}", format_profile(&profile));
    Ok(())
}

fn cmd_notify(session: &Session<'_>, state: Toggle) -> Result<(), String> {
    let mut profile = load(session)?;
    profile.notifications_enabled = matches!(state, Toggle::On);

    session
        .storage
        .upsert_profile(&profile)
        .map_err(|e| format!("failed to save profile: {e}"))?;

    let label = if profile.notifications_enabled {
        "on"
    } else {
        "off"
    };
    eprintln!("Notifications {label}");
    Ok(())
}

fn load(session: &Session<'_>) -> Result<Profile, String> {
    let user = session.user()?;
    session
        .storage
        .load_profile(&user)
        .map_err(|e| format!("failed to load profile: {e}"))?
        .ok_or_else(|| format!("no profile for {user}; run `quad profile setup`"))
}

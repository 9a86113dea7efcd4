//! Who is acting.
//!
//! Every command that posts, accepts, or reads "my" records needs a member.
//! Rather than requiring `--as` on every invocation, the member is resolved
//! through a chain:
//!
//! 1. `--as <user>`: explicit per-command override
//! 2. `QUAD_USER` env var: shell/session level
//! 3. `user` in `config.toml`: default for a single-member machine
//!
//! A resolved identity is a plain string, normally the member's campus email.

use std::env;

use crate::config::Config;

/// Error message shown when no identity can be resolved.
pub const USER_REQUIRED: &str = "user required: pass --as <user>, \
    set QUAD_USER, or add `user = \"...\"` to ~/.quad/config.toml";

/// Resolve the acting member from the tiered resolution chain.
pub fn resolve_user(explicit: Option<&str>, config: &Config) -> Result<String, String> {
    let from_env = env::var("QUAD_USER").ok();
    resolve_from(explicit, from_env.as_deref(), config)
}

fn resolve_from(
    explicit: Option<&str>,
    from_env: Option<&str>,
    config: &Config,
) -> Result<String, String> {
    [explicit, from_env, config.user.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(String::from)
        .ok_or_else(|| USER_REQUIRED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(user: Option<&str>) -> Config {
        Config {
            user: user.map(String::from),
            ..Config::default()
        }
    }

    #[test]
    fn explicit_wins() {
        let config = config_with(Some("config@campus.edu"));
        let user = resolve_from(Some("asha@campus.edu"), Some("env@campus.edu"), &config);
        assert_eq!(user.unwrap(), "asha@campus.edu");
    }

    #[test]
    fn env_beats_config() {
        let config = config_with(Some("config@campus.edu"));
        let user = resolve_from(None, Some("env@campus.edu"), &config);
        assert_eq!(user.unwrap(), "env@campus.edu");
    }

    #[test]
    fn falls_back_to_config() {
        let config = config_with(Some("config@campus.edu"));
        assert_eq!(resolve_from(None, None, &config).unwrap(), "config@campus.edu");
    }

    #[test]
    fn empty_env_is_skipped() {
        let config = config_with(Some("config@campus.edu"));
        assert_eq!(
            resolve_from(None, Some(""), &config).unwrap(),
            "config@campus.edu"
        );
    }

    #[test]
    fn nothing_set_is_an_error() {
        let err = resolve_from(None, None, &Config::default()).unwrap_err();
        assert_eq!(err, USER_REQUIRED);
    }
}

//! Bot configuration.
//!
//! Loads `.env` (if present) into the process environment, then reads
//! `DNT_*` variables over built-in defaults.
//!
//! Precedence: env vars > `.env` file > defaults.

use anyhow::{bail, Result};

/// Default X API origin.
pub const DEFAULT_X_API_BASE: &str = "https://api.x.com";
/// Default Scryfall API origin.
pub const DEFAULT_SCRYFALL_BASE: &str = "https://api.scryfall.com";

/// Runtime configuration for the posting job.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// OAuth 2 user-context access token for the posting account.
    pub access_token: Option<String>,
    /// Numeric id of the posting account, used to read its history.
    pub account_id: Option<String>,
    /// X API origin (overridable for tests and proxies).
    pub x_api_base: String,
    /// Scryfall API origin.
    pub scryfall_base: String,
    /// How far back to look for already-posted cards.
    pub history_months: u32,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// User-Agent sent to both APIs. Scryfall asks for one.
    pub user_agent: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            account_id: None,
            x_api_base: DEFAULT_X_API_BASE.to_string(),
            scryfall_base: DEFAULT_SCRYFALL_BASE.to_string(),
            history_months: 2,
            log_level: "info".to_string(),
            user_agent: format!("dnt-blurb-bot/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl BotConfig {
    /// Load `.env` then apply environment overrides to the defaults.
    ///
    /// Returns the config plus warnings to log once logging is up. A missing
    /// `.env` file is not an error.
    pub fn load() -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                warnings.push(format!("failed to read .env file: {}", e));
            }
        }
        let mut config = Self::default();
        warnings.extend(config.apply_overrides(|key| std::env::var(key).ok()));
        (config, warnings)
    }

    /// Apply environment variable overrides, returning a warning for each
    /// value that was ignored.
    ///
    /// Takes a resolver function for testability (avoids `set_var` in tests).
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(v) = env("DNT_X_ACCESS_TOKEN") {
            self.access_token = Some(v);
        }
        if let Some(v) = env("DNT_X_ACCOUNT_ID") {
            self.account_id = Some(v);
        }
        if let Some(v) = env("DNT_X_API_BASE") {
            self.x_api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = env("DNT_SCRYFALL_BASE") {
            self.scryfall_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = env("DNT_HISTORY_MONTHS") {
            match v.parse() {
                Ok(n) => self.history_months = n,
                Err(_) => warnings.push(format!(
                    "ignoring invalid env override DNT_HISTORY_MONTHS={}",
                    v
                )),
            }
        }
        if let Some(v) = env("DNT_LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = env("DNT_USER_AGENT") {
            self.user_agent = v;
        }
        warnings
    }

    /// Check that everything a live run needs is present.
    ///
    /// The account id is always needed (history lookup); the token only
    /// when actually posting.
    pub fn validate(&self, dry_run: bool) -> Result<()> {
        if self.account_id.as_deref().map_or(true, str::is_empty) {
            bail!("DNT_X_ACCOUNT_ID is not set");
        }
        if !dry_run && self.access_token.as_deref().map_or(true, str::is_empty) {
            bail!("DNT_X_ACCESS_TOKEN is not set (required unless --dry-run)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolver(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = BotConfig::default();
        assert_eq!(config.x_api_base, DEFAULT_X_API_BASE);
        assert_eq!(config.scryfall_base, DEFAULT_SCRYFALL_BASE);
        assert_eq!(config.history_months, 2);
        assert_eq!(config.log_level, "info");
        assert!(config.user_agent.starts_with("dnt-blurb-bot/"));
    }

    #[test]
    fn env_overrides_defaults() {
        let mut config = BotConfig::default();
        let warnings = config.apply_overrides(resolver(&[
            ("DNT_X_ACCESS_TOKEN", "tok"),
            ("DNT_X_ACCOUNT_ID", "1234"),
            ("DNT_X_API_BASE", "http://localhost:9000/"),
            ("DNT_HISTORY_MONTHS", "3"),
            ("DNT_LOG_LEVEL", "debug"),
        ]));
        assert_eq!(config.access_token.as_deref(), Some("tok"));
        assert_eq!(config.account_id.as_deref(), Some("1234"));
        assert_eq!(config.x_api_base, "http://localhost:9000");
        assert_eq!(config.history_months, 3);
        assert_eq!(config.log_level, "debug");
        assert!(warnings.is_empty());
    }

    #[test]
    fn invalid_numeric_override_is_ignored() {
        let mut config = BotConfig::default();
        let warnings = config.apply_overrides(resolver(&[("DNT_HISTORY_MONTHS", "lots")]));
        assert_eq!(config.history_months, 2);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("DNT_HISTORY_MONTHS=lots"));
    }

    #[test]
    fn validate_requires_account_and_token() {
        let mut config = BotConfig::default();
        assert!(config.validate(true).is_err());

        config.account_id = Some("1234".to_string());
        assert!(config.validate(true).is_ok());
        assert!(config.validate(false).is_err());

        config.access_token = Some("tok".to_string());
        assert!(config.validate(false).is_ok());
    }
}

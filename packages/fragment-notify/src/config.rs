use std::env;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

use crate::error::NotifyError;

/// Event htmx fires on the document when a response comes back with an error status.
pub const DEFAULT_EVENT_NAME: &str = "htmx:responseError";

pub const DEFAULT_TARGET_STATUS: u16 = 404;

pub const DEFAULT_MESSAGE: &str =
    "This page does not exist. The feature may not be implemented yet.";

/// Where the status lives in the event payload: htmx's `detail.xhr.status`,
/// then a flat `statusCode`.
pub const DEFAULT_STATUS_POINTERS: [&str; 2] = ["/xhr/status", "/statusCode"];

/// Notifier configuration.
///
/// Missing fields fall back to the defaults, which reproduce the classic
/// "blocking alert on 404" behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Event name to subscribe to on the document.
    pub event_name: String,
    /// Status code that triggers a notification.
    pub target_status: u16,
    /// Message template. `{status}` and `{path}` are substituted.
    pub message: String,
    /// Modal presentation when true, transient toast when false.
    pub blocking: bool,
    /// JSON pointers tried in order to read the status from the payload.
    pub status_pointers: Vec<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            event_name: DEFAULT_EVENT_NAME.to_string(),
            target_status: DEFAULT_TARGET_STATUS,
            message: DEFAULT_MESSAGE.to_string(),
            blocking: true,
            status_pointers: DEFAULT_STATUS_POINTERS
                .iter()
                .map(|pointer| pointer.to_string())
                .collect(),
        }
    }
}

impl NotifierConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = Self::default();

        let config = Self {
            event_name: env::var("NOTIFY_EVENT").unwrap_or(defaults.event_name),
            target_status: match env::var("NOTIFY_TARGET_STATUS") {
                Ok(raw) => raw
                    .trim()
                    .parse()
                    .context("NOTIFY_TARGET_STATUS must be a valid status code")?,
                Err(_) => defaults.target_status,
            },
            message: env::var("NOTIFY_MESSAGE").unwrap_or(defaults.message),
            blocking: match env::var("NOTIFY_BLOCKING") {
                Ok(raw) => parse_bool(&raw).context("NOTIFY_BLOCKING must be true or false")?,
                Err(_) => defaults.blocking,
            },
            status_pointers: env::var("NOTIFY_STATUS_POINTERS")
                .map(|raw| split_pointers(&raw))
                .unwrap_or(defaults.status_pointers),
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a JSON document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("invalid notifier config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the notifier cannot act on.
    pub fn validate(&self) -> Result<(), NotifyError> {
        if self.event_name.trim().is_empty() {
            return Err(NotifyError::invalid_config("event name is empty"));
        }
        if !(100..=999).contains(&self.target_status) {
            return Err(NotifyError::invalid_config(format!(
                "target status {} is not an HTTP status",
                self.target_status
            )));
        }
        if self.status_pointers.is_empty() {
            return Err(NotifyError::invalid_config("no status pointers configured"));
        }
        if let Some(bad) = self
            .status_pointers
            .iter()
            .find(|pointer| !pointer.is_empty() && !pointer.starts_with('/'))
        {
            return Err(NotifyError::invalid_config(format!(
                "status pointer `{bad}` must start with `/`"
            )));
        }
        Ok(())
    }

    pub fn with_target_status(mut self, status: u16) -> Self {
        self.target_status = status;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn with_event_name(mut self, event_name: impl Into<String>) -> Self {
        self.event_name = event_name.into();
        self
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised boolean `{other}`"),
    }
}

fn split_pointers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|pointer| !pointer.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_behaviour() {
        let config = NotifierConfig::default();
        assert_eq!(config.event_name, "htmx:responseError");
        assert_eq!(config.target_status, 404);
        assert_eq!(
            config.message,
            "This page does not exist. The feature may not be implemented yet."
        );
        assert!(config.blocking);
        assert_eq!(config.status_pointers, vec!["/xhr/status", "/statusCode"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = NotifierConfig::from_json(r#"{"target_status": 410, "blocking": false}"#)
            .unwrap();
        assert_eq!(config.target_status, 410);
        assert!(!config.blocking);
        assert_eq!(config.event_name, DEFAULT_EVENT_NAME);
        assert_eq!(config.message, DEFAULT_MESSAGE);
    }

    #[test]
    fn test_from_json_rejects_invalid_status() {
        let err = NotifierConfig::from_json(r#"{"target_status": 42}"#).unwrap_err();
        assert!(err.to_string().contains("not an HTTP status"));
    }

    #[test]
    fn test_validate_rejects_bad_pointer() {
        let config = NotifierConfig {
            status_pointers: vec!["xhr.status".to_string()],
            ..NotifierConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, NotifyError::InvalidConfig { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_event_and_pointers() {
        let config = NotifierConfig::default().with_event_name("  ");
        assert!(config.validate().is_err());

        let config = NotifierConfig {
            status_pointers: Vec::new(),
            ..NotifierConfig::default()
        };
        assert!(config.validate().is_err());
    }

    // Single test so the process-wide environment is only touched sequentially.
    #[test]
    fn test_from_env_reads_overrides_and_rejects_bad_values() {
        const VARS: [&str; 5] = [
            "NOTIFY_EVENT",
            "NOTIFY_TARGET_STATUS",
            "NOTIFY_MESSAGE",
            "NOTIFY_BLOCKING",
            "NOTIFY_STATUS_POINTERS",
        ];
        for var in VARS {
            env::remove_var(var);
        }

        assert_eq!(NotifierConfig::from_env().unwrap(), NotifierConfig::default());

        env::set_var("NOTIFY_TARGET_STATUS", "410");
        env::set_var("NOTIFY_BLOCKING", "off");
        env::set_var("NOTIFY_STATUS_POINTERS", "/statusCode, /xhr/status");
        env::set_var("NOTIFY_MESSAGE", "Gone: {path}");

        let config = NotifierConfig::from_env().unwrap();
        assert_eq!(config.target_status, 410);
        assert!(!config.blocking);
        assert_eq!(config.status_pointers, vec!["/statusCode", "/xhr/status"]);
        assert_eq!(config.message, "Gone: {path}");
        assert_eq!(config.event_name, DEFAULT_EVENT_NAME);

        env::set_var("NOTIFY_TARGET_STATUS", "four-oh-four");
        let err = NotifierConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("NOTIFY_TARGET_STATUS"));

        env::set_var("NOTIFY_TARGET_STATUS", "404");
        env::set_var("NOTIFY_BLOCKING", "sometimes");
        let err = NotifierConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("NOTIFY_BLOCKING"));

        env::set_var("NOTIFY_BLOCKING", "true");
        env::set_var("NOTIFY_STATUS_POINTERS", "xhr.status");
        assert!(NotifierConfig::from_env().is_err());

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" on ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_split_pointers_trims_and_drops_empty() {
        assert_eq!(
            split_pointers(" /statusCode, ,/xhr/status "),
            vec!["/statusCode", "/xhr/status"]
        );
    }
}

//! Relay configuration (mailboxes, tags)

use serde::Deserialize;
use std::time::Duration;

use crate::application::{MailboxConfig, RelaySettings, DEFAULT_MAILBOX_CAPACITY};
use crate::domain::chat::DEFAULT_TAG;

use super::error::ValidationError;

/// Largest mailbox a connection may be given.
pub const MAX_MAILBOX_CAPACITY: usize = 1024;

/// Relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Envelopes buffered per connection before senders wait
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Tag used when a client connects without one
    #[serde(default = "default_tag")]
    pub default_tag: String,

    /// Longest a sender waits on a full mailbox before dropping the
    /// envelope; 0 waits forever
    #[serde(default = "default_enqueue_timeout_ms")]
    pub enqueue_timeout_ms: u64,
}

impl RelayConfig {
    /// Enqueue timeout, or `None` for unbounded waiting.
    pub fn enqueue_timeout(&self) -> Option<Duration> {
        match self.enqueue_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Settings handed to the relay service.
    pub fn settings(&self) -> RelaySettings {
        RelaySettings {
            mailbox: MailboxConfig {
                capacity: self.mailbox_capacity,
                enqueue_timeout: self.enqueue_timeout(),
            },
            default_tag: self.default_tag.clone(),
        }
    }

    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mailbox_capacity == 0 || self.mailbox_capacity > MAX_MAILBOX_CAPACITY {
            return Err(ValidationError::InvalidMailboxCapacity(self.mailbox_capacity));
        }
        if self.default_tag.is_empty() {
            return Err(ValidationError::MissingRequired("relay.default_tag"));
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            default_tag: default_tag(),
            enqueue_timeout_ms: default_enqueue_timeout_ms(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    DEFAULT_MAILBOX_CAPACITY
}

fn default_tag() -> String {
    DEFAULT_TAG.to_string()
}

fn default_enqueue_timeout_ms() -> u64 {
    5_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.mailbox_capacity, 16);
        assert_eq!(config.default_tag, "default");
        assert_eq!(config.enqueue_timeout(), Some(Duration::from_secs(5)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_means_unbounded() {
        let config = RelayConfig {
            enqueue_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.enqueue_timeout(), None);
        assert_eq!(config.settings().mailbox.enqueue_timeout, None);
    }

    #[test]
    fn test_settings_carry_capacity_and_tag() {
        let config = RelayConfig {
            mailbox_capacity: 32,
            default_tag: "lobby".to_string(),
            ..Default::default()
        };
        let settings = config.settings();
        assert_eq!(settings.mailbox.capacity, 32);
        assert_eq!(settings.default_tag, "lobby");
    }

    #[test]
    fn test_validation_rejects_bad_capacity() {
        for capacity in [0, MAX_MAILBOX_CAPACITY + 1] {
            let config = RelayConfig {
                mailbox_capacity: capacity,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ValidationError::InvalidMailboxCapacity(c)) if c == capacity
            ));
        }
    }

    #[test]
    fn test_validation_rejects_empty_default_tag() {
        let config = RelayConfig {
            default_tag: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relay_config_deserialization() {
        let json = r#"{ "mailbox_capacity": 8, "enqueue_timeout_ms": 250 }"#;
        let config: RelayConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mailbox_capacity, 8);
        assert_eq!(config.default_tag, "default");
        assert_eq!(config.enqueue_timeout(), Some(Duration::from_millis(250)));
    }
}

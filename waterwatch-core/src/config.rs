//! Service configuration.

use crate::dialog::CommandKeywords;
use std::time::Duration;

/// Default idle period after which a conversation starts over.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Default minimum gap between two sweeps of expired conversations.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for a [`QueryService`](crate::service::QueryService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Idle period after which a conversation is reset to Idle.
    pub idle_timeout: Duration,

    /// Minimum time between opportunistic sweeps of expired entries.
    pub sweep_interval: Duration,

    /// Reset and help keywords.
    pub keywords: CommandKeywords,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceConfig {
    /// Create a config with default timeouts and keywords.
    pub fn new() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            keywords: CommandKeywords::default(),
        }
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Replace the keyword lists.
    pub fn with_keywords(mut self, keywords: CommandKeywords) -> Self {
        self.keywords = keywords;
        self
    }

    /// Add an extra reset keyword.
    pub fn with_reset_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.reset.push(keyword.into());
        self
    }

    /// Add an extra help keyword.
    pub fn with_help_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.help.push(keyword.into());
        self
    }
}

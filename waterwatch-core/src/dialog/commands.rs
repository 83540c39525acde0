//! Control commands recognised in free text.
//!
//! Detection is plain case-insensitive containment. Every entry point
//! shares one [`CommandKeywords`] so reset/help behave the same everywhere.

use serde::{Deserialize, Serialize};

/// A control command found in a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reset,
    Help,
}

/// Keyword lists for the control commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandKeywords {
    pub reset: Vec<String>,
    pub help: Vec<String>,
}

impl Default for CommandKeywords {
    fn default() -> Self {
        Self {
            reset: ["reset", "restart", "start over", "เริ่มใหม่", "รีเซ็ต", "ยกเลิก"]
                .into_iter()
                .map(String::from)
                .collect(),
            help: ["help", "ช่วยเหลือ", "วิธีใช้"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl CommandKeywords {
    /// Reset takes precedence over help.
    pub fn detect(&self, message: &str) -> Option<Command> {
        let lower = message.to_lowercase();
        if contains_any(&lower, &self.reset) {
            Some(Command::Reset)
        } else if contains_any(&lower, &self.help) {
            Some(Command::Help)
        } else {
            None
        }
    }

    /// The keyword shown to users when telling them how to reset.
    pub fn reset_hint(&self) -> &str {
        self.reset.first().map(String::as_str).unwrap_or("reset")
    }

    pub fn help_hint(&self) -> &str {
        self.help.first().map(String::as_str).unwrap_or("help")
    }
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .any(|k| !k.is_empty() && haystack.contains(&k))
}

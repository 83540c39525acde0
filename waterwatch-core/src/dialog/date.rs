//! ISO date literals embedded in messages.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

// ASCII digits only; `\d` would also accept Thai numerals.
static DATE_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("date literal pattern"));

/// The first `YYYY-MM-DD` substring of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLiteral {
    /// `None` when the text has the right shape but is not a calendar date.
    pub date: Option<NaiveDate>,
    pub span: Range<usize>,
}

impl DateLiteral {
    /// Find the first literal in `message`.
    pub fn find(message: &str) -> Option<Self> {
        DATE_LITERAL.find(message).map(|m| Self {
            date: NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok(),
            span: m.range(),
        })
    }

    /// `message` with this literal cut out, trimmed.
    pub fn strip_from(&self, message: &str) -> String {
        let mut rest = String::with_capacity(message.len());
        rest.push_str(&message[..self.span.start]);
        rest.push(' ');
        rest.push_str(&message[self.span.end..]);
        rest.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// The literal's date, or `fallback` when it is not a real date.
    pub fn date_or(&self, fallback: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(fallback)
    }
}

//! Severity bands and the worst-of aggregator.

use serde::{Deserialize, Serialize};

/// Classification of a single metric reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    Good,
    Warning,
    Critical,
    /// No enabled threshold applies to the metric.
    Unknown,
}

impl Band {
    /// Get the display name.
    pub fn name(&self) -> &'static str {
        match self {
            Band::Good => "good",
            Band::Warning => "warning",
            Band::Critical => "critical",
            Band::Unknown => "unknown",
        }
    }

    /// Severity rank for comparison. `Unknown` has no rank.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Band::Good => Some(0),
            Band::Warning => Some(1),
            Band::Critical => Some(2),
            Band::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.rank().is_some()
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A classified reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityResult {
    pub metric_name: String,
    pub value: f64,
    pub band: Band,
}

impl SeverityResult {
    pub fn new(metric_name: impl Into<String>, value: f64, band: Band) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            band,
        }
    }
}

/// Band of an overall verdict. Never `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallBand {
    Good,
    Warning,
    Critical,
}

impl OverallBand {
    /// Fixed user-facing text for the band.
    pub fn display_text(&self) -> &'static str {
        match self {
            OverallBand::Good => "system normal",
            OverallBand::Warning => "some items need attention",
            OverallBand::Critical => "items require urgent action",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OverallBand::Good => "good",
            OverallBand::Warning => "warning",
            OverallBand::Critical => "critical",
        }
    }
}

/// Worst-of verdict for one district on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallSeverity {
    pub band: OverallBand,
    pub display_text: String,
    /// Set when no metric could be classified; `band` is then `Good`.
    pub unclassified: bool,
}

impl OverallSeverity {
    fn of(band: OverallBand, unclassified: bool) -> Self {
        Self {
            band,
            display_text: band.display_text().to_string(),
            unclassified,
        }
    }
}

/// Reduce per-metric results to one overall verdict.
///
/// Any `Critical` wins, then any `Warning`, else `Good`. `Unknown` results
/// do not vote; when nothing votes the verdict is `Good` flagged as
/// unclassified.
pub fn aggregate<'a>(results: impl IntoIterator<Item = &'a SeverityResult>) -> OverallSeverity {
    let worst = results.into_iter().filter_map(|r| r.band.rank()).max();

    match worst {
        Some(2) => OverallSeverity::of(OverallBand::Critical, false),
        Some(1) => OverallSeverity::of(OverallBand::Warning, false),
        Some(_) => OverallSeverity::of(OverallBand::Good, false),
        None => OverallSeverity::of(OverallBand::Good, true),
    }
}

//! User-facing reply texts.

use super::commands::CommandKeywords;
use crate::catalog::{LocationEntity, LocationLevel};
use crate::report::DistrictReport;
use chrono::NaiveDate;
use std::fmt::Write;

/// Reply to a reset command. Fixed text.
pub const RESET_GUIDANCE: &str =
    "Starting over. Send the name of a region to begin, for example part of its name.";

/// Reply when a backing store cannot be reached. Fixed, non-leaking text.
pub const UNAVAILABLE: &str =
    "Sorry, the monitoring service is temporarily unavailable. Please try again in a moment.";

/// Fixed usage text for the help command.
pub fn usage(keywords: &CommandKeywords) -> String {
    format!(
        "How to ask for district readings:\n\
         1. Send a region name (or part of it).\n\
         2. Send a province name from that region.\n\
         3. Send a district name. Add a date as YYYY-MM-DD to see that day, otherwise today is used.\n\
         After that, send another date to see a different day.\n\
         Send '{}' at any time to start over.",
        keywords.reset_hint()
    )
}

fn name_list(entities: &[LocationEntity]) -> String {
    entities
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn not_found(
    level: LocationLevel,
    fragment: &str,
    parent: Option<&str>,
    options: &[LocationEntity],
) -> String {
    let mut out = match parent {
        Some(parent) => format!("No {level} in {parent} matches \"{fragment}\"."),
        None => format!("No {level} matches \"{fragment}\"."),
    };
    if !options.is_empty() {
        let _ = write!(out, " Available: {}.", name_list(options));
    }
    out
}

pub fn region_chosen(region: &str, provinces: &[LocationEntity]) -> String {
    let mut out = format!("Region: {region}.\nWhich province?");
    if !provinces.is_empty() {
        let _ = write!(out, " Available: {}.", name_list(provinces));
    }
    out
}

pub fn province_chosen(province: &str, districts: &[LocationEntity]) -> String {
    let mut out = format!("Province: {province}.\nDistricts:");
    for district in districts {
        let _ = write!(out, "\n- {}", district.name);
    }
    out.push_str("\nWhich district? Add a date as YYYY-MM-DD for a specific day.");
    out
}

pub fn currently_viewing(district: &str, keywords: &CommandKeywords) -> String {
    format!(
        "Currently viewing {district}. Send a date as YYYY-MM-DD for another day, or send '{}' to change region.",
        keywords.reset_hint()
    )
}

pub fn no_data(district: &str, date: NaiveDate, keywords: &CommandKeywords) -> String {
    format!(
        "No data for {district} on {date}. Send another date as YYYY-MM-DD, or '{}' to change region.",
        keywords.reset_hint()
    )
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Full answer: raw values, per-metric bands, overall status, reset reminder.
pub fn report(report: &DistrictReport, keywords: &CommandKeywords) -> String {
    let mut out = format!(
        "{} ({}) on {}:",
        report.district, report.province, report.date
    );

    for (reading, result) in report.rows() {
        let _ = write!(out, "\n- {}: {}", reading.label(), format_value(reading.value));
        if let Some(unit) = reading.display_unit() {
            let _ = write!(out, " {unit}");
        }
        let _ = write!(out, " ({})", result.band);
        if let Some(trend) = reading.trend {
            let _ = write!(out, ", trend {trend:+.1}");
        }
    }

    let _ = write!(out, "\nOverall status: {}", report.overall.display_text);
    if report.overall.unclassified {
        out.push_str(" (no thresholds apply to these metrics)");
    }
    let _ = write!(out, "\nSend '{}' to change region.", keywords.reset_hint());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1500.0), "1500");
        assert_eq!(format_value(3.25), "3.25");
        assert_eq!(format_value(0.8), "0.80");
    }

    #[test]
    fn test_not_found_lists_options() {
        let options = vec![LocationEntity::region("Northern"), LocationEntity::region("Southern")];
        let text = not_found(LocationLevel::Region, "west", None, &options);
        assert_eq!(text, "No region matches \"west\". Available: Northern, Southern.");
    }

    #[test]
    fn test_usage_mentions_reset_keyword() {
        let keywords = CommandKeywords::default();
        assert!(usage(&keywords).contains("'reset'"));
    }
}

use crate::error::{ReportError, Result};
use chrono::{Datelike, Days, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Quarterly,
}

impl ReportKind {
    /// Window from the start of the current period up to, but excluding, tomorrow.
    pub fn window(self, today: NaiveDate) -> DateWindow {
        let to = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let from = match self {
            ReportKind::Daily => today,
            ReportKind::Weekly => today
                .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
                .unwrap_or(today),
            ReportKind::Monthly => today.with_day(1).unwrap_or(today),
            ReportKind::Quarterly => {
                let first_month = (today.month0() / 3) * 3 + 1;
                NaiveDate::from_ymd_opt(today.year(), first_month, 1).unwrap_or(today)
            }
        };
        DateWindow { from, to }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::Daily => "Daily Report",
            ReportKind::Weekly => "Weekly Report",
            ReportKind::Monthly => "Monthly Report",
            ReportKind::Quarterly => "Quarterly Report",
        }
    }

    /// File name used when a report is saved, e.g. `weekly-2024-01-05.md`.
    pub fn file_name(self, today: NaiveDate) -> String {
        format!("{self}-{}.md", today.format(DATE_FORMAT))
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportKind::Daily => "daily",
            ReportKind::Weekly => "weekly",
            ReportKind::Monthly => "monthly",
            ReportKind::Quarterly => "quarterly",
        };
        write!(f, "{name}")
    }
}

/// Inclusive date boundaries for `git log --since/--until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(ReportError::InvalidDate(format!(
                "Invalid range: since ({}) is after until ({})",
                from.format(DATE_FORMAT),
                to.format(DATE_FORMAT)
            )));
        }
        Ok(Self { from, to })
    }

    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Self::new(parse_date(from)?, parse_date(to)?)
    }

    /// Both bounds sit at midnight so git does not substitute the current time of day.
    pub fn since_arg(&self) -> String {
        format!("--since={} 00:00:00", self.from.format(DATE_FORMAT))
    }

    pub fn until_arg(&self) -> String {
        format!("--until={} 00:00:00", self.to.format(DATE_FORMAT))
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from.format(DATE_FORMAT), self.to.format(DATE_FORMAT))
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|e| ReportError::InvalidDate(format!("'{input}' is not YYYY-MM-DD: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn daily_window_ends_tomorrow() {
        let w = ReportKind::Daily.window(date("2024-01-31"));
        assert_eq!(w, DateWindow { from: date("2024-01-31"), to: date("2024-02-01") });
    }

    #[test]
    fn weekly_window_starts_on_monday() {
        // 2024-01-10 is a Wednesday
        let w = ReportKind::Weekly.window(date("2024-01-10"));
        assert_eq!(w.from, date("2024-01-08"));
        assert_eq!(w.to, date("2024-01-11"));

        // Sunday belongs to the week that started six days earlier
        let w = ReportKind::Weekly.window(date("2024-01-14"));
        assert_eq!(w.from, date("2024-01-08"));
    }

    #[test]
    fn monthly_and_quarterly_windows() {
        let today = date("2024-05-17");
        assert_eq!(ReportKind::Monthly.window(today).from, date("2024-05-01"));
        assert_eq!(ReportKind::Quarterly.window(today).from, date("2024-04-01"));
        assert_eq!(ReportKind::Quarterly.window(date("2024-12-31")).from, date("2024-10-01"));
        assert_eq!(ReportKind::Quarterly.window(date("2024-12-31")).to, date("2025-01-01"));
    }

    #[test]
    fn parse_rejects_reversed_range() {
        let err = DateWindow::parse("2024-02-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, ReportError::InvalidDate(_)));
    }

    #[test]
    fn parse_rejects_non_iso_dates() {
        assert!(DateWindow::parse("01/02/2024", "2024-01-03").is_err());
    }

    #[test]
    fn window_args_pin_midnight_on_both_bounds() {
        let w = DateWindow::parse("2024-01-01", "2024-01-08").unwrap();
        assert_eq!(w.since_arg(), "--since=2024-01-01 00:00:00");
        assert_eq!(w.until_arg(), "--until=2024-01-08 00:00:00");
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"from":"2024-01-01","to":"2024-01-08"}"#);
    }

    #[test]
    fn report_file_name_uses_kind() {
        assert_eq!(ReportKind::Monthly.file_name(date("2024-03-09")), "monthly-2024-03-09.md");
    }
}

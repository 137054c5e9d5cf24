//! Timetable configuration.
//!
//! # Environment Variables
//!
//! - `ACADEMIC_YEAR`: academic year used for authorization and code lookups,
//!   e.g. `2025/2026`. Defaults to the year containing today: from July
//!   onward `Y/Y+1`, before July `Y-1/Y`.
//! - `DEFAULT_PROGRAM`: program for classes missing from the class master
//!   (default: `Reguler`)
//! - `BULK_CONCURRENCY`: concurrent store calls during bulk generation and
//!   range deletes (default: 8, clamped to 1..=64)

use chrono::{Datelike, Local, NaiveDate};
use std::env;
use timetable_models::DEFAULT_PROGRAM;

pub const DEFAULT_BULK_CONCURRENCY: usize = 8;
pub const MAX_BULK_CONCURRENCY: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleConfig {
    pub academic_year: String,
    pub default_program: String,
    pub bulk_concurrency: usize,
}

impl ScheduleConfig {
    pub fn from_env() -> Self {
        Self {
            academic_year: env::var("ACADEMIC_YEAR")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| academic_year_for(Local::now().date_naive())),
            default_program: env::var("DEFAULT_PROGRAM")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_PROGRAM.to_string()),
            bulk_concurrency: clamp_concurrency(
                env::var("BULK_CONCURRENCY")
                    .ok()
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_BULK_CONCURRENCY),
            ),
        }
    }

    /// Config pinned to an academic year, other values at their defaults.
    pub fn for_year(academic_year: impl Into<String>) -> Self {
        Self {
            academic_year: academic_year.into(),
            default_program: DEFAULT_PROGRAM.to_string(),
            bulk_concurrency: DEFAULT_BULK_CONCURRENCY,
        }
    }
}

/// Academic year label for a date; the school year starts in July.
pub fn academic_year_for(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= 7 {
        format!("{}/{}", year, year + 1)
    } else {
        format!("{}/{}", year - 1, year)
    }
}

fn clamp_concurrency(n: usize) -> usize {
    n.clamp(1, MAX_BULK_CONCURRENCY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_academic_year_rolls_over_in_july() {
        let june = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let july = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(academic_year_for(june), "2024/2025");
        assert_eq!(academic_year_for(july), "2025/2026");
    }

    #[test]
    fn test_concurrency_is_clamped() {
        assert_eq!(clamp_concurrency(0), 1);
        assert_eq!(clamp_concurrency(8), 8);
        assert_eq!(clamp_concurrency(1000), MAX_BULK_CONCURRENCY);
    }

    #[test]
    fn test_for_year_defaults() {
        let config = ScheduleConfig::for_year("2025/2026");
        assert_eq!(config.academic_year, "2025/2026");
        assert_eq!(config.default_program, "Reguler");
        assert_eq!(config.bulk_concurrency, DEFAULT_BULK_CONCURRENCY);
    }
}

//! Timetable counters.
//!
//! The library only records through the `metrics` facade; the host process
//! decides whether a recorder is installed.

use metrics::counter;
use std::sync::OnceLock;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true) // Enabled by default
    })
}

/// Track assignments written, labelled by where they came from
/// (`manual`, `range_edit`, `grid`, `flat`)
pub fn track_assignments_inserted(source: &str, count: usize) {
    if !is_observability_enabled() || count == 0 {
        return;
    }
    counter!("schedule_assignments_inserted_total", "source" => source.to_string())
        .increment(count as u64);
}

/// Track bulk items that were rejected or failed to persist
pub fn track_bulk_failures(source: &str, count: usize) {
    if !is_observability_enabled() || count == 0 {
        return;
    }
    counter!("schedule_bulk_failures_total", "source" => source.to_string())
        .increment(count as u64);
}

pub fn track_assignments_deleted(count: usize) {
    if !is_observability_enabled() || count == 0 {
        return;
    }
    counter!("schedule_assignments_deleted_total").increment(count as u64);
}

pub fn track_range_edited() {
    if !is_observability_enabled() {
        return;
    }
    counter!("schedule_ranges_edited_total").increment(1);
}

//! Teaching assignment models and DTOs.
//!
//! A [`TeachingAssignment`] is the atomic stored record: one teacher, one
//! subject, one class, one period on one day, in force from
//! `effective_from` onward. A [`ConsolidatedRange`] is the derived view that
//! merges contiguous periods of otherwise identical assignments; it is
//! never persisted.

use crate::day::DayOfWeek;
use crate::ids::{AssignmentId, TeacherId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use timetable_core::serde::deserialize_optional_date;
use timetable_core::{PaginationMeta, PaginationParams};
use validator::{Validate, ValidationError};

/// Atomic stored assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeachingAssignment {
    pub id: AssignmentId,
    pub teacher_id: TeacherId,
    /// Denormalized display name
    pub teacher_name: String,
    pub subject_name: String,
    pub day_of_week: DayOfWeek,
    pub class_name: String,
    /// 1-based period number
    pub period_number: i32,
    /// Date from which this assignment is in force
    pub effective_from: NaiveDate,
    pub active: bool,
}

/// An assignment that has not been written yet.
///
/// Produced by `create`, by range edits, and by both spreadsheet generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssignment {
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub subject_name: String,
    pub day_of_week: DayOfWeek,
    pub class_name: String,
    pub period_number: i32,
    pub effective_from: NaiveDate,
    pub active: bool,
}

impl NewAssignment {
    pub fn into_assignment(self, id: AssignmentId) -> TeachingAssignment {
        TeachingAssignment {
            id,
            teacher_id: self.teacher_id,
            teacher_name: self.teacher_name,
            subject_name: self.subject_name,
            day_of_week: self.day_of_week,
            class_name: self.class_name,
            period_number: self.period_number,
            effective_from: self.effective_from,
            active: self.active,
        }
    }

    /// Short description used in per-item outcome messages.
    pub fn describe(&self) -> String {
        format!(
            "{} / {} / {} {} period {}",
            self.teacher_name, self.subject_name, self.day_of_week, self.class_name, self.period_number
        )
    }
}

/// Filters understood by the assignment store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentFilter {
    pub day_of_week: Option<DayOfWeek>,
    pub class_name: Option<String>,
    /// Case-insensitive substring match on teacher or subject name
    pub search: Option<String>,
    /// Only rows with `effective_from <= as_of`
    pub as_of: Option<NaiveDate>,
    /// Return inactive rows as well
    pub include_inactive: bool,
}

impl AssignmentFilter {
    /// In-memory equivalent of the store's SQL predicate.
    pub fn matches(&self, assignment: &TeachingAssignment) -> bool {
        if !self.include_inactive && !assignment.active {
            return false;
        }
        if let Some(day) = self.day_of_week
            && assignment.day_of_week != day
        {
            return false;
        }
        if let Some(class_name) = &self.class_name
            && !assignment.class_name.eq_ignore_ascii_case(class_name.trim())
        {
            return false;
        }
        if let Some(as_of) = self.as_of
            && assignment.effective_from > as_of
        {
            return false;
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            if !assignment.teacher_name.to_lowercase().contains(&needle)
                && !assignment.subject_name.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Query parameters for listing consolidated schedules.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleFilterParams {
    /// Free-text match on teacher or subject name
    pub search: Option<String>,
    pub day_of_week: Option<DayOfWeek>,
    pub class_name: Option<String>,
    /// Only assignments in force on or before this date
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub as_of: Option<NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl ScheduleFilterParams {
    pub fn to_store_filter(&self) -> AssignmentFilter {
        AssignmentFilter {
            day_of_week: self.day_of_week,
            class_name: self
                .class_name
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            search: self
                .search
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            as_of: self.as_of,
            include_inactive: false,
        }
    }
}

/// Contiguous run of periods sharing teacher, subject, day, class and
/// effective date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedRange {
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub subject_name: String,
    pub day_of_week: DayOfWeek,
    pub class_name: String,
    pub effective_from: NaiveDate,
    pub start_period: i32,
    pub end_period: i32,
    /// "3" or "3-5"
    pub label: String,
    /// Constituent assignment ids, in period order
    pub assignment_ids: Vec<AssignmentId>,
}

impl ConsolidatedRange {
    /// Period numbers covered by the range.
    pub fn periods(&self) -> Vec<i32> {
        (self.start_period..=self.end_period).collect()
    }
}

fn validate_periods(periods: &[i32]) -> Result<(), ValidationError> {
    if periods.iter().any(|p| *p < 1) {
        let mut err = ValidationError::new("period_number");
        err.message = Some("Period numbers must be positive".into());
        return Err(err);
    }
    Ok(())
}

/// DTO for creating assignments for one teacher, class and day.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateScheduleDto {
    pub teacher_id: TeacherId,
    #[validate(length(min = 1, max = 150, message = "Subject is required"))]
    pub subject_name: String,
    pub day_of_week: DayOfWeek,
    #[validate(length(min = 1, max = 50, message = "Class is required"))]
    pub class_name: String,
    /// One row is created per period
    #[validate(
        length(min = 1, message = "Select at least one period"),
        custom(function = "validate_periods")
    )]
    pub periods: Vec<i32>,
    pub effective_from: NaiveDate,
}

/// DTO for editing a consolidated range.
///
/// Fields left as `None` keep the range's current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateRangeDto {
    pub teacher_id: Option<TeacherId>,
    #[validate(length(min = 1, max = 150, message = "Subject cannot be empty"))]
    pub subject_name: Option<String>,
    #[validate(
        length(min = 1, message = "Select at least one period"),
        custom(function = "validate_periods")
    )]
    pub periods: Vec<i32>,
    pub effective_from: Option<NaiveDate>,
}

/// Paginated response containing consolidated ranges.
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedSchedulesResponse {
    pub data: Vec<ConsolidatedRange>,
    pub meta: PaginationMeta,
}

/// One exported spreadsheet row; re-importable by the flat importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleExportRow {
    pub teacher: String,
    pub subject: String,
    pub day: String,
    pub class: String,
    pub periods: String,
    pub effective_from: String,
    pub active: String,
}

impl ScheduleExportRow {
    pub const HEADERS: [&'static str; 7] = [
        "Teacher",
        "Subject",
        "Day",
        "Class",
        "Period",
        "Effective From",
        "Active",
    ];

    pub fn from_range(range: &ConsolidatedRange) -> Self {
        Self {
            teacher: range.teacher_name.clone(),
            subject: range.subject_name.clone(),
            day: range.day_of_week.label().to_string(),
            class: range.class_name.clone(),
            periods: range.label.clone(),
            effective_from: range.effective_from.format("%Y-%m-%d").to_string(),
            active: "Ya".to_string(),
        }
    }

    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.teacher.clone(),
            self.subject.clone(),
            self.day.clone(),
            self.class.clone(),
            self.periods.clone(),
            self.effective_from.clone(),
            self.active.clone(),
        ]
    }
}

//! # Timetable Models
//!
//! Domain models and DTOs for the teacher timetable.
//!
//! # Modules
//!
//! - [`day`]: Day-of-week value type with localized labels
//! - [`ids`]: Strongly-typed ID newtypes
//! - [`imports`]: Bulk import issues and batch outcomes
//! - [`masters`]: Read-only master data (teachers, classes, period slots, authorizations)
//! - [`schedules`]: Teaching assignments, consolidated ranges, filters and DTOs

pub mod day;
pub mod ids;
pub mod imports;
pub mod masters;
pub mod schedules;

// Re-export commonly used types at crate root for convenience
pub use day::DayOfWeek;
pub use ids::{AssignmentId, TeacherId};
pub use imports::{BatchOutcome, CandidatePreview, ImportIssue, ItemOutcome};
pub use masters::{
    ClassInfo, DEFAULT_PROGRAM, PeriodSlot, Teacher, TeacherSubjectAuthorization,
    TeacherSubjectCode,
};
pub use schedules::{
    AssignmentFilter, ConsolidatedRange, CreateScheduleDto, NewAssignment,
    PaginatedSchedulesResponse, ScheduleExportRow, ScheduleFilterParams, TeachingAssignment,
    UpdateRangeDto,
};

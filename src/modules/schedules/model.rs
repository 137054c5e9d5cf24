//! Schedule models, re-exported from `timetable-models` so callers of the
//! schedules module need a single import path.

pub use timetable_models::{
    AssignmentFilter, AssignmentId, BatchOutcome, CandidatePreview, ClassInfo, ConsolidatedRange,
    CreateScheduleDto, DayOfWeek, ImportIssue, ItemOutcome, NewAssignment,
    PaginatedSchedulesResponse, PeriodSlot, ScheduleExportRow, ScheduleFilterParams, Teacher,
    TeacherId, TeacherSubjectAuthorization, TeacherSubjectCode, TeachingAssignment,
    UpdateRangeDto,
};

pub use super::flat::SheetRecord;

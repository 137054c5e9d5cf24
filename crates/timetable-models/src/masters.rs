//! Master data read by the timetable subsystem.
//!
//! These tables are maintained elsewhere in the school administration
//! application; the timetable code only reads them.

use crate::day::DayOfWeek;
use crate::ids::TeacherId;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Program used when a class is missing from the class master.
pub const DEFAULT_PROGRAM: &str = "Reguler";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
}

/// A class and the program (track) it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClassInfo {
    pub class_name: String,
    pub program: String,
}

/// One bell-schedule slot of a program on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PeriodSlot {
    pub day_of_week: DayOfWeek,
    pub program: String,
    pub period_number: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A (teacher, subject) pairing allowed in an academic year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeacherSubjectAuthorization {
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub subject_name: String,
    /// e.g. "2025/2026"
    pub academic_year: String,
}

/// Short codes used in the grid spreadsheet, resolved to a teacher and subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeacherSubjectCode {
    pub subject_code: String,
    pub teacher_code: String,
    pub teacher_id: TeacherId,
    pub teacher_name: String,
    pub subject_name: String,
    pub academic_year: String,
}

impl TeacherSubjectCode {
    /// Lookup key: both codes trimmed and uppercased.
    pub fn key(&self) -> (String, String) {
        code_key(&self.subject_code, &self.teacher_code)
    }
}

pub fn code_key(subject_code: &str, teacher_code: &str) -> (String, String) {
    (
        subject_code.trim().to_uppercase(),
        teacher_code.trim().to_uppercase(),
    )
}

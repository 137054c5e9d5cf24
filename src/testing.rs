//! In-memory backends for tests.
//!
//! Available under `cfg(test)` and the `test-utils` feature. The store
//! counts insert calls and can be told to fail specific writes, so tests can
//! check both fail-closed validation and best-effort bulk behaviour.

use futures::future::{self, BoxFuture};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::NaiveTime;
use timetable_core::AppError;
use timetable_models::{
    AssignmentFilter, AssignmentId, ClassInfo, DayOfWeek, NewAssignment, PeriodSlot, Teacher,
    TeacherId, TeacherSubjectAuthorization, TeacherSubjectCode, TeachingAssignment,
};

use crate::modules::schedules::master::MasterData;
use crate::modules::schedules::store::AssignmentStore;

const FIRST_BELL_SECS: u32 = 7 * 3600;
const PERIOD_SECS: u32 = 45 * 60;

fn ready<T: Send + 'static>(result: Result<T, AppError>) -> BoxFuture<'static, Result<T, AppError>> {
    Box::pin(future::ready(result))
}

#[derive(Default)]
pub struct InMemoryAssignmentStore {
    rows: RwLock<Vec<TeachingAssignment>>,
    insert_calls: AtomicUsize,
    failing_periods: RwLock<HashSet<i32>>,
    failing_deletes: RwLock<HashSet<AssignmentId>>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a row directly, bypassing the insert counter.
    pub fn seed(&self, assignment: NewAssignment) -> AssignmentId {
        let id = AssignmentId::new();
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(assignment.into_assignment(id));
        id
    }

    pub fn rows(&self) -> Vec<TeachingAssignment> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `insert` calls, including failed ones.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Makes every insert for this period number fail.
    pub fn fail_inserts_for_period(&self, period_number: i32) {
        self.failing_periods
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(period_number);
    }

    /// Makes deleting this id fail while leaving the row in place.
    pub fn fail_delete_of(&self, id: AssignmentId) {
        self.failing_deletes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    fn try_insert(&self, assignment: &NewAssignment) -> Result<AssignmentId, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failing_periods
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&assignment.period_number);
        if failing {
            return Err(AppError::persistence(anyhow::anyhow!(
                "simulated write failure for period {}",
                assignment.period_number
            )));
        }

        Ok(self.seed(assignment.clone()))
    }

    fn try_delete(&self, id: AssignmentId) -> Result<(), AppError> {
        let failing = self
            .failing_deletes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id);
        if failing {
            return Err(AppError::persistence(anyhow::anyhow!(
                "simulated delete failure for {}",
                id
            )));
        }

        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(AppError::not_found(anyhow::anyhow!("Assignment {} not found", id)));
        }
        Ok(())
    }
}

impl AssignmentStore for InMemoryAssignmentStore {
    fn insert<'a>(
        &'a self,
        assignment: &'a NewAssignment,
    ) -> BoxFuture<'a, Result<AssignmentId, AppError>> {
        ready(self.try_insert(assignment))
    }

    fn delete_by_id(&self, id: AssignmentId) -> BoxFuture<'_, Result<(), AppError>> {
        ready(self.try_delete(id))
    }

    fn query<'a>(
        &'a self,
        filter: &'a AssignmentFilter,
    ) -> BoxFuture<'a, Result<Vec<TeachingAssignment>, AppError>> {
        let rows: Vec<_> = self
            .rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        ready(Ok(rows))
    }
}

/// Master tables built up front with the `with_*` methods.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMasterData {
    teachers: Vec<Teacher>,
    classes: Vec<ClassInfo>,
    slots: Vec<PeriodSlot>,
    authorizations: Vec<TeacherSubjectAuthorization>,
    codes: Vec<TeacherSubjectCode>,
}

impl InMemoryMasterData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_teacher(mut self, id: TeacherId, name: &str) -> Self {
        self.teachers.push(Teacher {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_class(mut self, class_name: &str, program: &str) -> Self {
        self.classes.push(ClassInfo {
            class_name: class_name.to_string(),
            program: program.to_string(),
        });
        self
    }

    /// Periods `1..=count` of 45 minutes each, starting at 07:00.
    pub fn with_slots(mut self, program: &str, day: DayOfWeek, count: i32) -> Self {
        for period_number in 1..=count {
            let offset = (period_number as u32 - 1) * PERIOD_SECS;
            let start = NaiveTime::from_num_seconds_from_midnight_opt(FIRST_BELL_SECS + offset, 0)
                .unwrap_or(NaiveTime::MIN);
            let end = NaiveTime::from_num_seconds_from_midnight_opt(
                FIRST_BELL_SECS + offset + PERIOD_SECS,
                0,
            )
            .unwrap_or(NaiveTime::MIN);
            self.slots.push(PeriodSlot {
                day_of_week: day,
                program: program.to_string(),
                period_number,
                start_time: start,
                end_time: end,
            });
        }
        self
    }

    pub fn with_authorization(mut self, teacher_id: TeacherId, subject: &str, year: &str) -> Self {
        self.authorizations.push(TeacherSubjectAuthorization {
            teacher_id,
            teacher_name: self.teacher_name(teacher_id),
            subject_name: subject.to_string(),
            academic_year: year.to_string(),
        });
        self
    }

    pub fn with_code(
        mut self,
        subject_code: &str,
        teacher_code: &str,
        teacher_id: TeacherId,
        subject: &str,
        year: &str,
    ) -> Self {
        self.codes.push(TeacherSubjectCode {
            subject_code: subject_code.to_string(),
            teacher_code: teacher_code.to_string(),
            teacher_id,
            teacher_name: self.teacher_name(teacher_id),
            subject_name: subject.to_string(),
            academic_year: year.to_string(),
        });
        self
    }

    fn teacher_name(&self, id: TeacherId) -> String {
        self.teachers
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }
}

impl MasterData for InMemoryMasterData {
    fn class_info<'a>(
        &'a self,
        class_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<ClassInfo>, AppError>> {
        let found = self
            .classes
            .iter()
            .find(|c| c.class_name.eq_ignore_ascii_case(class_name.trim()))
            .cloned();
        ready(Ok(found))
    }

    fn period_slots<'a>(
        &'a self,
        program: &'a str,
        day: DayOfWeek,
    ) -> BoxFuture<'a, Result<Vec<PeriodSlot>, AppError>> {
        let slots = self
            .slots
            .iter()
            .filter(|s| s.program == program && s.day_of_week == day)
            .cloned()
            .collect();
        ready(Ok(slots))
    }

    fn authorizations<'a>(
        &'a self,
        teacher_id: TeacherId,
        academic_year: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TeacherSubjectAuthorization>, AppError>> {
        let rows: Vec<_> = self
            .authorizations
            .iter()
            .filter(|a| a.teacher_id == teacher_id && a.academic_year == academic_year)
            .cloned()
            .collect();
        ready(Ok(rows))
    }

    fn subject_codes<'a>(
        &'a self,
        academic_year: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TeacherSubjectCode>, AppError>> {
        let codes = self
            .codes
            .iter()
            .filter(|c| c.academic_year == academic_year)
            .cloned()
            .collect();
        ready(Ok(codes))
    }

    fn teachers(&self) -> BoxFuture<'_, Result<Vec<Teacher>, AppError>> {
        ready(Ok(self.teachers.clone()))
    }

    fn teacher(&self, id: TeacherId) -> BoxFuture<'_, Result<Option<Teacher>, AppError>> {
        let found = self.teachers.iter().find(|t| t.id == id).cloned();
        ready(Ok(found))
    }
}

//! Read-only master data used by scheduling.

use futures::future::BoxFuture;
use sqlx::PgPool;
use timetable_core::AppError;
use timetable_models::{
    ClassInfo, DayOfWeek, PeriodSlot, Teacher, TeacherId, TeacherSubjectAuthorization,
    TeacherSubjectCode,
};

use super::store::map_db_error;

/// Lookups against the school's master tables.
pub trait MasterData: Send + Sync {
    /// Class master entry, matched case-insensitively.
    fn class_info<'a>(
        &'a self,
        class_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<ClassInfo>, AppError>>;

    /// Bell-schedule slots of a program on one day, ascending by period.
    fn period_slots<'a>(
        &'a self,
        program: &'a str,
        day: DayOfWeek,
    ) -> BoxFuture<'a, Result<Vec<PeriodSlot>, AppError>>;

    fn authorizations<'a>(
        &'a self,
        teacher_id: TeacherId,
        academic_year: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TeacherSubjectAuthorization>, AppError>>;

    /// The subject/teacher code master for an academic year.
    fn subject_codes<'a>(
        &'a self,
        academic_year: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TeacherSubjectCode>, AppError>>;

    fn teachers(&self) -> BoxFuture<'_, Result<Vec<Teacher>, AppError>>;

    fn teacher(&self, id: TeacherId) -> BoxFuture<'_, Result<Option<Teacher>, AppError>>;
}

#[derive(Clone, Debug)]
pub struct PgMasterData {
    pool: PgPool,
}

impl PgMasterData {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MasterData for PgMasterData {
    fn class_info<'a>(
        &'a self,
        class_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<ClassInfo>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, ClassInfo>(
                "SELECT class_name, program FROM classes WHERE LOWER(class_name) = LOWER($1)",
            )
            .bind(class_name.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
        })
    }

    fn period_slots<'a>(
        &'a self,
        program: &'a str,
        day: DayOfWeek,
    ) -> BoxFuture<'a, Result<Vec<PeriodSlot>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, PeriodSlot>(
                r#"
                SELECT day_of_week, program, period_number, start_time, end_time
                FROM period_slots
                WHERE program = $1 AND day_of_week = $2
                ORDER BY period_number ASC
                "#,
            )
            .bind(program)
            .bind(day)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
        })
    }

    fn authorizations<'a>(
        &'a self,
        teacher_id: TeacherId,
        academic_year: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TeacherSubjectAuthorization>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, TeacherSubjectAuthorization>(
                r#"
                SELECT teacher_id, teacher_name, subject_name, academic_year
                FROM teacher_subjects
                WHERE teacher_id = $1 AND academic_year = $2
                "#,
            )
            .bind(teacher_id)
            .bind(academic_year)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
        })
    }

    fn subject_codes<'a>(
        &'a self,
        academic_year: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TeacherSubjectCode>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, TeacherSubjectCode>(
                r#"
                SELECT subject_code, teacher_code, teacher_id, teacher_name, subject_name,
                       academic_year
                FROM teacher_subjects
                WHERE academic_year = $1
                  AND subject_code IS NOT NULL
                  AND teacher_code IS NOT NULL
                "#,
            )
            .bind(academic_year)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)
        })
    }

    fn teachers(&self) -> BoxFuture<'_, Result<Vec<Teacher>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, Teacher>("SELECT id, name FROM teachers ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)
        })
    }

    fn teacher(&self, id: TeacherId) -> BoxFuture<'_, Result<Option<Teacher>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, Teacher>("SELECT id, name FROM teachers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_error)
        })
    }
}

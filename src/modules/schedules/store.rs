//! Persistence boundary for atomic teaching assignments.
//!
//! [`AssignmentStore`] is the only way the schedule service reads or writes
//! assignments. [`PgAssignmentStore`] is the production implementation; an
//! in-memory one lives in [`crate::testing`].

use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, QueryBuilder};
use timetable_core::AppError;
use timetable_models::{AssignmentFilter, AssignmentId, NewAssignment, TeachingAssignment};
use tracing::debug;

const SELECT_ASSIGNMENTS: &str = "SELECT id, teacher_id, teacher_name, subject_name, day_of_week, \
     class_name, period_number, effective_from, active FROM teaching_assignments WHERE 1=1";

/// Record store for [`TeachingAssignment`]s.
///
/// Implementations must not hold locks across await points; the service
/// calls these methods concurrently during bulk operations.
pub trait AssignmentStore: Send + Sync {
    /// Writes one assignment and returns its new id.
    fn insert<'a>(
        &'a self,
        assignment: &'a NewAssignment,
    ) -> BoxFuture<'a, Result<AssignmentId, AppError>>;

    /// Removes one assignment. A missing id is a `NotFound` error.
    fn delete_by_id(&self, id: AssignmentId) -> BoxFuture<'_, Result<(), AppError>>;

    /// Every assignment matching the filter, in no particular order.
    ///
    /// Overlapping effective dates are all returned; nothing picks a
    /// "current" row.
    fn query<'a>(
        &'a self,
        filter: &'a AssignmentFilter,
    ) -> BoxFuture<'a, Result<Vec<TeachingAssignment>, AppError>>;
}

#[derive(Clone, Debug)]
pub struct PgAssignmentStore {
    pool: PgPool,
}

impl PgAssignmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_db_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::RowNotFound => AppError::not_found(anyhow::anyhow!("Record not found")),
        other => AppError::persistence(other),
    }
}

/// Escapes LIKE wildcards so free text is matched literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl AssignmentStore for PgAssignmentStore {
    fn insert<'a>(
        &'a self,
        assignment: &'a NewAssignment,
    ) -> BoxFuture<'a, Result<AssignmentId, AppError>> {
        Box::pin(async move {
            let id = sqlx::query_scalar::<_, AssignmentId>(
                r#"
                INSERT INTO teaching_assignments
                    (teacher_id, teacher_name, subject_name, day_of_week, class_name,
                     period_number, effective_from, active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
            )
            .bind(assignment.teacher_id)
            .bind(&assignment.teacher_name)
            .bind(&assignment.subject_name)
            .bind(assignment.day_of_week)
            .bind(&assignment.class_name)
            .bind(assignment.period_number)
            .bind(assignment.effective_from)
            .bind(assignment.active)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::persistence)?;

            debug!(assignment_id = %id, "Inserted teaching assignment");
            Ok(id)
        })
    }

    fn delete_by_id(&self, id: AssignmentId) -> BoxFuture<'_, Result<(), AppError>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM teaching_assignments WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_db_error)?;

            if result.rows_affected() == 0 {
                return Err(AppError::not_found(anyhow::anyhow!(
                    "Assignment {} not found",
                    id
                )));
            }

            debug!(assignment_id = %id, "Deleted teaching assignment");
            Ok(())
        })
    }

    fn query<'a>(
        &'a self,
        filter: &'a AssignmentFilter,
    ) -> BoxFuture<'a, Result<Vec<TeachingAssignment>, AppError>> {
        Box::pin(async move {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_ASSIGNMENTS);

            if !filter.include_inactive {
                qb.push(" AND active = TRUE");
            }
            if let Some(day) = filter.day_of_week {
                qb.push(" AND day_of_week = ").push_bind(day);
            }
            if let Some(class_name) = &filter.class_name {
                qb.push(" AND LOWER(class_name) = LOWER(")
                    .push_bind(class_name.trim().to_string())
                    .push(")");
            }
            if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                let pattern = like_pattern(search);
                qb.push(" AND (LOWER(teacher_name) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(subject_name) LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            if let Some(as_of) = filter.as_of {
                qb.push(" AND effective_from <= ").push_bind(as_of);
            }
            qb.push(" ORDER BY class_name, period_number");

            let rows = qb
                .build_query_as::<TeachingAssignment>()
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)?;

            debug!(count = rows.len(), "Queried teaching assignments");
            Ok(rows)
        })
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDate;
use futures::{StreamExt, stream};
use sqlx::PgPool;
use timetable_core::permissions::{self, CapabilityCheck, permission_name};
use timetable_core::{AppError, ErrorKind};
use timetable_models::{
    AssignmentFilter, AssignmentId, BatchOutcome, CandidatePreview, ConsolidatedRange,
    CreateScheduleDto, DayOfWeek, ItemOutcome, NewAssignment, PaginatedSchedulesResponse,
    PeriodSlot, ScheduleExportRow, ScheduleFilterParams, TeachingAssignment, UpdateRangeDto,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::config::schedule::ScheduleConfig;
use crate::metrics;

use super::authorization::AssignmentValidator;
use super::availability::AvailabilityResolver;
use super::consolidator::{consolidate, normalize_periods, plan_edit};
use super::flat::{SheetRecord, parse_flat};
use super::grid::parse_grid;
use super::master::{MasterData, PgMasterData};
use super::store::{AssignmentStore, PgAssignmentStore};

const SOURCE_MANUAL: &str = "manual";
const SOURCE_RANGE_EDIT: &str = "range_edit";
const SOURCE_GRID: &str = "grid";
const SOURCE_FLAT: &str = "flat";

/// Gate for callers: fails with an authorization error unless `caps`
/// grants `action` on teacher schedules.
pub fn require_capability(caps: &dyn CapabilityCheck, action: &str) -> Result<(), AppError> {
    if caps.can_perform(permissions::TEACHER_SCHEDULES, action) {
        return Ok(());
    }
    Err(AppError::authorization(anyhow!(
        "Missing permission {}",
        permission_name(permissions::TEACHER_SCHEDULES, action)
    )))
}

/// Entry point for every timetable read and write.
///
/// Writes always go availability check, then pairing authorization, then
/// store. Bulk paths run that per candidate with bounded concurrency and
/// never roll back siblings.
#[derive(Clone)]
pub struct ScheduleService {
    store: Arc<dyn AssignmentStore>,
    master: Arc<dyn MasterData>,
    availability: AvailabilityResolver,
    validator: AssignmentValidator,
    config: ScheduleConfig,
}

impl ScheduleService {
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        master: Arc<dyn MasterData>,
        config: ScheduleConfig,
    ) -> Self {
        Self {
            availability: AvailabilityResolver::new(master.clone(), config.default_program.clone()),
            validator: AssignmentValidator::new(master.clone()),
            store,
            master,
            config,
        }
    }

    pub fn from_pool(pool: PgPool, config: ScheduleConfig) -> Self {
        Self::new(
            Arc::new(PgAssignmentStore::new(pool.clone())),
            Arc::new(PgMasterData::new(pool)),
            config,
        )
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Consolidated ranges matching the filter, in display order.
    #[instrument(skip(self))]
    pub async fn ranges(&self, filter: &AssignmentFilter) -> Result<Vec<ConsolidatedRange>, AppError> {
        let assignments = self.store.query(filter).await?;
        Ok(consolidate(assignments))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        params: &ScheduleFilterParams,
    ) -> Result<PaginatedSchedulesResponse, AppError> {
        let ranges = self.ranges(&params.to_store_filter()).await?;
        let (data, meta) = params.pagination.window(ranges);
        Ok(PaginatedSchedulesResponse { data, meta })
    }

    pub async fn available_periods(
        &self,
        class_name: &str,
        day: DayOfWeek,
    ) -> Result<Vec<PeriodSlot>, AppError> {
        self.availability.available_periods(class_name.trim(), day).await
    }

    /// Creates one assignment per selected period.
    ///
    /// Nothing is written unless every period is selectable and the pairing
    /// is authorized. If a write fails part-way, rows already written by
    /// this call are removed again.
    #[instrument(skip(self, dto), fields(teacher_id = %dto.teacher_id, class_name = %dto.class_name))]
    pub async fn create(&self, dto: CreateScheduleDto) -> Result<Vec<TeachingAssignment>, AppError> {
        dto.validate().map_err(AppError::input)?;

        let teacher = self
            .master
            .teacher(dto.teacher_id)
            .await?
            .ok_or_else(|| AppError::input(anyhow!("Teacher {} not found", dto.teacher_id)))?;
        let subject_name = dto.subject_name.trim();
        let class_name = dto.class_name.trim();
        let periods = normalize_periods(&dto.periods);

        self.ensure_selectable(class_name, dto.day_of_week, &periods)
            .await?;
        let subject_name = self
            .validator
            .authorize(teacher.id, &teacher.name, subject_name, &self.config.academic_year)
            .await?;

        let rows = periods
            .into_iter()
            .map(|period_number| NewAssignment {
                teacher_id: teacher.id,
                teacher_name: teacher.name.clone(),
                subject_name: subject_name.clone(),
                day_of_week: dto.day_of_week,
                class_name: class_name.to_string(),
                period_number,
                effective_from: dto.effective_from,
                active: true,
            })
            .collect();

        let created = self.insert_all(rows).await?;
        metrics::track_assignments_inserted(SOURCE_MANUAL, created.len());
        info!(count = created.len(), "Created teaching assignments");
        Ok(created)
    }

    /// Replaces a consolidated range with freshly created rows.
    ///
    /// The new periods and pairing are validated before anything is
    /// deleted. Deletes run concurrently; if any fails the call stops with a
    /// persistence error and nothing is inserted.
    #[instrument(skip(self, range, dto), fields(range = %range.label, class_name = %range.class_name))]
    pub async fn update_range(
        &self,
        range: &ConsolidatedRange,
        dto: UpdateRangeDto,
    ) -> Result<Vec<TeachingAssignment>, AppError> {
        dto.validate().map_err(AppError::input)?;

        let teacher_id = dto.teacher_id.unwrap_or(range.teacher_id);
        let teacher_name = match self.master.teacher(teacher_id).await? {
            Some(teacher) => teacher.name,
            None if teacher_id == range.teacher_id => range.teacher_name.clone(),
            None => {
                return Err(AppError::input(anyhow!("Teacher {} not found", teacher_id)));
            }
        };
        let subject_name = dto
            .subject_name
            .as_deref()
            .map(str::trim)
            .unwrap_or(&range.subject_name);
        if subject_name.is_empty() {
            return Err(AppError::input(anyhow!("Subject cannot be empty")));
        }
        let effective_from = dto.effective_from.unwrap_or(range.effective_from);
        let periods = normalize_periods(&dto.periods);

        self.ensure_selectable(&range.class_name, range.day_of_week, &periods)
            .await?;
        let subject_name = self
            .validator
            .authorize(teacher_id, &teacher_name, subject_name, &self.config.academic_year)
            .await?;

        let edit = plan_edit(
            range,
            teacher_id,
            &teacher_name,
            &subject_name,
            &periods,
            effective_from,
        );

        let outcome = BatchOutcome::from_items(self.delete_ids(&edit.delete_ids).await);
        metrics::track_assignments_deleted(outcome.succeeded);
        if outcome.failed() > 0 {
            return Err(AppError::persistence(anyhow!(
                "Failed to delete {} of {} assignments in range {}: {}",
                outcome.failed(),
                outcome.attempted,
                range.label,
                outcome.errors.join("; ")
            )));
        }

        let created = self.insert_all(edit.inserts).await?;
        metrics::track_assignments_inserted(SOURCE_RANGE_EDIT, created.len());
        metrics::track_range_edited();
        info!(
            deleted = outcome.succeeded,
            inserted = created.len(),
            "Range updated"
        );
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: AssignmentId) -> Result<(), AppError> {
        self.store.delete_by_id(id).await?;
        metrics::track_assignments_deleted(1);
        Ok(())
    }

    /// Deletes every assignment of a range, best effort.
    #[instrument(skip(self, range), fields(range = %range.label, class_name = %range.class_name))]
    pub async fn delete_range(&self, range: &ConsolidatedRange) -> Result<BatchOutcome, AppError> {
        if range.assignment_ids.is_empty() {
            return Err(AppError::input(anyhow!("Range {} has no assignments", range.label)));
        }

        let outcome = BatchOutcome::from_items(self.delete_ids(&range.assignment_ids).await);
        metrics::track_assignments_deleted(outcome.succeeded);
        info!(
            attempted = outcome.attempted,
            deleted = outcome.succeeded,
            "Range deleted"
        );
        Ok(outcome)
    }

    /// Parses a grid sheet against this academic year's code master.
    #[instrument(skip(self, sheet), fields(rows = sheet.len()))]
    pub async fn preview_grid(
        &self,
        sheet: &[Vec<String>],
        effective_from: NaiveDate,
    ) -> Result<CandidatePreview, AppError> {
        let codes = self.master.subject_codes(&self.config.academic_year).await?;
        let preview = parse_grid(sheet, &codes, effective_from)?;
        info!(
            candidates = preview.candidates.len(),
            issues = preview.issues.len(),
            "Grid parsed"
        );
        Ok(preview)
    }

    /// Parses then commits a grid sheet.
    ///
    /// When the parse produced issues, `confirm` decides whether the valid
    /// candidates are still written; declining returns an aborted outcome.
    pub async fn generate_from_grid<F>(
        &self,
        sheet: &[Vec<String>],
        effective_from: NaiveDate,
        confirm: F,
    ) -> Result<BatchOutcome, AppError>
    where
        F: FnOnce(&CandidatePreview) -> bool,
    {
        let preview = self.preview_grid(sheet, effective_from).await?;
        Ok(self.commit_preview(preview, SOURCE_GRID, confirm).await)
    }

    #[instrument(skip(self, records), fields(rows = records.len()))]
    pub async fn preview_flat(
        &self,
        records: &[SheetRecord],
        fallback: NaiveDate,
    ) -> Result<CandidatePreview, AppError> {
        let teachers = self.master.teachers().await?;
        let preview = parse_flat(records, &teachers, fallback);
        info!(
            candidates = preview.candidates.len(),
            issues = preview.issues.len(),
            "Flat sheet parsed"
        );
        Ok(preview)
    }

    /// Parses then commits a flat sheet; see [`Self::generate_from_grid`].
    pub async fn import_flat<F>(
        &self,
        records: &[SheetRecord],
        fallback: NaiveDate,
        confirm: F,
    ) -> Result<BatchOutcome, AppError>
    where
        F: FnOnce(&CandidatePreview) -> bool,
    {
        let preview = self.preview_flat(records, fallback).await?;
        Ok(self.commit_preview(preview, SOURCE_FLAT, confirm).await)
    }

    /// Ranges matching the filter as re-importable flat rows.
    #[instrument(skip(self))]
    pub async fn export(
        &self,
        params: &ScheduleFilterParams,
    ) -> Result<Vec<ScheduleExportRow>, AppError> {
        let ranges = self.ranges(&params.to_store_filter()).await?;
        Ok(ranges.iter().map(ScheduleExportRow::from_range).collect())
    }

    async fn commit_preview<F>(
        &self,
        preview: CandidatePreview,
        source: &'static str,
        confirm: F,
    ) -> BatchOutcome
    where
        F: FnOnce(&CandidatePreview) -> bool,
    {
        let preflight = preview.issue_messages();
        if preview.has_issues() && !confirm(&preview) {
            info!(source, issues = preflight.len(), "Bulk run declined");
            return BatchOutcome::aborted(preflight);
        }

        self.commit_candidates(preview.candidates, source)
            .await
            .with_preflight(preflight)
    }

    /// Validates and writes each candidate independently.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub async fn commit_candidates(
        &self,
        candidates: Vec<NewAssignment>,
        source: &'static str,
    ) -> BatchOutcome {
        let items: Vec<ItemOutcome> = stream::iter(candidates)
            .map(|candidate| self.validate_and_insert(candidate))
            .buffer_unordered(self.config.bulk_concurrency)
            .collect()
            .await;

        let outcome = BatchOutcome::from_items(items);
        metrics::track_assignments_inserted(source, outcome.succeeded);
        metrics::track_bulk_failures(source, outcome.failed());
        info!(
            source,
            attempted = outcome.attempted,
            inserted = outcome.succeeded,
            "Bulk run finished"
        );
        outcome
    }

    async fn validate_and_insert(&self, mut candidate: NewAssignment) -> ItemOutcome {
        let item = candidate.describe();

        let authorized = self
            .validator
            .authorize(
                candidate.teacher_id,
                &candidate.teacher_name,
                &candidate.subject_name,
                &self.config.academic_year,
            )
            .await;
        match authorized {
            Ok(subject_name) => candidate.subject_name = subject_name,
            Err(err) => {
                let reason = err.error.to_string();
                return if err.is(ErrorKind::Authorization) {
                    ItemOutcome::Rejected { item, reason }
                } else {
                    ItemOutcome::Failed { item, reason }
                };
            }
        }

        match self.store.insert(&candidate).await {
            Ok(id) => ItemOutcome::Inserted { id, item },
            Err(err) => {
                warn!(item = %item, error = %err, "Bulk insert failed");
                ItemOutcome::Failed {
                    item,
                    reason: err.error.to_string(),
                }
            }
        }
    }

    async fn ensure_selectable(
        &self,
        class_name: &str,
        day: DayOfWeek,
        periods: &[i32],
    ) -> Result<(), AppError> {
        let slots = self.availability.available_periods(class_name, day).await?;
        if slots.is_empty() {
            return Err(AppError::input(anyhow!(
                "No periods are configured for class {} on {}",
                class_name,
                day
            )));
        }

        let allowed: HashSet<i32> = slots.iter().map(|slot| slot.period_number).collect();
        let unavailable: Vec<String> = periods
            .iter()
            .filter(|p| !allowed.contains(*p))
            .map(ToString::to_string)
            .collect();
        if !unavailable.is_empty() {
            return Err(AppError::input(anyhow!(
                "Period(s) {} are not available for class {} on {}",
                unavailable.join(", "),
                class_name,
                day
            )));
        }

        Ok(())
    }

    async fn insert_all(&self, rows: Vec<NewAssignment>) -> Result<Vec<TeachingAssignment>, AppError> {
        let mut created: Vec<TeachingAssignment> = Vec::with_capacity(rows.len());

        for row in rows {
            match self.store.insert(&row).await {
                Ok(id) => created.push(row.into_assignment(id)),
                Err(err) => {
                    self.discard(&created).await;
                    return Err(AppError::persistence(anyhow!(
                        "Failed to save {}: {}",
                        row.describe(),
                        err.error
                    )));
                }
            }
        }

        Ok(created)
    }

    async fn discard(&self, created: &[TeachingAssignment]) {
        for assignment in created {
            if let Err(err) = self.store.delete_by_id(assignment.id).await {
                warn!(assignment_id = %assignment.id, error = %err, "Could not remove partial write");
            }
        }
    }

    async fn delete_ids(&self, ids: &[AssignmentId]) -> Vec<ItemOutcome> {
        stream::iter(ids.iter().copied())
            .map(|id| async move {
                match self.store.delete_by_id(id).await {
                    Ok(()) => ItemOutcome::Deleted { id },
                    Err(err) => {
                        warn!(assignment_id = %id, error = %err, "Delete failed");
                        ItemOutcome::Failed {
                            item: format!("assignment {}", id),
                            reason: err.error.to_string(),
                        }
                    }
                }
            })
            .buffer_unordered(self.config.bulk_concurrency)
            .collect()
            .await
    }
}

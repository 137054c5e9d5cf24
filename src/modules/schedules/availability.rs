use std::sync::Arc;

use timetable_core::AppError;
use timetable_models::{DayOfWeek, PeriodSlot};
use tracing::{instrument, warn};

use super::master::MasterData;

/// Resolves the period slots a class may use on a given day.
#[derive(Clone)]
pub struct AvailabilityResolver {
    master: Arc<dyn MasterData>,
    default_program: String,
}

impl AvailabilityResolver {
    pub fn new(master: Arc<dyn MasterData>, default_program: impl Into<String>) -> Self {
        Self {
            master,
            default_program: default_program.into(),
        }
    }

    /// Program of a class, falling back to the default program when the
    /// class is missing from the class master.
    pub async fn program_for(&self, class_name: &str) -> Result<String, AppError> {
        Ok(self
            .master
            .class_info(class_name)
            .await?
            .map(|info| info.program)
            .unwrap_or_else(|| self.default_program.clone()))
    }

    /// Ordered slots for the class's program on `day`. An empty list is not
    /// an error.
    #[instrument(skip(self))]
    pub async fn available_periods(
        &self,
        class_name: &str,
        day: DayOfWeek,
    ) -> Result<Vec<PeriodSlot>, AppError> {
        let program = self.program_for(class_name).await?;
        let mut slots = self.master.period_slots(&program, day).await?;
        slots.sort_by_key(|slot| slot.period_number);

        if slots.is_empty() {
            warn!(class_name, %day, program = %program, "No period slots configured");
        }

        Ok(slots)
    }
}

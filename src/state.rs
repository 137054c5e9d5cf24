use sqlx::PgPool;

use crate::config::database::{DatabaseConfig, init_db_pool};
use crate::config::schedule::ScheduleConfig;
use crate::modules::schedules::service::ScheduleService;
use timetable_core::AppError;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub schedule_config: ScheduleConfig,
}

impl AppState {
    /// Schedule service backed by this state's Postgres pool.
    pub fn schedule_service(&self) -> ScheduleService {
        ScheduleService::from_pool(self.db.clone(), self.schedule_config.clone())
    }
}

pub async fn init_app_state() -> Result<AppState, AppError> {
    let database_config = DatabaseConfig::from_env()?;
    Ok(AppState {
        db: init_db_pool(&database_config).await?,
        schedule_config: ScheduleConfig::from_env(),
    })
}

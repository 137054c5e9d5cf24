use std::sync::Arc;

use timetable_core::AppError;
use timetable_models::TeacherId;
use tracing::{instrument, warn};

use super::master::MasterData;

/// Checks (teacher, subject, academic year) pairings against the
/// teacher-subject master list.
#[derive(Clone)]
pub struct AssignmentValidator {
    master: Arc<dyn MasterData>,
}

impl AssignmentValidator {
    pub fn new(master: Arc<dyn MasterData>) -> Self {
        Self { master }
    }

    /// Succeeds only when the teacher holds an authorization row for the
    /// subject in that academic year. Subject names compare trimmed and
    /// case-insensitively; the master's spelling is returned so stored rows
    /// share one subject name.
    #[instrument(skip(self))]
    pub async fn authorize(
        &self,
        teacher_id: TeacherId,
        teacher_name: &str,
        subject_name: &str,
        academic_year: &str,
    ) -> Result<String, AppError> {
        let wanted = subject_name.trim().to_lowercase();
        let rows = self.master.authorizations(teacher_id, academic_year).await?;

        if let Some(row) = rows
            .into_iter()
            .find(|row| row.subject_name.trim().to_lowercase() == wanted)
        {
            return Ok(row.subject_name.trim().to_string());
        }

        warn!(%teacher_id, teacher_name, subject_name, academic_year, "Pairing not authorized");
        Err(AppError::authorization(anyhow::anyhow!(
            "{} is not authorized to teach {} in {}",
            teacher_name,
            subject_name.trim(),
            academic_year
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryMasterData;
    use timetable_core::ErrorKind;

    const TEACHER: TeacherId = TeacherId::from_u128(5);

    fn validator() -> AssignmentValidator {
        let master = InMemoryMasterData::new()
            .with_teacher(TEACHER, "Dewi Lestari")
            .with_authorization(TEACHER, "Bahasa Indonesia", "2025/2026");
        AssignmentValidator::new(Arc::new(master))
    }

    #[tokio::test]
    async fn test_authorized_pairing_returns_master_spelling() {
        let subject = validator()
            .authorize(TEACHER, "Dewi Lestari", " bahasa indonesia ", "2025/2026")
            .await
            .unwrap();
        assert_eq!(subject, "Bahasa Indonesia");
    }

    #[tokio::test]
    async fn test_other_subject_or_year_fails_closed() {
        let v = validator();

        let err = v
            .authorize(TEACHER, "Dewi Lestari", "Sejarah", "2025/2026")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
        assert_eq!(
            err.to_string(),
            "authorization error: Dewi Lestari is not authorized to teach Sejarah in 2025/2026"
        );

        let err = v
            .authorize(TEACHER, "Dewi Lestari", "Bahasa Indonesia", "2026/2027")
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Authorization));
    }
}

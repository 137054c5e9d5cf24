#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use timetable::config::schedule::ScheduleConfig;
use timetable::modules::schedules::ScheduleService;
use timetable::testing::{InMemoryAssignmentStore, InMemoryMasterData};
use timetable_models::{DayOfWeek, NewAssignment, TeacherId};

pub const YEAR: &str = "2025/2026";

pub const SITI: TeacherId = TeacherId::from_u128(0x01);
pub const BUDI: TeacherId = TeacherId::from_u128(0x02);
/// Shares a display name with [`BUDI`]
pub const BUDI_TWIN: TeacherId = TeacherId::from_u128(0x03);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn effective() -> NaiveDate {
    date(2025, 7, 14)
}

/// Two programs: `Reguler` with 8 periods Monday to Thursday and
/// `Unggulan` (class XI-IPA) with 10 on Monday. Siti teaches Matematika,
/// Budi teaches Fisika; Budi also has a Kimia code but no Kimia
/// authorization.
pub fn master() -> InMemoryMasterData {
    InMemoryMasterData::new()
        .with_teacher(SITI, "Siti Rahma")
        .with_teacher(BUDI, "Budi Santoso")
        .with_teacher(BUDI_TWIN, "Budi Santoso")
        .with_class("X-1", "Reguler")
        .with_class("X-2", "Reguler")
        .with_class("XI-IPA", "Unggulan")
        .with_slots("Reguler", DayOfWeek::Monday, 8)
        .with_slots("Reguler", DayOfWeek::Tuesday, 8)
        .with_slots("Reguler", DayOfWeek::Wednesday, 8)
        .with_slots("Reguler", DayOfWeek::Thursday, 8)
        .with_slots("Unggulan", DayOfWeek::Monday, 10)
        .with_authorization(SITI, "Matematika", YEAR)
        .with_authorization(BUDI, "Fisika", YEAR)
        .with_authorization(BUDI_TWIN, "Fisika", YEAR)
        .with_authorization(SITI, "Fisika", "2024/2025")
        .with_code("MTK", "T01", SITI, "Matematika", YEAR)
        .with_code("FIS", "T02", BUDI, "Fisika", YEAR)
        .with_code("KIM", "T02", BUDI, "Kimia", YEAR)
}

pub struct Harness {
    pub store: Arc<InMemoryAssignmentStore>,
    pub service: ScheduleService,
}

pub fn harness() -> Harness {
    harness_with(master())
}

pub fn harness_with(master: InMemoryMasterData) -> Harness {
    let store = Arc::new(InMemoryAssignmentStore::new());
    let service = ScheduleService::new(
        store.clone(),
        Arc::new(master),
        ScheduleConfig::for_year(YEAR),
    );
    Harness { store, service }
}

pub fn assignment(
    teacher_id: TeacherId,
    teacher_name: &str,
    subject: &str,
    day: DayOfWeek,
    class_name: &str,
    period_number: i32,
    effective_from: NaiveDate,
) -> NewAssignment {
    NewAssignment {
        teacher_id,
        teacher_name: teacher_name.to_string(),
        subject_name: subject.to_string(),
        day_of_week: day,
        class_name: class_name.to_string(),
        period_number,
        effective_from,
        active: true,
    }
}

/// Seeds Siti's Matematika periods in X-1 on Monday.
pub fn seed_siti_monday(
    store: &InMemoryAssignmentStore,
    periods: &[i32],
    effective_from: NaiveDate,
) {
    for period in periods {
        store.seed(assignment(
            SITI,
            "Siti Rahma",
            "Matematika",
            DayOfWeek::Monday,
            "X-1",
            *period,
            effective_from,
        ));
    }
}

pub fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect()
}

mod common;

use common::*;
use timetable_core::{ErrorKind, PaginationParams};
use timetable_models::{
    AssignmentFilter, CreateScheduleDto, DayOfWeek, ScheduleFilterParams, UpdateRangeDto,
};

fn create_dto(periods: Vec<i32>) -> CreateScheduleDto {
    CreateScheduleDto {
        teacher_id: SITI,
        subject_name: "Matematika".to_string(),
        day_of_week: DayOfWeek::Monday,
        class_name: "X-1".to_string(),
        periods,
        effective_from: effective(),
    }
}

#[tokio::test]
async fn test_create_writes_one_row_per_period() {
    let h = harness();

    let created = h.service.create(create_dto(vec![3, 1, 2, 2])).await.unwrap();

    let periods: Vec<i32> = created.iter().map(|a| a.period_number).collect();
    assert_eq!(periods, vec![1, 2, 3]);
    assert_eq!(h.store.rows().len(), 3);
    assert!(created.iter().all(|a| a.teacher_name == "Siti Rahma" && a.active));
}

#[tokio::test]
async fn test_create_unauthorized_pairing_never_reaches_store() {
    let h = harness();
    let dto = CreateScheduleDto {
        subject_name: "Kimia".to_string(),
        ..create_dto(vec![1, 2])
    };

    let err = h.service.create(dto).await.unwrap_err();

    assert!(err.is(ErrorKind::Authorization));
    assert_eq!(h.store.insert_calls(), 0);
    assert!(h.store.rows().is_empty());
}

#[tokio::test]
async fn test_create_authorization_is_per_academic_year() {
    // Siti taught Fisika last year only
    let h = harness();
    let dto = CreateScheduleDto {
        subject_name: "Fisika".to_string(),
        ..create_dto(vec![1])
    };

    let err = h.service.create(dto).await.unwrap_err();
    assert!(err.is(ErrorKind::Authorization));
    assert_eq!(h.store.insert_calls(), 0);
}

#[tokio::test]
async fn test_create_subject_match_ignores_case_and_whitespace() {
    let h = harness();
    let dto = CreateScheduleDto {
        subject_name: "  matematika ".to_string(),
        ..create_dto(vec![4])
    };

    let created = h.service.create(dto).await.unwrap();
    assert_eq!(created[0].subject_name, "Matematika");
}

#[tokio::test]
async fn test_create_rejects_missing_periods_and_unknown_teacher() {
    let h = harness();

    let err = h.service.create(create_dto(vec![])).await.unwrap_err();
    assert!(err.is(ErrorKind::Input));

    let dto = CreateScheduleDto {
        teacher_id: timetable_models::TeacherId::from_u128(0xdead),
        ..create_dto(vec![1])
    };
    let err = h.service.create(dto).await.unwrap_err();
    assert!(err.is(ErrorKind::Input));
    assert_eq!(h.store.insert_calls(), 0);
}

#[tokio::test]
async fn test_create_rejects_periods_outside_bell_schedule() {
    let h = harness();

    let err = h.service.create(create_dto(vec![7, 8, 9])).await.unwrap_err();

    assert!(err.is(ErrorKind::Input));
    assert!(err.to_string().contains("9"));
    assert_eq!(h.store.insert_calls(), 0);
}

#[tokio::test]
async fn test_create_rejects_day_without_slots() {
    let h = harness();
    let dto = CreateScheduleDto {
        day_of_week: DayOfWeek::Saturday,
        ..create_dto(vec![1])
    };

    let err = h.service.create(dto).await.unwrap_err();
    assert!(err.is(ErrorKind::Input));
    assert_eq!(h.store.insert_calls(), 0);
}

#[tokio::test]
async fn test_create_failure_removes_partial_rows() {
    let h = harness();
    h.store.fail_inserts_for_period(3);

    let err = h.service.create(create_dto(vec![1, 2, 3])).await.unwrap_err();

    assert!(err.is(ErrorKind::Persistence));
    assert_eq!(h.store.insert_calls(), 3);
    assert!(h.store.rows().is_empty());
}

#[tokio::test]
async fn test_available_periods_use_class_program() {
    let h = harness();

    let unggulan = h
        .service
        .available_periods("xi-ipa", DayOfWeek::Monday)
        .await
        .unwrap();
    assert_eq!(unggulan.len(), 10);

    // Unknown classes fall back to the default program
    let fallback = h
        .service
        .available_periods("XII-9", DayOfWeek::Tuesday)
        .await
        .unwrap();
    let numbers: Vec<i32> = fallback.iter().map(|s| s.period_number).collect();
    assert_eq!(numbers, (1..=8).collect::<Vec<_>>());

    let none = h
        .service
        .available_periods("X-1", DayOfWeek::Sunday)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_list_consolidates_and_orders_by_day_weight() {
    let h = harness();
    seed_siti_monday(&h.store, &[1, 2, 3, 5, 6, 8], effective());
    h.store.seed(assignment(
        BUDI,
        "Budi Santoso",
        "Fisika",
        DayOfWeek::Friday,
        "X-1",
        1,
        effective(),
    ));
    h.store.seed(assignment(
        BUDI,
        "Budi Santoso",
        "Fisika",
        DayOfWeek::Wednesday,
        "X-2",
        4,
        effective(),
    ));

    let response = h
        .service
        .list(&ScheduleFilterParams::default())
        .await
        .unwrap();

    let labels: Vec<(DayOfWeek, &str)> = response
        .data
        .iter()
        .map(|r| (r.day_of_week, r.label.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (DayOfWeek::Monday, "1-3"),
            (DayOfWeek::Monday, "5-6"),
            (DayOfWeek::Monday, "8"),
            (DayOfWeek::Wednesday, "4"),
            (DayOfWeek::Friday, "1"),
        ]
    );
    assert_eq!(response.meta.total, 5);
    assert!(!response.meta.has_more);
}

#[tokio::test]
async fn test_list_never_merges_distinct_teachers_with_same_name() {
    let h = harness();
    for (teacher, period) in [(BUDI, 1), (BUDI_TWIN, 2)] {
        h.store.seed(assignment(
            teacher,
            "Budi Santoso",
            "Fisika",
            DayOfWeek::Tuesday,
            "X-2",
            period,
            effective(),
        ));
    }

    let response = h
        .service
        .list(&ScheduleFilterParams::default())
        .await
        .unwrap();
    assert_eq!(response.data.len(), 2);
}

#[tokio::test]
async fn test_list_as_of_returns_every_row_in_force() {
    let h = harness();
    seed_siti_monday(&h.store, &[1], date(2025, 1, 1));
    seed_siti_monday(&h.store, &[1], date(2025, 6, 1));

    let march = ScheduleFilterParams {
        as_of: Some(date(2025, 3, 1)),
        ..Default::default()
    };
    let response = h.service.list(&march).await.unwrap();
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].effective_from, date(2025, 1, 1));

    let july = ScheduleFilterParams {
        as_of: Some(date(2025, 7, 1)),
        ..Default::default()
    };
    let response = h.service.list(&july).await.unwrap();
    assert_eq!(response.data.len(), 2);
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let h = harness();
    seed_siti_monday(&h.store, &[1, 3, 5], effective());
    h.store.seed(assignment(
        BUDI,
        "Budi Santoso",
        "Fisika",
        DayOfWeek::Monday,
        "X-2",
        2,
        effective(),
    ));

    let by_search = ScheduleFilterParams {
        search: Some("fis".to_string()),
        ..Default::default()
    };
    let response = h.service.list(&by_search).await.unwrap();
    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].class_name, "X-2");

    let by_class = ScheduleFilterParams {
        class_name: Some("x-1".to_string()),
        pagination: PaginationParams {
            limit: Some(2),
            offset: None,
            page: Some(1),
        },
        ..Default::default()
    };
    let response = h.service.list(&by_class).await.unwrap();
    assert_eq!(response.data.len(), 2);
    assert_eq!(response.meta.total, 3);
    assert!(response.meta.has_more);
}

#[tokio::test]
async fn test_update_range_replaces_rows() {
    let h = harness();
    seed_siti_monday(&h.store, &[2, 3, 4], effective());
    let range = h
        .service
        .ranges(&AssignmentFilter::default())
        .await
        .unwrap()
        .remove(0);
    let old_ids = range.assignment_ids.clone();

    let created = h
        .service
        .update_range(
            &range,
            UpdateRangeDto {
                periods: vec![5, 6],
                effective_from: Some(date(2026, 1, 5)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    let rows = h.store.rows();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !old_ids.contains(&r.id)));
    assert!(rows.iter().all(|r| r.effective_from == date(2026, 1, 5)));

    let ranges = h.service.ranges(&AssignmentFilter::default()).await.unwrap();
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].label, "5-6");
}

#[tokio::test]
async fn test_update_range_can_change_teacher_and_subject() {
    let h = harness();
    seed_siti_monday(&h.store, &[1, 2], effective());
    let range = h
        .service
        .ranges(&AssignmentFilter::default())
        .await
        .unwrap()
        .remove(0);

    h.service
        .update_range(
            &range,
            UpdateRangeDto {
                teacher_id: Some(BUDI),
                subject_name: Some("Fisika".to_string()),
                periods: vec![1, 2],
                effective_from: None,
            },
        )
        .await
        .unwrap();

    let rows = h.store.rows();
    assert!(rows.iter().all(|r| r.teacher_id == BUDI
        && r.teacher_name == "Budi Santoso"
        && r.subject_name == "Fisika"
        && r.effective_from == effective()));
}

#[tokio::test]
async fn test_update_range_rejected_pairing_leaves_range_untouched() {
    let h = harness();
    seed_siti_monday(&h.store, &[1, 2], effective());
    let range = h
        .service
        .ranges(&AssignmentFilter::default())
        .await
        .unwrap()
        .remove(0);

    let err = h
        .service
        .update_range(
            &range,
            UpdateRangeDto {
                subject_name: Some("Kimia".to_string()),
                periods: vec![1, 2, 3],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::Authorization));
    assert_eq!(h.store.rows().len(), 2);
    assert_eq!(h.store.insert_calls(), 0);
}

#[tokio::test]
async fn test_update_range_stops_when_a_delete_fails() {
    let h = harness();
    seed_siti_monday(&h.store, &[1, 2, 3], effective());
    let range = h
        .service
        .ranges(&AssignmentFilter::default())
        .await
        .unwrap()
        .remove(0);
    h.store.fail_delete_of(range.assignment_ids[1]);

    let err = h
        .service
        .update_range(
            &range,
            UpdateRangeDto {
                periods: vec![4],
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::Persistence));
    assert_eq!(h.store.insert_calls(), 0);
    // Sibling deletes are not compensated
    let rows = h.store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, range.assignment_ids[1]);
}

#[tokio::test]
async fn test_delete_single_and_missing_id() {
    let h = harness();
    seed_siti_monday(&h.store, &[1], effective());
    let id = h.store.rows()[0].id;

    h.service.delete(id).await.unwrap();
    assert!(h.store.rows().is_empty());

    let err = h.service.delete(id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_delete_range_reports_partial_failure() {
    let h = harness();
    seed_siti_monday(&h.store, &[1, 2, 3], effective());
    let range = h
        .service
        .ranges(&AssignmentFilter::default())
        .await
        .unwrap()
        .remove(0);
    h.store.fail_delete_of(range.assignment_ids[0]);

    let outcome = h.service.delete_range(&range).await.unwrap();

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(h.store.rows().len(), 1);
}

#[tokio::test]
async fn test_export_uses_flat_period_syntax() {
    let h = harness();
    seed_siti_monday(&h.store, &[1, 2, 3, 6], effective());

    let rows = h
        .service
        .export(&ScheduleFilterParams::default())
        .await
        .unwrap();

    let periods: Vec<&str> = rows.iter().map(|r| r.periods.as_str()).collect();
    assert_eq!(periods, vec!["1-3", "6"]);
    assert_eq!(rows[0].day, "Senin");
    assert_eq!(rows[0].teacher, "Siti Rahma");
    assert_eq!(rows[0].effective_from, "2025-07-14");
}

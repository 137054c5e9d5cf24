use timetable::modules::schedules::model::{BatchOutcome, CandidatePreview, ConsolidatedRange, PeriodSlot};

/// `Senin 1-3 | X-1 | Matematika | Siti Rahma | from 2025-07-14`
pub fn range_line(range: &ConsolidatedRange) -> String {
    format!(
        "{} {} | {} | {} | {} | from {}",
        range.day_of_week,
        range.label,
        range.class_name,
        range.subject_name,
        range.teacher_name,
        range.effective_from.format("%Y-%m-%d")
    )
}

pub fn slot_line(slot: &PeriodSlot) -> String {
    format!(
        "{:>2}. {}-{}",
        slot.period_number,
        slot.start_time.format("%H:%M"),
        slot.end_time.format("%H:%M")
    )
}

pub fn print_preview(preview: &CandidatePreview) {
    println!(
        "\n📋 {} candidate assignment(s), {} issue(s)",
        preview.candidates.len(),
        preview.issues.len()
    );
    for message in preview.issue_messages() {
        println!("   ⚠️  {}", message);
    }
}

pub fn print_outcome(outcome: &BatchOutcome) {
    if outcome.aborted {
        println!("\n⏹️  Aborted, nothing was written");
        return;
    }

    let icon = if outcome.is_complete() { "✅" } else { "⚠️ " };
    println!(
        "\n{} {} of {} write(s) succeeded",
        icon, outcome.succeeded, outcome.attempted
    );
    for error in &outcome.errors {
        println!("   - {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use timetable::modules::schedules::model::{DayOfWeek, TeacherId};

    #[test]
    fn test_range_line() {
        let range = ConsolidatedRange {
            teacher_id: TeacherId::from_u128(1),
            teacher_name: "Siti Rahma".to_string(),
            subject_name: "Matematika".to_string(),
            day_of_week: DayOfWeek::Monday,
            class_name: "X-1".to_string(),
            effective_from: NaiveDate::from_ymd_opt(2025, 7, 14).unwrap(),
            start_period: 1,
            end_period: 3,
            label: "1-3".to_string(),
            assignment_ids: vec![],
        };
        assert_eq!(
            range_line(&range),
            "Senin 1-3 | X-1 | Matematika | Siti Rahma | from 2025-07-14"
        );
    }
}

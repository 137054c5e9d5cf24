//! Merging atomic assignments into contiguous period ranges, and expanding
//! an edited range back into atomic writes.
//!
//! Rows are grouped by (teacher id, subject, day, class, effective date).
//! Within a group, periods are walked in ascending order; a period exactly
//! one past the current range's last period extends it, anything else
//! (a gap or a duplicate) closes it and opens a new one. Every input id
//! ends up in exactly one range.

use chrono::NaiveDate;
use std::collections::HashMap;
use timetable_models::{
    AssignmentId, ConsolidatedRange, DayOfWeek, NewAssignment, TeacherId, TeachingAssignment,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    teacher_id: TeacherId,
    subject_name: String,
    day_of_week: DayOfWeek,
    class_name: String,
    effective_from: NaiveDate,
}

impl GroupKey {
    fn of(assignment: &TeachingAssignment) -> Self {
        Self {
            teacher_id: assignment.teacher_id,
            subject_name: assignment.subject_name.clone(),
            day_of_week: assignment.day_of_week,
            class_name: assignment.class_name.clone(),
            effective_from: assignment.effective_from,
        }
    }
}

struct OpenRange {
    first: TeachingAssignment,
    last: i32,
    ids: Vec<AssignmentId>,
}

impl OpenRange {
    fn start(row: TeachingAssignment) -> Self {
        Self {
            last: row.period_number,
            ids: vec![row.id],
            first: row,
        }
    }

    fn extends_with(&self, row: &TeachingAssignment) -> bool {
        row.period_number == self.last + 1
    }

    fn push(&mut self, row: TeachingAssignment) {
        self.last = row.period_number;
        self.ids.push(row.id);
    }

    fn close(self) -> ConsolidatedRange {
        let start = self.first.period_number;
        ConsolidatedRange {
            teacher_id: self.first.teacher_id,
            teacher_name: self.first.teacher_name,
            subject_name: self.first.subject_name,
            day_of_week: self.first.day_of_week,
            class_name: self.first.class_name,
            effective_from: self.first.effective_from,
            start_period: start,
            end_period: self.last,
            label: range_label(start, self.last),
            assignment_ids: self.ids,
        }
    }
}

/// `"3"` for a single period, `"3-5"` otherwise.
pub fn range_label(start: i32, end: i32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

/// Groups and merges assignments, returning ranges in display order.
pub fn consolidate(assignments: Vec<TeachingAssignment>) -> Vec<ConsolidatedRange> {
    let mut groups: HashMap<GroupKey, Vec<TeachingAssignment>> = HashMap::new();
    for assignment in assignments {
        groups
            .entry(GroupKey::of(&assignment))
            .or_default()
            .push(assignment);
    }

    let mut ranges = Vec::new();
    for (_, mut rows) in groups {
        rows.sort_by_key(|row| (row.period_number, row.id));
        merge_group(rows, &mut ranges);
    }

    sort_ranges(&mut ranges);
    ranges
}

fn merge_group(rows: Vec<TeachingAssignment>, out: &mut Vec<ConsolidatedRange>) {
    let mut current: Option<OpenRange> = None;

    for row in rows {
        let extends = current.as_ref().is_some_and(|open| open.extends_with(&row));
        if extends {
            if let Some(open) = current.as_mut() {
                open.push(row);
            }
        } else if let Some(done) = current.replace(OpenRange::start(row)) {
            out.push(done.close());
        }
    }

    if let Some(done) = current {
        out.push(done.close());
    }
}

/// Day weight (Monday first), then start period. Remaining ties fall back
/// to class, teacher, subject and effective date so output is stable.
pub fn sort_ranges(ranges: &mut [ConsolidatedRange]) {
    ranges.sort_by(|a, b| {
        a.day_of_week
            .weight()
            .cmp(&b.day_of_week.weight())
            .then(a.start_period.cmp(&b.start_period))
            .then_with(|| a.class_name.cmp(&b.class_name))
            .then_with(|| a.teacher_name.cmp(&b.teacher_name))
            .then_with(|| a.subject_name.cmp(&b.subject_name))
            .then_with(|| a.effective_from.cmp(&b.effective_from))
            .then_with(|| a.teacher_id.cmp(&b.teacher_id))
    });
}

/// Period numbers covered by a range.
pub fn expand(range: &ConsolidatedRange) -> Vec<i32> {
    range.periods()
}

/// Sorted, de-duplicated period selection.
pub fn normalize_periods(periods: &[i32]) -> Vec<i32> {
    let mut periods = periods.to_vec();
    periods.sort_unstable();
    periods.dedup();
    periods
}

/// Atomic writes replacing an edited range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeEdit {
    pub delete_ids: Vec<AssignmentId>,
    pub inserts: Vec<NewAssignment>,
}

/// Plans the delete-then-recreate of a range. Day and class stay with the
/// range; teacher, subject, periods and effective date come from the edit.
pub fn plan_edit(
    range: &ConsolidatedRange,
    teacher_id: TeacherId,
    teacher_name: &str,
    subject_name: &str,
    periods: &[i32],
    effective_from: NaiveDate,
) -> RangeEdit {
    let inserts = normalize_periods(periods)
        .into_iter()
        .map(|period_number| NewAssignment {
            teacher_id,
            teacher_name: teacher_name.to_string(),
            subject_name: subject_name.trim().to_string(),
            day_of_week: range.day_of_week,
            class_name: range.class_name.clone(),
            period_number,
            effective_from,
            active: true,
        })
        .collect();

    RangeEdit {
        delete_ids: range.assignment_ids.clone(),
        inserts,
    }
}

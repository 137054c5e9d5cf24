//! Flat row-per-assignment sheet importer.
//!
//! Each record is keyed by its column header. Headers are matched after
//! normalization (trimmed, lowercased, spaces and dashes folded to `_`)
//! against a fixed alias list per field, so both English and Indonesian
//! sheets import. The period column accepts `"3"`, `"1,3,5"` or `"2-4"`;
//! one candidate is produced per period.

use chrono::NaiveDate;
use std::collections::HashMap;
use timetable_core::serde::parse_flexible_date;
use timetable_models::{CandidatePreview, DayOfWeek, ImportIssue, NewAssignment, Teacher};

use super::grid::parse_period_number;

/// One sheet row keyed by its (raw) header.
pub type SheetRecord = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Teacher,
    Subject,
    Day,
    Class,
    Period,
    EffectiveFrom,
    Active,
}

impl Field {
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Field::Teacher => &["teacher", "teacher_name", "guru", "nama_guru"],
            Field::Subject => &["subject", "subject_name", "mapel", "mata_pelajaran"],
            Field::Day => &["day", "day_of_week", "hari"],
            Field::Class => &["class", "class_name", "kelas"],
            Field::Period => &["period", "periods", "jam", "jam_ke"],
            Field::EffectiveFrom => &["effective_from", "berlaku_mulai", "tanggal_berlaku"],
            Field::Active => &["active", "aktif", "status"],
        }
    }
}

pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Trimmed, non-blank value of a field.
///
/// When several columns carry the field, the one whose alias comes first in
/// [`Field::aliases`] wins; headers normalizing to the same alias are taken
/// in header order.
fn field(record: &SheetRecord, field: Field) -> Option<&str> {
    field.aliases().iter().find_map(|alias| {
        record
            .iter()
            .filter(|(header, value)| {
                normalize_header(header) == *alias && !value.trim().is_empty()
            })
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, value)| value.trim())
    })
}

/// Expands a period field into sorted, distinct period numbers.
///
/// Returns `None` when any part is outside
/// `1..=`[`MAX_PERIOD_NUMBER`](super::grid::MAX_PERIOD_NUMBER) or a
/// range runs backwards.
pub fn parse_period_field(raw: &str) -> Option<Vec<i32>> {
    let mut periods = Vec::new();

    for part in raw.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_period_number(start)?;
                let end = parse_period_number(end)?;
                if start > end {
                    return None;
                }
                periods.extend(start..=end);
            }
            None => periods.push(parse_period_number(part)?),
        }
    }

    periods.sort_unstable();
    periods.dedup();
    Some(periods)
}

/// `"Tidak"` marks a row inactive; anything else is active.
pub fn parse_active_flag(raw: Option<&str>) -> bool {
    !raw.is_some_and(|v| v.trim().eq_ignore_ascii_case("tidak"))
}

/// Parses flat records into candidates plus issues.
///
/// Row numbers in issues are 1-based sheet rows with the header on row 1.
/// Rows missing a teacher, day, class or period are skipped without an
/// issue. A blank effective date falls back to `fallback`.
pub fn parse_flat(records: &[SheetRecord], teachers: &[Teacher], fallback: NaiveDate) -> CandidatePreview {
    let mut by_name: HashMap<String, &Teacher> = HashMap::new();
    for teacher in teachers {
        by_name
            .entry(teacher.name.trim().to_lowercase())
            .or_insert(teacher);
    }

    let mut preview = CandidatePreview::default();

    for (index, record) in records.iter().enumerate() {
        let row = index + 2;
        let (Some(teacher_raw), Some(day_raw), Some(class_name), Some(period_raw)) = (
            field(record, Field::Teacher),
            field(record, Field::Day),
            field(record, Field::Class),
            field(record, Field::Period),
        ) else {
            continue;
        };

        let mut issues = Vec::new();

        let teacher = by_name.get(&teacher_raw.to_lowercase()).copied();
        if teacher.is_none() {
            issues.push(ImportIssue::UnknownTeacher {
                row,
                name: teacher_raw.to_string(),
            });
        }

        let day = day_raw.parse::<DayOfWeek>().ok();
        if day.is_none() {
            issues.push(ImportIssue::UnknownDay {
                row,
                raw: day_raw.to_string(),
            });
        }

        let periods = parse_period_field(period_raw);
        if periods.is_none() {
            issues.push(ImportIssue::InvalidPeriod {
                row,
                raw: period_raw.to_string(),
            });
        }

        let effective_from = match field(record, Field::EffectiveFrom) {
            None => Some(fallback),
            Some(raw) => {
                let parsed = parse_flexible_date(raw);
                if parsed.is_none() {
                    issues.push(ImportIssue::InvalidDate {
                        row,
                        raw: raw.to_string(),
                    });
                }
                parsed
            }
        };

        let (Some(teacher), Some(day), Some(periods), Some(effective_from)) =
            (teacher, day, periods, effective_from)
        else {
            preview.issues.extend(issues);
            continue;
        };

        let subject_name = field(record, Field::Subject).unwrap_or_default();
        let active = parse_active_flag(field(record, Field::Active));

        preview
            .candidates
            .extend(periods.into_iter().map(|period_number| NewAssignment {
                teacher_id: teacher.id,
                teacher_name: teacher.name.clone(),
                subject_name: subject_name.to_string(),
                day_of_week: day,
                class_name: class_name.to_string(),
                period_number,
                effective_from,
                active,
            }));
    }

    preview
}

//! Day/period × class grid parser.
//!
//! Layout (1-based rows and columns):
//!
//! ```text
//! row 1   | title / header, ignored
//! row 2   | -     | -      | X-1      | X-2      | ...
//! row 3.. | Senin | 1      | MTK T01  |          | ...
//! ```
//!
//! Each class cell holds `"<SUBJECT_CODE> <TEACHER_CODE>"` or is blank.
//! Codes are resolved against the code master of the academic year. Bad
//! cells are recorded as issues and parsing continues.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use timetable_core::AppError;
use timetable_models::masters::code_key;
use timetable_models::{CandidatePreview, DayOfWeek, ImportIssue, NewAssignment, TeacherSubjectCode};

const CLASS_ROW: usize = 1;
const FIRST_DATA_ROW: usize = 2;
const FIRST_CLASS_COLUMN: usize = 2;

/// Highest period number accepted from a sheet.
pub const MAX_PERIOD_NUMBER: i32 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCell {
    pub subject_code: String,
    pub teacher_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    pub row: usize,
    pub class: String,
    pub raw: String,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&ImportIssue::from(self.clone()), f)
    }
}

impl std::error::Error for CellError {}

impl From<CellError> for ImportIssue {
    fn from(err: CellError) -> Self {
        ImportIssue::MalformedCell {
            row: err.row,
            class: err.class,
            raw: err.raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Parsed(ParsedCell),
    Malformed(CellError),
}

/// Parses one class cell. `row` is the 1-based sheet row.
pub fn parse_cell(raw: &str, row: usize, class: &str) -> GridCell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return GridCell::Blank;
    }

    let mut tokens = trimmed.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(subject_code), Some(teacher_code)) => GridCell::Parsed(ParsedCell {
            subject_code: subject_code.to_string(),
            teacher_code: teacher_code.to_string(),
        }),
        _ => GridCell::Malformed(CellError {
            row,
            class: class.to_string(),
            raw: trimmed.to_string(),
        }),
    }
}

/// Period number in `1..=MAX_PERIOD_NUMBER`, tolerating spreadsheet floats
/// such as `"3.0"`.
pub(crate) fn parse_period_number(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    let value = raw.parse::<i32>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && *f <= i32::MAX as f64)
            .map(|f| f as i32)
    })?;
    (1..=MAX_PERIOD_NUMBER).contains(&value).then_some(value)
}

struct GridAccumulator<'a> {
    codes: HashMap<(String, String), &'a TeacherSubjectCode>,
    effective_from: NaiveDate,
    preview: CandidatePreview,
}

impl<'a> GridAccumulator<'a> {
    fn new(codes: &'a [TeacherSubjectCode], effective_from: NaiveDate) -> Self {
        let mut by_key = HashMap::new();
        for code in codes {
            by_key.entry(code.key()).or_insert(code);
        }
        Self {
            codes: by_key,
            effective_from,
            preview: CandidatePreview::default(),
        }
    }

    fn accept(&mut self, cell: GridCell, row: usize, class: &str, day: DayOfWeek, period: i32) {
        let parsed = match cell {
            GridCell::Blank => return,
            GridCell::Malformed(err) => {
                self.preview.issues.push(err.into());
                return;
            }
            GridCell::Parsed(parsed) => parsed,
        };

        match self.codes.get(&code_key(&parsed.subject_code, &parsed.teacher_code)) {
            Some(code) => self.preview.candidates.push(NewAssignment {
                teacher_id: code.teacher_id,
                teacher_name: code.teacher_name.clone(),
                subject_name: code.subject_name.clone(),
                day_of_week: day,
                class_name: class.to_string(),
                period_number: period,
                effective_from: self.effective_from,
                active: true,
            }),
            None => self.preview.issues.push(ImportIssue::UnknownCode {
                row,
                class: class.to_string(),
                subject_code: parsed.subject_code,
                teacher_code: parsed.teacher_code,
            }),
        }
    }

    fn record(&mut self, issue: ImportIssue) {
        self.preview.issues.push(issue);
    }

    fn finish(self) -> CandidatePreview {
        self.preview
    }
}

fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(|s| s.trim()).unwrap_or("")
}

/// Class names from row 2, with their column positions.
fn class_columns(sheet: &[Vec<String>]) -> Vec<(usize, String)> {
    sheet
        .get(CLASS_ROW)
        .map(|row| {
            row.iter()
                .enumerate()
                .skip(FIRST_CLASS_COLUMN)
                .filter(|(_, name)| !name.trim().is_empty())
                .map(|(column, name)| (column, name.trim().to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Parses a grid sheet into candidates plus issues.
///
/// Fails only when row 2 names no class at all.
pub fn parse_grid(
    sheet: &[Vec<String>],
    codes: &[TeacherSubjectCode],
    effective_from: NaiveDate,
) -> Result<CandidatePreview, AppError> {
    let classes = class_columns(sheet);
    if classes.is_empty() {
        return Err(AppError::input(anyhow::anyhow!(
            "No class names found in row 2 of the sheet"
        )));
    }

    let mut acc = GridAccumulator::new(codes, effective_from);

    for (index, data_row) in sheet.iter().enumerate().skip(FIRST_DATA_ROW) {
        let row_number = index + 1;
        let day_raw = cell(data_row, 0);
        let period_raw = cell(data_row, 1);
        if day_raw.is_empty() || period_raw.is_empty() {
            continue;
        }

        let Some(period) = parse_period_number(period_raw) else {
            continue;
        };
        let day = match day_raw.parse::<DayOfWeek>() {
            Ok(day) => day,
            Err(_) => {
                acc.record(ImportIssue::UnknownDay {
                    row: row_number,
                    raw: day_raw.to_string(),
                });
                continue;
            }
        };

        for (column, class) in &classes {
            let parsed = parse_cell(cell(data_row, *column), row_number, class);
            acc.accept(parsed, row_number, class, day, period);
        }
    }

    Ok(acc.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetable_models::TeacherId;

    fn sheet(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn codes() -> Vec<TeacherSubjectCode> {
        vec![TeacherSubjectCode {
            subject_code: "MTK".to_string(),
            teacher_code: "T01".to_string(),
            teacher_id: TeacherId::from_u128(1),
            teacher_name: "Siti Rahma".to_string(),
            subject_name: "Matematika".to_string(),
            academic_year: "2025/2026".to_string(),
        }]
    }

    fn effective() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
    }

    #[test]
    fn test_parse_cell_variants() {
        assert_eq!(parse_cell("   ", 3, "X-1"), GridCell::Blank);
        assert_eq!(
            parse_cell(" MTK  T01 ", 3, "X-1"),
            GridCell::Parsed(ParsedCell {
                subject_code: "MTK".to_string(),
                teacher_code: "T01".to_string(),
            })
        );
        match parse_cell("MTK", 4, "X-2") {
            GridCell::Malformed(err) => {
                assert_eq!(err.to_string(), "Row 4, Class X-2: malformed cell 'MTK'")
            }
            other => panic!("expected malformed cell, got {:?}", other),
        }
    }

    #[test]
    fn test_one_malformed_and_one_valid_cell() {
        let grid = sheet(&[
            &["Jadwal", "", "", ""],
            &["Hari", "Jam", "X-1", "X-2"],
            &["Senin", "1", "MTK T01", ""],
            &["Senin", "2", "", "MTK"],
        ]);

        let preview = parse_grid(&grid, &codes(), effective()).unwrap();
        assert_eq!(preview.candidates.len(), 1);
        assert_eq!(preview.issues.len(), 1);

        let candidate = &preview.candidates[0];
        assert_eq!(candidate.class_name, "X-1");
        assert_eq!(candidate.day_of_week, DayOfWeek::Monday);
        assert_eq!(candidate.period_number, 1);
        assert_eq!(candidate.teacher_name, "Siti Rahma");
        assert_eq!(candidate.subject_name, "Matematika");
        assert_eq!(candidate.effective_from, effective());
        assert_eq!(
            preview.issues[0].to_string(),
            "Row 4, Class X-2: malformed cell 'MTK'"
        );
    }

    #[test]
    fn test_codes_match_case_insensitively_and_unknown_codes_are_issues() {
        let grid = sheet(&[
            &[""],
            &["", "", "XI-1"],
            &["selasa", "3.0", "mtk t01"],
            &["Selasa", "4", "BIO T99"],
        ]);

        let preview = parse_grid(&grid, &codes(), effective()).unwrap();
        assert_eq!(preview.candidates.len(), 1);
        assert_eq!(preview.candidates[0].period_number, 3);
        assert_eq!(
            preview.issue_messages(),
            vec!["Row 4, Class XI-1: unknown subject/teacher code 'BIO T99'"]
        );
    }

    #[test]
    fn test_blank_class_headers_keep_column_alignment() {
        let grid = sheet(&[
            &[""],
            &["", "", "", "X-2"],
            &["Rabu", "1", "MTK T01", "MTK T01"],
        ]);

        let preview = parse_grid(&grid, &codes(), effective()).unwrap();
        assert_eq!(preview.candidates.len(), 1);
        assert_eq!(preview.candidates[0].class_name, "X-2");
    }

    #[test]
    fn test_rows_without_day_or_valid_period_are_skipped() {
        let grid = sheet(&[
            &[""],
            &["", "", "X-1"],
            &["", "1", "MTK T01"],
            &["Senin", "", "MTK T01"],
            &["Senin", "istirahat", "MTK T01"],
            &["Senin", "0", "MTK T01"],
            &["Senin", "25", "MTK T01"],
        ]);

        let preview = parse_grid(&grid, &codes(), effective()).unwrap();
        assert!(preview.candidates.is_empty());
        assert!(preview.issues.is_empty());
    }

    #[test]
    fn test_period_number_bounds() {
        assert_eq!(parse_period_number("1"), Some(1));
        assert_eq!(parse_period_number("3.0"), Some(3));
        assert_eq!(parse_period_number("24"), Some(MAX_PERIOD_NUMBER));
        assert_eq!(parse_period_number("25"), None);
        assert_eq!(parse_period_number("2000000000"), None);
        assert_eq!(parse_period_number("-1"), None);
    }

    #[test]
    fn test_cell_error_message_matches_import_issue() {
        let err = CellError {
            row: 7,
            class: "XI-IPA".to_string(),
            raw: "FIS".to_string(),
        };
        assert_eq!(err.to_string(), ImportIssue::from(err.clone()).to_string());
    }

    #[test]
    fn test_unknown_day_is_row_issue() {
        let grid = sheet(&[&[""], &["", "", "X-1"], &["Funday", "1", "MTK T01"]]);

        let preview = parse_grid(&grid, &codes(), effective()).unwrap();
        assert!(preview.candidates.is_empty());
        assert_eq!(preview.issue_messages(), vec!["Row 3: unknown day 'Funday'"]);
    }

    #[test]
    fn test_empty_class_row_rejects_sheet() {
        let grid = sheet(&[&["Jadwal"], &["Hari", "Jam", "", " "]]);
        let err = parse_grid(&grid, &codes(), effective()).unwrap_err();
        assert!(err.is(timetable_core::ErrorKind::Input));
    }
}

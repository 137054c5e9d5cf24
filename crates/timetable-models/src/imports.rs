//! Bulk generation and import result types.
//!
//! Spreadsheet parsing never aborts on a bad cell or row: every problem
//! becomes an [`ImportIssue`] collected next to the valid candidates in a
//! [`CandidatePreview`]. Committing the candidates is best-effort and
//! reported through a [`BatchOutcome`] that keeps one [`ItemOutcome`] per
//! attempted write.

use crate::ids::AssignmentId;
use crate::schedules::NewAssignment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A row- or cell-level problem found while parsing a sheet.
///
/// `row` is the 1-based spreadsheet row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ImportIssue {
    #[error("Row {row}, Class {class}: malformed cell '{raw}'")]
    MalformedCell { row: usize, class: String, raw: String },

    #[error("Row {row}, Class {class}: unknown subject/teacher code '{subject_code} {teacher_code}'")]
    UnknownCode {
        row: usize,
        class: String,
        subject_code: String,
        teacher_code: String,
    },

    #[error("Row {row}: unknown day '{raw}'")]
    UnknownDay { row: usize, raw: String },

    #[error("Row {row}: teacher '{name}' not found")]
    UnknownTeacher { row: usize, name: String },

    #[error("Row {row}: invalid period '{raw}'")]
    InvalidPeriod { row: usize, raw: String },

    #[error("Row {row}: invalid effective date '{raw}'")]
    InvalidDate { row: usize, raw: String },
}

impl ImportIssue {
    pub fn row(&self) -> usize {
        match self {
            ImportIssue::MalformedCell { row, .. }
            | ImportIssue::UnknownCode { row, .. }
            | ImportIssue::UnknownDay { row, .. }
            | ImportIssue::UnknownTeacher { row, .. }
            | ImportIssue::InvalidPeriod { row, .. }
            | ImportIssue::InvalidDate { row, .. } => *row,
        }
    }
}

/// Parsed candidates and every issue found along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidatePreview {
    pub candidates: Vec<NewAssignment>,
    pub issues: Vec<ImportIssue>,
}

impl CandidatePreview {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

/// Result of one write inside a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Inserted { id: AssignmentId, item: String },
    Deleted { id: AssignmentId },
    Rejected { item: String, reason: String },
    Failed { item: String, reason: String },
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Inserted { .. } | ItemOutcome::Deleted { .. })
    }

    pub fn message(&self) -> Option<String> {
        match self {
            ItemOutcome::Rejected { item, reason } | ItemOutcome::Failed { item, reason } => {
                Some(format!("{}: {}", item, reason))
            }
            _ => None,
        }
    }
}

/// Best-effort batch result.
///
/// `attempted` counts the writes that were tried; `succeeded` those the
/// store accepted. `errors` holds pre-flight parse issues followed by the
/// per-item failure messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    pub attempted: usize,
    pub succeeded: usize,
    pub items: Vec<ItemOutcome>,
    pub errors: Vec<String>,
    /// The caller declined to commit after seeing pre-flight issues
    pub aborted: bool,
}

impl BatchOutcome {
    pub fn from_items(items: Vec<ItemOutcome>) -> Self {
        let attempted = items.len();
        let succeeded = items.iter().filter(|i| i.is_success()).count();
        let errors = items.iter().filter_map(ItemOutcome::message).collect();
        Self {
            attempted,
            succeeded,
            items,
            errors,
            aborted: false,
        }
    }

    pub fn aborted(preflight: Vec<String>) -> Self {
        Self {
            errors: preflight,
            aborted: true,
            ..Default::default()
        }
    }

    /// Prepends pre-flight parse issues to the error list.
    pub fn with_preflight(mut self, preflight: Vec<String>) -> Self {
        let mut errors = preflight;
        errors.append(&mut self.errors);
        self.errors = errors;
        self
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn is_complete(&self) -> bool {
        !self.aborted && self.errors.is_empty() && self.succeeded == self.attempted
    }

    pub fn inserted_ids(&self) -> Vec<AssignmentId> {
        self.items
            .iter()
            .filter_map(|i| match i {
                ItemOutcome::Inserted { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_messages() {
        let malformed = ImportIssue::MalformedCell {
            row: 4,
            class: "X-2".to_string(),
            raw: "MTK".to_string(),
        };
        assert_eq!(malformed.to_string(), "Row 4, Class X-2: malformed cell 'MTK'");
        assert_eq!(malformed.row(), 4);

        let unknown = ImportIssue::UnknownCode {
            row: 5,
            class: "X-1".to_string(),
            subject_code: "BIO".to_string(),
            teacher_code: "T99".to_string(),
        };
        assert_eq!(
            unknown.to_string(),
            "Row 5, Class X-1: unknown subject/teacher code 'BIO T99'"
        );
    }

    #[test]
    fn test_batch_outcome_counts() {
        let outcome = BatchOutcome::from_items(vec![
            ItemOutcome::Inserted {
                id: AssignmentId::from_u128(1),
                item: "a".to_string(),
            },
            ItemOutcome::Rejected {
                item: "b".to_string(),
                reason: "not authorized".to_string(),
            },
            ItemOutcome::Failed {
                item: "c".to_string(),
                reason: "connection reset".to_string(),
            },
        ]);
        assert_eq!(outcome.attempted, 3);
        assert_eq!(outcome.succeeded, 1);
        assert_eq!(outcome.failed(), 2);
        assert_eq!(outcome.errors, vec!["b: not authorized", "c: connection reset"]);
        assert_eq!(outcome.inserted_ids(), vec![AssignmentId::from_u128(1)]);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_preflight_errors_come_first() {
        let outcome = BatchOutcome::from_items(vec![ItemOutcome::Failed {
            item: "x".to_string(),
            reason: "boom".to_string(),
        }])
        .with_preflight(vec!["Row 3: unknown day 'Funday'".to_string()]);
        assert_eq!(outcome.errors[0], "Row 3: unknown day 'Funday'");
        assert_eq!(outcome.errors[1], "x: boom");
    }

    #[test]
    fn test_aborted_outcome_attempts_nothing() {
        let outcome = BatchOutcome::aborted(vec!["issue".to_string()]);
        assert!(outcome.aborted);
        assert_eq!(outcome.attempted, 0);
        assert!(!outcome.is_complete());
    }
}

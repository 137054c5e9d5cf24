//! Pagination utilities for list responses.
//!
//! Supports both offset-based and page-based pagination:
//!
//! - `limit`: Maximum number of items to return (1-100, default: 10)
//! - `offset`: Number of items to skip from the beginning
//! - `page`: Page number (1-indexed); takes precedence over `offset`
//!
//! Consolidated schedule ranges are built in memory, so [`PaginationParams::window`]
//! slices an already-ordered vector and produces the matching [`PaginationMeta`].
//!
//! # Example
//!
//! ```ignore
//! use timetable_core::pagination::PaginationParams;
//!
//! let params = PaginationParams { limit: Some(20), offset: None, page: Some(2) };
//! let (rows, meta) = params.window(all_ranges);
//! assert_eq!(meta.offset, Some(20));
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes an optional string into an optional i64.
///
/// Query-string and spreadsheet-driven inputs may carry empty strings,
/// which are treated as `None`.
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Maximum items per page (the limit that was applied)
    pub limit: i64,
    /// Number of items skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Current page number (only present if page-based pagination was used)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether there are more items after this page
    pub has_more: bool,
}

/// Query parameters for pagination.
///
/// - `limit` is clamped to the range [1, 100]
/// - `offset` is clamped to a minimum of 0
/// - `page` is clamped to a minimum of 1
#[derive(Debug, Clone, Hash, Deserialize)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0, ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(10),
            offset: Some(0),
            page: None,
        }
    }
}

impl PaginationParams {
    /// Returns the effective limit, clamped to [1, 100]. Defaults to 10.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    /// Returns the effective offset.
    ///
    /// If `page` is set, calculates the offset from the page number.
    /// Otherwise, returns the explicit offset or 0.
    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.page {
            let page = page.max(1);
            (page - 1) * self.limit()
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }

    /// Returns the page number if provided, clamped to a minimum of 1.
    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }

    /// Slices `items` to the requested window and builds the metadata.
    pub fn window<T>(&self, items: Vec<T>) -> (Vec<T>, PaginationMeta) {
        let total = items.len() as i64;
        let limit = self.limit();
        let offset = self.offset();

        let data: Vec<T> = items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        let meta = PaginationMeta {
            total,
            limit,
            offset: Some(offset),
            page: self.page(),
            has_more: offset + limit < total,
        };

        (data, meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.limit(), 10);
        assert_eq!(params.offset(), 0);
        assert_eq!(params.page(), None);
    }

    #[test]
    fn test_pagination_params_limit_boundaries() {
        let too_small = PaginationParams {
            limit: Some(0),
            offset: None,
            page: None,
        };
        assert_eq!(too_small.limit(), 1);

        let too_large = PaginationParams {
            limit: Some(150),
            offset: None,
            page: None,
        };
        assert_eq!(too_large.limit(), 100);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let params = PaginationParams {
            limit: Some(20),
            offset: Some(5),
            page: Some(3),
        };
        assert_eq!(params.offset(), 40);
        assert_eq!(params.page(), Some(3));
    }

    #[test]
    fn test_negative_offset_clamped() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(-5),
            page: None,
        };
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_window_middle_page() {
        let params = PaginationParams {
            limit: Some(2),
            offset: None,
            page: Some(2),
        };
        let (data, meta) = params.window((1..=5).collect::<Vec<_>>());
        assert_eq!(data, vec![3, 4]);
        assert_eq!(meta.total, 5);
        assert_eq!(meta.offset, Some(2));
        assert!(meta.has_more);
    }

    #[test]
    fn test_window_past_end_is_empty() {
        let params = PaginationParams {
            limit: Some(10),
            offset: Some(50),
            page: None,
        };
        let (data, meta) = params.window(vec!["a", "b"]);
        assert!(data.is_empty());
        assert_eq!(meta.total, 2);
        assert!(!meta.has_more);
    }

    #[test]
    fn test_deserialize_empty_strings_as_none() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"limit": "", "offset": "4", "page": null}"#).unwrap();
        assert_eq!(params.limit, None);
        assert_eq!(params.offset, Some(4));
        assert_eq!(params.page, None);
    }
}

//! # Timetable Core
//!
//! Core types, errors, and utilities for the timetable service.
//!
//! - [`errors`]: Application error type with failure categories
//! - [`pagination`]: Pagination parameters and metadata for list responses
//! - [`permissions`]: Permission constants and the capability-check seam
//! - [`serde`]: Custom serde helpers and date parsing
//!
//! # Example
//!
//! ```ignore
//! use timetable_core::errors::AppError;
//! use timetable_core::pagination::PaginationParams;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Assignment not found"));
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod errors;
pub mod pagination;
pub mod permissions;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorKind};
pub use pagination::{PaginationMeta, PaginationParams};
pub use permissions::{CapabilityCheck, StaticCapabilities};

//! Teacher timetable: atomic period assignments, their consolidated range
//! view, and bulk generation from spreadsheets.
//!
//! - [`service`]: the only entry point other layers call
//! - [`store`] / [`master`]: persistence and master-data seams
//! - [`availability`] / [`authorization`]: pre-write checks
//! - [`consolidator`]: range merge and edit expansion
//! - [`grid`] / [`flat`]: spreadsheet parsers producing candidates

pub mod authorization;
pub mod availability;
pub mod consolidator;
pub mod flat;
pub mod grid;
pub mod master;
pub mod model;
pub mod service;
pub mod store;

pub use service::{ScheduleService, require_capability};

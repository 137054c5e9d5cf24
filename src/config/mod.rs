//! Configuration modules for the timetable service.
//!
//! Each submodule loads one configuration type from environment variables
//! (a `.env` file is honoured when the binary calls `dotenvy::dotenv()`).
//!
//! # Modules
//!
//! - [`database`]: PostgreSQL connection settings and pool initialization
//! - [`schedule`]: Academic year, default program and bulk fan-out width

pub mod database;
pub mod schedule;

//! # Timetable CLI
//!
//! Spreadsheet I/O and terminal output used by the `timetable-cli` binary.
//!
//! - [`spreadsheet`]: read `.xlsx`/`.xls`/`.ods`/`.csv` sheets, write CSV exports
//! - [`output`]: one-line renderings of ranges, previews and batch outcomes

pub mod output;
pub mod spreadsheet;

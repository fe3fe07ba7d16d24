//! `certforge-scoring` — score tracker domain.
//!
//! Cell vocabulary, the tracker sheet layout, and the pure score classifier
//! that turns an edited cell into a pass/fail decision.

pub mod cell;
pub mod classify;
pub mod layout;

pub use cell::{CellRef, CellValue};
pub use classify::{Classification, classify};
pub use layout::{
    FAIL_BACKGROUND, FAILED_SCORE_STATUS, HEADER_ROWS, NAME_COLUMN, PASS_BACKGROUND,
    PASS_THRESHOLD, ROSTER_EMAIL_COLUMN, ROSTER_NAME_COLUMN, STATUS_COLUMN, TRACKER_SHEET,
    category_for_column, score_column,
};

//! Tracker sheet layout and scoring constants.

use certforge_certs::Category;

/// Sheet holding one row per subject with per-category score columns.
pub const TRACKER_SHEET: &str = "Score Tracker";

/// Rows at or above this index are headers and never classified.
pub const HEADER_ROWS: u32 = 1;

/// Column carrying the subject name.
pub const NAME_COLUMN: u32 = 2;

/// Column the bulk job and the classifier write status annotations into.
pub const STATUS_COLUMN: u32 = 8;

/// Minimum integer score that counts as a pass.
pub const PASS_THRESHOLD: i64 = 15;

/// Background set on passing score cells.
pub const PASS_BACKGROUND: &str = "#93c47d";

/// Background set on failing and unparseable score cells.
pub const FAIL_BACKGROUND: &str = "#e06666";

/// Status annotation written for a below-threshold score.
pub const FAILED_SCORE_STATUS: &str = "Failed Score";

/// Roster sheets: column holding the subject name (exact-match join key).
pub const ROSTER_NAME_COLUMN: u32 = 3;

/// Roster sheets: column holding the recipient address.
pub const ROSTER_EMAIL_COLUMN: u32 = 4;

/// Score column for a category.
pub fn score_column(category: Category) -> u32 {
    match category {
        Category::Basic => 5,
        Category::Intermediate => 6,
        Category::Advanced => 7,
    }
}

/// Category tracked by a column, if it is a score column at all.
pub fn category_for_column(col: u32) -> Option<Category> {
    Category::ALL.into_iter().find(|c| score_column(*c) == col)
}

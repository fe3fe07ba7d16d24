//! Tabular-store port.
//!
//! Cells are addressed by (sheet, row, column), 1-based. Backgrounds are hex
//! color strings as the store reports them. The roster join — exact name
//! match in a fixed column — is part of this interface because the store is
//! the only system that holds the per-category rosters.

use certforge_scoring::{CellRef, CellValue};

pub mod in_memory;

pub use in_memory::InMemorySpreadsheet;

/// Tabular-store error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SheetError {
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// One enumerated row: values and backgrounds, densely indexed from column 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub row: u32,
    pub values: Vec<CellValue>,
    pub backgrounds: Vec<String>,
}

impl SheetRow {
    /// Value at a 1-based column, blank when the row is shorter.
    pub fn value(&self, col: u32) -> CellValue {
        self.values
            .get((col as usize).saturating_sub(1))
            .cloned()
            .unwrap_or(CellValue::Blank)
    }

    /// Background at a 1-based column, default when the row is shorter.
    pub fn background(&self, col: u32) -> &str {
        self.backgrounds
            .get((col as usize).saturating_sub(1))
            .map(String::as_str)
            .unwrap_or(DEFAULT_BACKGROUND)
    }
}

/// Background reported for cells that were never colored.
pub const DEFAULT_BACKGROUND: &str = "#ffffff";

/// Tabular store abstraction.
pub trait Spreadsheet: Send + Sync {
    /// Read one cell's value.
    fn cell_value(&self, sheet: &str, cell: CellRef) -> Result<CellValue, SheetError>;

    /// Write one cell's value.
    fn set_cell_value(&self, sheet: &str, cell: CellRef, value: CellValue)
    -> Result<(), SheetError>;

    /// Read one cell's background color.
    fn background(&self, sheet: &str, cell: CellRef) -> Result<String, SheetError>;

    /// Write one cell's background color.
    fn set_background(&self, sheet: &str, cell: CellRef, color: &str) -> Result<(), SheetError>;

    /// Enumerate all rows with values and backgrounds in one call.
    fn rows(&self, sheet: &str) -> Result<Vec<SheetRow>, SheetError>;

    /// Roster join: the recipient address for an exact subject-name match,
    /// or `None` when the roster has no such row.
    fn roster_email(&self, sheet: &str, name: &str) -> Result<Option<String>, SheetError>;
}

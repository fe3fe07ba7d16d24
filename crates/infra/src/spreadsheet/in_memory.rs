//! In-memory tabular store for tests/dev.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use certforge_scoring::{CellRef, CellValue, ROSTER_EMAIL_COLUMN, ROSTER_NAME_COLUMN};

use super::{DEFAULT_BACKGROUND, SheetError, SheetRow, Spreadsheet};

#[derive(Debug, Default)]
struct SheetData {
    cells: HashMap<(u32, u32), CellValue>,
    backgrounds: HashMap<(u32, u32), String>,
}

impl SheetData {
    fn extent(&self) -> (u32, u32) {
        let mut max_row = 0;
        let mut max_col = 0;
        for &(row, col) in self.cells.keys().chain(self.backgrounds.keys()) {
            max_row = max_row.max(row);
            max_col = max_col.max(col);
        }
        (max_row, max_col)
    }
}

/// In-memory spreadsheet for tests/dev.
///
/// Sheets must be created explicitly (`add_sheet`); reads against unknown
/// sheets fail like the real store does.
#[derive(Debug, Default)]
pub struct InMemorySpreadsheet {
    sheets: RwLock<HashMap<String, SheetData>>,
}

impl InMemorySpreadsheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn add_sheet(&self, name: &str) {
        let mut sheets = self.sheets.write().unwrap();
        sheets.entry(name.to_string()).or_default();
    }

    /// Seed one roster row (name in the join column, address beside it).
    pub fn add_roster_entry(&self, sheet: &str, row: u32, name: &str, email: &str) {
        self.add_sheet(sheet);
        let mut sheets = self.sheets.write().unwrap();
        let data = sheets.entry(sheet.to_string()).or_default();
        data.cells
            .insert((row, ROSTER_NAME_COLUMN), CellValue::text(name));
        data.cells
            .insert((row, ROSTER_EMAIL_COLUMN), CellValue::text(email));
    }

    fn with_sheet<T>(
        &self,
        sheet: &str,
        f: impl FnOnce(&SheetData) -> T,
    ) -> Result<T, SheetError> {
        let sheets = self.sheets.read().unwrap();
        let data = sheets
            .get(sheet)
            .ok_or_else(|| SheetError::SheetNotFound(sheet.to_string()))?;
        Ok(f(data))
    }

    fn with_sheet_mut<T>(
        &self,
        sheet: &str,
        f: impl FnOnce(&mut SheetData) -> T,
    ) -> Result<T, SheetError> {
        let mut sheets = self.sheets.write().unwrap();
        let data = sheets
            .get_mut(sheet)
            .ok_or_else(|| SheetError::SheetNotFound(sheet.to_string()))?;
        Ok(f(data))
    }
}

impl Spreadsheet for InMemorySpreadsheet {
    fn cell_value(&self, sheet: &str, cell: CellRef) -> Result<CellValue, SheetError> {
        self.with_sheet(sheet, |data| {
            data.cells
                .get(&(cell.row, cell.col))
                .cloned()
                .unwrap_or(CellValue::Blank)
        })
    }

    fn set_cell_value(
        &self,
        sheet: &str,
        cell: CellRef,
        value: CellValue,
    ) -> Result<(), SheetError> {
        self.with_sheet_mut(sheet, |data| {
            data.cells.insert((cell.row, cell.col), value);
        })
    }

    fn background(&self, sheet: &str, cell: CellRef) -> Result<String, SheetError> {
        self.with_sheet(sheet, |data| {
            data.backgrounds
                .get(&(cell.row, cell.col))
                .cloned()
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string())
        })
    }

    fn set_background(&self, sheet: &str, cell: CellRef, color: &str) -> Result<(), SheetError> {
        self.with_sheet_mut(sheet, |data| {
            data.backgrounds
                .insert((cell.row, cell.col), color.to_string());
        })
    }

    fn rows(&self, sheet: &str) -> Result<Vec<SheetRow>, SheetError> {
        self.with_sheet(sheet, |data| {
            let (max_row, max_col) = data.extent();
            (1..=max_row)
                .map(|row| SheetRow {
                    row,
                    values: (1..=max_col)
                        .map(|col| data.cells.get(&(row, col)).cloned().unwrap_or_default())
                        .collect(),
                    backgrounds: (1..=max_col)
                        .map(|col| {
                            data.backgrounds
                                .get(&(row, col))
                                .cloned()
                                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string())
                        })
                        .collect(),
                })
                .collect()
        })
    }

    fn roster_email(&self, sheet: &str, name: &str) -> Result<Option<String>, SheetError> {
        self.with_sheet(sheet, |data| {
            let (max_row, _) = data.extent();
            // Row 1 is the roster header.
            for row in 2..=max_row {
                let matches = data
                    .cells
                    .get(&(row, ROSTER_NAME_COLUMN))
                    .and_then(|v| v.as_text().map(|s| s.trim() == name.trim()))
                    .unwrap_or(false);
                if matches {
                    return data
                        .cells
                        .get(&(row, ROSTER_EMAIL_COLUMN))
                        .and_then(|v| v.as_text())
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty());
                }
            }
            None
        })
    }
}

impl Spreadsheet for Arc<InMemorySpreadsheet> {
    fn cell_value(&self, sheet: &str, cell: CellRef) -> Result<CellValue, SheetError> {
        (**self).cell_value(sheet, cell)
    }

    fn set_cell_value(
        &self,
        sheet: &str,
        cell: CellRef,
        value: CellValue,
    ) -> Result<(), SheetError> {
        (**self).set_cell_value(sheet, cell, value)
    }

    fn background(&self, sheet: &str, cell: CellRef) -> Result<String, SheetError> {
        (**self).background(sheet, cell)
    }

    fn set_background(&self, sheet: &str, cell: CellRef, color: &str) -> Result<(), SheetError> {
        (**self).set_background(sheet, cell, color)
    }

    fn rows(&self, sheet: &str) -> Result<Vec<SheetRow>, SheetError> {
        (**self).rows(sheet)
    }

    fn roster_email(&self, sheet: &str, name: &str) -> Result<Option<String>, SheetError> {
        (**self).roster_email(sheet, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sheet_is_an_error() {
        let sheet = InMemorySpreadsheet::new();
        assert!(matches!(
            sheet.cell_value("nope", CellRef::new(1, 1)),
            Err(SheetError::SheetNotFound(_))
        ));
    }

    #[test]
    fn cells_read_back() {
        let sheet = InMemorySpreadsheet::new();
        sheet.add_sheet("s");
        sheet
            .set_cell_value("s", CellRef::new(2, 3), CellValue::text("x"))
            .unwrap();
        assert_eq!(
            sheet.cell_value("s", CellRef::new(2, 3)).unwrap(),
            CellValue::text("x")
        );
        // Unset cells are blank, unset backgrounds default.
        assert_eq!(
            sheet.cell_value("s", CellRef::new(9, 9)).unwrap(),
            CellValue::Blank
        );
        assert_eq!(
            sheet.background("s", CellRef::new(2, 3)).unwrap(),
            DEFAULT_BACKGROUND
        );
    }

    #[test]
    fn rows_cover_the_extent() {
        let sheet = InMemorySpreadsheet::new();
        sheet.add_sheet("s");
        sheet
            .set_cell_value("s", CellRef::new(3, 2), CellValue::Number(7.0))
            .unwrap();
        sheet
            .set_background("s", CellRef::new(2, 4), "#93c47d")
            .unwrap();

        let rows = sheet.rows("s").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].value(2), CellValue::Number(7.0));
        assert_eq!(rows[1].background(4), "#93c47d");
        assert_eq!(rows[0].value(1), CellValue::Blank);
    }

    #[test]
    fn roster_join_matches_exact_names() {
        let sheet = InMemorySpreadsheet::new();
        sheet.add_roster_entry("roster", 2, "Jane Doe", "jane@example.com");
        sheet.add_roster_entry("roster", 3, "A. Lee", "a.lee@example.com");

        assert_eq!(
            sheet.roster_email("roster", "A. Lee").unwrap(),
            Some("a.lee@example.com".to_string())
        );
        assert_eq!(sheet.roster_email("roster", "Jane").unwrap(), None);
    }
}

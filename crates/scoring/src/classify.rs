//! Score classification.
//!
//! Classification is a pure function of (cell, value): re-applying the same
//! raw value yields the same decision every time, with the single exception
//! of the cleared-value no-op. Prior row state never enters the decision.

use certforge_certs::Category;

use crate::cell::{CellRef, CellValue};
use crate::layout::{HEADER_ROWS, PASS_THRESHOLD, category_for_column};

/// Outcome of classifying one edited cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Edit outside the score columns or in the header row.
    NotAScore,
    /// Score was deleted; nothing may change downstream.
    Cleared,
    /// Unparseable value: failed background, no certificate path.
    FailureMarker { category: Category },
    /// Parsed score below the pass threshold.
    Fail { category: Category, score: i64 },
    /// Parsed score at or above the pass threshold.
    Pass { category: Category, score: i64 },
}

/// Classify an edited cell.
pub fn classify(cell: CellRef, value: &CellValue) -> Classification {
    if cell.row <= HEADER_ROWS {
        return Classification::NotAScore;
    }
    let Some(category) = category_for_column(cell.col) else {
        return Classification::NotAScore;
    };
    if value.is_cleared() {
        return Classification::Cleared;
    }

    let score = match value {
        CellValue::Number(n) if n.is_finite() => *n as i64,
        CellValue::Text(s) => match s.trim().parse::<i64>() {
            Ok(n) => n,
            Err(_) => return Classification::FailureMarker { category },
        },
        _ => return Classification::FailureMarker { category },
    };

    if score >= PASS_THRESHOLD {
        Classification::Pass { category, score }
    } else {
        Classification::Fail { category, score }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell position (0-indexed internally)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Maximum number of rows
    pub const MAX_ROWS: i32 = 16_384;
    /// Maximum number of columns
    pub const MAX_COLS: i32 = 16_384;

    /// Sentinel for "no position"; fails `is_valid`
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Check if this position is within the sheet bounds
    pub fn is_valid(&self) -> bool {
        (0..Self::MAX_ROWS).contains(&self.row) && (0..Self::MAX_COLS).contains(&self.col)
    }

    /// Parse A1 notation (e.g., "A1" -> (0, 0), "AA15" -> (14, 26)).
    ///
    /// Accepts uppercase column letters followed by a 1-based decimal row and
    /// nothing else. Any rejection (empty input, lowercase, missing letters
    /// or digits, trailing characters, out-of-range coordinates) yields
    /// [`Position::NONE`]; callers distinguish via [`Position::is_valid`].
    pub fn from_a1(notation: &str) -> Position {
        let mut chars = notation.chars().peekable();

        let mut col_str = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_uppercase() {
                col_str.push(c);
                chars.next();
            } else {
                break;
            }
        }

        let mut row_str = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                row_str.push(c);
                chars.next();
            } else {
                break;
            }
        }

        if col_str.is_empty() || row_str.is_empty() || chars.next().is_some() {
            return Position::NONE;
        }

        let col = match col_from_label(&col_str) {
            Some(col) => col,
            None => return Position::NONE,
        };
        let row: i64 = match row_str.parse() {
            Ok(row) => row,
            Err(_) => return Position::NONE,
        };
        if row == 0 {
            // Rows are 1-indexed in A1 notation
            return Position::NONE;
        }

        let pos = Position {
            row: (row - 1).min(i32::MAX as i64) as i32,
            col,
        };
        if pos.is_valid() {
            pos
        } else {
            Position::NONE
        }
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1")
    pub fn to_a1(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: i32) -> String {
    let mut label = String::new();
    let mut n = col as i64 + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
pub fn col_from_label(label: &str) -> Option<i32> {
    let mut col: i64 = 0;

    for c in label.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col * 26 + (c as i64 - 'A' as i64 + 1);
        if col > i32::MAX as i64 {
            return None;
        }
    }

    if col == 0 {
        None
    } else {
        Some((col - 1) as i32)
    }
}

/// Printable extent of a sheet
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

//! `Sheet!A1:Z1` style range addressing.

use super::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Range {
    pub sheet: String,
    /// Zero-based column index.
    pub start_col: usize,
    /// One-based row number.
    pub start_row: usize,
    pub end_col: Option<usize>,
    pub end_row: Option<usize>,
}

pub const LAST_COLUMN: &str = "Z";

pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (ch.to_ascii_uppercase() as u8 - b'A') as usize + 1;
    }
    Some(index - 1)
}

/// Splits `B12` into (column, row); either part may be missing (`B`, `12`).
fn parse_cell(cell: &str) -> Option<(Option<usize>, Option<usize>)> {
    let split = cell
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    let col = if letters.is_empty() {
        None
    } else {
        Some(column_index(letters)?)
    };
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse::<usize>().ok().filter(|r| *r > 0)?)
    };
    Some((col, row))
}

impl A1Range {
    pub fn parse(range: &str) -> Result<Self, StoreError> {
        let invalid = || StoreError::InvalidRange(range.to_string());
        let (sheet, cells) = match range.split_once('!') {
            Some((sheet, cells)) => (sheet, Some(cells)),
            None => (range, None),
        };
        let sheet = sheet.trim_matches('\'').to_string();
        if sheet.is_empty() {
            return Err(invalid());
        }

        let Some(cells) = cells else {
            return Ok(A1Range {
                sheet,
                start_col: 0,
                start_row: 1,
                end_col: None,
                end_row: None,
            });
        };

        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (start, Some(end)),
            None => (cells, None),
        };

        let (start_col, start_row) = parse_cell(start).ok_or_else(invalid)?;
        let (end_col, end_row) = match end {
            Some(end) => parse_cell(end).ok_or_else(invalid)?,
            // A single cell is its own end
            None => (start_col, start_row),
        };

        Ok(A1Range {
            sheet,
            start_col: start_col.unwrap_or(0),
            start_row: start_row.unwrap_or(1),
            end_col,
            end_row,
        })
    }

    pub fn rows(sheet: &str, first_row: usize) -> String {
        format!("{sheet}!A{first_row}:{LAST_COLUMN}")
    }

    pub fn single_row(sheet: &str, row_number: usize) -> String {
        format!("{sheet}!A{row_number}:{LAST_COLUMN}{row_number}")
    }

    pub fn column(sheet: &str, column: usize, first_row: usize, last_row: usize) -> String {
        let letter = column_letter(column);
        format!("{sheet}!{letter}{first_row}:{letter}{last_row}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_row_and_open_ended_ranges() {
        let row = A1Range::parse("Students!A5:Z5").unwrap();
        assert_eq!(row.sheet, "Students");
        assert_eq!((row.start_col, row.start_row), (0, 5));
        assert_eq!((row.end_col, row.end_row), (Some(25), Some(5)));

        let open = A1Range::parse("Groups!A2:Z").unwrap();
        assert_eq!(open.start_row, 2);
        assert_eq!(open.end_row, None);

        let whole = A1Range::parse("Profiles").unwrap();
        assert_eq!((whole.start_col, whole.start_row), (0, 1));
    }

    #[test]
    fn column_letters_round_trip() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_index("AB"), Some(27));
        assert_eq!(A1Range::column("Profiles", 2, 2, 9), "Profiles!C2:C9");
    }

    #[test]
    fn rejects_garbage() {
        assert!(A1Range::parse("!A1").is_err());
        assert!(A1Range::parse("Sheet!1A:").is_err());
    }
}

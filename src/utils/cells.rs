//! Coercion between typed values and spreadsheet cell strings.

pub fn parse_bool(cell: &str) -> bool {
    matches!(
        cell.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

pub fn format_bool(value: bool) -> String {
    let text = if value { "TRUE" } else { "FALSE" };
    text.to_string()
}

pub fn parse_int(cell: &str) -> i64 {
    let trimmed = cell.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|n| n.round() as i64))
        .unwrap_or(0)
}

/// Cell at `index`, or empty when the row is short.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_coerce_loosely() {
        for truthy in ["TRUE", "true", " True ", "1", "yes", "Y"] {
            assert!(parse_bool(truthy), "{truthy}");
        }
        for falsy in ["FALSE", "false", "", "0", "no", "completed"] {
            assert!(!parse_bool(falsy), "{falsy}");
        }
    }

    #[test]
    fn integers_tolerate_blanks_and_decimals() {
        assert_eq!(parse_int("15"), 15);
        assert_eq!(parse_int("15.0"), 15);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("n/a"), 0);
    }

    #[test]
    fn short_rows_read_as_empty() {
        let row = vec!["a".to_string()];
        assert_eq!(cell(&row, 0), "a");
        assert_eq!(cell(&row, 5), "");
    }
}

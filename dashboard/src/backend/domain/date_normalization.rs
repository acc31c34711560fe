//! Date normalization for search bounds.
//!
//! The search bar accepts `YYYY-MM-DD` as well as `DD-MM-YYYY`. Stored dates
//! are `YYYY-MM-DD` text and range queries compare strings, so day-first
//! input has to be rewritten before it reaches the store.
//!
//! The rule is a segment-length heuristic, not date parsing:
//!
//! - no `-` in the input: returned unchanged
//! - first `-`-delimited segment is exactly 4 characters: returned unchanged
//! - otherwise, with exactly three segments `a-b-c`: rewritten to `c-b-a`
//! - anything else: returned unchanged
//!
//! Nothing is validated. `"1-8-2024"` becomes `"2024-8-1"`, `"2024/08/01"`
//! and `"yesterday"` pass straight through, and such values usually just
//! match no records. Callers that want stricter input must check it
//! themselves.

/// Rewrite a day-first date to year-first, leaving everything else untouched
pub fn normalize_date(input: &str) -> String {
    if !input.contains('-') {
        return input.to_string();
    }

    let segments: Vec<&str> = input.split('-').collect();
    if segments[0].chars().count() == 4 {
        return input.to_string();
    }

    match segments.as_slice() {
        [day, month, year] => format!("{}-{}-{}", year, month, day),
        _ => input.to_string(),
    }
}

/// Normalize an optional search bound; missing and empty bounds are absent
pub fn normalize_bound(input: Option<&str>) -> Option<String> {
    match input {
        Some(value) if !value.is_empty() => Some(normalize_date(value)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_first_is_unchanged() {
        assert_eq!(normalize_date("2024-08-01"), "2024-08-01");
    }

    #[test]
    fn test_day_first_is_rewritten() {
        assert_eq!(normalize_date("01-08-2024"), "2024-08-01");
        assert_eq!(normalize_date("1-8-2024"), "2024-8-1");
    }

    #[test]
    fn test_malformed_input_passes_through() {
        assert_eq!(normalize_date("2024/08/01"), "2024/08/01");
        assert_eq!(normalize_date("yesterday"), "yesterday");
        assert_eq!(normalize_date("01-08"), "01-08");
        assert_eq!(normalize_date("01-08-2024-x"), "01-08-2024-x");
        assert_eq!(normalize_date("-"), "-");
    }

    #[test]
    fn test_heuristic_does_not_validate() {
        // Three segments with a short first one are always swapped
        assert_eq!(normalize_date("ab-cd-ef"), "ef-cd-ab");
        // A 4-character first segment is trusted as a year
        assert_eq!(normalize_date("abcd-99-99"), "abcd-99-99");
    }

    #[test]
    fn test_empty_bound_is_absent() {
        assert_eq!(normalize_bound(Some("")), None);
        assert_eq!(normalize_bound(None), None);
        assert_eq!(normalize_bound(Some("26-08-2024")), Some("2024-08-26".to_string()));
    }
}

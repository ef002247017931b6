//! Encoding of string lists as `;value;` delimited strings.
//!
//! Multi-valued tag fields (artists, genres, album artists) and persisted
//! selections use this format: every value is wrapped in semicolons, so
//! `["a", "b"]` becomes `";a;;b;"`. Searching for `;a;` in the encoded
//! string then matches whole values only.

const DELIMITER: char = ';';

/// Encodes values as a delimited string. Blank values are skipped; an empty
/// list encodes to `""`.
pub fn to_delimited_string<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|value| value.as_ref().trim())
        .filter(|value| !value.is_empty())
        .map(|value| format!("{DELIMITER}{value}{DELIMITER}"))
        .collect()
}

/// Decodes a delimited string back into its values. `""` decodes to an
/// empty list.
pub fn from_delimited_string(delimited: &str) -> Vec<String> {
    let trimmed = delimited.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let inner = trimmed.strip_prefix(DELIMITER).unwrap_or(trimmed);
    let inner = inner.strip_suffix(DELIMITER).unwrap_or(inner);

    inner
        .split(";;")
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_delimited_string() {
        assert_eq!(to_delimited_string(&["a", "b"]), ";a;;b;");
        assert_eq!(to_delimited_string::<&str>(&[]), "");
        assert_eq!(to_delimited_string(&["Jazz", " ", ""]), ";Jazz;");
    }

    #[test]
    fn test_from_delimited_string() {
        assert_eq!(from_delimited_string(";a;;b;"), vec!["a", "b"]);
        assert!(from_delimited_string("").is_empty());
        assert!(from_delimited_string(";;").is_empty());
        assert_eq!(from_delimited_string("Rock"), vec!["Rock"]);
    }

    #[test]
    fn test_round_trip() {
        let values = vec!["Massive Attack".to_string(), "Tricky".to_string()];
        assert_eq!(from_delimited_string(&to_delimited_string(&values)), values);
    }
}

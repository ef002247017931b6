//! String helpers shared by models, sorting and the metadata scrapers.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Leading articles ignored when sorting artist names
const SORT_PREFIXES: &[&str] = &["the ", "a "];

/// Returns `true` for `None`, the empty string and whitespace-only strings.
pub fn is_null_or_white_space(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Replaces accented Latin letters with their base letters.
///
/// Characters outside the Latin blocks (CJK, Cyrillic, ...) are kept as they
/// are, so a sortable string never turns into a romanization.
pub fn remove_accents(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for c in value.chars() {
        if is_accented_latin(c) {
            match deunicode::deunicode_char(c) {
                Some(replacement) if replacement.chars().all(|r| r.is_ascii_alphabetic()) => {
                    result.push_str(replacement)
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

fn is_accented_latin(c: char) -> bool {
    matches!(c as u32, 0x00C0..=0x024F | 0x1E00..=0x1EFF) && c != '×' && c != '÷'
}

/// Normalizes a display string for ordering.
///
/// Trims, lowercases and strips accents. With `remove_prefixes`, a leading
/// "the " or "a " is dropped so that "The Beatles" sorts under B.
pub fn get_sortable_string(value: &str, remove_prefixes: bool) -> String {
    let mut sortable = remove_accents(value.trim()).to_lowercase();

    if remove_prefixes {
        for prefix in SORT_PREFIXES {
            if let Some(rest) = sortable.strip_prefix(prefix) {
                sortable = rest.trim_start().to_string();
                break;
            }
        }
    }

    sortable
}

/// Case-insensitive comparison that orders digit runs by numeric value,
/// so "Track 2" sorts before "Track 10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let l_run = take_digits(&mut left);
                let r_run = take_digits(&mut right);
                let ordering = compare_digit_runs(&l_run, &r_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(l), Some(r)) => {
                let ordering = l.to_lowercase().cmp(r.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(c);
        chars.next();
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Replaces the first occurrence of `from` with `to`.
pub fn replace_first(value: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return value.to_string();
    }
    value.replacen(from, to, 1)
}

/// Shortens `value` to at most `max_chars` characters, ending in "..." when
/// something was cut.
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    let keep = max_chars.saturating_sub(3);
    let mut truncated: String = value.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

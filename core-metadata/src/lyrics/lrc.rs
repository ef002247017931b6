//! LRC lyrics format
//!
//! ```text
//! [ar:Portishead]
//! [ti:Roads]
//! [00:12.50]Oh, can't anybody see
//! [01:02.10][02:40.00]How can it feel this wrong
//! ```
//!
//! Timestamps are `[mm:ss]`, `[mm:ss.xx]` or `[mm:ss.xxx]`. A line may carry
//! several timestamps when it is sung more than once.

use super::TimedLine;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d{1,3}):(\d{1,2})(?:[.:](\d{1,3}))?\]").expect("valid timestamp pattern")
});

static LEADING_TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(\d{1,3}):(\d{1,2})(?:[.:](\d{1,3}))?\]").expect("valid timestamp pattern")
});

static METADATA_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*\[(ar|ti|al|au|by|re|ve|offset|length|#):[^\]]*\]\s*$")
        .expect("valid metadata pattern")
});

static OFFSET_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*\[offset:\s*([+-]?\d+)\s*\]").expect("valid offset pattern")
});

/// Returns the lyrics text with timestamps and metadata tags removed
pub fn strip_timestamps(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .filter(|line| !METADATA_TAG.is_match(line))
        .map(|line| TIMESTAMP.replace_all(line, "").trim().to_string())
        .collect();

    lines.join("\n").trim().to_string()
}

/// Parses the timed lines of an LRC document, ordered by time
///
/// A line with several timestamps produces one entry per timestamp. An
/// `[offset:ms]` tag shifts every timestamp; positive values make lines
/// appear earlier.
pub fn parse(text: &str) -> Vec<TimedLine> {
    let offset_ms = offset_of(text);
    let mut timed_lines = Vec::new();

    for line in text.lines() {
        if METADATA_TAG.is_match(line) {
            continue;
        }

        let mut rest = line.trim();
        let mut times = Vec::new();

        while let Some(caps) = LEADING_TIMESTAMP.captures(rest) {
            let end = caps.get(0).map_or(0, |m| m.end());
            if let Some(ms) = timestamp_ms(&caps) {
                times.push((ms as i64 - offset_ms).max(0) as u64);
            }
            rest = rest[end..].trim_start();
        }

        let text = TIMESTAMP.replace_all(rest, "");
        let text = text.trim();
        for time_ms in times {
            timed_lines.push(TimedLine::new(time_ms, text));
        }
    }

    timed_lines.sort_by_key(|line| line.time_ms);
    timed_lines
}

/// True when the text contains at least one LRC timestamp
pub fn has_timestamps(text: &str) -> bool {
    TIMESTAMP.is_match(text)
}

fn offset_of(text: &str) -> i64 {
    OFFSET_TAG
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn timestamp_ms(caps: &Captures<'_>) -> Option<u64> {
    let minutes: u64 = caps.get(1)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(2)?.as_str().parse().ok()?;
    let fraction_ms = match caps.get(3) {
        Some(m) => {
            let value: u64 = m.as_str().parse().ok()?;
            match m.as_str().len() {
                1 => value * 100,
                2 => value * 10,
                _ => value,
            }
        }
        None => 0,
    };

    Some(minutes * 60_000 + seconds * 1_000 + fraction_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "[ar:Portishead]\n\
                          [ti:Roads]\n\
                          [al:Dummy]\n\
                          [by:someone]\n\
                          [length:05:05]\n\
                          [00:12.50]Oh, can't anybody see\n\
                          [00:20]We've got a war to fight\n\
                          [00:31.125]\n\
                          [01:02.10][02:40.00]How can it feel this wrong\n";

    #[test]
    fn test_strip_timestamps() {
        let text = strip_timestamps(SAMPLE);
        assert_eq!(
            text,
            "Oh, can't anybody see\nWe've got a war to fight\n\nHow can it feel this wrong"
        );
    }

    #[test]
    fn test_parse_all_timestamp_precisions() {
        let lines = parse(SAMPLE);
        let times: Vec<u64> = lines.iter().map(|l| l.time_ms).collect();
        assert_eq!(times, vec![12_500, 20_000, 31_125, 62_100, 160_000]);
        assert_eq!(lines[0].text, "Oh, can't anybody see");
        assert_eq!(lines[2].text, "");
        assert_eq!(lines[3].text, lines[4].text);
    }

    #[test]
    fn test_offset_shifts_lines() {
        let lines = parse("[offset:+500]\n[00:01.00]a\n[00:00.20]b");
        assert_eq!(lines[0], TimedLine::new(0, "b"));
        assert_eq!(lines[1], TimedLine::new(500, "a"));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(strip_timestamps("just words\r\nmore words"), "just words\nmore words");
        assert!(parse("just words").is_empty());
        assert!(!has_timestamps("[chorus] no time here"));
        assert!(has_timestamps("[03:01.1]x"));
    }
}

//! SubRip (`.srt`) captions used as lyrics
//!
//! ```text
//! 1
//! 00:00:12,500 --> 00:00:15,000
//! Oh, can't anybody see
//!
//! 2
//! 00:00:20,000 --> 00:00:24,000
//! We've got a war to fight
//! ```

use super::TimedLine;
use once_cell::sync::Lazy;
use regex::Regex;

static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2}):(\d{2})[,.](\d{1,3})\s*-->\s*\d{1,2}:\d{2}:\d{2}[,.]\d{1,3}")
        .expect("valid timing pattern")
});

static INDEX_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").expect("valid index pattern"));

/// Parses the caption entries, in file order
///
/// Every timing line starts a new entry and the text lines after it belong
/// to that entry until a blank line or the next timing line. A bare index
/// line directly above a timing line is dropped, so files without blank
/// separators still parse. Text before the first timing line is ignored.
/// Multi-line captions are joined with `\n`.
pub fn parse(text: &str) -> Vec<TimedLine> {
    let text = text.trim_start_matches('\u{feff}');
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut entries = Vec::new();
    let mut current: Option<(u64, Vec<&str>)> = None;
    let mut accepting_text = false;

    for (i, line) in lines.iter().enumerate() {
        if let Some(time_ms) = timing_of(line) {
            if let Some((time_ms, text)) = current.take() {
                entries.push(TimedLine::new(time_ms, text.join("\n").trim()));
            }
            current = Some((time_ms, Vec::new()));
            accepting_text = true;
            continue;
        }

        if line.is_empty() {
            accepting_text = false;
            continue;
        }

        let is_index = INDEX_LINE.is_match(line)
            && lines.get(i + 1).is_some_and(|next| TIMING_LINE.is_match(next));
        if is_index || !accepting_text {
            continue;
        }

        if let Some((_, text)) = current.as_mut() {
            text.push(line);
        }
    }

    if let Some((time_ms, text)) = current {
        entries.push(TimedLine::new(time_ms, text.join("\n").trim()));
    }

    entries
}

/// Caption text of every entry, one entry per line group
pub fn to_text(text: &str) -> String {
    parse(text)
        .into_iter()
        .map(|line| line.text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn timing_of(line: &str) -> Option<u64> {
    let caps = TIMING_LINE.captures(line)?;
    let part = |i: usize| -> Option<u64> { caps.get(i)?.as_str().parse().ok() };
    let fraction = caps.get(4)?.as_str();
    let millis = fraction.parse::<u64>().ok()?
        * match fraction.len() {
            1 => 100,
            2 => 10,
            _ => 1,
        };

    Some(part(1)? * 3_600_000 + part(2)? * 60_000 + part(3)? * 1_000 + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}1\r\n\
                          00:00:12,500 --> 00:00:15,000\r\n\
                          Oh, can't anybody see\r\n\
                          \r\n\
                          2\r\n\
                          00:00:20,000 --> 00:00:24,000\r\n\
                          We've got a war to fight\r\n\
                          Would find our way\r\n\
                          \r\n\
                          \r\n\
                          3\r\n\
                          01:02:03,004 --> 01:02:05,000\r\n\
                          How can it feel this wrong\r\n";

    #[test]
    fn test_parse_entries() {
        let lines = parse(SAMPLE);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], TimedLine::new(12_500, "Oh, can't anybody see"));
        assert_eq!(
            lines[1],
            TimedLine::new(20_000, "We've got a war to fight\nWould find our way")
        );
        assert_eq!(lines[2].time_ms, 3_723_004);
    }

    #[test]
    fn test_timing_lines_not_in_text() {
        let text = to_text(SAMPLE);
        assert!(!text.contains("-->"));
        assert_eq!(
            text,
            "Oh, can't anybody see\nWe've got a war to fight\nWould find our way\nHow can it feel this wrong"
        );
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let lines = parse("1\nnot a timing line\ntext\n\n2\n00:00:01,000 --> 00:00:02,000\nok");
        assert_eq!(lines, vec![TimedLine::new(1_000, "ok")]);
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_entries_without_blank_separators() {
        let text = "1\n00:00:01,000 --> 00:00:02,000\nOh\n2\n00:00:02,500 --> 00:00:03,000\nSee\n";

        assert_eq!(
            parse(text),
            vec![TimedLine::new(1_000, "Oh"), TimedLine::new(2_500, "See")]
        );
        assert_eq!(to_text(text), "Oh\nSee");
    }

    #[test]
    fn test_numeric_caption_text_kept() {
        let text = "1\n00:00:01,000 --> 00:00:02,000\n99\nLuftballons\n\n2\n00:00:03,000 --> 00:00:04,000\nend";
        assert_eq!(
            parse(text),
            vec![TimedLine::new(1_000, "99\nLuftballons"), TimedLine::new(3_000, "end")]
        );
    }

    #[test]
    fn test_missing_index_line() {
        let lines = parse("00:00:05.250 --> 00:00:06.000\nhello");
        assert_eq!(lines, vec![TimedLine::new(5_250, "hello")]);
    }
}

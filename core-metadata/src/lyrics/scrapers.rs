//! Per-site lyrics page parsers
//!
//! Each parser knows which site it handles and how to cut the lyrics out of
//! that site's markup. The markup of these sites changes without notice, so
//! every parser returns `None` rather than failing when it cannot find what
//! it expects.

use crate::html::{balanced_div_inner, html_to_text, url_has_domain};
use once_cell::sync::Lazy;
use regex::Regex;

/// Extracts lyrics from the HTML of one lyrics site
pub trait LyricsScraper: Send + Sync {
    /// Display name used as the lyrics source name
    fn name(&self) -> &'static str;

    /// Whether `url` points at a page this scraper understands
    fn handles(&self, url: &str) -> bool;

    /// Lyrics text of the page, `None` when none could be found
    fn parse(&self, html: &str) -> Option<String>;
}

/// All built-in scrapers
pub fn default_scrapers() -> Vec<Box<dyn LyricsScraper>> {
    vec![
        Box::new(AzLyricsParser),
        Box::new(GeniusParser),
        Box::new(MusixmatchParser),
        Box::new(LyricsComParser),
    ]
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

// =============================================================================
// AZLyrics
// =============================================================================

const AZLYRICS_LICENSE_MARKER: &str = "<!-- usage of azlyrics.com content";

/// AZLyrics pages put the lyrics right after a licensing comment
pub struct AzLyricsParser;

impl LyricsScraper for AzLyricsParser {
    fn name(&self) -> &'static str {
        "AZLyrics"
    }

    fn handles(&self, url: &str) -> bool {
        url_has_domain(url, "azlyrics.com")
    }

    fn parse(&self, html: &str) -> Option<String> {
        // ASCII lowercasing keeps byte offsets intact
        let lowered = html.to_ascii_lowercase();
        let marker = lowered.find(AZLYRICS_LICENSE_MARKER)?;
        let comment_end = marker + lowered[marker..].find("-->")? + "-->".len();

        let after = &html[comment_end..];
        let leading_ws = after.len() - after.trim_start().len();
        let fragment = if lowered[comment_end + leading_ws..].starts_with("<div") {
            balanced_div_inner(html, comment_end + leading_ws)?
        } else {
            let end = lowered[comment_end..]
                .find("</div")
                .map_or(html.len(), |i| comment_end + i);
            &html[comment_end..end]
        };

        non_empty(html_to_text(fragment))
    }
}

// =============================================================================
// Genius
// =============================================================================

const GENIUS_CONTAINER_ATTR: &str = r#"data-lyrics-container="true""#;

/// Genius splits lyrics over several container divs
pub struct GeniusParser;

impl LyricsScraper for GeniusParser {
    fn name(&self) -> &'static str {
        "Genius"
    }

    fn handles(&self, url: &str) -> bool {
        url_has_domain(url, "genius.com")
    }

    fn parse(&self, html: &str) -> Option<String> {
        let mut parts = Vec::new();

        for (attr_pos, _) in html.match_indices(GENIUS_CONTAINER_ATTR) {
            let Some(div_start) = html[..attr_pos].rfind("<div") else {
                continue;
            };
            if let Some(inner) = balanced_div_inner(html, div_start) {
                let text = html_to_text(inner);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
        }

        non_empty(parts.join("\n"))
    }
}

// =============================================================================
// Musixmatch
// =============================================================================

static MUSIXMATCH_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<(?:span|p)\b[^>]*class="[^"]*(?:lyrics__content__ok|mxm-lyrics__content)[^"]*"[^>]*>(.*?)</(?:span|p)\s*>"#,
    )
    .expect("valid musixmatch pattern")
});

/// Musixmatch renders each lyrics block as a span or paragraph
pub struct MusixmatchParser;

impl LyricsScraper for MusixmatchParser {
    fn name(&self) -> &'static str {
        "Musixmatch"
    }

    fn handles(&self, url: &str) -> bool {
        url_has_domain(url, "musixmatch.com")
    }

    fn parse(&self, html: &str) -> Option<String> {
        let parts: Vec<String> = MUSIXMATCH_CONTENT
            .captures_iter(html)
            .filter_map(|caps| caps.get(1))
            .map(|m| html_to_text(m.as_str()))
            .filter(|text| !text.is_empty())
            .collect();

        non_empty(parts.join("\n"))
    }
}

// =============================================================================
// Lyrics.com
// =============================================================================

static LYRICS_COM_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<pre\b[^>]*id="lyric-body-text"[^>]*>(.*?)</pre\s*>"#)
        .expect("valid lyrics.com pattern")
});

pub struct LyricsComParser;

impl LyricsScraper for LyricsComParser {
    fn name(&self) -> &'static str {
        "Lyrics.com"
    }

    fn handles(&self, url: &str) -> bool {
        url_has_domain(url, "lyrics.com")
    }

    fn parse(&self, html: &str) -> Option<String> {
        let body = LYRICS_COM_BODY.captures(html)?.get(1)?;
        non_empty(html_to_text(body.as_str()))
    }
}

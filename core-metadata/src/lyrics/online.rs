//! Lyrics sites queried over HTTP
//!
//! ## Sources
//!
//! - **AZLyrics**: page URL derived from artist and title, then scraped
//! - **ChartLyrics**: `SearchLyricDirect` XML endpoint
//! - **Web search**: DuckDuckGo results filtered to sites a scraper handles
//!
//! Every API returns [`LyricsModel::empty`] when the site has nothing for
//! the track and an error only when talking to the site failed.

use super::scrapers::{default_scrapers, AzLyricsParser, LyricsScraper};
use super::{LyricsModel, LyricsSourceType};
use crate::error::{MetadataError, Result};
use crate::html::{absolute_url, decode_entities, trim_lines};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest};
use core_library::strings::{remove_accents, truncate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout for lyrics site requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Some sites refuse requests without a browser user agent
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// A lyrics site that can be asked for one song
#[async_trait]
pub trait OnlineLyricsApi: Send + Sync {
    /// Name shown as the lyrics source
    fn source_name(&self) -> &'static str;

    async fn get_lyrics(&self, artist: &str, title: &str) -> Result<LyricsModel>;
}

/// GETs a page, `None` on 404
async fn fetch_page(http: &dyn HttpClient, url: &str) -> Result<Option<String>> {
    let request = HttpRequest::get(url)
        .header("User-Agent", BROWSER_USER_AGENT)
        .timeout(REQUEST_TIMEOUT);

    let response = http.execute(request).await?;

    if response.status == 404 {
        return Ok(None);
    }

    if !response.is_success() {
        return Err(MetadataError::HttpError {
            status: response.status,
            body: truncate(&response.text_lossy(), 200),
        });
    }

    Ok(Some(response.text_lossy()))
}

fn online_lyrics(source_name: &str, text: String) -> LyricsModel {
    if text.trim().is_empty() {
        LyricsModel::empty()
    } else {
        LyricsModel::new(source_name, LyricsSourceType::Online, text)
    }
}

// =============================================================================
// AZLyrics
// =============================================================================

const AZLYRICS_BASE_URL: &str = "https://www.azlyrics.com/lyrics";

pub struct AzLyricsApi {
    http_client: Arc<dyn HttpClient>,
    parser: AzLyricsParser,
}

impl AzLyricsApi {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            parser: AzLyricsParser,
        }
    }

    /// Page URL for a song, `None` when artist or title has no usable
    /// characters
    ///
    /// AZLyrics keys pages on lowercase ASCII letters and digits only, and
    /// files "The Beatles" under "beatles".
    pub fn lyrics_url(artist: &str, title: &str) -> Option<String> {
        let artist = artist.trim().to_lowercase();
        let artist = url_part(artist.strip_prefix("the ").unwrap_or(&artist));
        let title = url_part(title);

        if artist.is_empty() || title.is_empty() {
            return None;
        }

        Some(format!("{}/{}/{}.html", AZLYRICS_BASE_URL, artist, title))
    }
}

fn url_part(value: &str) -> String {
    remove_accents(value)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[async_trait]
impl OnlineLyricsApi for AzLyricsApi {
    fn source_name(&self) -> &'static str {
        self.parser.name()
    }

    async fn get_lyrics(&self, artist: &str, title: &str) -> Result<LyricsModel> {
        let Some(url) = Self::lyrics_url(artist, title) else {
            return Ok(LyricsModel::empty());
        };

        debug!(url = %url, "Requesting AZLyrics page");
        let Some(html) = fetch_page(self.http_client.as_ref(), &url).await? else {
            debug!(artist = %artist, title = %title, "No AZLyrics page");
            return Ok(LyricsModel::empty());
        };

        let text = self.parser.parse(&html).unwrap_or_default();
        Ok(online_lyrics(self.source_name(), text))
    }
}

// =============================================================================
// ChartLyrics
// =============================================================================

const CHARTLYRICS_URL: &str = "http://api.chartlyrics.com/apiv1.asmx/SearchLyricDirect";

static CHARTLYRICS_LYRIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<Lyric>(.*?)</Lyric>").expect("valid lyric pattern"));

pub struct ChartLyricsApi {
    http_client: Arc<dyn HttpClient>,
}

impl ChartLyricsApi {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    /// Lyric text of a `GetLyricResult` document, entity-decoded
    pub fn parse_response(xml: &str) -> String {
        CHARTLYRICS_LYRIC
            .captures(xml)
            .and_then(|caps| caps.get(1))
            .map(|m| trim_lines(&decode_entities(m.as_str())))
            .unwrap_or_default()
    }
}

#[async_trait]
impl OnlineLyricsApi for ChartLyricsApi {
    fn source_name(&self) -> &'static str {
        "ChartLyrics"
    }

    async fn get_lyrics(&self, artist: &str, title: &str) -> Result<LyricsModel> {
        let url = format!(
            "{}?artist={}&song={}",
            CHARTLYRICS_URL,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        debug!(artist = %artist, title = %title, "Querying ChartLyrics");
        let Some(xml) = fetch_page(self.http_client.as_ref(), &url).await? else {
            return Ok(LyricsModel::empty());
        };

        Ok(online_lyrics(self.source_name(), Self::parse_response(&xml)))
    }
}

// =============================================================================
// Web search
// =============================================================================

const SEARCH_PAGE_URL: &str = "https://duckduckgo.com/";
const SEARCH_LINKS_URL: &str = "https://links.duckduckgo.com/d.js";

static VQD_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"vqd\s*[=:]\s*\\?["']?([0-9][0-9-]+)"#).expect("valid vqd pattern")
});

static RESULTS_PAYLOAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)DDG\.pageLayout\.load\('d',\s*(\[.*?\])\s*\);").expect("valid payload pattern")
});

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "u")]
    url: Option<String>,
}

/// Finds lyrics pages through a web search and scrapes the first one that
/// yields text
pub struct WebSearchLyricsApi {
    http_client: Arc<dyn HttpClient>,
    scrapers: Vec<Box<dyn LyricsScraper>>,
}

impl WebSearchLyricsApi {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_scrapers(http_client, default_scrapers())
    }

    pub fn with_scrapers(
        http_client: Arc<dyn HttpClient>,
        scrapers: Vec<Box<dyn LyricsScraper>>,
    ) -> Self {
        Self {
            http_client,
            scrapers,
        }
    }

    /// Search token embedded in the search page
    pub fn extract_vqd(html: &str) -> Option<String> {
        VQD_TOKEN
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Result URLs of a `d.js` response, in ranking order
    pub fn extract_result_urls(script: &str) -> Result<Vec<String>> {
        let Some(payload) = RESULTS_PAYLOAD.captures(script).and_then(|caps| caps.get(1)) else {
            return Ok(Vec::new());
        };

        let results: Vec<SearchResult> = serde_json::from_str(payload.as_str())
            .map_err(|e| MetadataError::Parse(format!("search results: {}", e)))?;

        Ok(results
            .into_iter()
            .filter_map(|result| result.url)
            .filter_map(|url| absolute_url(&url))
            .map(String::from)
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let encoded = urlencoding::encode(query);

        let page_url = format!("{}?q={}", SEARCH_PAGE_URL, encoded);
        let Some(page) = fetch_page(self.http_client.as_ref(), &page_url).await? else {
            return Ok(Vec::new());
        };

        let Some(vqd) = Self::extract_vqd(&page) else {
            warn!("Search page did not contain a vqd token");
            return Ok(Vec::new());
        };

        let links_url = format!(
            "{}?q={}&vqd={}&l=us-en&p=1&s=0",
            SEARCH_LINKS_URL, encoded, vqd
        );
        let Some(script) = fetch_page(self.http_client.as_ref(), &links_url).await? else {
            return Ok(Vec::new());
        };

        Self::extract_result_urls(&script)
    }
}

#[async_trait]
impl OnlineLyricsApi for WebSearchLyricsApi {
    fn source_name(&self) -> &'static str {
        "Web search"
    }

    async fn get_lyrics(&self, artist: &str, title: &str) -> Result<LyricsModel> {
        let query = format!("{} {} lyrics", artist, title);
        let urls = self.search(&query).await?;
        debug!(query = %query, results = urls.len(), "Web search finished");

        for url in urls {
            let Some(scraper) = self.scrapers.iter().find(|s| s.handles(&url)) else {
                continue;
            };

            let html = match fetch_page(self.http_client.as_ref(), &url).await {
                Ok(Some(html)) => html,
                Ok(None) => continue,
                Err(e) => {
                    warn!(url = %url, error = %e, "Could not fetch search result");
                    continue;
                }
            };

            if let Some(text) = scraper.parse(&html) {
                debug!(url = %url, source = scraper.name(), "Scraped lyrics from search result");
                return Ok(online_lyrics(scraper.name(), text));
            }
        }

        Ok(LyricsModel::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azlyrics_url() {
        assert_eq!(
            AzLyricsApi::lyrics_url("The Beatles", "Hey Jude!").as_deref(),
            Some("https://www.azlyrics.com/lyrics/beatles/heyjude.html")
        );
        assert_eq!(
            AzLyricsApi::lyrics_url("Sigur Rós", "Hoppípolla").as_deref(),
            Some("https://www.azlyrics.com/lyrics/sigurros/hoppipolla.html")
        );
        assert_eq!(
            AzLyricsApi::lyrics_url("Theatre of Tragedy", "Venus").as_deref(),
            Some("https://www.azlyrics.com/lyrics/theatreoftragedy/venus.html")
        );
        assert!(AzLyricsApi::lyrics_url("!!!", "").is_none());
    }

    #[test]
    fn test_chartlyrics_parse_response() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<GetLyricResult xmlns="http://api.chartlyrics.com/">
  <LyricSong>Roads</LyricSong>
  <Lyric>Oh, can&apos;t anybody see
We&#39;ve got a war to fight</Lyric>
</GetLyricResult>"#;

        assert_eq!(
            ChartLyricsApi::parse_response(xml),
            "Oh, can't anybody see\nWe've got a war to fight"
        );
        assert_eq!(ChartLyricsApi::parse_response("<GetLyricResult><Lyric /></GetLyricResult>"), "");
    }

    #[test]
    fn test_extract_vqd() {
        let html = r#"<script>DDG.deep.initialize('/d.js?q=roads&t=D&l=us-en&s=0&dl=en&ct=NL&ss_mkt=us&vqd=4-123456789012345678901234567890&p_ent=');</script>"#;
        assert_eq!(
            WebSearchLyricsApi::extract_vqd(html).as_deref(),
            Some("4-123456789012345678901234567890")
        );
        assert_eq!(
            WebSearchLyricsApi::extract_vqd(r#"var x = {vqd:"4-99"};"#).as_deref(),
            Some("4-99")
        );
        assert!(WebSearchLyricsApi::extract_vqd("<html></html>").is_none());
    }

    #[test]
    fn test_extract_result_urls() {
        let script = r#"if (DDG.pageLayout) DDG.pageLayout.load('d',[{"a":"x","u":"https://www.azlyrics.com/lyrics/portishead/roads.html"},{"u":"//genius.com/Portishead-roads-lyrics"},{"u":""},{"n":"/d.js?q=roads&s=30"}]);DDG.duckbar.load('images');"#;

        let urls = WebSearchLyricsApi::extract_result_urls(script).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://www.azlyrics.com/lyrics/portishead/roads.html",
                "https://genius.com/Portishead-roads-lyrics",
            ]
        );
        assert!(WebSearchLyricsApi::extract_result_urls("nothing").unwrap().is_empty());
        assert!(WebSearchLyricsApi::extract_result_urls("DDG.pageLayout.load('d',[{]);").is_err());
    }
}

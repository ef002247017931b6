//! Minimal HTML text extraction for scraped pages and API payloads

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

// A line break already following the tag is part of the same break
static BR_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>(?:\r?\n)?").expect("valid br pattern"));

static BLOCK_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:p|div)\b[^>]*>").expect("valid block pattern"));

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment pattern"));

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").expect("valid script pattern")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});").expect("valid entity pattern")
});

static DIV_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<div\b[^>]*>|</div\s*>").expect("valid div pattern"));

/// Replaces `<br>` variants with newlines
pub fn br_to_newline(html: &str) -> String {
    BR_TAG.replace_all(html, "\n").into_owned()
}

/// Removes comments, scripts, styles and every remaining tag
pub fn strip_tags(html: &str) -> String {
    let without_comments = COMMENT.replace_all(html, "");
    let without_scripts = SCRIPT_OR_STYLE.replace_all(&without_comments, "");
    TAG.replace_all(&without_scripts, "").into_owned()
}

/// Decodes named and numeric character references
///
/// Unknown named entities are left as they are.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        let code = u32::from_str_radix(hex, 16).ok()?;
        return char::from_u32(code).map(String::from);
    }

    if let Some(decimal) = entity.strip_prefix('#') {
        let code: u32 = decimal.parse().ok()?;
        return char::from_u32(code).map(String::from);
    }

    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "hellip" => "…",
        "mdash" => "—",
        "ndash" => "–",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        "copy" => "©",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Trims every line, collapses runs of blank lines and trims the result
pub fn trim_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = false;

    for line in text.lines().map(str::trim) {
        let blank = line.is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(line);
        previous_blank = blank;
    }

    lines.join("\n").trim().to_string()
}

/// Converts an HTML fragment to plain text, keeping line breaks
pub fn html_to_text(html: &str) -> String {
    let with_breaks = br_to_newline(html);
    let with_blocks = BLOCK_BOUNDARY.replace_all(&with_breaks, "\n");
    let stripped = strip_tags(&with_blocks);
    trim_lines(&decode_entities(&stripped))
}

/// Inner HTML of the `<div>` whose opening tag starts at `start`
///
/// Nested divs are balanced; an unterminated div yields everything to the end
/// of the document.
pub fn balanced_div_inner(html: &str, start: usize) -> Option<&str> {
    let open = DIV_BOUNDARY.find_at(html, start)?;
    if open.start() != start || open.as_str().starts_with("</") {
        return None;
    }

    let mut depth = 1usize;
    for boundary in DIV_BOUNDARY.find_iter(&html[open.end()..]) {
        if boundary.as_str().starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Some(&html[open.end()..open.end() + boundary.start()]);
            }
        } else {
            depth += 1;
        }
    }

    Some(&html[open.end()..])
}

/// Parses an absolute URL; protocol-relative links (`//host/path`) are read as https
pub fn absolute_url(url: &str) -> Option<Url> {
    let url = url.trim();
    let parsed = match url.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{}", rest)),
        None => Url::parse(url),
    };

    parsed.ok().filter(|u| u.has_host())
}

/// Lowercased host of a URL, without port or credentials
pub fn host_of(url: &str) -> Option<String> {
    absolute_url(url)?
        .host_str()
        .map(|host| host.to_ascii_lowercase())
}

/// True when the URL's host is `domain` or one of its subdomains
pub fn url_has_domain(url: &str, domain: &str) -> bool {
    host_of(url).is_some_and(|host| {
        host == domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

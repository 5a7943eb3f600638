//! Regex-based HTML inspection: metadata, readable text, structure counts,
//! links, images and linked resources.

use std::sync::LazyLock;

use regex::{Captures, Regex};

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

static TITLE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?is)<title[^>]*>(.*?)</title>"));
static META: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<meta\s+([^>]+)>"));
static META_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)name\s*=\s*["']([^"']+)["']"#));
static META_CONTENT: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)content\s*=\s*["']([^"']*)["']"#));
static LANG: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)<html[^>]+lang\s*=\s*["']([^"']+)["']"#));
static SCRIPT_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?is)<script[^>]*>(.*?)</script>"));
static STYLE_BLOCK: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?is)<style[^>]*>.*?</style>"));
static COMMENT: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));
static TAG: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"<[^>]+>"));
static WHITESPACE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\s+"));
static ENTITY: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);"));
static HEADING: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<h[1-6][\s>]"));
static H1: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<h1[\s>]"));
static PARAGRAPH: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<p[\s>]"));
static FORM: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<form[\s>]"));
static TABLE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<table[\s>]"));
static LIST: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<(?:ul|ol)[\s>]"));
static LINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)<a\s+[^>]*href\s*=\s*["']([^"']+)["'][^>]*>"#));
static IMAGE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<img\s[^>]*>"));
static SRC: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)\ssrc\s*=\s*["']([^"']+)["']"#));
static ALT: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)\salt\s*=\s*["']([^"']*)["']"#));
static SCRIPT_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)<script[^>]*>"));
static STYLESHEET: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)<link[^>]+href\s*=\s*["']([^"']+\.css[^"']*)["']"#));
static VIEWPORT: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r#"(?i)<meta[^>]+name\s*=\s*["']viewport["']"#));

fn count(re: &Option<Regex>, text: &str) -> usize {
    re.as_ref().map_or(0, |re| re.find_iter(text).count())
}

fn first_capture(re: &Option<Regex>, text: &str) -> Option<String> {
    re.as_ref()?
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn all_captures(re: &Option<Regex>, text: &str) -> Vec<String> {
    re.as_ref()
        .map(|re| {
            re.captures_iter(text)
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
                .collect()
        })
        .unwrap_or_default()
}

fn replace_all(re: &Option<Regex>, text: &str, with: &str) -> String {
    match re {
        Some(re) => re.replace_all(text, with).into_owned(),
        None => text.to_string(),
    }
}

/// Decode named and numeric character references.
pub fn decode_entities(text: &str) -> String {
    let Some(re) = ENTITY.as_ref() else {
        return text.to_string();
    };
    re.replace_all(text, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = if let Some(hex) = entity
            .strip_prefix("#x")
            .or_else(|| entity.strip_prefix("#X"))
        {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = entity.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                "copy" => Some('©'),
                "reg" => Some('®'),
                "hellip" => Some('…'),
                "mdash" => Some('—'),
                "ndash" => Some('–'),
                _ => None,
            }
        };
        decoded
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Collapse whitespace runs into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    replace_all(&WHITESPACE, text, " ").trim().to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub author: Option<String>,
    pub lang: Option<String>,
}

impl PageMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.keywords.is_empty()
            && self.author.is_none()
            && self.lang.is_none()
    }
}

pub fn metadata(html: &str) -> PageMetadata {
    let mut meta = PageMetadata {
        title: first_capture(&TITLE, html)
            .map(|t| collapse_whitespace(&decode_entities(&t)))
            .filter(|t| !t.is_empty()),
        lang: first_capture(&LANG, html),
        ..Default::default()
    };

    for attrs in all_captures(&META, html) {
        let (Some(name), Some(content)) = (
            first_capture(&META_NAME, &attrs),
            first_capture(&META_CONTENT, &attrs),
        ) else {
            continue;
        };
        let content = decode_entities(&content);
        match name.to_lowercase().as_str() {
            "description" => meta.description = Some(content),
            "keywords" => {
                meta.keywords = content
                    .split(',')
                    .map(|k| k.trim().to_string())
                    .filter(|k| !k.is_empty())
                    .collect()
            }
            "author" => meta.author = Some(content),
            _ => {}
        }
    }
    meta
}

/// Visible text: scripts, styles, comments and tags removed, entities
/// decoded, whitespace collapsed.
pub fn readable_text(html: &str) -> String {
    let text = replace_all(&SCRIPT_BLOCK, html, " ");
    let text = replace_all(&STYLE_BLOCK, &text, " ");
    let text = replace_all(&COMMENT, &text, " ");
    let text = replace_all(&TAG, &text, " ");
    collapse_whitespace(&decode_entities(&text))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlStructure {
    pub total_elements: usize,
    pub text_length: usize,
    pub word_count: usize,
    pub headings: usize,
    pub h1: usize,
    pub paragraphs: usize,
    pub forms: usize,
    pub tables: usize,
    pub lists: usize,
}

pub fn structure(html: &str) -> HtmlStructure {
    let text = readable_text(html);
    HtmlStructure {
        total_elements: count(&TAG, html),
        text_length: text.chars().count(),
        word_count: text.split_whitespace().count(),
        headings: count(&HEADING, html),
        h1: count(&H1, html),
        paragraphs: count(&PARAGRAPH, html),
        forms: count(&FORM, html),
        tables: count(&TABLE, html),
        lists: count(&LIST, html),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkSummary {
    pub total: usize,
    pub internal: Vec<String>,
    pub external: Vec<String>,
    pub mailto: Vec<String>,
}

impl LinkSummary {
    /// External link hosts with counts, most linked first.
    pub fn top_domains(&self, limit: usize) -> Vec<(String, usize)> {
        let mut counts: std::collections::HashMap<String, usize> = Default::default();
        for link in &self.external {
            if let Some(host) = reqwest::Url::parse(link)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
            {
                *counts.entry(host).or_default() += 1;
            }
        }
        let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts.truncate(limit);
        counts
    }
}

pub fn links(html: &str) -> LinkSummary {
    let mut summary = LinkSummary::default();
    for link in all_captures(&LINK, html) {
        summary.total += 1;
        let lower = link.to_lowercase();
        if lower.starts_with("mailto:") {
            summary.mailto.push(link);
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            summary.external.push(link);
        } else {
            summary.internal.push(link);
        }
    }
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub src: String,
    pub alt: Option<String>,
}

impl ImageInfo {
    pub fn has_alt(&self) -> bool {
        self.alt.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

pub fn images(html: &str) -> Vec<ImageInfo> {
    let Some(re) = IMAGE.as_ref() else {
        return Vec::new();
    };
    re.find_iter(html)
        .filter_map(|tag| {
            let tag = tag.as_str();
            first_capture(&SRC, tag).map(|src| ImageInfo {
                src,
                alt: first_capture(&ALT, tag),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources {
    pub script_tags: usize,
    pub external_scripts: Vec<String>,
    pub inline_scripts: usize,
    pub stylesheets: Vec<String>,
}

pub fn resources(html: &str) -> Resources {
    let external_scripts: Vec<String> = SCRIPT_TAG
        .as_ref()
        .map(|re| {
            re.find_iter(html)
                .filter_map(|m| first_capture(&SRC, m.as_str()))
                .collect()
        })
        .unwrap_or_default();
    let inline_scripts = all_captures(&SCRIPT_BLOCK, html)
        .iter()
        .filter(|body| !body.trim().is_empty())
        .count();
    Resources {
        script_tags: count(&SCRIPT_TAG, html),
        external_scripts,
        inline_scripts,
        stylesheets: all_captures(&STYLESHEET, html),
    }
}

pub fn has_viewport(html: &str) -> bool {
    count(&VIEWPORT, html) > 0
}

/// Anchor (href, inner html) pairs with their byte span in the page.
pub fn anchors(html: &str) -> Vec<(String, String, std::ops::Range<usize>)> {
    static ANCHOR: LazyLock<Option<Regex>> =
        LazyLock::new(|| compile(r#"(?is)<a\s[^>]*href\s*=\s*"([^"]+)"[^>]*>(.*?)</a>"#));
    ANCHOR
        .as_ref()
        .map(|re| {
            re.captures_iter(html)
                .filter_map(|c| {
                    let whole = c.get(0)?;
                    Some((c[1].to_string(), c[2].to_string(), whole.range()))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title> Rust &amp; Tokio Guide </title>
  <meta name="description" content="Learn async Rust">
  <meta name="keywords" content="rust, async , tokio">
  <meta name="author" content="Ferris">
  <meta name="viewport" content="width=device-width">
  <link rel="stylesheet" href="/static/site.css?v=2">
  <style>body { color: red; }</style>
  <script src="https://cdn.example.com/app.js"></script>
  <script>console.log("hi");</script>
</head>
<body>
  <h1>Getting started</h1>
  <h2>Install</h2>
  <p>Use <a href="/install">the installer</a> or <a href="https://rustup.rs/">rustup</a>.</p>
  <p>Mail <a href="mailto:team@example.com">us</a> &lt;now&gt; &#169; &#x41;</p>
  <ul><li>one</li></ul>
  <img src="/logo.png" alt="Logo">
  <img src="/spacer.gif">
  <!-- hidden comment -->
  <form action="/search"></form>
</body>
</html>"#;

    #[test]
    fn metadata_is_extracted_and_decoded() {
        let meta = metadata(PAGE);
        assert_eq!(meta.title.as_deref(), Some("Rust & Tokio Guide"));
        assert_eq!(meta.description.as_deref(), Some("Learn async Rust"));
        assert_eq!(meta.keywords, vec!["rust", "async", "tokio"]);
        assert_eq!(meta.author.as_deref(), Some("Ferris"));
        assert_eq!(meta.lang.as_deref(), Some("en"));
    }

    #[test]
    fn readable_text_drops_markup() {
        let text = readable_text(PAGE);
        assert!(text.contains("Getting started Install Use the installer or rustup ."));
        assert!(text.contains("<now> © A"));
        assert!(!text.contains("console.log"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("hidden comment"));
    }

    #[test]
    fn structure_counts_elements() {
        let s = structure(PAGE);
        assert_eq!(s.headings, 2);
        assert_eq!(s.h1, 1);
        assert_eq!(s.paragraphs, 2);
        assert_eq!(s.forms, 1);
        assert_eq!(s.tables, 0);
        assert_eq!(s.lists, 1);
        assert!(s.word_count > 5);
    }

    #[test]
    fn links_are_classified() {
        let l = links(PAGE);
        assert_eq!(l.total, 3);
        assert_eq!(l.internal, vec!["/install"]);
        assert_eq!(l.external, vec!["https://rustup.rs/"]);
        assert_eq!(l.mailto.len(), 1);
        assert_eq!(l.top_domains(5), vec![("rustup.rs".to_string(), 1)]);
    }

    #[test]
    fn images_and_resources() {
        let imgs = images(PAGE);
        assert_eq!(imgs.len(), 2);
        assert!(imgs[0].has_alt());
        assert!(!imgs[1].has_alt());

        let r = resources(PAGE);
        assert_eq!(r.script_tags, 2);
        assert_eq!(r.external_scripts, vec!["https://cdn.example.com/app.js"]);
        assert_eq!(r.inline_scripts, 1);
        assert_eq!(r.stylesheets, vec!["/static/site.css?v=2"]);
        assert!(has_viewport(PAGE));
    }

    #[test]
    fn unknown_entities_are_kept() {
        assert_eq!(decode_entities("a &bogus; b &amp; c"), "a &bogus; b & c");
    }

    #[test]
    fn anchors_carry_spans() {
        let found = anchors(r#"x <a class="r" href="https://a.dev/x">A <b>dev</b></a> y"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "https://a.dev/x");
        assert_eq!(found[0].1, "A <b>dev</b>");
        assert_eq!(found[0].2.start, 2);
    }
}

//! Search engine result scraping, relevance scoring and insights.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

use super::error::{WebError, WebResult};
use super::html;
use crate::render::preview;

pub const SNIPPET_CHARS: usize = 300;
const MAX_PARSED_RESULTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchEngine {
    DuckDuckGo,
    GitHub,
    StackOverflow,
    Docs,
}

impl SearchEngine {
    pub const ALL: [SearchEngine; 4] = [
        SearchEngine::DuckDuckGo,
        SearchEngine::GitHub,
        SearchEngine::StackOverflow,
        SearchEngine::Docs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "duckduckgo",
            SearchEngine::GitHub => "github",
            SearchEngine::StackOverflow => "stackoverflow",
            SearchEngine::Docs => "docs",
        }
    }

    fn host(&self) -> &'static str {
        match self {
            SearchEngine::DuckDuckGo => "duckduckgo.com",
            SearchEngine::GitHub => "github.com",
            SearchEngine::StackOverflow => "stackoverflow.com",
            SearchEngine::Docs => "docs.python.org",
        }
    }

    /// Results page URL for a query.
    pub fn search_url(&self, query: &str) -> WebResult<Url> {
        let (base, extra): (&str, &[(&str, &str)]) = match self {
            SearchEngine::DuckDuckGo => ("https://html.duckduckgo.com/html/", &[]),
            SearchEngine::GitHub => ("https://github.com/search", &[("type", "repositories")]),
            SearchEngine::StackOverflow => ("https://stackoverflow.com/search", &[]),
            SearchEngine::Docs => ("https://docs.python.org/3/search.html", &[]),
        };
        let params = std::iter::once(("q", query)).chain(extra.iter().copied());
        Url::parse_with_params(base, params).map_err(|_| WebError::InvalidUrl {
            url: base.to_string(),
        })
    }

    /// Navigation and account links on the engine's own site.
    fn is_internal(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return true;
        };
        let own = host == self.host() || host.ends_with(&format!(".{}", self.host()));
        if !own {
            return false;
        }
        match self {
            SearchEngine::DuckDuckGo => true,
            _ => {
                let path = url.path();
                path == "/"
                    || ["/search", "/login", "/signup", "/join", "/users/login", "/features"]
                        .iter()
                        .any(|p| path.starts_with(p))
            }
        }
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchEngine {
    type Err = WebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        SearchEngine::ALL
            .into_iter()
            .find(|e| e.as_str() == name || (name.is_empty() && *e == SearchEngine::DuckDuckGo))
            .ok_or_else(|| WebError::UnsupportedEngine {
                engine: s.to_string(),
                available: SearchEngine::ALL
                    .iter()
                    .map(|e| e.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub relevance: f64,
}

/// Resolve a result href to an absolute URL, unwrapping DuckDuckGo redirects.
fn result_url(href: &str) -> Option<Url> {
    let href = html::decode_entities(href.trim());
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        href
    };
    let url = Url::parse(&absolute).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    if url.host_str().is_some_and(|h| h.ends_with("duckduckgo.com")) && url.path().starts_with("/l/")
    {
        let target = url
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())?;
        return Url::parse(&target).ok();
    }
    Some(url)
}

/// Pull (title, url, snippet) results out of an engine's HTML page.
pub fn parse_results(page: &str, engine: SearchEngine) -> Vec<SearchHit> {
    let anchors = html::anchors(page);
    let mut seen = HashSet::new();
    let mut hits = Vec::new();

    for (i, (href, inner, span)) in anchors.iter().enumerate() {
        if hits.len() >= MAX_PARSED_RESULTS {
            break;
        }
        let Some(url) = result_url(href) else {
            continue;
        };
        if engine.is_internal(&url) {
            continue;
        }
        let title = html::readable_text(inner);
        if title.is_empty() {
            continue;
        }
        let key = url.as_str().trim_end_matches('/').to_string();
        if !seen.insert(key) {
            continue;
        }
        let next = anchors.get(i + 1).map_or(page.len(), |(_, _, s)| s.start);
        let snippet = page
            .get(span.end..next.max(span.end))
            .map(html::readable_text)
            .unwrap_or_default();
        hits.push(SearchHit {
            title,
            url: url.to_string(),
            snippet: preview(&snippet, SNIPPET_CHARS),
            relevance: 0.0,
        });
    }
    hits
}

/// Weighted share of query words found in title (0.6), snippet (0.3) and url (0.1).
pub fn relevance(hit: &SearchHit, query: &str) -> f64 {
    let words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return 0.0;
    }
    let share = |text: &str| {
        let text = text.to_lowercase();
        words.iter().filter(|w| text.contains(w.as_str())).count() as f64 / words.len() as f64
    };
    (share(&hit.title) * 0.6 + share(&hit.snippet) * 0.3 + share(&hit.url) * 0.1).min(1.0)
}

pub fn score(hits: &mut [SearchHit], query: &str) {
    for hit in hits.iter_mut() {
        hit.relevance = relevance(hit, query);
    }
}

fn result_kind(url: &str) -> &'static str {
    if url.contains("github.com") {
        "code_repository"
    } else if url.contains("stackoverflow.com") {
        "q_and_a"
    } else if url.contains("docs.") || url.contains("documentation") {
        "documentation"
    } else {
        "general_content"
    }
}

/// Domain spread, dominant domain and result type diversity.
pub fn insights(hits: &[SearchHit]) -> Vec<String> {
    if hits.is_empty() {
        return Vec::new();
    }
    let mut domains: HashMap<String, usize> = HashMap::new();
    for hit in hits {
        if let Some(host) = Url::parse(&hit.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
        {
            *domains.entry(host).or_default() += 1;
        }
    }

    let mut out = vec![format!("Results span {} unique domains", domains.len())];
    if let Some((domain, count)) = domains
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .filter(|(_, c)| **c > 1)
    {
        out.push(format!("Most common domain: {} ({} results)", domain, count));
    }

    let kinds: BTreeSet<&str> = hits.iter().map(|h| result_kind(&h.url)).collect();
    if kinds.len() > 1 {
        out.push(format!(
            "Diverse result types: {}",
            kinds.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    out
}

static WORD: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").ok());

/// Query extended with title words that repeat across results.
pub fn related_queries(query: &str, hits: &[SearchHit]) -> Vec<String> {
    let Some(word_re) = WORD.as_ref() else {
        return Vec::new();
    };
    let lower_query = query.to_lowercase();
    let titles = hits
        .iter()
        .map(|h| h.title.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in word_re.find_iter(&titles).map(|m| m.as_str()) {
        if !lower_query.contains(word) {
            *counts.entry(word).or_default() += 1;
        }
    }
    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    counts
        .into_iter()
        .take(3)
        .filter(|(_, count)| *count > 1)
        .map(|(word, _)| format!("{} {}", query, word))
        .collect()
}

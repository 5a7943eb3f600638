//! Webpage analysis: structure, SEO scoring and technical notes.

use super::client::FetchedPage;
use super::error::{WebError, WebResult};
use super::html::{self, HtmlStructure, ImageInfo, LinkSummary, PageMetadata, Resources};
use crate::render::{format_bytes, percent};

const SEO_MIN_WORDS: usize = 300;
const SEO_MAX_PAGE_BYTES: u64 = 500_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorStatus {
    Good,
    Warning,
    Error,
}

impl FactorStatus {
    pub fn marker(&self) -> &'static str {
        match self {
            FactorStatus::Good => "[ok]",
            FactorStatus::Warning => "[warn]",
            FactorStatus::Error => "[missing]",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeoFactor {
    pub name: &'static str,
    pub status: FactorStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeoReport {
    pub score: u32,
    pub factors: Vec<SeoFactor>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PageAnalysis {
    pub url: String,
    pub final_url: String,
    pub status: u16,
    pub content_type: String,
    pub size: u64,
    pub metadata: PageMetadata,
    pub structure: HtmlStructure,
    pub links: LinkSummary,
    pub images: Vec<ImageInfo>,
    pub resources: Resources,
    pub seo: Option<SeoReport>,
    pub technical: Vec<String>,
    pub performance: Vec<String>,
    pub accessibility: Vec<String>,
}

impl PageAnalysis {
    pub fn images_with_alt(&self) -> usize {
        self.images.iter().filter(|i| i.has_alt()).count()
    }
}

pub fn analyze(page: &FetchedPage, analyze_seo: bool) -> WebResult<PageAnalysis> {
    if !page.is_html() {
        return Err(WebError::NotHtml {
            content_type: page.content_type.clone(),
        });
    }
    let body = page.body.as_deref().unwrap_or_default();

    let metadata = html::metadata(body);
    let structure = html::structure(body);
    let links = html::links(body);
    let images = html::images(body);
    let resources = html::resources(body);
    let viewport = html::has_viewport(body);

    let seo = analyze_seo.then(|| seo_report(page, &metadata, &structure, &images, viewport));
    let technical = technical_notes(page, viewport);
    let performance = performance_notes(page.size, &resources, images.len());
    let accessibility = accessibility_notes(&structure, &images);

    Ok(PageAnalysis {
        url: page.url.clone(),
        final_url: page.final_url.clone(),
        status: page.status,
        content_type: page.content_type.clone(),
        size: page.size,
        metadata,
        structure,
        links,
        images,
        resources,
        seo,
        technical,
        performance,
        accessibility,
    })
}

pub fn seo_report(
    page: &FetchedPage,
    metadata: &PageMetadata,
    structure: &HtmlStructure,
    images: &[ImageInfo],
    viewport: bool,
) -> SeoReport {
    let mut score = 0;
    let mut factors = Vec::new();
    let mut recommendations = Vec::new();
    let mut factor = |name, status, message: String| {
        factors.push(SeoFactor {
            name,
            status,
            message,
        })
    };

    match metadata.title.as_deref().map(|t| t.chars().count()) {
        Some(len) if (10..=60).contains(&len) => {
            score += 20;
            factor("Title", FactorStatus::Good, "Title length is optimal".into());
        }
        Some(len) => {
            factor(
                "Title",
                FactorStatus::Warning,
                format!("Title length ({}) should be 10-60 characters", len),
            );
            recommendations.push("Optimize title length to 10-60 characters".to_string());
        }
        None => {
            factor("Title", FactorStatus::Error, "Missing page title".into());
            recommendations.push("Add a descriptive page title".to_string());
        }
    }

    match metadata.description.as_deref().map(|d| d.chars().count()) {
        Some(len) if (120..=160).contains(&len) => {
            score += 15;
            factor(
                "Meta description",
                FactorStatus::Good,
                "Meta description length is optimal".into(),
            );
        }
        Some(len) => {
            factor(
                "Meta description",
                FactorStatus::Warning,
                format!("Meta description length ({}) should be 120-160 characters", len),
            );
            recommendations.push("Adjust the meta description to 120-160 characters".to_string());
        }
        None => {
            factor(
                "Meta description",
                FactorStatus::Error,
                "Missing meta description".into(),
            );
            recommendations.push("Add a meta description".to_string());
        }
    }

    match structure.h1 {
        1 => {
            score += 15;
            factor("H1", FactorStatus::Good, "Exactly one H1 tag".into());
        }
        0 => {
            factor("H1", FactorStatus::Error, "Missing H1 tag".into());
            recommendations.push("Add exactly one H1 tag".to_string());
        }
        n => {
            factor("H1", FactorStatus::Warning, format!("Multiple H1 tags ({})", n));
            recommendations.push("Use only one H1 tag per page".to_string());
        }
    }

    let with_alt = images.iter().filter(|i| i.has_alt()).count();
    let alt_share = if images.is_empty() {
        100.0
    } else {
        percent(with_alt, images.len())
    };
    if alt_share >= 90.0 {
        score += 10;
        factor(
            "Image alt text",
            FactorStatus::Good,
            if images.is_empty() {
                "No images to describe".to_string()
            } else {
                format!("{:.1}% of images have alt text", alt_share)
            },
        );
    } else {
        factor(
            "Image alt text",
            FactorStatus::Warning,
            format!("Only {:.1}% of images have alt text", alt_share),
        );
        recommendations.push("Add alt text to all images".to_string());
    }

    if structure.word_count >= SEO_MIN_WORDS {
        score += 10;
        factor(
            "Content length",
            FactorStatus::Good,
            format!("{} words of text", structure.word_count),
        );
    } else {
        factor(
            "Content length",
            FactorStatus::Warning,
            format!("Content is short ({} words)", structure.word_count),
        );
        recommendations.push(format!("Add more content (aim for {}+ words)", SEO_MIN_WORDS));
    }

    if page.size < SEO_MAX_PAGE_BYTES {
        score += 10;
        factor(
            "Page size",
            FactorStatus::Good,
            format!("{} is reasonable for fast loading", format_bytes(page.size)),
        );
    } else {
        factor(
            "Page size",
            FactorStatus::Warning,
            format!("{} may slow down loading", format_bytes(page.size)),
        );
        recommendations.push("Reduce page weight below 500 KB".to_string());
    }

    if page.final_url.starts_with("https://") {
        score += 10;
        factor("HTTPS", FactorStatus::Good, "Served over HTTPS".into());
    } else {
        factor("HTTPS", FactorStatus::Warning, "Served over plain HTTP".into());
        recommendations.push("Serve the page over HTTPS".to_string());
    }

    if viewport {
        score += 10;
        factor("Viewport", FactorStatus::Good, "Viewport meta tag present".into());
    } else {
        factor("Viewport", FactorStatus::Error, "No viewport meta tag".into());
        recommendations.push("Add a viewport meta tag for mobile devices".to_string());
    }

    SeoReport {
        score: score.min(100),
        factors,
        recommendations,
    }
}

fn technical_notes(page: &FetchedPage, viewport: bool) -> Vec<String> {
    let mut notes = Vec::new();
    if page.status == 200 {
        notes.push("HTTP 200: page loads successfully".to_string());
    } else {
        notes.push(format!("HTTP {}: non-standard response code", page.status));
    }
    match page.content_encoding.as_deref() {
        Some(enc) if enc.contains("gzip") || enc.contains("br") || enc.contains("deflate") => {
            notes.push(format!("Compression enabled ({})", enc))
        }
        _ => notes.push("No compression reported".to_string()),
    }
    if page.final_url.starts_with("https://") {
        notes.push("HTTPS enabled".to_string());
    } else {
        notes.push("HTTP only: consider HTTPS".to_string());
    }
    if viewport {
        notes.push("Viewport meta tag found (mobile-friendly)".to_string());
    } else {
        notes.push("No viewport meta tag (may not be mobile-friendly)".to_string());
    }
    if page.redirected() {
        notes.push(format!("Redirected to {}", page.final_url));
    }
    notes
}

fn performance_notes(size: u64, resources: &Resources, image_count: usize) -> Vec<String> {
    let mut notes = Vec::new();
    if size > 1024 * 1024 {
        notes.push(format!(
            "Large page size ({}): consider optimization",
            format_bytes(size)
        ));
    } else if size < 10 * 1024 {
        notes.push(format!("Small page size ({}): fast loading", format_bytes(size)));
    }
    let external = resources.external_scripts.len() + resources.stylesheets.len();
    if external > 10 {
        notes.push(format!(
            "Many external resources ({}) may affect loading speed",
            external
        ));
    }
    if image_count > 20 {
        notes.push(format!("Many images ({}): consider lazy loading", image_count));
    }
    notes
}

fn accessibility_notes(structure: &HtmlStructure, images: &[ImageInfo]) -> Vec<String> {
    let mut notes = Vec::new();
    if !images.is_empty() {
        let missing = images.iter().filter(|i| !i.has_alt()).count();
        if missing > 0 {
            notes.push(format!("{} images missing alt text", missing));
        } else {
            notes.push("All images have alt text".to_string());
        }
    }
    if structure.forms > 0 {
        notes.push(format!(
            "{} forms detected: ensure inputs are labelled",
            structure.forms
        ));
    }
    if structure.headings > 0 {
        notes.push(format!(
            "{} headings found: good for screen readers",
            structure.headings
        ));
    } else {
        notes.push("No headings found: add a heading structure".to_string());
    }
    notes
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn page(url: &str, body: &str) -> FetchedPage {
        FetchedPage {
            url: url.to_string(),
            final_url: url.to_string(),
            status: 200,
            content_type: "text/html".to_string(),
            content_encoding: Some("gzip".to_string()),
            size: body.len() as u64,
            body: Some(body.to_string()),
            elapsed: Duration::from_millis(5),
            from_cache: false,
        }
    }

    fn well_formed() -> String {
        let description = "d".repeat(130);
        let words = "word ".repeat(320);
        format!(
            r#"<html lang="en"><head><title>A well sized page title</title>
            <meta name="description" content="{description}">
            <meta name="viewport" content="width=device-width"></head>
            <body><h1>Main</h1><h2>Sub</h2><p>{words}</p>
            <img src="a.png" alt="chart"><a href="/docs">Docs</a>
            <a href="https://github.com/x">GH</a><a href="mailto:a@b.c">Mail</a></body></html>"#
        )
    }

    #[test]
    fn perfect_page_scores_full_marks() {
        let analysis = analyze(&page("https://example.com/", &well_formed()), true).unwrap();
        let seo = analysis.seo.as_ref().unwrap();
        assert_eq!(seo.score, 100);
        assert!(seo.recommendations.is_empty());
        assert!(seo.factors.iter().all(|f| f.status == FactorStatus::Good));

        assert_eq!(analysis.structure.h1, 1);
        assert_eq!(analysis.structure.headings, 2);
        assert_eq!(analysis.links.internal.len(), 1);
        assert_eq!(analysis.links.external.len(), 1);
        assert_eq!(analysis.links.mailto.len(), 1);
        assert_eq!(analysis.images_with_alt(), 1);
        assert!(analysis.technical.iter().any(|n| n.contains("gzip")));
    }

    #[test]
    fn bare_page_collects_recommendations() {
        let body = r#"<html><body><h1>A</h1><h1>B</h1><img src="x.png"><p>short</p></body></html>"#;
        let mut bare = page("http://example.com/", body);
        bare.content_encoding = None;
        let analysis = analyze(&bare, true).unwrap();
        let seo = analysis.seo.unwrap();

        // only the page size check passes
        assert_eq!(seo.score, 10);
        assert!(seo.recommendations.contains(&"Add a descriptive page title".to_string()));
        assert!(seo.recommendations.contains(&"Use only one H1 tag per page".to_string()));
        assert!(seo.recommendations.contains(&"Serve the page over HTTPS".to_string()));
        assert!(analysis.accessibility.contains(&"1 images missing alt text".to_string()));
        assert!(analysis.technical.contains(&"No compression reported".to_string()));
    }

    #[test]
    fn pages_without_images_pass_the_alt_check() {
        let report = seo_report(
            &page("https://example.com", "<p>x</p>"),
            &PageMetadata::default(),
            &HtmlStructure::default(),
            &[],
            false,
        );
        // alt text, page size and https
        assert_eq!(report.score, 30);
    }

    #[test]
    fn non_html_is_rejected() {
        let mut json = page("https://api.example.com", "{}");
        json.content_type = "application/json".to_string();
        assert!(matches!(
            analyze(&json, true),
            Err(WebError::NotHtml { content_type }) if content_type == "application/json"
        ));
    }

    #[test]
    fn seo_can_be_skipped() {
        let analysis = analyze(&page("https://example.com", &well_formed()), false).unwrap();
        assert!(analysis.seo.is_none());
    }
}

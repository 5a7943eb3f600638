//! Markdown rendering of web tool results.

use crate::render::{format_bytes, percent, preview};

use super::download::DownloadResult;
use super::page::PageAnalysis;
use super::tool::{FetchReport, SearchReport};

pub const TEXT_PREVIEW_CHARS: usize = 3000;
const DESCRIPTION_PREVIEW_CHARS: usize = 200;

fn bullets(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!("\n**{}:**\n", title);
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
    out
}

pub fn fetch(report: &FetchReport) -> String {
    let page = &report.page;
    let mut out = format!("## Web Content: `{}`\n\n", page.url);
    out.push_str(&format!("- **Status:** {}\n", page.status));
    out.push_str(&format!(
        "- **Content Type:** {}\n",
        if page.content_type.is_empty() {
            "unknown"
        } else {
            &page.content_type
        }
    ));
    out.push_str(&format!("- **Size:** {}\n", format_bytes(page.size)));
    if page.from_cache {
        out.push_str("- **Source:** cache\n");
    } else {
        out.push_str(&format!(
            "- **Fetch Time:** {:.2}s\n",
            page.elapsed.as_secs_f64()
        ));
    }
    if page.redirected() {
        out.push_str(&format!("- **Redirected to:** {}\n", page.final_url));
    }

    if let Some(meta) = &report.metadata {
        out.push_str("\n**Page Metadata:**\n");
        if let Some(title) = &meta.title {
            out.push_str(&format!("- Title: {}\n", title));
        }
        if let Some(description) = &meta.description {
            out.push_str(&format!(
                "- Description: {}\n",
                preview(description, DESCRIPTION_PREVIEW_CHARS)
            ));
        }
        if !meta.keywords.is_empty() {
            let keywords: Vec<&str> = meta.keywords.iter().take(10).map(String::as_str).collect();
            out.push_str(&format!("- Keywords: {}\n", keywords.join(", ")));
        }
        if let Some(author) = &meta.author {
            out.push_str(&format!("- Author: {}\n", author));
        }
        if let Some(lang) = &meta.lang {
            out.push_str(&format!("- Language: {}\n", lang));
        }
    }

    out.push_str(&bullets("Content Analysis", &report.insights));

    if let Some(text) = &report.text {
        let total = text.chars().count();
        out.push_str("\n**Extracted Content:**\n```\n");
        out.push_str(&preview(text, TEXT_PREVIEW_CHARS));
        out.push_str("\n```\n");
        if total > TEXT_PREVIEW_CHARS {
            out.push_str(&format!(
                "_Truncated to {} of {} characters._\n",
                TEXT_PREVIEW_CHARS, total
            ));
        }
        out.push_str(&bullets("Content Insights", &report.text_insights));
    }

    if let Some(saved) = &report.saved {
        out.push_str(&format!("\n**Saved Content:** `{}`\n", saved.display()));
    }
    out.push_str(&bullets("Suggested Actions", &report.suggestions));
    out.trim_end().to_string()
}

pub fn search(report: &SearchReport, include_snippets: bool) -> String {
    if report.hits.is_empty() {
        return format!(
            "No results found for '{}' using {}.\n\nTry different keywords or another search engine.",
            report.query, report.engine
        );
    }

    let mut out = format!(
        "## Web Search: '{}'\n\n- **Engine:** {}\n- **Found:** {} results in {:.2}s\n\n",
        report.query,
        report.engine,
        report.hits.len(),
        report.elapsed.as_secs_f64()
    );
    for (i, hit) in report.hits.iter().enumerate() {
        out.push_str(&format!("**{}. {}**\n{}\n", i + 1, hit.title, hit.url));
        if include_snippets && !hit.snippet.is_empty() {
            out.push_str(&format!("> {}\n", hit.snippet));
        }
        out.push_str(&format!("Relevance: {:.1}\n\n", hit.relevance));
    }
    out.push_str(&bullets("Search Insights", &report.insights));
    out.push_str(&bullets("Related Searches", &report.related));
    out.trim_end().to_string()
}

pub fn analysis(
    analysis: &PageAnalysis,
    include_links: bool,
    include_images: bool,
    include_scripts: bool,
) -> String {
    let mut out = format!("## Webpage Analysis: `{}`\n\n", analysis.url);
    out.push_str(&format!("- **Status:** {}\n", analysis.status));
    out.push_str(&format!("- **Size:** {}\n", format_bytes(analysis.size)));
    out.push_str(&format!("- **Content Type:** {}\n", analysis.content_type));
    if let Some(title) = &analysis.metadata.title {
        out.push_str(&format!("- **Title:** {}\n", title));
    }
    if let Some(lang) = &analysis.metadata.lang {
        out.push_str(&format!("- **Language:** {}\n", lang));
    }

    let s = &analysis.structure;
    out.push_str(&format!(
        "\n**HTML Structure:**\n- Elements: {}\n- Text: {} characters, {} words\n\
         - Headings: {} (H1: {})\n- Paragraphs: {}\n- Forms: {}\n- Tables: {}\n- Lists: {}\n",
        s.total_elements,
        s.text_length,
        s.word_count,
        s.headings,
        s.h1,
        s.paragraphs,
        s.forms,
        s.tables,
        s.lists
    ));

    if include_links {
        let l = &analysis.links;
        out.push_str(&format!(
            "\n**Links:**\n- Total: {}\n- Internal: {}\n- External: {}\n- Email: {}\n",
            l.total,
            l.internal.len(),
            l.external.len(),
            l.mailto.len()
        ));
        let domains = l.top_domains(5);
        if !domains.is_empty() {
            out.push_str("- Top external domains:\n");
            for (domain, count) in domains {
                out.push_str(&format!("  - {}: {} links\n", domain, count));
            }
        }
    }

    if include_images && !analysis.images.is_empty() {
        let with_alt = analysis.images_with_alt();
        out.push_str(&format!(
            "\n**Images:**\n- Total: {}\n- With alt text: {} ({:.1}%)\n",
            analysis.images.len(),
            with_alt,
            percent(with_alt, analysis.images.len())
        ));
    }

    if include_scripts {
        let r = &analysis.resources;
        out.push_str(&format!(
            "\n**Scripts & Resources:**\n- Script tags: {}\n- External scripts: {}\n\
             - Inline scripts: {}\n- Stylesheets: {}\n",
            r.script_tags,
            r.external_scripts.len(),
            r.inline_scripts,
            r.stylesheets.len()
        ));
    }

    if let Some(seo) = &analysis.seo {
        out.push_str(&format!("\n**SEO Score:** {}/100\n", seo.score));
        for factor in &seo.factors {
            out.push_str(&format!(
                "- {} {}: {}\n",
                factor.status.marker(),
                factor.name,
                factor.message
            ));
        }
        out.push_str(&bullets("SEO Recommendations", &seo.recommendations));
    }

    out.push_str(&bullets("Technical", &analysis.technical));
    out.push_str(&bullets("Performance", &analysis.performance));
    out.push_str(&bullets("Accessibility", &analysis.accessibility));
    out.trim_end().to_string()
}

pub fn download(result: &DownloadResult) -> String {
    let mut out = format!(
        "## File Downloaded\n\n- **Source:** {}\n- **Saved to:** `{}`\n- **Size:** {}\n\
         - **Time:** {:.2}s\n- **Speed:** {}/s\n- **Type:** {}\n",
        result.url,
        result.path.display(),
        format_bytes(result.size),
        result.elapsed.as_secs_f64(),
        format_bytes(result.bytes_per_second() as u64),
        result.file_type
    );
    if let Some(ct) = &result.content_type {
        out.push_str(&format!("- **Content Type:** {}\n", ct));
    }
    out.push_str(&bullets("File Notes", &result.notes));
    out.push_str(&bullets("Security Notes", &result.security));
    out.push_str(&bullets("Usage Suggestions", &result.suggestions));
    out.trim_end().to_string()
}

//! Markdown rendering of memory store results.

use crate::db::CategoryStats;
use crate::render::{format_tags, percent, preview, title_case};

use super::scoring::category_weight;
use super::store::{Insights, Recalled, SearchOutcome, SearchRequest, Stored, Synthesis};

pub fn stored(result: &Stored) -> String {
    let memory = &result.memory;
    let mut lines = vec![
        "## Memory Stored".to_string(),
        String::new(),
        format!("- **Key:** `{}`", memory.key),
        format!("- **Category:** {}", memory.category),
        format!("- **Importance:** {:.2}/1.0", memory.importance),
        format!("- **Concepts Extracted:** {}", memory.concepts.len()),
    ];

    if !memory.tags.is_empty() {
        lines.push(format!("- **Tags:** {}", format_tags(&memory.tags)));
    }

    if !memory.concepts.is_empty() {
        let more = if memory.concepts.len() > 5 { "..." } else { "" };
        lines.push(format!(
            "- **Key Concepts:** {}{}",
            memory.concepts[..memory.concepts.len().min(5)].join(", "),
            more
        ));
    }

    if !result.related.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "### Related Memories Found: {}",
            result.related.len()
        ));
        for related in result.related.iter().take(3) {
            lines.push(format!("- `{}`: {}", related.key, related.preview));
        }
    }

    lines.push(String::new());
    lines.push("Memory is now persistent across sessions and searchable.".to_string());
    lines.join("\n")
}

pub fn search(request: &SearchRequest, outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::NoCandidates => format!(
            "No memories found matching the category/importance filters for query: '{}'",
            request.query
        ),
        SearchOutcome::NoMatches => format!(
            "No sufficiently relevant memories found for query: '{}'\n\n\
             Try different keywords or check available categories with bb7_memory_list_categories.",
            request.query
        ),
        SearchOutcome::Found {
            query_concepts,
            hits,
            scored,
            candidates,
        } => {
            let concepts = if query_concepts.is_empty() {
                "N/A".to_string()
            } else {
                query_concepts.join(", ")
            };
            let mut lines = vec![
                "## Memory Search Results".to_string(),
                String::new(),
                format!("**Query:** '{}' (concepts: {})", request.query, concepts),
                format!(
                    "**Results:** {} of {} requested (from {} scored, {} candidates)",
                    hits.len(),
                    request.limit,
                    scored,
                    candidates
                ),
                String::new(),
            ];

            let preview_len = if request.include_context { 200 } else { 150 };
            for (i, hit) in hits.iter().enumerate() {
                let memory = &hit.memory;
                lines.push(format!("### {}. {}", i + 1, memory.key));
                lines.push(format!(
                    "Relevance: {:.2} | Category: {} | Importance: {:.2} | Accessed: {} times",
                    hit.score, memory.category, memory.importance, memory.access_count
                ));
                lines.push(format!("Content: {}", preview(&memory.content, preview_len)));
                if !memory.tags.is_empty() {
                    lines.push(format!("Tags: {}", format_tags(&memory.tags)));
                }
                if request.include_context
                    && let Some(context) = &memory.context
                {
                    lines.push(format!("Context: {}", preview(context, 100)));
                }
                lines.push(String::new());
            }
            lines.join("\n")
        }
    }
}

pub fn recall_missing(key: &str) -> String {
    format!(
        "Memory '{}' not found.\n\nUse bb7_memory_search to find memories by content or bb7_memory_list_categories.",
        key
    )
}

pub fn recall(result: &Recalled) -> String {
    let memory = &result.memory;
    let mut lines = vec![
        format!("## Memory Recall: {}", memory.key),
        String::new(),
        format!("- **Category:** {}", memory.category),
        format!("- **Importance:** {:.2}/1.0", memory.importance),
        format!("- **Access Count:** {}", memory.access_count),
        format!("- **Created:** {}", memory.created_at),
        format!("- **Updated:** {}", memory.updated_at),
    ];
    if let Some(project) = &memory.project_context {
        lines.push(format!("- **Project:** {}", project));
    }
    if !memory.tags.is_empty() {
        lines.push(format!("- **Tags:** {}", format_tags(&memory.tags)));
    }

    lines.push(String::new());
    lines.push("### Content".to_string());
    lines.push(memory.content.clone());

    if let Some(context) = &memory.context {
        lines.push(String::new());
        lines.push("### Context".to_string());
        lines.push(context.clone());
    }

    if !memory.concepts.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "**Key Concepts:** {}",
            memory.concepts[..memory.concepts.len().min(10)].join(", ")
        ));
    }

    if !result.related.is_empty() {
        lines.push(String::new());
        lines.push(format!("### Related Memories ({})", result.related.len()));
        for related in result.related.iter().take(5) {
            lines.push(format!("- `{}` ({:.2})", related.key, related.importance));
            lines.push(format!("  {}", related.preview));
        }
    }

    lines.join("\n")
}

pub fn synthesis(topic: &str, result: &Synthesis, include_cross_project: bool) -> String {
    let report = match result {
        Synthesis::Incomplete { found, needed } => {
            return format!(
                "## Synthesis Incomplete\n\nFound only {} memories related to '{}', need at least {}.\n\n\
                 Try a broader topic or add more memories with bb7_memory_store.",
                found, topic, needed
            );
        }
        Synthesis::Complete(report) => report,
    };

    let total = report.memories.len();
    let mut lines = vec![
        format!("## Memory Synthesis: {}", topic),
        String::new(),
        format!("- **Related memories analyzed:** {}", total),
        format!("- **Average importance:** {:.2}/1.0", report.avg_importance),
    ];
    if include_cross_project {
        lines.push(format!("- **Project span:** {} different projects", report.projects));
    }

    lines.push(String::new());
    lines.push("### Key Categories".to_string());
    for (category, count) in &report.categories {
        lines.push(format!(
            "- {}: {} memories ({:.1}%)",
            category,
            count,
            percent(*count, total)
        ));
    }

    lines.push(String::new());
    lines.push("### Dominant Concepts".to_string());
    for (concept, count) in &report.top_concepts {
        lines.push(format!("- {}: {} occurrences", concept, count));
    }

    lines.push(String::new());
    lines.push("### Concept Co-occurrences".to_string());
    if report.co_occurrences.is_empty() {
        lines.push("- No concept pairs appear together in more than one memory.".to_string());
    } else {
        for ((first, second), count) in &report.co_occurrences {
            lines.push(format!(
                "- '{}' & '{}': together in {} memories",
                first, second, count
            ));
        }
    }

    lines.push(String::new());
    lines.push("### Patterns".to_string());
    if report.high_impact > 0 {
        lines.push(format!(
            "- {} high-impact insights identified for '{}'.",
            report.high_impact, topic
        ));
    } else {
        lines.push(format!(
            "- No high-impact (>0.7) memories found for '{}'.",
            topic
        ));
    }

    let mut recommendations = Vec::new();
    if report.avg_importance > 0.7 {
        recommendations.push(format!(
            "- '{}' shows high strategic importance across stored knowledge.",
            topic
        ));
    }
    if include_cross_project && report.projects > 1 {
        recommendations.push(format!(
            "- Patterns for '{}' span multiple projects; consider sharing a unified approach.",
            topic
        ));
    }
    if report.co_occurrences.is_empty() && total > 5 {
        recommendations.push(format!(
            "- Concepts around '{}' are diverse but weakly linked; explore connections.",
            topic
        ));
    }
    if !recommendations.is_empty() {
        lines.push(String::new());
        lines.push("### Recommendations".to_string());
        lines.extend(recommendations);
    }

    lines.join("\n")
}

pub fn categories(total: i64, categories: &[CategoryStats], include_stats: bool) -> String {
    if categories.is_empty() {
        return "No memories found.\n\nCreate your first memory with bb7_memory_store.".to_string();
    }

    let mut lines = vec![
        "## Memory Categories".to_string(),
        String::new(),
        format!("- **Total Memories:** {}", total),
        format!("- **Categories Used:** {}", categories.len()),
        String::new(),
    ];

    for stats in categories {
        lines.push(format!("### {}", title_case(&stats.category)));
        lines.push(format!(
            "- Count: {} ({:.1}%)",
            stats.count,
            percent(stats.count as usize, total as usize)
        ));
        if include_stats {
            lines.push(format!("- Avg Importance: {:.2}/1.0", stats.avg_importance));
            if let Some(weight) = category_weight(&stats.category) {
                lines.push(format!("- Category Weight: {:.2}", weight));
            }
            lines.push(format!(
                "- Last Updated: {}",
                stats.last_updated.as_deref().unwrap_or("-")
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

pub fn insights(report: &Insights) -> String {
    let stats = &report.stats;
    if stats.total == 0 {
        return "No memories to analyze.\n\nStart building your knowledge base with bb7_memory_store."
            .to_string();
    }
    let total = stats.total as usize;

    let mut lines = vec![
        "## Memory System Insights".to_string(),
        String::new(),
        format!("- **Total Memories:** {}", stats.total),
        format!("- **Average Importance:** {:.2}", stats.avg_importance),
        format!("- **Total Accesses:** {}", stats.total_accesses),
        String::new(),
        "### Knowledge Quality Distribution".to_string(),
        format!(
            "- High impact (>=0.8): {} ({:.1}%)",
            stats.high,
            percent(stats.high as usize, total)
        ),
        format!(
            "- Medium impact (0.5-0.8): {} ({:.1}%)",
            stats.medium,
            percent(stats.medium as usize, total)
        ),
        format!(
            "- Low impact (<0.5): {} ({:.1}%)",
            stats.low,
            percent(stats.low as usize, total)
        ),
        String::new(),
        "### Intelligence Insights".to_string(),
    ];

    let high_share = percent(stats.high as usize, total);
    if high_share > 30.0 {
        lines.push(format!(
            "- Strong foundation: {:.0}% of memories are high-impact.",
            high_share
        ));
    } else {
        lines.push(format!(
            "- Consider capturing more high-impact memories (currently {:.0}%).",
            high_share
        ));
    }

    lines.push(String::new());
    if report.most_accessed.is_empty() {
        lines.push("### Most Accessed\n- None accessed yet.".to_string());
    } else {
        lines.push(format!("### Most Accessed (Top {})", report.most_accessed.len()));
        for memory in &report.most_accessed {
            lines.push(format!(
                "- `{}` (accessed {} times): {}",
                memory.key,
                memory.access_count,
                preview(&memory.content, 50)
            ));
        }
    }

    lines.push(String::new());
    if report.prolific_concepts.is_empty() {
        lines.push("### Prolific Concepts\n- No high-importance memories with concepts.".to_string());
    } else {
        lines.push(format!(
            "### Prolific Concepts in High-Importance Memories (Top {})",
            report.prolific_concepts.len()
        ));
        for (concept, count) in &report.prolific_concepts {
            lines.push(format!("- '{}': {} memories", concept, count));
        }
    }

    if !report.common_concepts.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "### Most Common Concepts (Top {})",
            report.common_concepts.len()
        ));
        for (concept, count) in &report.common_concepts {
            lines.push(format!("- '{}': {} memories", concept, count));
        }
    }

    if !report.categories.is_empty() {
        lines.push(String::new());
        lines.push("### Category Spread".to_string());
        for stats in &report.categories {
            lines.push(format!("- {}: {}", stats.category, stats.count));
        }
    }

    lines.join("\n")
}

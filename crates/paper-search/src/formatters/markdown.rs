//! Markdown output formatting.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::models::{Paper, SearchResult, Source};

/// Characters of abstract shown per paper.
const ABSTRACT_PREVIEW: usize = 300;

/// Format a search result, including the echoed query, as Markdown.
#[must_use]
pub fn format_search_result(result: &SearchResult) -> String {
    if result.is_empty() {
        return format!("No papers found for \"{}\".", result.query);
    }

    let mut output = format!("# Results for \"{}\" ({} papers)\n\n", result.query, result.total);
    output.push_str(&format_paper_list(&result.papers));
    output
}

fn format_paper_list(papers: &[Paper]) -> String {
    let mut output = String::new();
    for (i, paper) in papers.iter().enumerate() {
        output.push_str(&format_paper_markdown(paper, i + 1));
        output.push_str("\n---\n\n");
    }
    output
}

/// Format a single paper as Markdown.
#[must_use]
pub fn format_paper_markdown(paper: &Paper, index: usize) -> String {
    let mut output = String::new();

    let _ = write!(output, "## {index}. {}\n\n", paper.title);

    if !paper.authors.is_empty() {
        let _ = write!(output, "**Authors**: {}\n\n", paper.author_names());
    }

    let mut meta = Vec::new();
    if paper.has_year() {
        meta.push(format!("**Year**: {}", paper.year));
    }
    meta.push(format!("**Citations**: {}", paper.citation_count));
    if let Some(venue) = &paper.venue {
        meta.push(format!("**Venue**: {venue}"));
    }
    meta.push(format!("**Source**: {}", paper.source.display_name()));
    let _ = write!(output, "{}\n\n", meta.join(" | "));

    if !paper.fields.is_empty() {
        let _ = write!(output, "**Fields**: {}\n\n", paper.fields.join(", "));
    }

    let mut links = Vec::new();
    if let Some(doi) = paper.doi() {
        links.push(format!("[DOI](https://doi.org/{doi})"));
    }
    if let Some(arxiv) = &paper.identifiers.arxiv_id {
        if paper.source != Source::Arxiv {
            links.push(format!("[arXiv](https://arxiv.org/abs/{arxiv})"));
        }
    }
    if let Some(url) = &paper.url {
        links.push(format!("[{}]({url})", paper.source.display_name()));
    }
    if !links.is_empty() {
        let _ = write!(output, "**Links**: {}\n\n", links.join(" | "));
    }

    if let Some(pdf_url) = &paper.pdf_url {
        let _ = write!(output, "**PDF**: [Open Access]({pdf_url})\n\n");
    }

    let _ = writeln!(output, "**Abstract**: {}", preview(&paper.r#abstract));

    output
}

/// Truncate on a character boundary.
fn preview(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(ABSTRACT_PREVIEW) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}

/// Format the source catalogue as Markdown.
#[must_use]
pub fn format_sources_markdown(sources: &[(Source, bool)]) -> String {
    let mut output = String::from("# Sources\n\n| Source | Id | Default | Credentials |\n|---|---|---|---|\n");
    for (source, configured) in sources {
        let default = if source.requires_credentials() { "no" } else { "yes" };
        let credentials = match (source.requires_credentials(), configured) {
            (false, _) => "not required",
            (true, true) => "configured",
            (true, false) => "missing",
        };
        let _ = writeln!(
            output,
            "| {} | `{}` | {default} | {credentials} |",
            source.display_name(),
            source.as_str()
        );
    }
    output
}

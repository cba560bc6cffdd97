use std::fmt::Write;
use std::path::Path;

use crate::NewItem;

/// Link base for PubMed records; the identifier is appended after a `/`.
pub const PUBMED_LINK_BASE: &str = "https://www.ncbi.nlm.nih.gov/pubmed";
/// Column at which abstracts are wrapped.
pub const WRAP_WIDTH: usize = 80;
/// Rendered in place of a missing abstract.
pub const ABSTRACT_PLACEHOLDER: &str = "No abstract.";

/// New items found for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestSection {
    pub query: String,
    pub items: Vec<NewItem>,
}

impl DigestSection {
    pub fn new(query: impl Into<String>, items: Vec<NewItem>) -> Self {
        Self {
            query: query.into(),
            items,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DigestOptions {
    pub link_base: String,
    pub wrap_width: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            link_base: PUBMED_LINK_BASE.to_string(),
            wrap_width: WRAP_WIDTH,
        }
    }
}

/// Renders the Markdown digest, or `None` when no section has any item.
///
/// Sections are emitted in input order, each under its own heading, so the
/// output is byte-identical for identical input.
pub fn render_digest(sections: &[DigestSection], options: &DigestOptions) -> Option<String> {
    if sections.iter().all(|section| section.items.is_empty()) {
        return None;
    }

    let base = options.link_base.trim_end_matches('/');
    let mut text = String::new();
    for section in sections {
        let _ = write!(text, "# {}\n\n", section.query);
        for item in &section.items {
            let meta = &item.metadata;
            let _ = write!(
                text,
                "## {title}\n\n{authors}, *{venue}*, {year}\n\n[PMID: {id}]({base}/{id})\n\n{abstract_text}\n\n",
                title = meta.title,
                authors = meta.authors.join(", "),
                venue = meta.venue,
                year = meta.year.as_deref().unwrap_or("n.d."),
                id = item.id,
                base = base,
                abstract_text = render_abstract(meta.abstract_text.as_deref(), options.wrap_width),
            );
        }
    }
    Some(text)
}

/// Appends a note pointing at the log directory after a run with recoverable errors.
pub fn annotate_with_errors(mut digest: String, log_dir: &Path) -> String {
    let _ = writeln!(
        digest,
        "> Some queries or records could not be fetched during this run. See the log in `{}`.",
        log_dir.display()
    );
    digest
}

fn render_abstract(text: Option<&str>, width: usize) -> String {
    match text.map(str::trim) {
        None | Some("") | Some("None") => ABSTRACT_PLACEHOLDER.to_string(),
        Some(text) => {
            // Treat embedded line breaks and tabs as plain spaces before wrapping.
            let flat: String = text
                .chars()
                .map(|c| if c.is_whitespace() { ' ' } else { c })
                .collect();
            textwrap::wrap(&flat, width).join("\n")
        }
    }
}

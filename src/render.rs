use crate::agent::context::truncate_chars;
use crate::search::SearchResult;
use crate::session::HistoryEntry;

const PREVIEW_CHARS: usize = 200;

pub fn render_sources(sources: &[SearchResult]) -> String {
    let mut out = String::new();
    for (j, source) in sources.iter().enumerate() {
        out.push_str(&format!("[{}] {}\n", j + 1, source.title));
        if !source.url.is_empty() {
            out.push_str(&format!("Link: {}\n", source.url));
        }
        if !source.content.is_empty() {
            out.push_str(&format!(
                "{}...\n",
                truncate_chars(&source.content, PREVIEW_CHARS)
            ));
        }
        out.push_str("---\n");
    }
    out
}

pub fn render_entry(entry: &HistoryEntry) -> String {
    let mut out = format!("> {}\n\n{}\n", entry.question, entry.answer.text);
    if !entry.answer.sources.is_empty() {
        out.push_str("\nSources:\n");
        out.push_str(&render_sources(&entry.answer.sources));
    }
    out
}

/// Oldest turn first.
pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No questions asked yet.\n".to_string();
    }
    entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

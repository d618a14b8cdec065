use crate::search::{SearchResult, DEFAULT_TITLE};

/// Per-source character budget for the text sent to the model.
pub const SNIPPET_CHARS: usize = 800;

/// A search result as it appears in the prompt: labeled and truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextItem {
    pub index: usize,
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl ContextItem {
    pub fn from_result(index: usize, result: &SearchResult) -> Self {
        let title = match result.title.trim() {
            "" => DEFAULT_TITLE.to_string(),
            t => t.to_string(),
        };
        let collapsed = collapse_newlines(&result.content);

        Self {
            index,
            title,
            url: result.url.trim().to_string(),
            snippet: truncate_chars(collapsed.trim(), SNIPPET_CHARS).to_string(),
        }
    }

    fn render(&self) -> String {
        format!(
            "[{}] {}\nURL: {}\n{}\n",
            self.index, self.title, self.url, self.snippet
        )
    }
}

/// Labels results 1..=N in the order given.
pub fn context_items(results: &[SearchResult]) -> Vec<ContextItem> {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| ContextItem::from_result(i + 1, r))
        .collect()
}

/// Renders the context block handed to the prompt. Callers must not pass an
/// empty slice.
pub fn build_context(results: &[SearchResult]) -> String {
    context_items(results)
        .iter()
        .map(ContextItem::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Each line break (`\r\n`, `\n` or `\r`) becomes one space.
fn collapse_newlines(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

//! Markdown rendering for chat messages.

use crate::gemini::types::{GenerateContentResponse, GroundingChunk};

/// Display block for an answer: surrounded by blank lines, closed by a horizontal rule.
pub fn format_answer(answer: &str) -> String {
    format!("\n{answer}\n\n---\n")
}

/// Numbered `[title](uri)` list of the response's web sources.
///
/// Numbers follow chunk positions so they line up with the inline citation
/// markers. `None` when there is nothing to list.
pub fn render_sources(response: &GenerateContentResponse) -> Option<String> {
    let chunks = response.grounding_metadata()?.chunks();

    let entries: Vec<String> = chunks
        .iter()
        .enumerate()
        .filter_map(|(i, chunk)| source_entry(i + 1, chunk))
        .collect();

    if entries.is_empty() {
        return None;
    }
    Some(format!("\n### 📚 Sources\n{}\n", entries.join("\n")))
}

fn source_entry(number: usize, chunk: &GroundingChunk) -> Option<String> {
    let uri = chunk.uri()?;
    let title = chunk
        .web
        .as_ref()
        .and_then(|w| w.title.as_deref())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(uri);
    Some(format!("**[{number}]** [{}]({uri})", escape_md_link(title)))
}

pub fn greeting(model: &str) -> String {
    format!("\n### 🤖 Gemini Chatbot ({})\n", sanitize_heading(model))
}

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
pub(crate) fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '[' | ']' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Sanitize text for embedding in a Markdown heading.
/// Replaces newlines (which would break heading structure) with spaces.
pub(crate) fn sanitize_heading(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

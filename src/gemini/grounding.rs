//! Inline citation markers for grounded answers.
//!
//! Gemini reports which spans of the answer are backed by which search results
//! ("supports" pointing into a list of "chunks"). Markers are spliced in at the
//! end of each supported span. Splicing is best-effort: anything missing or
//! malformed in the metadata leaves the answer text as it was.

use tracing::debug;

use super::types::{GenerateContentResponse, GroundingChunk, GroundingSupport};

pub const NO_TEXT_PLACEHOLDER: &str = "No response text.";

/// Trimmed answer text with `[n](uri)` markers spliced in after each grounded segment.
pub fn add_citations(response: &GenerateContentResponse) -> String {
    let Some(text) = response.text() else {
        debug!("response carried no text");
        return NO_TEXT_PLACEHOLDER.to_string();
    };
    let text = text.trim();

    match response.grounding_metadata() {
        Some(metadata) => splice_citations(text, metadata.supports(), metadata.chunks()),
        None => text.to_string(),
    }
}

/// Inserts `" [i+1](uri), ..."` at each support's `end_index`.
///
/// Offsets are UTF-8 byte offsets into `text`. Supports are applied from the
/// highest offset down, so each insertion only touches text past every offset
/// still to be processed. Supports sharing an offset keep their original order.
///
/// Not idempotent: splicing the output again with the same supports would
/// use offsets that no longer match the text.
pub fn splice_citations(
    text: &str,
    supports: &[GroundingSupport],
    chunks: &[GroundingChunk],
) -> String {
    let mut out = text.to_string();
    if supports.is_empty() || chunks.is_empty() {
        return out;
    }

    let mut ordered: Vec<(usize, usize, &GroundingSupport)> = supports
        .iter()
        .enumerate()
        .filter_map(|(pos, support)| Some((insertion_point(text, support)?, pos, support)))
        .collect();
    // Descending offset; descending position within a tie, so the earlier support ends up first.
    ordered.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut inserted = 0;
    for (at, _, support) in ordered {
        let markers = citation_markers(support, chunks);
        if markers.is_empty() {
            continue;
        }
        out.insert_str(at, &format!(" {}", markers.join(", ")));
        inserted += 1;
    }

    debug!(
        supports = supports.len(),
        chunks = chunks.len(),
        inserted,
        "citations spliced"
    );
    out
}

/// Byte position in `text` for a support's markers, clamped to the text and
/// moved back onto a char boundary. `None` when the support has no usable offset.
fn insertion_point(text: &str, support: &GroundingSupport) -> Option<usize> {
    let end = usize::try_from(support.end_index()?).ok()?;
    Some(text.floor_char_boundary(end.min(text.len())))
}

fn citation_markers(support: &GroundingSupport, chunks: &[GroundingChunk]) -> Vec<String> {
    support
        .chunk_indices()
        .iter()
        .filter_map(|&idx| {
            let idx = usize::try_from(idx).ok()?;
            let uri = chunks.get(idx)?.uri()?;
            Some(format!("[{}]({uri})", idx + 1))
        })
        .collect()
}

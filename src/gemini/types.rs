use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub tools: Vec<Tool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set on reasoning parts, which are not part of the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub error: Option<ApiError>,
}

impl GenerateContentResponse {
    fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.as_ref().and_then(|c| c.first())
    }

    /// Answer text of the first candidate: every non-thought text part, concatenated.
    /// `None` when the candidate carries no text at all.
    pub fn text(&self) -> Option<String> {
        let parts = &self.first_candidate()?.content.as_ref()?.parts;
        let mut texts = parts
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .peekable();
        texts.peek()?;
        Some(texts.collect())
    }

    pub fn grounding_metadata(&self) -> Option<&GroundingMetadata> {
        self.first_candidate()?.grounding_metadata.as_ref()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    pub grounding_supports: Option<Vec<GroundingSupport>>,
    pub grounding_chunks: Option<Vec<GroundingChunk>>,
}

impl GroundingMetadata {
    pub fn supports(&self) -> &[GroundingSupport] {
        self.grounding_supports.as_deref().unwrap_or_default()
    }

    pub fn chunks(&self) -> &[GroundingChunk] {
        self.grounding_chunks.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingSupport {
    pub segment: Option<Segment>,
    pub grounding_chunk_indices: Option<Vec<i64>>,
}

impl GroundingSupport {
    pub fn end_index(&self) -> Option<i64> {
        self.segment.as_ref()?.end_index
    }

    pub fn chunk_indices(&self) -> &[i64] {
        self.grounding_chunk_indices.as_deref().unwrap_or_default()
    }
}

/// Span of the answer a support refers to. Offsets are UTF-8 byte offsets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub end_index: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GroundingChunk {
    pub web: Option<WebChunk>,
}

impl GroundingChunk {
    /// The chunk's web URI, if it has a non-empty one.
    pub fn uri(&self) -> Option<&str> {
        self.web
            .as_ref()?
            .uri
            .as_deref()
            .filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub struct WebChunk {
    pub uri: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: Option<u16>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_joins_parts_and_skips_thoughts() {
        let response = parse(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "thinking...", "thought": true},
                        {"text": "Hello, "},
                        {"text": "world."}
                    ],
                    "role": "model"
                }
            }]
        }));

        assert_eq!(response.text().as_deref(), Some("Hello, world."));
    }

    #[test]
    fn text_absent_without_text_parts() {
        let response = parse(serde_json::json!({
            "candidates": [{"content": {"parts": [{"thought": true, "text": "x"}]}}]
        }));
        assert!(response.text().is_none());

        let response = parse(serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]}));
        assert!(response.text().is_none());

        let response = parse(serde_json::json!({}));
        assert!(response.text().is_none());
    }

    #[test]
    fn parses_grounding_supports() {
        let response = parse(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Answer"}]},
                "groundingMetadata": {
                    "webSearchQueries": ["answer"],
                    "groundingSupports": [{
                        "segment": {"startIndex": 0, "endIndex": 6, "text": "Answer"},
                        "groundingChunkIndices": [0, 1],
                        "confidenceScores": [0.9, 0.5]
                    }],
                    "groundingChunks": [
                        {"web": {"uri": "https://a.com", "title": "A"}},
                        {"retrievedContext": {"uri": "gs://bucket/doc"}}
                    ]
                }
            }]
        }));

        let metadata = response.grounding_metadata().unwrap();
        assert_eq!(metadata.supports().len(), 1);
        assert_eq!(metadata.supports()[0].end_index(), Some(6));
        assert_eq!(metadata.supports()[0].chunk_indices(), &[0, 1]);
        assert_eq!(metadata.chunks()[0].uri(), Some("https://a.com"));
        assert!(metadata.chunks()[1].web.is_none());
    }

    #[test]
    fn missing_collections_read_as_empty() {
        let metadata = GroundingMetadata::default();
        assert!(metadata.supports().is_empty());
        assert!(metadata.chunks().is_empty());
    }

    #[test]
    fn request_serializes_google_search_tool() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text("hi")],
                role: None,
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "contents": [{"parts": [{"text": "hi"}]}],
                "tools": [{"google_search": {}}]
            })
        );
    }
}

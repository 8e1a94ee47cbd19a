//! Gemini `generateContent` with Google Search grounding, and citation splicing.

pub(crate) mod client;
pub(crate) mod grounding;
pub(crate) mod types;

//! The fixed five-section prompt vocabulary.
//!
//! Headers form a closed set; priority is positional (earlier = higher) and
//! never renegotiated. Each section renders through one wrapper format:
//!
//! ```text
//! ---
//! ## HEADER
//! content
//! ```
//!
//! with a trailing newline, so joining formatted sections with `"\n"` yields
//! a blank line between them.

use serde::{Deserialize, Serialize};

/// The fixed placeholder substituted when the memory section is refused by
/// the allocator. Small enough by design margin that it is re-emitted
/// without a second budget check.
pub const OMITTED_CONTEXT_PLACEHOLDER: &str = "[Memory context omitted due to budget constraints]";

/// The closed set of section headers, in no particular order — ordering
/// comes from the section list handed to the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionHeader {
    System,
    IdentitySnapshot,
    MoodState,
    RelevantMemory,
    CurrentRequest,
}

impl SectionHeader {
    /// The header line exactly as it appears in the rendered prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Self::System => "SYSTEM",
            Self::IdentitySnapshot => "IDENTITY SNAPSHOT",
            Self::MoodState => "MOOD STATE",
            Self::RelevantMemory => "RELEVANT MEMORY",
            Self::CurrentRequest => "CURRENT REQUEST",
        }
    }

    /// The budget component key: the lowercased header.
    pub fn component_key(&self) -> String {
        self.label().to_lowercase()
    }

    /// Whether a refused section is replaced by
    /// [`OMITTED_CONTEXT_PLACEHOLDER`] instead of being dropped. Only the
    /// memory section degrades this way; every other header is omitted
    /// entirely on refusal.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::RelevantMemory)
    }
}

impl std::fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One (header, content) fragment, transient within a single turn.
#[derive(Debug, Clone)]
pub struct Section {
    pub header: SectionHeader,
    pub content: String,
}

impl Section {
    pub fn new(header: SectionHeader, content: impl Into<String>) -> Self {
        Self {
            header,
            content: content.into(),
        }
    }

    /// Render this section through the fixed wrapper. Budget cost is always
    /// measured on this output, never on the raw content.
    pub fn formatted(&self) -> String {
        wrap(self.header, &self.content)
    }
}

/// The fixed wrapper: delimiter line, header line, content, trailing newline.
pub fn wrap(header: SectionHeader, content: &str) -> String {
    format!("---\n## {}\n{}\n", header.label(), content)
}

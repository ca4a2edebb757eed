//! Section assembly — the fixed-shape document builder.
//!
//! Walks an ordered section list, prices each fully formatted section
//! against the turn's [`BudgetAllocator`], and applies a per-header policy
//! on refusal: the memory section degrades to a placeholder, everything
//! else is omitted outright. Input order is always preserved; the assembler
//! never reorders, suspends, or calls out.
//!
//! The user's request is special-cased: its cost is reserved against the
//! fresh allocator before any other section is priced, so upstream sections
//! can never starve it out of the document. If the request alone exceeds
//! the whole ceiling it is truncated to fit rather than dropped — losing
//! the request silently would corrupt the turn with no signal.

use crate::section::{wrap, Section, SectionHeader, OMITTED_CONTEXT_PLACEHOLDER};
use crate::token;
use kindred_core::budget::BudgetAllocator;
use tracing::{debug, warn};

/// The assembled document plus what happened to each section on the way in.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    /// Retained formatted sections, original order, blank-line separated.
    pub text: String,
    /// Headers dropped entirely (non-degradable refusals).
    pub omitted: Vec<SectionHeader>,
    /// Headers re-emitted with a placeholder (degradable refusals).
    pub degraded: Vec<SectionHeader>,
    /// Whether the request content had to be cut down to fit the ceiling.
    pub request_truncated: bool,
}

/// Stateless section assembler. Create one and reuse it across turns.
#[derive(Debug, Default)]
pub struct SectionAssembler;

impl SectionAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Assemble `sections` into the final prompt, charging every retained
    /// section to `allocator`.
    pub fn assemble(
        &self,
        sections: &[Section],
        allocator: &mut BudgetAllocator,
    ) -> AssembledPrompt {
        let mut request_truncated = false;

        // Reserve the request before pricing anything else. The reservation
        // happens against the fresh allocator, so the only way it can fail
        // is a request bigger than the entire ceiling — truncate then.
        let mut reserved_request: Option<String> = sections
            .iter()
            .find(|s| s.header == SectionHeader::CurrentRequest)
            .map(|s| {
                let (formatted, truncated) = Self::reserve_request(s, allocator);
                request_truncated = truncated;
                formatted
            });

        let mut parts: Vec<String> = Vec::with_capacity(sections.len());
        let mut omitted = Vec::new();
        let mut degraded = Vec::new();

        for section in sections {
            if section.header == SectionHeader::CurrentRequest {
                if let Some(formatted) = reserved_request.take() {
                    parts.push(formatted);
                    continue;
                }
            }

            let formatted = section.formatted();
            let cost = token::estimate_tokens(&formatted);

            if allocator.allocate(&section.header.component_key(), cost) {
                parts.push(formatted);
            } else if section.header.is_degradable() {
                // Placeholder fits by design margin — re-emit unconditionally
                // so the document keeps its fixed shape.
                parts.push(wrap(section.header, OMITTED_CONTEXT_PLACEHOLDER));
                degraded.push(section.header);
            } else {
                debug!(header = %section.header, cost, "Section omitted by budget policy");
                omitted.push(section.header);
            }
        }

        AssembledPrompt {
            text: parts.join("\n"),
            omitted,
            degraded,
            request_truncated,
        }
    }

    /// Allocate the request section's formatted cost, truncating the content
    /// to the remaining capacity when even that first allocation is refused.
    /// Returns the formatted section and whether truncation happened.
    fn reserve_request(section: &Section, allocator: &mut BudgetAllocator) -> (String, bool) {
        let key = section.header.component_key();
        let formatted = section.formatted();
        let cost = token::estimate_tokens(&formatted);

        if allocator.allocate(&key, cost) {
            return (formatted, false);
        }

        // Oversized request: cut the content so wrapper + content costs at
        // most what is still available.
        let available = allocator.remaining();
        let wrapper_len = wrap(section.header, "").len();
        let content_budget = token::max_chars(available).saturating_sub(wrapper_len);

        let mut cut = content_budget.min(section.content.len());
        while cut > 0 && !section.content.is_char_boundary(cut) {
            cut -= 1;
        }
        let truncated = &section.content[..cut];

        warn!(
            original_len = section.content.len(),
            retained_len = cut,
            available,
            "Request content truncated to fit capacity ceiling"
        );

        let formatted = wrap(section.header, truncated);
        let cost = token::estimate_tokens(&formatted);
        // content_budget was derived from `available`, so this commits.
        allocator.allocate(&key, cost);
        (formatted, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_allocator(ceiling: usize) -> BudgetAllocator {
        // total × 1.0 − reserved keeps the arithmetic obvious in tests.
        BudgetAllocator::new(ceiling + 1000, 1000, 1.0).unwrap()
    }

    fn five_sections() -> Vec<Section> {
        vec![
            Section::new(SectionHeader::System, "Act as the kernel."),
            Section::new(SectionHeader::IdentitySnapshot, "Name: Wren\nRole: partner"),
            Section::new(SectionHeader::MoodState, "Calm and attentive."),
            Section::new(SectionHeader::RelevantMemory, "- user likes terse answers"),
            Section::new(SectionHeader::CurrentRequest, "Summarize my notes."),
        ]
    }

    #[test]
    fn generous_ceiling_keeps_all_five_in_order() {
        let mut alloc = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let prompt = SectionAssembler::new().assemble(&five_sections(), &mut alloc);

        let positions: Vec<usize> = [
            "## SYSTEM",
            "## IDENTITY SNAPSHOT",
            "## MOOD STATE",
            "## RELEVANT MEMORY",
            "## CURRENT REQUEST",
        ]
        .iter()
        .map(|h| prompt.text.find(h).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(prompt.omitted.is_empty());
        assert!(prompt.degraded.is_empty());
        assert!(!prompt.request_truncated);
    }

    #[test]
    fn sections_are_separated_by_a_blank_line() {
        let mut alloc = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let prompt = SectionAssembler::new().assemble(&five_sections(), &mut alloc);
        assert!(prompt.text.contains("Act as the kernel.\n\n---\n## IDENTITY SNAPSHOT"));
    }

    #[test]
    fn each_header_appears_exactly_once() {
        let mut alloc = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let prompt = SectionAssembler::new().assemble(&five_sections(), &mut alloc);
        for header in ["SYSTEM", "IDENTITY SNAPSHOT", "MOOD STATE", "RELEVANT MEMORY"] {
            assert_eq!(prompt.text.matches(&format!("## {header}")).count(), 1);
        }
    }

    #[test]
    fn refused_memory_degrades_to_placeholder() {
        // Ceiling sized so system + request fit but a fat memory section
        // does not.
        let mut alloc = tiny_allocator(1000);
        let sections = vec![
            Section::new(SectionHeader::System, "Act as the kernel."),
            Section::new(SectionHeader::RelevantMemory, "m".repeat(8000)),
            Section::new(SectionHeader::CurrentRequest, "Hi."),
        ];
        let prompt = SectionAssembler::new().assemble(&sections, &mut alloc);

        assert_eq!(prompt.degraded, vec![SectionHeader::RelevantMemory]);
        assert!(prompt.text.contains("## RELEVANT MEMORY"));
        assert!(prompt.text.contains(OMITTED_CONTEXT_PLACEHOLDER));
        assert!(!prompt.text.contains("mmmm"));
    }

    #[test]
    fn refused_non_degradable_header_is_absent() {
        let mut alloc = tiny_allocator(1000);
        let sections = vec![
            Section::new(SectionHeader::System, "Act as the kernel."),
            Section::new(SectionHeader::MoodState, "e".repeat(8000)),
            Section::new(SectionHeader::CurrentRequest, "Hi."),
        ];
        let prompt = SectionAssembler::new().assemble(&sections, &mut alloc);

        assert_eq!(prompt.omitted, vec![SectionHeader::MoodState]);
        assert!(!prompt.text.contains("## MOOD STATE"));
        // The surviving neighbors keep their relative order.
        let sys = prompt.text.find("## SYSTEM").unwrap();
        let req = prompt.text.find("## CURRENT REQUEST").unwrap();
        assert!(sys < req);
    }

    #[test]
    fn request_is_reserved_ahead_of_earlier_sections() {
        // Memory would fit on its own but leaves no room for the request;
        // the request is charged first and survives intact.
        let mut alloc = tiny_allocator(1000);
        let sections = vec![
            Section::new(SectionHeader::RelevantMemory, "m".repeat(3950)),
            Section::new(SectionHeader::CurrentRequest, "Please fix the roster."),
        ];
        let prompt = SectionAssembler::new().assemble(&sections, &mut alloc);

        assert!(prompt.text.contains("Please fix the roster."));
        assert!(!prompt.request_truncated);
        assert_eq!(prompt.degraded, vec![SectionHeader::RelevantMemory]);
    }

    #[test]
    fn oversized_request_is_truncated_not_dropped() {
        let mut alloc = tiny_allocator(1000); // 4000 chars of capacity
        let sections = vec![
            Section::new(SectionHeader::System, "Act as the kernel."),
            Section::new(SectionHeader::CurrentRequest, "r".repeat(20_000)),
        ];
        let prompt = SectionAssembler::new().assemble(&sections, &mut alloc);

        assert!(prompt.request_truncated);
        assert!(prompt.text.contains("## CURRENT REQUEST"));
        // Nothing was left for the system section.
        assert_eq!(prompt.omitted, vec![SectionHeader::System]);
        // The invariant held throughout.
        assert!(alloc.used() <= alloc.ceiling());
        assert_eq!(alloc.remaining(), alloc.ceiling() - alloc.used());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let mut alloc = tiny_allocator(1000);
        let sections = vec![Section::new(
            SectionHeader::CurrentRequest,
            "é".repeat(10_000),
        )];
        let prompt = SectionAssembler::new().assemble(&sections, &mut alloc);
        assert!(prompt.request_truncated);
        assert!(prompt.text.is_char_boundary(prompt.text.len()));
    }

    #[test]
    fn cost_is_charged_on_formatted_text_not_raw_content() {
        let mut alloc = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let section = Section::new(SectionHeader::System, "abcd");
        let formatted_cost = token::estimate_tokens(&section.formatted());
        assert!(formatted_cost > token::estimate_tokens("abcd"));

        SectionAssembler::new().assemble(&[section], &mut alloc);
        assert_eq!(alloc.used(), formatted_cost);
    }

    #[test]
    fn empty_section_list_produces_empty_text() {
        let mut alloc = BudgetAllocator::new(128000, 8000, 0.85).unwrap();
        let prompt = SectionAssembler::new().assemble(&[], &mut alloc);
        assert!(prompt.text.is_empty());
        assert_eq!(alloc.used(), 0);
    }
}

//! Mood → prompt injection text.
//!
//! Deterministic banded rendering: the same state always produces the same
//! text, so assembled prompts stay reproducible for a given input set.

use kindred_core::mood::MoodState;

/// Render `state` as the content of the mood section.
pub fn injection_text(state: &MoodState) -> String {
    let tone = match state.valence {
        v if v < -0.5 => "strained",
        v if v < -0.15 => "subdued",
        v if v <= 0.15 => "even-keeled",
        v if v <= 0.5 => "upbeat",
        _ => "bright",
    };

    let energy = match state.arousal {
        a if a < 0.25 => "low energy",
        a if a <= 0.6 => "steady energy",
        _ => "high energy",
    };

    let guidance = if state.valence < -0.15 {
        "Favor patience and shorter steps; acknowledge friction before advising."
    } else if state.stability < 0.4 {
        "Keep the pacing gentle; avoid abrupt topic shifts."
    } else {
        "Match the user's pace and keep the tone natural."
    };

    format!("Tone: {tone}, {energy}. {guidance}")
}

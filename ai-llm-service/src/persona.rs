//! The AskHer persona: system instruction, stateless prompt framing and the
//! fixed texts returned when the model cannot be reached.

use crate::config::llm_model_config::GenerationOptions;

pub const SYSTEM_PROMPT: &str = "You are AskHer, a supportive and empathetic AI companion designed to help women navigate life's challenges. \
Your responses should be: Warm and understanding, Non-judgmental, Encouraging of professional help when needed. \
CRITICAL: BRIEF: Aim for 1-5 sentences depending on the user's message, unless the user explicitly asks for more detail. \
CRITICAL: PLAIN TEXT: Respond in plain text only. Do NOT use any Markdown, bullet points, bolding, italics, or other special formatting. \
Remember to: Validate feelings, Offer gentle guidance, Maintain a supportive tone, Encourage self-care and self-compassion.";

/// Returned when the provider rejects our credentials or endpoint.
pub const CONFIG_FALLBACK: &str = "I apologize, but there seems to be an issue with the AI service configuration. Please make sure the API key is properly set up.";

/// Returned for every other generation failure.
pub const GENERIC_FALLBACK: &str = "I apologize, but I'm having trouble processing that right now. Could you try rephrasing your message?";

pub const STATELESS_TEMPERATURE: f32 = 0.7;
pub const STATELESS_MAX_OUTPUT_TOKENS: u32 = 200;
pub const STATELESS_STOP: &str = "\n*";

/// Single-shot prompt: persona, optional tone hint, then the user turn.
pub fn stateless_prompt(question: &str, tone: Option<&str>) -> String {
    let mut out = String::with_capacity(SYSTEM_PROMPT.len() + question.len() + 64);
    out.push_str(SYSTEM_PROMPT);
    if let Some(tone) = tone.map(str::trim).filter(|t| !t.is_empty()) {
        out.push_str("\n\nPreferred tone: ");
        out.push_str(tone);
    }
    out.push_str("\n\nUser: ");
    out.push_str(question);
    out.push_str("\n\nAI:");
    out
}

pub fn stateless_options() -> GenerationOptions {
    GenerationOptions {
        temperature: Some(STATELESS_TEMPERATURE),
        max_output_tokens: Some(STATELESS_MAX_OUTPUT_TOKENS),
        top_p: None,
        stop_sequences: vec![STATELESS_STOP.to_string()],
    }
}

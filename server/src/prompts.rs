//! System instructions sent to the upstream model.

use serde_json::json;
use shared_types::Tone;

pub const PROOFREADER_INSTRUCTION: &str = "You are an expert proofreader. Your task is to correct grammar, spelling, and punctuation errors in the provided text.
You MUST respond in the requested JSON format.
Your response must include:
1.  'correctedText': The full, corrected version of the text.
2.  'wrongWords': An array of strings. Each string must be an *exact* word or phrase from the *original* text that you identified as incorrect (e.g., 'mispelled', 'grammer', 'their are'). Only include words that were actually changed.";

const PROFESSIONAL_INSTRUCTION: &str = "You are an expert editor. Rewrite the following text to be more formal, polite, and suitable for a professional business setting. Do not add any extra commentary, just provide the rewritten text.";

const FRIENDLY_INSTRUCTION: &str = "You are an expert editor. Rewrite the following text to be more casual, warm, and friendly, as if speaking to a colleague. Use contractions and simpler language. Do not add any extra commentary, just provide the rewritten text.";

const CONCISE_INSTRUCTION: &str = "You are an expert editor. Rewrite the following text to be as clear and concise as possible. Remove all filler words, repetition, and unnecessary phrases. Do not add any extra commentary, just provide the rewritten text.";

/// Structured-output schema for the correction call.
pub fn correction_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "correctedText": { "type": "STRING" },
            "wrongWords": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["correctedText", "wrongWords"]
    })
}

pub fn tone_instruction(tone: &Tone) -> String {
    match tone {
        Tone::Professional => PROFESSIONAL_INSTRUCTION.to_string(),
        Tone::Friendly => FRIENDLY_INSTRUCTION.to_string(),
        Tone::Concise => CONCISE_INSTRUCTION.to_string(),
        Tone::Other(label) => format!(
            "You are an expert writing assistant. Please rewrite the following text in a {label} tone."
        ),
    }
}

// Prompt fragments shared by the classifier and feedback generator.
// Each module that calls the LLM keeps its own prompts.rs alongside it.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps internal scale values and labels out of user-facing prose.
pub const NO_INTERNAL_LEVELS_INSTRUCTION: &str = "\
    CRITICAL: Never mention numeric levels, scores, or internal labels such as \
    'level 4', 'apply', 'master', 'required level' or 'indicator'. \
    Describe behaviour and outcomes in plain language instead.";

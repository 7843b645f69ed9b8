pub const FEEDBACK_SYSTEM: &str = "You are an experienced systems engineering coach. \
    You write short, concrete and encouraging feedback for engineers about their competencies.";

pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"Write feedback for one competency area: {area}.

For each competency below you get what the person currently does and what their role
expects, plus whether they are BELOW, MEET or EXCEED the expectation.

{competencies}

Rules:
- Write 1-2 sentences of strengths for every competency.
- Only for BELOW competencies, add 1-2 sentences with one concrete improvement step
  that closes the distance to the expected behaviour.
- For MEET and EXCEED competencies the improvement MUST be null. Do not hint at
  further development for them.
- {no_internal_levels}

Return JSON:
{
  "competencies": [
    { "competency_name": "...", "strengths": "...", "improvement": "..." | null }
  ]
}"#;

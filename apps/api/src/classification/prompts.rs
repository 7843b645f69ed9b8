pub const TASK_CLASSIFICATION_SYSTEM: &str = "You are an expert in systems engineering \
    and the ISO/IEC 15288 life-cycle processes. You map the work people describe onto \
    process areas precisely and conservatively.";

pub const TASK_CLASSIFICATION_PROMPT: &str = r#"A person described their work in three groups.

Tasks they are RESPONSIBLE for:
{responsible_for}

Tasks they SUPPORT others with:
{supporting}

Tasks they DESIGN or define (methods, processes, architectures):
{designing}

Process areas (id: name):
{process_catalog}

Role archetypes (id: name):
{role_catalog}

For every process area the tasks clearly touch, give the person's involvement:
"supporting", "responsible" or "designing". Omit process areas the tasks do not touch.
Only use ids from the lists above. When several tasks touch the same process area,
report the strongest involvement.

Also propose the single role archetype the person most resembles, with a confidence
between 0 and 1 and a one-sentence rationale. Use null if no role fits.

Return JSON:
{
  "processes": [
    { "process_id": 23, "involvement": "responsible" }
  ],
  "suggested_role": { "role_id": 5, "confidence": 0.8, "rationale": "..." }
}"#;

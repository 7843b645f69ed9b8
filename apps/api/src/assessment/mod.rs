// Self-assessments: append-only results, gap evaluation against role
// requirements and generated feedback per competency area.

pub mod feedback;
pub mod gap;
pub mod handlers;
pub mod prompts;
pub mod store;

// Role Profile Store: the projection from process involvement to competency
// requirements, and the per-organization role matrices built with it.

pub mod handlers;
pub mod projection;
pub mod store;

pub mod distance;
pub mod handlers;
pub mod matcher;

pub mod assessment;
pub mod matrix;
pub mod organization;

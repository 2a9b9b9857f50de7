pub mod assessment;
pub mod upload;

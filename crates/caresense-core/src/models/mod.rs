pub mod assessment;
pub mod patient;
pub mod results;
pub mod risk;

pub mod lead;
pub mod strategy;

pub mod errors;
pub mod nodes;

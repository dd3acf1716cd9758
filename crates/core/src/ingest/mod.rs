pub mod catalog;
pub mod source;
pub mod types;

pub mod ast;
pub mod config;
pub mod error;
pub mod types;
pub mod validate;
pub mod visit;

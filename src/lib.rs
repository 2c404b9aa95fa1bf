pub mod config;
pub mod errors;
pub mod factory;
pub mod harness;

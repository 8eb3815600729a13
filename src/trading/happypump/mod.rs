pub mod builder;
pub mod common;

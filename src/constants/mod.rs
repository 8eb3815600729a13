pub mod happypump;
pub mod trade;

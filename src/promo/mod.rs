//! Promotion-code extraction, grouping, and ordering.

pub mod grouping;
pub mod tokenizer;

//! File reading and writing adapters.

pub mod read;
pub mod write;

//! Core library for the promo-tools command line application.
//!
//! The library exposes high-level pipelines that power the command-line
//! interface as well as the tests. The modules are structured to keep
//! responsibilities narrow and composable: the CSV tokenizer lives in
//! [`grid`], the ordinal-indexed table model in [`model`], promotion-code
//! extraction and grouping under [`promo`], file adapters under [`io`], and
//! the per-tool orchestration in [`pipeline`].

pub mod error;
pub mod grid;
pub mod io;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod promo;

pub use error::{Result, ToolError};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToolError};

/// Prefix applied to generated file names so that output never collides
/// with the source export.
pub const GENERATED_PREFIX: &str = "[GENERATED]_";

/// Writes the output text as UTF-8.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text)?;
    Ok(())
}

/// Derives the conventional output name for an input file:
/// `[GENERATED]_<original name>`.
pub fn generated_name(input: &Path) -> Result<String> {
    let name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| ToolError::UnnamedInput(input.to_path_buf()))?;
    Ok(format!("{GENERATED_PREFIX}{name}"))
}

/// Default output path: the generated name next to the input file.
pub fn default_output_path(input: &Path) -> Result<PathBuf> {
    let name = generated_name(input)?;
    Ok(input.with_file_name(name))
}

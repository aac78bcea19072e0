use std::fs;
use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::error::Result;

/// Reads a file decoded as Latin-1 (Windows-1252).
///
/// The retail exports this crate consumes are produced by legacy systems in
/// a single-byte character set; bytes above ASCII must round-trip so that
/// accented characters in source labels survive into the UTF-8 output.
pub fn read_latin1(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let (text, _, _) = WINDOWS_1252.decode(&bytes);
    Ok(text.into_owned())
}

/// Reads a file as UTF-8, replacing invalid sequences. Used for the
/// free-text promotion history input, which is modern pasted text rather
/// than a legacy export.
pub fn read_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

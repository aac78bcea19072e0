//! Minimal CSV tokenizer.
//!
//! This is intentionally not a full CSV parser: a comma is treated as a cell
//! delimiter only when an even number of `"` characters precede it on the
//! line, quote characters are kept verbatim in the cell value, and malformed
//! quoting degrades to a naive split instead of raising an error. The retail
//! exports this crate consumes never use escaped quotes.

/// Splits raw text into an ordered sequence of rows of raw string cells.
///
/// Rows are delimited by `\r\n` or `\n`. Empty input yields a single row
/// containing one empty cell.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    text.split("\r\n")
        .flat_map(|chunk| chunk.split('\n'))
        .map(split_line)
        .collect()
}

/// Splits one line on commas that sit outside double-quoted spans.
fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quotes = 0usize;

    for ch in line.chars() {
        match ch {
            '"' => {
                quotes += 1;
                current.push(ch);
            }
            ',' if quotes % 2 == 0 => {
                cells.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    cells.push(current);
    cells
}

//! Extraction of promotion tokens from multi-value cells.
//!
//! A promotions cell mixes codes, price fragments, and filler (`A B- $12.50
//! & C`). Tokenization keeps the codes and drops the rest; duplicate codes
//! survive here and are collapsed later by the grouping layer.

/// Splits a cell into promotion tokens, in input order.
///
/// A candidate is rejected when it is empty or whitespace-only, when it is
/// purely numeric after stripping `$` characters (a price fragment, not a
/// code), or when it is the literal `&`. Surviving tokens have exactly one
/// trailing `-` stripped: a dash-suffixed token is a variant of the same
/// code and is folded into it.
pub fn extract_tokens(cell_value: &str) -> Vec<String> {
    cell_value
        .split(' ')
        .filter(|token| !token.trim().is_empty())
        .filter(|token| parse_number(token).is_none())
        .filter(|token| *token != "&")
        .map(|token| token.strip_suffix('-').unwrap_or(token).to_string())
        .collect()
}

/// Returns the first token of the cell that reads as a number once `$`
/// characters are stripped, or `None` when the cell carries no price.
pub fn extract_price(cell_value: &str) -> Option<f64> {
    cell_value.split(' ').find_map(parse_number)
}

/// Formats an extracted price for output, to two decimal places.
pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

fn parse_number(token: &str) -> Option<f64> {
    let stripped = token.replace('$', "");
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok()
}

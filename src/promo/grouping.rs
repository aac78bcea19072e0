//! Grouping, deduplication, and priority ordering of promotion tokens.
//!
//! A token such as `Étalage maxi-2` carries a semantic type (`Étalage maxi`)
//! and a numeric suffix (`2`). Duplicate tokens of one type are collapsed to
//! the representative with the largest suffix, and the survivors are ordered
//! by a caller-supplied priority list with an alphabetical fallback for
//! types the list does not know.

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Sentinel suffix for tokens that carry no trailing number.
pub const NO_SUFFIX: f64 = -1.0;

/// Promotion types that must be accompanied by a numeric value column when
/// the wide output format is generated.
pub const VALUE_REQUIRED_PROMO_CODES: &[&str] = &["LO", "AM"];

/// Default priority order for known promotion types, most prominent first.
/// Types absent from this list sort after the known ones.
pub const SUGGESTED_PRIORITY: &[&str] = &[
    "Circulaire-Majeur à rabais mixte",
    "Circulaire-Standard Plus 170 succursales à rabais mixte",
    "Circulaire-Standard plus 120 succursales à rabais mixte",
    "Circulaire-Standard plus 235 succursales à points bonis",
    "Circulaire-Standard plus 235 succursales à rabais mixte",
    "Circulaire-Standard plus 25 succursales à rabais mixte",
    "Circulaire-Standard plus 315 succursales sans rabais",
    "Circulaire-Standard plus 315 succursales à rabais mixte",
    "Circulaire-Standard plus 60 succursales à rabais mixte",
    "Circulaire-Standard plus 80  succursales sans rabais",
    "Circulaire-Standard plus 80  succursales à rabais mixte",
    "Circulaire-Vedette à rabais mixte",
    "Événement tactique-Forfait Nouveauté",
    "Événement tactique-Forfait Nouveauté Sélection",
    "Événement tactique-Produit à découvrir à rabais mixte",
    "Événement tactique-Standard plus 235 succursales sans rabais",
    "Événement tactique-Standard plus 235 succursales à points bonis",
    "Événement tactique-Standard plus 315 succursales sans rabais",
    "Événement tactique-Standard plus 80  succursales à points bonis",
    "Forfait offre de lancement",
    "Vitrine 1 période",
    "Dégustation - régulière",
    "Étalage super",
    "Étalage maxi",
    "Étalage régulier",
    "Étalage gros",
    "Étalage mini longue durée",
    "Étalage mini",
    "Allongeur - régulier",
    "Frigo longue durée",
    "Frigo 1 période",
    "LTO",
    "Points",
];

/// Returns the semantic type of a promotion token: the trimmed token with a
/// trailing `-<number>` or `_<number>` qualifier removed.
pub fn promotion_type(token: &str) -> String {
    let trimmed = token.trim();
    match suffix_start(trimmed) {
        Some(index) => trimmed[..index].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Returns the numeric suffix of a promotion token, or [`NO_SUFFIX`] when
/// the token carries none (or the fragment does not read as a number).
pub fn promotion_suffix(token: &str) -> f64 {
    let trimmed = token.trim();
    let Some(index) = suffix_start(trimmed) else {
        return NO_SUFFIX;
    };
    let fragment: String = trimmed[index..]
        .chars()
        .filter(|ch| *ch != '-' && *ch != '_')
        .collect();
    parse_leading_float(fragment.trim()).unwrap_or(NO_SUFFIX)
}

/// Byte index where the trailing `(-|_)<ws><digits/.,>` qualifier starts,
/// or `None` when the token has no such qualifier.
fn suffix_start(token: &str) -> Option<usize> {
    let bytes = token.as_bytes();
    let mut index = bytes.len();
    while index > 0 && matches!(bytes[index - 1], b'0'..=b'9' | b',' | b'.') {
        index -= 1;
    }
    if index == bytes.len() {
        return None;
    }
    while index > 0 && bytes[index - 1].is_ascii_whitespace() {
        index -= 1;
    }
    if index > 0 && matches!(bytes[index - 1], b'-' | b'_') {
        Some(index - 1)
    } else {
        None
    }
}

/// Parses the longest numeric prefix of the fragment, so that comma-grouped
/// suffixes such as `1,5` read as `1` like the source data expects.
fn parse_leading_float(fragment: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for (index, ch) in fragment.char_indices() {
        match ch {
            '0'..='9' => end = index + 1,
            '.' if !seen_dot => {
                seen_dot = true;
            }
            _ => break,
        }
    }
    fragment[..end].parse().ok()
}

/// Collapses a token list to one representative per distinct type.
///
/// Tokens are grouped by [`promotion_type`]; within a group the token with
/// the largest suffix survives (the last seen wins a tie). The `Points`
/// type has one special rule: a zero-suffix entry counts as absent and is
/// discarded before reduction, so a group of only `Points-0` tokens
/// contributes no output at all. Group output order is first-seen order.
pub fn group_and_reduce(tokens: &[String]) -> Vec<String> {
    let mut groups: Vec<(String, Vec<&String>)> = Vec::new();
    for token in tokens {
        let type_name = promotion_type(token);
        match groups.iter_mut().find(|(name, _)| *name == type_name) {
            Some((_, group)) => group.push(token),
            None => groups.push((type_name, vec![token])),
        }
    }

    let mut reduced = Vec::with_capacity(groups.len());
    for (type_name, mut group) in groups {
        if type_name == "Points" {
            group.retain(|token| promotion_suffix(token) != 0.0);
        }
        let largest = group.into_iter().max_by(|lhs, rhs| {
            promotion_suffix(lhs)
                .partial_cmp(&promotion_suffix(rhs))
                .unwrap_or(Ordering::Equal)
        });
        if let Some(token) = largest {
            reduced.push(token.clone());
        }
    }
    reduced
}

/// Compares two types under a priority list: known types by their list
/// rank, unknown types after all known ones, unknown ties alphabetically.
fn compare_by_priority(lhs: &str, rhs: &str, priority: &[String]) -> Ordering {
    let rank = |name: &str| priority.iter().position(|entry| entry == name);
    match (rank(lhs), rank(rhs)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => lhs.cmp(rhs),
    }
}

/// Orders a list of types by the priority list. The sort is stable, so
/// equal ranks preserve the incoming relative order.
pub fn order_types(mut types: Vec<String>, priority: &[String]) -> Vec<String> {
    types.sort_by(|lhs, rhs| compare_by_priority(lhs, rhs, priority));
    types
}

/// Orders whole tokens by the priority rank of their type, preserving the
/// incoming relative order of same-type tokens.
pub fn sort_tokens_by_type(tokens: &mut [String], priority: &[String]) {
    tokens.sort_by(|lhs, rhs| {
        compare_by_priority(&promotion_type(lhs), &promotion_type(rhs), priority)
    });
}

/// Accumulator for the distinct promotion codes discovered across one
/// dataset. Scoped to a single processing run and handed back to the
/// caller; iteration order is alphabetical.
#[derive(Debug, Default)]
pub struct CodeRegistry {
    codes: BTreeSet<String>,
}

impl CodeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one discovered code.
    pub fn record(&mut self, code: &str) {
        self.codes.insert(code.to_string());
    }

    /// Drops a code that the caller vetted out.
    pub fn remove(&mut self, code: &str) {
        self.codes.remove(code);
    }

    /// Number of distinct codes recorded.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The recorded codes in alphabetical order.
    pub fn sorted(&self) -> Vec<String> {
        self.codes.iter().cloned().collect()
    }
}

/// Column id of the paired numeric value column for a value-required code.
pub fn value_column_id(code: &str) -> String {
    format!("{code}_VALUE")
}

/// True when the column id is the value column of a value-required code.
pub fn is_value_column_id(column_id: &str) -> bool {
    VALUE_REQUIRED_PROMO_CODES
        .iter()
        .any(|code| column_id == value_column_id(code))
}

//! End-to-end pipelines for the three tools.
//!
//! Each pipeline reads one input file, runs the reshaping core over it, and
//! writes one output file. Processing is single-threaded and synchronous;
//! only one file is handled per run and no state survives the run.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};
use crate::grid;
use crate::io::read;
use crate::io::write;
use crate::model::{grid_stats, Dataset, Record, Row, Stats};
use crate::promo::grouping::{
    self, group_and_reduce, is_value_column_id, order_types, promotion_type, sort_tokens_by_type,
    value_column_id, CodeRegistry, VALUE_REQUIRED_PROMO_CODES,
};
use crate::promo::tokenizer::{extract_price, extract_tokens, format_price};

/// Column holding the period identifier in the reshaped banner output.
pub const PERIOD_COLUMN: &str = "PERIOD";
/// Column the banner tool sorts on first.
pub const BANNER_COLUMN: &str = "Banner Group";
/// Column the banner tool sorts on second.
pub const PRODUCT_COLUMN: &str = "PRODUCT_DISPLAY_DSC";
/// Column holding the raw multi-value promotion cell.
pub const PROMOTIONS_COLUMN: &str = "Promotions";

/// Measure names recognised in the input file name; the first match names
/// the per-period value column, `PRICE` when none matches.
const MEASURE_NAMES: &[&str] = &["PRICE", "SALES", "UNITS"];

/// Outcome of a table-reshaping run.
#[derive(Debug, Serialize)]
pub struct ReshapeSummary {
    /// Path the output was written to.
    pub output: PathBuf,
    /// Size summary of the parsed input.
    pub input_stats: Stats,
    /// Size summary of the serialized output.
    pub output_stats: Stats,
    /// Promotion codes discovered across the dataset (wide format only).
    pub codes: Vec<String>,
}

/// Outcome of a promotion-history normalization run.
#[derive(Debug, Serialize)]
pub struct FixSummary {
    /// Path the output was written to, absent in list-only mode.
    pub output: Option<PathBuf>,
    /// Number of input lines processed.
    pub lines: usize,
    /// Distinct promotion types discovered, in priority order.
    pub types: Vec<String>,
}

/// Reshapes a wide per-period export into long form: one output row per
/// (source row, period column) pair, with a leading `PERIOD` column and a
/// trailing measure column carrying the period's value.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display())
)]
pub fn banner_by_period(input: &Path, output: Option<&Path>) -> Result<ReshapeSummary> {
    let text = read_input(input)?;
    let rows = grid::parse(&text);
    let input_stats = grid_stats(&text, &rows);
    info!(?input_stats, "input parsed");

    let mut dataset = Dataset::from_grid(rows, Some(Box::new(mark_period_columns)));

    // Period columns in input order, i.e. by ordinal.
    let mut period_columns: Vec<(usize, String)> = dataset
        .headers
        .values()
        .filter(|column| column.period)
        .map(|column| (column.ordinal, column.id.clone()))
        .collect();
    period_columns.sort_by_key(|(ordinal, _)| *ordinal);
    let period_columns: Vec<String> = period_columns.into_iter().map(|(_, id)| id).collect();
    if period_columns.is_empty() {
        return Err(ToolError::NoPeriodColumn);
    }
    debug!(count = period_columns.len(), "period columns discovered");

    let measure = measure_column_name(input);
    dataset.add_column(PERIOD_COLUMN, 0);
    let measure_ordinal = dataset.headers.len() - 1;
    dataset.add_column(measure.clone(), measure_ordinal);

    // One output row per period per source row, non-period data duplicated.
    let mut body = Vec::with_capacity(dataset.body.len() * period_columns.len());
    for row_index in 0..dataset.body.len() {
        for period_id in &period_columns {
            let mut row = dataset.clone_row(row_index);
            let value = row
                .get(period_id)
                .map(|cell| cell.raw_value.clone())
                .unwrap_or_default();
            if let Some(cell) = row.get_mut(PERIOD_COLUMN) {
                cell.output_value = period_id.clone();
            }
            if let Some(cell) = row.get_mut(&measure) {
                cell.output_value = value;
            }
            body.push(row);
        }
    }

    // Banner first, product second, period date third.
    body.sort_by(|lhs, rhs| {
        cell_output(lhs, BANNER_COLUMN)
            .cmp(cell_output(rhs, BANNER_COLUMN))
            .then_with(|| cell_output(lhs, PRODUCT_COLUMN).cmp(cell_output(rhs, PRODUCT_COLUMN)))
            .then_with(|| {
                compare_periods(cell_output(lhs, PERIOD_COLUMN), cell_output(rhs, PERIOD_COLUMN))
            })
    });
    dataset.body = body;

    finish(dataset, input, output, input_stats, Vec::new())
}

/// Widens the promotions column into per-code flag columns: one column per
/// discovered code holding `1`/`0`, plus a `<CODE>_VALUE` price column for
/// each value-required code. `drop_codes` removes codes the caller vetted
/// out of the discovered set.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display())
)]
pub fn promotions_wide(
    input: &Path,
    output: Option<&Path>,
    drop_codes: &[String],
) -> Result<ReshapeSummary> {
    let text = read_input(input)?;
    let rows = grid::parse(&text);
    let input_stats = grid_stats(&text, &rows);
    info!(?input_stats, "input parsed");

    let mut dataset = Dataset::from_grid(rows, Some(Box::new(attach_promotion_tokens)));
    if !dataset.headers.contains_key(PROMOTIONS_COLUMN) {
        return Err(ToolError::MissingColumn(PROMOTIONS_COLUMN.to_string()));
    }

    let mut registry = CodeRegistry::new();
    for row in &dataset.body {
        let tokens = row
            .get(PROMOTIONS_COLUMN)
            .and_then(|cell| cell.tokens.as_deref());
        for token in tokens.unwrap_or_default() {
            registry.record(token);
        }
    }
    info!(codes = registry.len(), "promotion codes discovered");
    for code in drop_codes {
        registry.remove(code);
    }
    for code in VALUE_REQUIRED_PROMO_CODES {
        registry.record(&value_column_id(code));
    }
    let codes = registry.sorted();

    for (index, code) in codes.iter().enumerate() {
        let ordinal = dataset.headers.len() - 1 + index;
        dataset.add_column(code.clone(), ordinal);
    }

    let value_columns: Vec<String> = dataset
        .headers
        .values()
        .filter(|column| column.value_column)
        .map(|column| column.id.clone())
        .collect();
    for row in &mut dataset.body {
        let Some(promotions) = row.get(PROMOTIONS_COLUMN).cloned() else {
            continue;
        };
        let Some(tokens) = promotions.tokens.as_ref() else {
            continue;
        };
        for code in &codes {
            let present = tokens.iter().any(|token| token == code);
            if let Some(cell) = row.get_mut(code) {
                cell.output_value = if present { "1" } else { "0" }.to_string();
            }
        }
        for column_id in &value_columns {
            if let Some(cell) = row.get_mut(column_id) {
                cell.output_value = extract_price(&promotions.raw_value)
                    .map(format_price)
                    .unwrap_or_default();
            }
        }
    }

    finish(dataset, input, output, input_stats, codes)
}

/// Normalizes free-text promotion history: per line, comma-separated
/// promotions are collapsed to one representative per type and reordered by
/// the priority list. When `list_only` is set, no output is written and the
/// summary just carries the discovered types.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display())
)]
pub fn fix_promotions(
    input: &Path,
    output: Option<&Path>,
    priority: &[String],
    list_only: bool,
) -> Result<FixSummary> {
    ensure_exists(input)?;
    let text = read::read_utf8(input)?;
    let lines: Vec<&str> = text.split('\n').collect();

    let types = promotion_types(&lines, priority);
    info!(lines = lines.len(), types = types.len(), "promotion history scanned");

    if list_only {
        return Ok(FixSummary {
            output: None,
            lines: lines.len(),
            types,
        });
    }

    let fixed: Vec<String> = lines
        .iter()
        .map(|line| fix_promotion_line(line, priority))
        .collect();

    let output_path = resolve_output(input, output)?;
    write::write_text(&output_path, &fixed.join("\n"))?;
    info!(output = %output_path.display(), "output written");

    Ok(FixSummary {
        output: Some(output_path),
        lines: lines.len(),
        types,
    })
}

/// Collapses one comma-separated promotion line to its canonical form.
pub fn fix_promotion_line(line: &str, priority: &[String]) -> String {
    let promotions: Vec<String> = line.split(',').map(|entry| entry.trim().to_string()).collect();
    let mut reduced = group_and_reduce(&promotions);
    sort_tokens_by_type(&mut reduced, priority);
    reduced.join(", ")
}

/// Distinct non-empty promotion types across the history, in priority
/// order.
pub fn promotion_types(lines: &[&str], priority: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    for line in lines {
        for promotion in line.split(',') {
            let type_name = promotion_type(promotion);
            if !type_name.is_empty() && !seen.contains(&type_name) {
                seen.push(type_name);
            }
        }
    }
    order_types(seen, priority)
}

/// The built-in priority list for promotion types.
pub fn default_priority() -> Vec<String> {
    grouping::SUGGESTED_PRIORITY
        .iter()
        .map(|entry| (*entry).to_string())
        .collect()
}

/// Loads a priority list from a file with one type per line. Blank lines
/// are skipped; an effectively empty file is rejected.
pub fn load_priority(path: &Path) -> Result<Vec<String>> {
    let text = read::read_utf8(path).map_err(|error| ToolError::InvalidPriorityFile {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })?;
    let entries: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if entries.is_empty() {
        return Err(ToolError::InvalidPriorityFile {
            path: path.to_path_buf(),
            reason: "no priority entries".to_string(),
        });
    }
    Ok(entries)
}

/// Transform rule for the banner tool: period-formatted header ids are
/// flagged and excluded from output.
fn mark_period_columns(record: Record) -> Record {
    match record {
        Record::Header(mut column) => {
            if is_period_column_id(&column.id) {
                column.period = true;
                column.exclude_from_output = true;
            }
            Record::Header(column)
        }
        body => body,
    }
}

/// Transform rule for the wide promotions tool: promotion cells get their
/// token list attached, `<CODE>_VALUE` headers are flagged as value
/// columns.
fn attach_promotion_tokens(record: Record) -> Record {
    match record {
        Record::Header(mut column) => {
            if is_value_column_id(&column.id) {
                column.value_column = true;
            }
            Record::Header(column)
        }
        Record::Body(mut cell) => {
            if cell.column_id == PROMOTIONS_COLUMN {
                cell.tokens = Some(extract_tokens(&cell.raw_value));
            }
            Record::Body(cell)
        }
    }
}

/// True for header ids in one of the period formats, `2019-11-04` or
/// `11/04/2019`.
fn is_period_column_id(id: &str) -> bool {
    is_iso_period(id) || is_slash_period(id)
}

fn is_iso_period(id: &str) -> bool {
    let bytes = id.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| matches!(index, 4 | 7) || byte.is_ascii_digit())
}

fn is_slash_period(id: &str) -> bool {
    let mut parts = 0;
    for part in id.split('/') {
        if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
            return false;
        }
        parts += 1;
    }
    parts == 3
}

/// Measure column name scraped from the input file name.
fn measure_column_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|name| name.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    MEASURE_NAMES
        .iter()
        .find(|measure| name.contains(**measure))
        .unwrap_or(&MEASURE_NAMES[0])
        .to_string()
}

fn cell_output<'a>(row: &'a Row, column_id: &str) -> &'a str {
    row.get(column_id)
        .map(|cell| cell.output_value.as_str())
        .unwrap_or("")
}

/// Orders period identifiers as dates when both parse; unparseable periods
/// sort after parseable ones, lexically among themselves.
fn compare_periods(lhs: &str, rhs: &str) -> Ordering {
    match (parse_period_date(lhs), parse_period_date(rhs)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => lhs.cmp(rhs),
    }
}

fn parse_period_date(period: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(period, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(period, "%m/%d/%Y"))
        .ok()
}

fn read_input(input: &Path) -> Result<String> {
    ensure_exists(input)?;
    read::read_latin1(input)
}

fn ensure_exists(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(ToolError::MissingInput(input.to_path_buf()));
    }
    Ok(())
}

fn resolve_output(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    match output {
        Some(path) => Ok(path.to_path_buf()),
        None => write::default_output_path(input),
    }
}

/// Serializes the dataset, writes it to the resolved output path, and
/// assembles the run summary.
fn finish(
    dataset: Dataset,
    input: &Path,
    output: Option<&Path>,
    input_stats: Stats,
    codes: Vec<String>,
) -> Result<ReshapeSummary> {
    let text = dataset.serialize();
    let output_stats = dataset.output_stats(&text);
    let output_path = resolve_output(input, output)?;
    write::write_text(&output_path, &text)?;
    info!(output = %output_path.display(), ?output_stats, "output written");

    Ok(ReshapeSummary {
        output: output_path,
        input_stats,
        output_stats,
        codes,
    })
}

use promo_tools::grid;
use promo_tools::model::{Dataset, Record, BOM};
use promo_tools::promo::grouping::{
    group_and_reduce, order_types, promotion_suffix, promotion_type, NO_SUFFIX,
};
use promo_tools::promo::tokenizer::{extract_price, extract_tokens, format_price};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

#[test]
fn parse_keeps_quoted_commas_in_one_cell() {
    let rows = grid::parse("a,\"b,c\",d\r\n1,2,3");
    assert_eq!(
        rows,
        vec![strings(&["a", "\"b,c\"", "d"]), strings(&["1", "2", "3"])]
    );
}

#[test]
fn parse_empty_input_yields_single_empty_row() {
    assert_eq!(grid::parse(""), vec![strings(&[""])]);
}

#[test]
fn parse_tolerates_unbalanced_quotes() {
    // Malformed quoting degrades: the open quote swallows the rest of the line.
    let rows = grid::parse("a,\"b,c");
    assert_eq!(rows, vec![strings(&["a", "\"b,c"])]);
}

#[test]
fn serialize_roundtrips_modulo_bom() {
    let text = "Banner,Product\nMetro,Apple\nIGA,Banana";
    let dataset = Dataset::from_grid(grid::parse(text), None);
    assert_eq!(dataset.serialize(), format!("{BOM}{text}"));
}

#[test]
fn add_column_keeps_ordinals_a_contiguous_permutation() {
    let mut dataset = Dataset::from_grid(grid::parse("a,b,c\n1,2,3"), None);
    dataset.add_column("x", 1);
    dataset.add_column("y", 0);

    let columns = dataset.output_columns();
    let ordinals: Vec<usize> = columns.iter().map(|column| column.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2, 3, 4]);

    let ids: Vec<&str> = columns.iter().map(|column| column.id.as_str()).collect();
    assert_eq!(ids, vec!["y", "a", "x", "b", "c"]);

    let header_line = dataset.serialize();
    let header_line = header_line
        .strip_prefix(BOM)
        .and_then(|text| text.lines().next())
        .expect("header line");
    assert_eq!(header_line, "y,a,x,b,c");
}

#[test]
fn add_column_beyond_width_resolves_at_serialization() {
    let mut dataset = Dataset::from_grid(grid::parse("a,b\n1,2"), None);
    dataset.add_column("z", 10);

    let ids: Vec<&str> = dataset
        .output_columns()
        .iter()
        .map(|column| column.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "z"]);
}

#[test]
fn add_column_gives_every_row_an_empty_cell() {
    let mut dataset = Dataset::from_grid(grid::parse("a\n1\n2"), None);
    dataset.add_column("b", 1);
    for row in &dataset.body {
        let cell = row.get("b").expect("inserted cell");
        assert_eq!(cell.raw_value, "");
        assert_eq!(cell.output_value, "");
    }
}

#[test]
fn output_stats_measure_the_serialized_text() {
    let dataset = Dataset::from_grid(grid::parse("a,b\n1,2\n3,4"), None);
    let text = dataset.serialize();
    let stats = dataset.output_stats(&text);
    assert_eq!(stats.rows, 3);
    assert_eq!(stats.columns, 2);
    // The byte-order marker is not counted as data.
    assert_eq!(stats.bytes, "a,b\n1,2\n3,4".len());
}

#[test]
fn clone_row_shares_no_state_with_source() {
    let dataset = Dataset::from_grid(grid::parse("a,b\n1,2"), None);
    let mut clone = dataset.clone_row(0);
    clone.get_mut("a").expect("cell").output_value = "changed".to_string();
    assert_eq!(dataset.body[0]["a"].output_value, "1");
}

#[test]
fn excluded_columns_are_dropped_from_header_and_rows() {
    let rule = |record: Record| match record {
        Record::Header(mut column) => {
            if column.id == "secret" {
                column.exclude_from_output = true;
            }
            Record::Header(column)
        }
        body => body,
    };
    let dataset = Dataset::from_grid(grid::parse("a,secret,b\n1,2,3"), Some(Box::new(rule)));
    assert_eq!(dataset.serialize(), format!("{BOM}a,b\n1,3"));
}

#[test]
fn later_duplicate_header_wins() {
    let dataset = Dataset::from_grid(grid::parse("A,A\n1,2"), None);
    assert_eq!(dataset.headers.len(), 1);
    assert_eq!(dataset.headers["A"].ordinal, 1);
    assert_eq!(dataset.body[0]["A"].raw_value, "2");
}

#[test]
fn short_rows_serialize_without_padding() {
    let dataset = Dataset::from_grid(grid::parse("a,b,c\n1,2"), None);
    assert_eq!(dataset.serialize(), format!("{BOM}a,b,c\n1,2"));
}

#[test]
fn transform_rule_runs_on_body_cells() {
    let rule = |record: Record| match record {
        Record::Body(mut cell) => {
            cell.output_value = cell.raw_value.to_uppercase();
            Record::Body(cell)
        }
        header => header,
    };
    let dataset = Dataset::from_grid(grid::parse("a\nhello"), Some(Box::new(rule)));
    assert_eq!(dataset.body[0]["a"].output_value, "HELLO");
    assert_eq!(dataset.body[0]["a"].raw_value, "hello");
}

#[test]
fn extract_tokens_rejects_numbers_and_ampersand() {
    assert_eq!(extract_tokens("A B- 12.50 & C"), strings(&["A", "B", "C"]));
}

#[test]
fn extract_tokens_strips_dollar_prices_and_keeps_duplicates() {
    assert_eq!(
        extract_tokens("LTO-2 $12.50 LTO-2  AM"),
        strings(&["LTO-2", "LTO-2", "AM"])
    );
}

#[test]
fn extract_tokens_strips_one_trailing_dash_only() {
    assert_eq!(extract_tokens("AM--"), strings(&["AM-"]));
}

#[test]
fn extract_price_finds_first_numeric_token() {
    assert_eq!(extract_price("LO $12.5 AM 3"), Some(12.5));
    assert_eq!(extract_price("LO AM"), None);
    assert_eq!(format_price(12.5), "12.50");
}

#[test]
fn promotion_type_strips_trailing_qualifier() {
    assert_eq!(promotion_type("LTO-3"), "LTO");
    assert_eq!(promotion_type("Étalage maxi_2.5"), "Étalage maxi");
    assert_eq!(promotion_type(" LTO- 3 "), "LTO");
    assert_eq!(promotion_type("Frigo 1 période"), "Frigo 1 période");
}

#[test]
fn promotion_suffix_parses_or_falls_back_to_sentinel() {
    assert_eq!(promotion_suffix("LTO-3"), 3.0);
    assert_eq!(promotion_suffix("Étalage maxi_2.5"), 2.5);
    assert_eq!(promotion_suffix("Points"), NO_SUFFIX);
    // Comma-grouped suffixes read as their leading number.
    assert_eq!(promotion_suffix("LTO-1,5"), 1.0);
}

#[test]
fn group_and_reduce_keeps_largest_suffix_per_type() {
    let tokens = strings(&["LTO-1", "LTO-3", "Points-0"]);
    assert_eq!(group_and_reduce(&tokens), strings(&["LTO-3"]));
}

#[test]
fn group_and_reduce_drops_type_whose_group_empties() {
    let tokens = strings(&["Points-0", "Points-0"]);
    assert_eq!(group_and_reduce(&tokens), Vec::<String>::new());
}

#[test]
fn group_and_reduce_keeps_nonzero_points() {
    let tokens = strings(&["Points-0", "Points-2"]);
    assert_eq!(group_and_reduce(&tokens), strings(&["Points-2"]));
}

#[test]
fn order_types_ranks_known_first_then_alphabetical() {
    let priority = strings(&["A", "B"]);
    let ordered = order_types(strings(&["B", "A", "Z"]), &priority);
    assert_eq!(ordered, strings(&["A", "B", "Z"]));

    let ordered = order_types(strings(&["Z", "Y", "A"]), &priority);
    assert_eq!(ordered, strings(&["A", "Y", "Z"]));
}

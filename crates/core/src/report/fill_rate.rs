use std::{cmp::Ordering, collections::BTreeMap};

use crate::{
    ColumnInfo, RelationName, ReportError, ResultTable, Value,
    relation::{quote_identifier, quote_literal},
};

/// Segment label of the union branch that counts every row.
pub const ALL_SEGMENTS: &str = "__all__";
/// Segment label used when the segment column itself is NULL.
pub const NULL_SEGMENT: &str = "(null)";

const SEGMENT_ALIAS: &str = "segment";
const SEGMENT_ROWS_ALIAS: &str = "n";
const TOTAL_ROWS_ALIAS: &str = "n_total";

/// One (segment, column) cell of the long-form fill-rate table.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRate {
    pub segment: String,
    pub column: String,
    pub n_rows: i64,
    pub n_nonnull: i64,
    pub fill_rate: Option<f64>,
}

/// Overall fill statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFill {
    pub column: String,
    pub ordinal: usize,
    pub data_type: String,
    pub n_filled: i64,
    pub n_total: i64,
    pub fill_rate: Option<f64>,
}

#[must_use]
pub fn count_alias(position: usize) -> String {
    format!("nn__{position:03}")
}

#[must_use]
pub fn fill_rate(n_nonnull: i64, n_rows: i64) -> Option<f64> {
    (n_rows != 0).then(|| n_nonnull as f64 / n_rows as f64)
}

/// Non-null counts per value of `segment_column`, plus an [`ALL_SEGMENTS`]
/// branch over the whole relation.
#[must_use]
pub fn segmented_fill_rate_sql(
    relation: &RelationName,
    segment_column: &str,
    columns: &[ColumnInfo],
) -> String {
    let counts = non_null_counts(columns);
    let segment = quote_identifier(segment_column);
    format!(
        "WITH base AS (\n  SELECT * FROM {relation}\n)\n\
         SELECT\n  CAST({segment} AS TEXT) AS {SEGMENT_ALIAS},\n  COUNT(*) AS {SEGMENT_ROWS_ALIAS},\n  {counts}\n\
         FROM base\nGROUP BY {segment}\n\n\
         UNION ALL\n\n\
         SELECT\n  {all} AS {SEGMENT_ALIAS},\n  COUNT(*) AS {SEGMENT_ROWS_ALIAS},\n  {counts}\n\
         FROM base",
        all = quote_literal(ALL_SEGMENTS),
    )
}

/// Row total plus one non-null count per column, in a single scan.
#[must_use]
pub fn overall_fill_rate_sql(relation: &RelationName, columns: &[ColumnInfo]) -> String {
    let counts = non_null_counts(columns);
    format!("SELECT\n  COUNT(*) AS {TOTAL_ROWS_ALIAS},\n  {counts}\nFROM {relation}")
}

/// Reshapes the segmented count query into long form, sorted by segment,
/// then fill rate (unknown rates last), then column.
pub fn fill_rates_from_counts(
    counts: &ResultTable,
    columns: &[ColumnInfo],
) -> Result<Vec<FillRate>, ReportError> {
    let mut rates = Vec::with_capacity(counts.len() * columns.len());

    for row in 0..counts.len() {
        let segment = match counts.value(row, SEGMENT_ALIAS) {
            None => {
                return Err(ReportError::MissingColumn {
                    column: SEGMENT_ALIAS.to_string(),
                });
            }
            Some(Value::Null) => NULL_SEGMENT.to_string(),
            Some(value) => value.to_string(),
        };
        let n_rows = integer_cell(counts, row, SEGMENT_ROWS_ALIAS)?;

        for (position, column) in columns.iter().enumerate() {
            let n_nonnull = integer_cell(counts, row, &count_alias(position))?;
            rates.push(FillRate {
                segment: segment.clone(),
                column: column.name.to_lowercase(),
                n_rows,
                n_nonnull,
                fill_rate: fill_rate(n_nonnull, n_rows),
            });
        }
    }

    rates.sort_by(|left, right| {
        left.segment
            .cmp(&right.segment)
            .then_with(|| compare_rates(left.fill_rate, right.fill_rate))
            .then_with(|| left.column.cmp(&right.column))
    });
    Ok(rates)
}

/// Reshapes the overall count query into one entry per column, ordered by
/// ordinal position.
pub fn column_fills_from_counts(
    counts: &ResultTable,
    columns: &[ColumnInfo],
) -> Result<Vec<ColumnFill>, ReportError> {
    if counts.is_empty() {
        return Err(ReportError::MissingColumn {
            column: TOTAL_ROWS_ALIAS.to_string(),
        });
    }
    let n_total = integer_cell(counts, 0, TOTAL_ROWS_ALIAS)?;

    let mut fills = columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            let n_filled = integer_cell(counts, 0, &count_alias(position))?;
            Ok(ColumnFill {
                column: column.name.clone(),
                ordinal: column.ordinal,
                data_type: column.data_type.clone(),
                n_filled,
                n_total,
                fill_rate: fill_rate(n_filled, n_total),
            })
        })
        .collect::<Result<Vec<_>, ReportError>>()?;
    fills.sort_by_key(|fill| fill.ordinal);
    Ok(fills)
}

/// Up to `limit` known rates of `segment`, emptiest first.
#[must_use]
pub fn emptiest_columns<'a>(rates: &'a [FillRate], segment: &str, limit: usize) -> Vec<&'a FillRate> {
    let mut selected = rates
        .iter()
        .filter(|rate| rate.segment == segment && rate.fill_rate.is_some())
        .collect::<Vec<_>>();
    selected.sort_by(|left, right| compare_rates(left.fill_rate, right.fill_rate));
    selected.truncate(limit);
    selected
}

/// Distinct segments in first-seen order.
#[must_use]
pub fn segments(rates: &[FillRate]) -> Vec<&str> {
    let mut seen = Vec::new();
    for rate in rates {
        if !seen.contains(&rate.segment.as_str()) {
            seen.push(rate.segment.as_str());
        }
    }
    seen
}

/// column -> segment -> fill rate.
#[must_use]
pub fn pivot_by_segment(rates: &[FillRate]) -> BTreeMap<&str, BTreeMap<&str, Option<f64>>> {
    let mut wide: BTreeMap<&str, BTreeMap<&str, Option<f64>>> = BTreeMap::new();
    for rate in rates {
        wide.entry(rate.column.as_str())
            .or_default()
            .insert(rate.segment.as_str(), rate.fill_rate);
    }
    wide
}

#[must_use]
pub fn fill_rates_table(rates: &[FillRate], segment_header: &str) -> ResultTable {
    ResultTable::with_rows(
        vec![
            segment_header.to_string(),
            "column".to_string(),
            "n_rows".to_string(),
            "n_nonnull".to_string(),
            "fill_rate".to_string(),
        ],
        rates
            .iter()
            .map(|rate| {
                vec![
                    Value::from(rate.segment.as_str()),
                    Value::from(rate.column.as_str()),
                    Value::Integer(rate.n_rows),
                    Value::Integer(rate.n_nonnull),
                    Value::from(rate.fill_rate),
                ]
            })
            .collect(),
    )
}

#[must_use]
pub fn column_fills_table(fills: &[ColumnFill]) -> ResultTable {
    ResultTable::with_rows(
        vec![
            "column_name".to_string(),
            "ordinal_position".to_string(),
            "data_type".to_string(),
            "n_filled".to_string(),
            "n_total".to_string(),
            "fill_rate".to_string(),
        ],
        fills
            .iter()
            .map(|fill| {
                vec![
                    Value::from(fill.column.as_str()),
                    Value::Integer(i64::try_from(fill.ordinal).unwrap_or(i64::MAX)),
                    Value::from(fill.data_type.as_str()),
                    Value::Integer(fill.n_filled),
                    Value::Integer(fill.n_total),
                    Value::from(fill.fill_rate),
                ]
            })
            .collect(),
    )
}

/// Ascending order with unknown rates after every known one.
pub(crate) fn compare_rates(left: Option<f64>, right: Option<f64>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.total_cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn non_null_counts(columns: &[ColumnInfo]) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            format!(
                "COUNT({}) AS {}",
                quote_identifier(&column.name),
                count_alias(position)
            )
        })
        .collect::<Vec<_>>()
        .join(",\n  ")
}

fn integer_cell(table: &ResultTable, row: usize, column: &str) -> Result<i64, ReportError> {
    let value = table
        .value(row, column)
        .ok_or_else(|| ReportError::MissingColumn {
            column: column.to_string(),
        })?;
    value.as_i64().ok_or_else(|| ReportError::UnexpectedValue {
        column: column.to_string(),
        value: value.to_string(),
    })
}

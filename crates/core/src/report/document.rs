use std::path::Path;

use super::{
    ALL_SEGMENTS, DictionaryReport, FillRateReport,
    dictionary::{dictionary_table, nullable_label},
    fill_rate::{ColumnFill, compare_rates, emptiest_columns, pivot_by_segment, segments},
};
use crate::{ResultTable, Value, renderer::render_markdown};

const GENERATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

pub(super) fn dictionary_summary(report: &DictionaryReport, worst: usize) -> String {
    let mut lines = vec![
        format!("# Dictionary — {}", report.relation.name),
        String::new(),
        format!("- Relation: `{}`", report.relation),
        format!("- Columns: **{}**", report.entries.len()),
        String::new(),
        "## Column dictionary".to_string(),
        String::new(),
        render_markdown(&dictionary_table(&report.entries), None),
        String::new(),
        "## Fill rate (summary)".to_string(),
        String::new(),
    ];

    for segment in segments(&report.rates) {
        let table = ResultTable::with_rows(
            ["column", "fill_rate", "n_nonnull", "n_rows"]
                .map(str::to_string)
                .to_vec(),
            emptiest_columns(&report.rates, segment, worst)
                .into_iter()
                .map(|rate| {
                    vec![
                        Value::from(rate.column.as_str()),
                        Value::from(rate.fill_rate),
                        Value::Integer(rate.n_nonnull),
                        Value::Integer(rate.n_rows),
                    ]
                })
                .collect(),
        );
        lines.push(format!("### {segment}"));
        lines.push(String::new());
        lines.push(render_markdown(&table, None));
        lines.push(String::new());
    }

    lines.join("\n")
}

pub(super) fn data_dictionary(report: &DictionaryReport) -> String {
    let wide = pivot_by_segment(&report.rates);
    let mut segment_columns = segments(&report.rates)
        .into_iter()
        .filter(|segment| *segment != ALL_SEGMENTS)
        .collect::<Vec<_>>();
    segment_columns.sort_unstable();

    let mut header = ["column", "type", "nullable", "description", "fill_rate_all"]
        .map(str::to_string)
        .to_vec();
    header.extend(segment_columns.iter().map(|segment| (*segment).to_string()));

    let mut entries = report.entries.iter().collect::<Vec<_>>();
    entries.sort_by(|left, right| left.column.cmp(&right.column));

    let rows = entries
        .into_iter()
        .map(|entry| {
            let by_segment = wide.get(entry.column.as_str());
            let rate_for = |segment: &str| -> Value {
                Value::from(by_segment.and_then(|rates| rates.get(segment).copied().flatten()))
            };
            let mut row = vec![
                Value::from(entry.column.as_str()),
                Value::from(entry.data_type.as_str()),
                Value::from(nullable_label(entry.nullable)),
                Value::from(entry.description),
                rate_for(ALL_SEGMENTS),
            ];
            row.extend(segment_columns.iter().map(|segment| rate_for(*segment)));
            row
        })
        .collect();
    let merged = ResultTable::with_rows(header, rows);

    [
        format!("# Data dictionary — `{}`", report.relation.name),
        String::new(),
        format!(
            "> Generated at: **{}**.",
            report.generated_at.format(GENERATED_AT_FORMAT)
        ),
        String::new(),
        "## Source".to_string(),
        String::new(),
        format!("- Relation: `{}`", report.relation),
        format!("- Columns: **{}**", report.entries.len()),
        String::new(),
        "## Fields (description + fill rate)".to_string(),
        String::new(),
        "_`fill_rate_*` = fraction of rows where the column is **non-null**. Values are a snapshot taken at generation time._".to_string(),
        String::new(),
        render_markdown(&merged, None),
        String::new(),
    ]
    .join("\n")
}

pub(super) fn column_fill_rates(report: &FillRateReport, csv_path: &Path, sample: usize) -> String {
    let mut highest = report.fills.iter().collect::<Vec<_>>();
    highest.sort_by(|left, right| match (left.fill_rate, right.fill_rate) {
        (Some(_), Some(_)) => compare_rates(right.fill_rate, left.fill_rate),
        _ => compare_rates(left.fill_rate, right.fill_rate),
    });
    let mut lowest = report.fills.iter().collect::<Vec<_>>();
    lowest.sort_by(|left, right| compare_rates(left.fill_rate, right.fill_rate));

    [
        format!("# Fill rate by column — {}", report.relation),
        String::new(),
        format!("- n_total: {}", report.n_total),
        format!("- Full CSV: `{}`", csv_path.display()),
        String::new(),
        "## Highest fill (sample)".to_string(),
        String::new(),
        render_markdown(&sample_table(&highest, sample), None),
        String::new(),
        "## Lowest fill (sample)".to_string(),
        String::new(),
        render_markdown(&sample_table(&lowest, sample), None),
        String::new(),
    ]
    .join("\n")
}

fn sample_table(fills: &[&ColumnFill], sample: usize) -> ResultTable {
    ResultTable::with_rows(
        ["COLUMN_NAME", "DATA_TYPE", "N_FILLED", "N_TOTAL", "FILL_RATE_%"]
            .map(str::to_string)
            .to_vec(),
        fills
            .iter()
            .take(sample)
            .map(|fill| {
                vec![
                    Value::from(fill.column.as_str()),
                    Value::from(fill.data_type.as_str()),
                    Value::Integer(fill.n_filled),
                    Value::Integer(fill.n_total),
                    Value::from(fill.fill_rate.map(percent)),
                ]
            })
            .collect(),
    )
}

fn percent(rate: f64) -> f64 {
    (rate * 10_000.0).round() / 100.0
}

//! Column dictionary and fill-rate reports over a warehouse relation.

mod dictionary;
mod document;
mod fill_rate;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::{
    ColumnInfo, RelationName, ReportError, Result, WarehouseClient, renderer::render_csv,
};

pub use dictionary::{DictionaryEntry, build_dictionary, describe_column, dictionary_table};
pub use fill_rate::{
    ALL_SEGMENTS, ColumnFill, FillRate, NULL_SEGMENT, column_fills_from_counts,
    column_fills_table, count_alias, emptiest_columns, fill_rate, fill_rates_from_counts,
    fill_rates_table, overall_fill_rate_sql, pivot_by_segment, segmented_fill_rate_sql, segments,
};

pub const DEFAULT_SEGMENT_COLUMN: &str = "c1_entity_type";
pub const DEFAULT_WORST_COLUMNS: usize = 15;
pub const DEFAULT_FILL_SAMPLE: usize = 12;

/// Column dictionary of a relation plus its fill rates split by a segment
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryReport {
    pub relation: RelationName,
    pub segment_column: String,
    pub entries: Vec<DictionaryEntry>,
    pub rates: Vec<FillRate>,
    pub generated_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryOutputs {
    pub fill_rates_csv: PathBuf,
    pub summary_markdown: PathBuf,
    pub data_dictionary_markdown: PathBuf,
}

impl DictionaryOutputs {
    #[must_use]
    pub fn new(relation: &RelationName, out_dir: &Path, docs_dir: &Path) -> Self {
        let stem = relation.name.to_lowercase();
        Self {
            fill_rates_csv: out_dir.join(format!("{stem}_fill_rates.csv")),
            summary_markdown: out_dir.join(format!("{stem}_dictionary.md")),
            data_dictionary_markdown: docs_dir.join(format!(
                "{}_DATA_DICTIONARY.md",
                relation.name.to_uppercase()
            )),
        }
    }
}

impl DictionaryReport {
    pub fn generate(
        client: &mut dyn WarehouseClient,
        relation: &RelationName,
        segment_column: &str,
        generated_at: DateTime<FixedOffset>,
    ) -> Result<Self> {
        let columns = describe_non_empty(client, relation)?;
        let segment = columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(segment_column))
            .ok_or_else(|| ReportError::MissingColumn {
                column: segment_column.to_string(),
            })?;

        let sql = segmented_fill_rate_sql(relation, &segment.name, &columns);
        let counts = client
            .execute(&sql)?
            .into_rows()
            .ok_or_else(|| ReportError::NoResultSet { sql: sql.clone() })?;
        let rates = fill_rates_from_counts(&counts, &columns)?;

        info!(
            %relation,
            columns = columns.len(),
            segments = counts.len(),
            "built dictionary report"
        );

        Ok(Self {
            relation: relation.clone(),
            segment_column: segment_column.to_lowercase(),
            entries: build_dictionary(&columns),
            rates,
            generated_at,
        })
    }

    #[must_use]
    pub fn fill_rates_csv(&self) -> String {
        render_csv(&fill_rates_table(&self.rates, &self.segment_column))
    }

    #[must_use]
    pub fn summary_markdown(&self, worst: usize) -> String {
        document::dictionary_summary(self, worst)
    }

    #[must_use]
    pub fn data_dictionary_markdown(&self) -> String {
        document::data_dictionary(self)
    }

    pub fn write(&self, outputs: &DictionaryOutputs, worst: usize) -> Result<Vec<PathBuf>> {
        write_file(&outputs.fill_rates_csv, &self.fill_rates_csv())?;
        write_file(&outputs.summary_markdown, &self.summary_markdown(worst))?;
        write_file(
            &outputs.data_dictionary_markdown,
            &self.data_dictionary_markdown(),
        )?;
        Ok(vec![
            outputs.data_dictionary_markdown.clone(),
            outputs.fill_rates_csv.clone(),
            outputs.summary_markdown.clone(),
        ])
    }
}

/// Overall per-column fill rates of a relation.
#[derive(Debug, Clone, PartialEq)]
pub struct FillRateReport {
    pub relation: RelationName,
    pub n_total: i64,
    pub fills: Vec<ColumnFill>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillRateOutputs {
    pub csv: PathBuf,
    pub markdown: PathBuf,
}

impl FillRateOutputs {
    #[must_use]
    pub fn new(relation: &RelationName, out_dir: &Path) -> Self {
        let stem = relation.name.to_lowercase();
        Self {
            csv: out_dir.join(format!("{stem}_column_fill_rates.csv")),
            markdown: out_dir.join(format!("{stem}_column_fill_rates.md")),
        }
    }
}

impl FillRateReport {
    pub fn generate(client: &mut dyn WarehouseClient, relation: &RelationName) -> Result<Self> {
        let columns = describe_non_empty(client, relation)?;
        let sql = overall_fill_rate_sql(relation, &columns);
        let counts = client
            .execute(&sql)?
            .into_rows()
            .ok_or_else(|| ReportError::NoResultSet { sql: sql.clone() })?;
        let fills = column_fills_from_counts(&counts, &columns)?;
        let n_total = fills.first().map_or(0, |fill| fill.n_total);

        info!(%relation, columns = fills.len(), n_total, "built fill-rate report");

        Ok(Self {
            relation: relation.clone(),
            n_total,
            fills,
        })
    }

    #[must_use]
    pub fn csv(&self) -> String {
        render_csv(&column_fills_table(&self.fills))
    }

    #[must_use]
    pub fn markdown(&self, csv_path: &Path, sample: usize) -> String {
        document::column_fill_rates(self, csv_path, sample)
    }

    pub fn write(&self, outputs: &FillRateOutputs, sample: usize) -> Result<Vec<PathBuf>> {
        write_file(&outputs.csv, &self.csv())?;
        write_file(&outputs.markdown, &self.markdown(&outputs.csv, sample))?;
        Ok(vec![outputs.csv.clone(), outputs.markdown.clone()])
    }
}

fn describe_non_empty(
    client: &mut dyn WarehouseClient,
    relation: &RelationName,
) -> Result<Vec<ColumnInfo>> {
    let columns = client.describe_columns(relation)?;
    if columns.is_empty() {
        return Err(ReportError::EmptyRelation {
            relation: relation.to_string(),
        }
        .into());
    }
    Ok(columns)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ReportError::io(parent, source))?;
    }
    fs::write(path, contents).map_err(|source| ReportError::io(path, source))?;
    Ok(())
}

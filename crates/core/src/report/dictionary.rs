use crate::{ColumnInfo, ResultTable, Value};

const ENTITY_KEY_COLUMNS: [&str; 4] = [
    "c1_entity_type",
    "c1_entity_id",
    "c1_created_at",
    "clinic_id",
];
const NEGATIVATION_PREFIXES: [&str; 3] = ["pefin_", "refin_", "protesto_"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// Lowercased column name.
    pub column: String,
    pub data_type: String,
    pub nullable: bool,
    pub description: &'static str,
}

#[must_use]
pub fn build_dictionary(columns: &[ColumnInfo]) -> Vec<DictionaryEntry> {
    columns
        .iter()
        .map(|column| DictionaryEntry {
            column: column.name.to_lowercase(),
            data_type: column.data_type.clone(),
            nullable: column.nullable,
            description: describe_column(&column.name),
        })
        .collect()
}

/// Heuristic description from naming conventions of the enriched borrower
/// tables. Rules are checked in order; the first match wins.
#[must_use]
pub fn describe_column(name: &str) -> &'static str {
    let c = name.to_lowercase();
    let c = c.as_str();

    if ENTITY_KEY_COLUMNS.contains(&c) {
        return "Entity key/timestamp in the funnel.";
    }
    if c.starts_with("c1_") {
        if c.contains("rejection") {
            return "Rejection/refusal reason.";
        }
        if c.contains("approved") {
            return "Approval signal/value (semantics defined in the core model).";
        }
        if c.contains("requested") {
            return "Requested/simulated amount.";
        }
        if c.contains("appeal") {
            return "Retry/appeal: canonical for simulations; inferred for legacy with prob/source.";
        }
        if c.contains("counter") {
            return "Counter-offer (proxy for simulations; canonical for legacy).";
        }
    }

    if c.starts_with("risk_capim") {
        return "Patient risk (0..5, -1, 9) and aggregation-safe versions.";
    }
    if c.starts_with("payment_default_risk") {
        return "Continuous probability/score (not the 0..5/-1/9 risk).";
    }
    if c.starts_with("clinic_credit_score") {
        return "Dynamic clinic risk/score (temporal join on score logs).";
    }
    if c.starts_with("financing_") {
        return "Financing conditions (term/installment/total debt min/max).";
    }
    if c.starts_with("borrower_") {
        return "Borrower registration/demographics (with *_source lineage).";
    }
    if c.contains("cadastro") {
        return "Lineage/feature of the registration/demographics axis.";
    }
    if c.ends_with("_count")
        || c.ends_with("_value")
        || c.contains("negativ")
        || NEGATIVATION_PREFIXES
            .iter()
            .any(|prefix| c.starts_with(prefix))
    {
        return "Negative records (counts/values) plus source.";
    }
    if c.contains("income") || c.starts_with("scr_") || c.contains("renda") {
        return "Income and proxies (including SCR) plus source.";
    }
    if c.ends_with("_score")
        || c.contains("score_source")
        || c.contains("boa_vista")
        || c.contains("serasa")
    {
        return "Bureau scores plus source.";
    }

    "Field of the official C1 model (see enrichment cores)."
}

#[must_use]
pub fn dictionary_table(entries: &[DictionaryEntry]) -> ResultTable {
    ResultTable::with_rows(
        ["column", "type", "nullable", "description"]
            .map(str::to_string)
            .to_vec(),
        entries
            .iter()
            .map(|entry| {
                vec![
                    Value::from(entry.column.as_str()),
                    Value::from(entry.data_type.as_str()),
                    Value::from(nullable_label(entry.nullable)),
                    Value::from(entry.description),
                ]
            })
            .collect(),
    )
}

pub(crate) const fn nullable_label(nullable: bool) -> &'static str {
    if nullable { "YES" } else { "NO" }
}

//! Turns raw rows into canonical records.

use crate::config::AnalyzerConfig;
use crate::types::{
    CanonicalRecord, ColumnMapping, Impact, LogicalField, RawRow, RawTable, RawValue,
};
use crate::util::{check_amount, parse_amount, Amount};
use std::collections::HashMap;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanOutput {
    pub records: Vec<CanonicalRecord>,
    /// Rows dropped because they had no usable category.
    pub discarded_count: usize,
    /// Non-blank impact values that were not recognized and became Medium.
    pub defaulted_impacts: usize,
    /// Savings cells that could not be read as a non-negative number.
    pub invalid_savings: usize,
    /// Most frequent explicit currency, or the configured default.
    pub currency: String,
}

pub fn clean(table: &RawTable, mapping: &ColumnMapping, config: &AnalyzerConfig) -> CleanOutput {
    let mut out = CleanOutput {
        currency: config.default_currency.clone(),
        ..CleanOutput::default()
    };
    let mut currency_counts: HashMap<String, usize> = HashMap::new();

    let column = |field: LogicalField| mapping.column(field);
    let text = |row: &RawRow, field: LogicalField| -> Option<String> {
        column(field).and_then(|c| row.text(c)).map(|t| t.into_owned())
    };

    for row in &table.rows {
        let Some(raw_category) = text(row, LogicalField::Category) else {
            out.discarded_count += 1;
            continue;
        };
        let category = config.canonical_category(&raw_category);

        let raw_impact = text(row, LogicalField::Impact);
        let impact = match raw_impact.as_deref().map(Impact::from_label) {
            Some(Some(level)) => level,
            Some(None) => {
                out.defaulted_impacts += 1;
                Impact::Medium
            }
            None => Impact::Medium,
        };

        let annual_savings = match column(LogicalField::AnnualSavings).and_then(|c| row.get(c)) {
            None => None,
            Some(value) => match read_amount(value) {
                Amount::Value(v) => Some(v),
                Amount::Blank => None,
                Amount::Invalid => {
                    out.invalid_savings += 1;
                    None
                }
            },
        };

        let currency = match text(row, LogicalField::Currency) {
            Some(c) => {
                *currency_counts.entry(c.clone()).or_insert(0) += 1;
                c
            }
            None => config.default_currency.clone(),
        };

        out.records.push(CanonicalRecord {
            category,
            impact,
            impact_specified: raw_impact.is_some(),
            recommendation: text(row, LogicalField::RecommendationText),
            resource_name: text(row, LogicalField::ResourceName)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            resource_type: text(row, LogicalField::ResourceType)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            resource_group: text(row, LogicalField::ResourceGroup)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            annual_savings,
            currency,
        });
    }

    if let Some(c) = dominant_currency(currency_counts) {
        out.currency = c;
    }

    tracing::debug!(
        kept = out.records.len(),
        discarded = out.discarded_count,
        defaulted_impacts = out.defaulted_impacts,
        invalid_savings = out.invalid_savings,
        "cleaned export rows"
    );
    debug_assert_eq!(out.records.len() + out.discarded_count, table.rows.len());
    out
}

fn read_amount(value: &RawValue) -> Amount {
    match value {
        RawValue::Empty => Amount::Blank,
        RawValue::Number(n) => check_amount(*n),
        RawValue::Text(s) => parse_amount(s),
    }
}

/// Most frequent label; ties go to the lexicographically smallest.
fn dominant_currency(counts: HashMap<String, usize>) -> Option<String> {
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_mapping;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::from_records(
            headers,
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn run(t: &RawTable) -> CleanOutput {
        let config = AnalyzerConfig::default();
        let mapping = build_mapping(&t.columns, &config.column_aliases);
        clean(t, &mapping, &config)
    }

    #[test]
    fn blank_category_rows_are_discarded() {
        let t = table(
            &["Category", "Impact"],
            &[&["Cost", "High"], &["  ", "Low"], &["Security", "Low"]],
        );
        let out = run(&t);
        assert_eq!(out.discarded_count, 1);
        assert_eq!(out.records.len(), 2);
    }

    #[test]
    fn missing_category_column_discards_everything() {
        let t = table(&["Impact"], &[&["High"], &["Low"]]);
        let out = run(&t);
        assert_eq!(out.discarded_count, 2);
        assert!(out.records.is_empty());
    }

    #[test]
    fn impact_defaults_to_medium() {
        let t = table(
            &["Category", "Impact"],
            &[&["Cost", "HIGH"], &["Cost", "urgent"], &["Cost", ""]],
        );
        let out = run(&t);
        let impacts: Vec<Impact> = out.records.iter().map(|r| r.impact).collect();
        assert_eq!(impacts, vec![Impact::High, Impact::Medium, Impact::Medium]);
        assert_eq!(out.defaulted_impacts, 1);
        assert!(out.records[1].impact_specified);
        assert!(!out.records[2].impact_specified);
    }

    #[test]
    fn savings_parse_failures_become_null() {
        let t = table(
            &["Category", "Savings"],
            &[&["Cost", "$1,200"], &["Cost", "n/a"], &["Cost", ""], &["Cost", "-5"]],
        );
        let out = run(&t);
        let savings: Vec<Option<f64>> = out.records.iter().map(|r| r.annual_savings).collect();
        assert_eq!(savings, vec![Some(1200.0), None, None, None]);
        assert_eq!(out.invalid_savings, 2);
        assert_eq!(out.discarded_count, 0);
    }

    #[test]
    fn numeric_cells_are_used_directly() {
        let mut row = RawRow::new();
        row.insert("Category", "Cost");
        row.insert("Savings", 99.5);
        let t = RawTable::from_rows(vec![row]);
        let out = run(&t);
        assert_eq!(out.records[0].annual_savings, Some(99.5));
    }

    #[test]
    fn dominant_currency_wins() {
        let t = table(
            &["Category", "Currency"],
            &[&["Cost", "EUR"], &["Cost", "EUR"], &["Cost", "USD"], &["Cost", ""]],
        );
        let out = run(&t);
        assert_eq!(out.currency, "EUR");
        assert_eq!(out.records[3].currency, "USD");
        assert_eq!(out.records[2].currency, "USD");
        assert_eq!(out.records[0].currency, "EUR");
    }

    #[test]
    fn currency_defaults_without_column() {
        let t = table(&["Category"], &[&["Cost"]]);
        assert_eq!(run(&t).currency, "USD");
    }

    #[test]
    fn resource_fields_default_to_unknown() {
        let t = table(&["Category", "Resource Name"], &[&["Cost", "vm-01"]]);
        let r = &run(&t).records[0];
        assert_eq!(r.resource_name, "vm-01");
        assert_eq!(r.resource_type, "Unknown");
        assert_eq!(r.resource_group, "Unknown");
        assert_eq!(r.recommendation, None);
    }

    #[test]
    fn category_labels_are_normalized() {
        let t = table(&["Category"], &[&["HighAvailability"], &["cost"]]);
        let out = run(&t);
        assert_eq!(out.records[0].category, "Reliability");
        assert_eq!(out.records[1].category, "Cost");
    }
}

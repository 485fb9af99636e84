use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use tabled::Tabled;

/// One raw cell as found in the export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Empty,
    Text(String),
    Number(f64),
}

impl RawValue {
    /// Trimmed textual form, `None` for blank cells.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            RawValue::Empty => None,
            RawValue::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(Cow::Borrowed(t))
                }
            }
            RawValue::Number(n) if n.is_finite() => Some(Cow::Owned(n.to_string())),
            RawValue::Number(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().is_none()
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(s.to_string())
        }
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        if s.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(s)
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

/// Source column name -> raw value, in export order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawRow(IndexMap<String, RawValue>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cell. The first value for a repeated column name is kept.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<RawValue>) {
        self.0.entry(column.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, column: &str) -> Option<&RawValue> {
        self.0.get(column)
    }

    /// Trimmed text of `column`, `None` when the column is absent or blank.
    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        self.get(column).and_then(RawValue::as_text)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// The parsed export: distinct column names plus rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Build a table from rows, collecting distinct column names in first-seen order.
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for c in row.columns() {
                if !columns.iter().any(|existing| existing == c) {
                    columns.push(c.to_string());
                }
            }
        }
        Self { columns, rows }
    }

    /// Build a table from a header line and positional records.
    ///
    /// Cells past the header width are dropped; short records are padded with
    /// empty cells.
    pub fn from_records<S: AsRef<str>>(headers: &[S], records: Vec<Vec<String>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for h in headers {
            let h = h.as_ref();
            if !columns.iter().any(|c| c == h) {
                columns.push(h.to_string());
            }
        }
        let rows = records
            .into_iter()
            .map(|cells| {
                let mut row = RawRow::new();
                let mut cells = cells.into_iter();
                for h in headers {
                    row.insert(h.as_ref(), cells.next().unwrap_or_default());
                }
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The logical fields the engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Category,
    Impact,
    RecommendationText,
    ResourceName,
    ResourceType,
    ResourceGroup,
    AnnualSavings,
    Currency,
}

impl LogicalField {
    pub const ALL: [LogicalField; 8] = [
        LogicalField::Category,
        LogicalField::Impact,
        LogicalField::RecommendationText,
        LogicalField::ResourceName,
        LogicalField::ResourceType,
        LogicalField::ResourceGroup,
        LogicalField::AnnualSavings,
        LogicalField::Currency,
    ];

    /// Fields that feed the data-quality score.
    pub const REQUIRED: [LogicalField; 3] = [
        LogicalField::Category,
        LogicalField::Impact,
        LogicalField::RecommendationText,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            LogicalField::Category => "category",
            LogicalField::Impact => "impact",
            LogicalField::RecommendationText => "recommendation_text",
            LogicalField::ResourceName => "resource_name",
            LogicalField::ResourceType => "resource_type",
            LogicalField::ResourceGroup => "resource_group",
            LogicalField::AnnualSavings => "annual_savings",
            LogicalField::Currency => "currency",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which source column each logical field resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnMapping(IndexMap<LogicalField, Option<String>>);

impl ColumnMapping {
    pub(crate) fn from_resolved(resolved: IndexMap<LogicalField, Option<String>>) -> Self {
        let mut fields = IndexMap::new();
        for field in LogicalField::ALL {
            fields.insert(field, resolved.get(&field).cloned().flatten());
        }
        Self(fields)
    }

    pub fn column(&self, field: LogicalField) -> Option<&str> {
        self.0.get(&field).and_then(|c| c.as_deref())
    }

    pub fn is_resolved(&self, field: LogicalField) -> bool {
        self.column(field).is_some()
    }

    pub fn resolved_count(&self) -> usize {
        self.0.values().filter(|c| c.is_some()).count()
    }

    /// Logical fields no source column matched.
    pub fn missing(&self) -> Vec<LogicalField> {
        self.0
            .iter()
            .filter(|(_, c)| c.is_none())
            .map(|(f, _)| *f)
            .collect()
    }
}

/// Canonical business-impact level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub const ALL: [Impact; 3] = [Impact::High, Impact::Medium, Impact::Low];

    /// Case-insensitive match of an export label.
    pub fn from_label(label: &str) -> Option<Impact> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Impact::High),
            "medium" | "moderate" => Some(Impact::Medium),
            "low" => Some(Impact::Low),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Low => "Low",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cleaned recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub category: String,
    pub impact: Impact,
    /// Whether the export carried a non-blank impact value for this row.
    pub impact_specified: bool,
    pub recommendation: Option<String>,
    pub resource_name: String,
    pub resource_type: String,
    pub resource_group: String,
    pub annual_savings: Option<f64>,
    pub currency: String,
}

/// Count and percentage per label, ordered for presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Distribution {
    pub counts: IndexMap<String, usize>,
    pub percentages: IndexMap<String, f64>,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn percentage(&self, label: &str) -> f64 {
        self.percentages.get(label).copied().unwrap_or(0.0)
    }

    /// Label with the highest count (ties resolved by ordering).
    pub fn top_label(&self) -> Option<&str> {
        self.counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(label, _)| label.as_str())
    }

    pub fn entries(&self) -> Vec<DistributionEntry> {
        self.counts
            .iter()
            .map(|(label, count)| DistributionEntry {
                label: label.clone(),
                count: *count,
                percentage: self.percentage(label),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DistributionEntry {
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Percentage")]
    #[tabled(rename = "Percentage")]
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_value_text_trims_and_blanks() {
        assert_eq!(RawValue::from("  Cost ").as_text().as_deref(), Some("Cost"));
        assert!(RawValue::from("   ").is_blank());
        assert!(RawValue::Empty.is_blank());
        assert_eq!(RawValue::Number(12.5).as_text().as_deref(), Some("12.5"));
        assert!(RawValue::Number(f64::NAN).is_blank());
    }

    #[test]
    fn from_records_pads_and_truncates() {
        let table = RawTable::from_records(
            &["Category", "Impact"],
            vec![
                vec!["Cost".into()],
                vec!["Security".into(), "High".into(), "extra".into()],
            ],
        );
        assert_eq!(table.columns, vec!["Category", "Impact"]);
        assert!(table.rows[0].get("Impact").unwrap().is_blank());
        assert_eq!(table.rows[1].text("Impact").as_deref(), Some("High"));
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn from_rows_collects_distinct_columns() {
        let a: RawRow = [("Category", "Cost")].into_iter().collect();
        let b: RawRow = [("Category", "Security"), ("Impact", "Low")]
            .into_iter()
            .collect();
        let table = RawTable::from_rows(vec![a, b]);
        assert_eq!(table.columns, vec!["Category", "Impact"]);
    }

    #[test]
    fn impact_labels_are_case_insensitive() {
        assert_eq!(Impact::from_label("HIGH"), Some(Impact::High));
        assert_eq!(Impact::from_label(" moderate "), Some(Impact::Medium));
        assert_eq!(Impact::from_label("low"), Some(Impact::Low));
        assert_eq!(Impact::from_label("urgent"), None);
    }

    #[test]
    fn distribution_top_label_prefers_count_then_order() {
        let mut d = Distribution::default();
        d.counts.insert("Cost".into(), 3);
        d.counts.insert("Security".into(), 5);
        d.counts.insert("Performance".into(), 5);
        assert_eq!(d.top_label(), Some("Performance"));
        assert_eq!(d.total(), 13);
    }
}

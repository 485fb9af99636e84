use crate::error::{AnalysisError, Result};
use crate::loader::LoadReport;
use crate::result::AnalysisResult;
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

pub const ANALYSIS_FILE: &str = "analysis.json";
pub const CATEGORY_FILE: &str = "category_summary.csv";
pub const IMPACT_FILE: &str = "impact_summary.csv";
pub const RESOURCE_TYPE_FILE: &str = "resource_types.csv";

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).map_err(|e| AnalysisError::Output(e.to_string()))?;
    for r in rows {
        wtr.serialize(r)
            .map_err(|e| AnalysisError::Output(e.to_string()))?;
    }
    wtr.flush().map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s =
        serde_json::to_string_pretty(value).map_err(|e| AnalysisError::Output(e.to_string()))?;
    std::fs::write(path, s).map_err(|e| AnalysisError::io(path, e))?;
    Ok(())
}

/// Write the JSON result and the CSV breakdowns into `dir`.
pub fn write_reports(dir: &Path, result: &AnalysisResult) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| AnalysisError::io(dir, e))?;
    let json = dir.join(ANALYSIS_FILE);
    write_json(&json, result)?;
    let categories = dir.join(CATEGORY_FILE);
    write_csv(&categories, &result.category_analysis.distribution.entries())?;
    let impacts = dir.join(IMPACT_FILE);
    write_csv(&impacts, &result.impact_analysis.distribution.entries())?;
    let types = dir.join(RESOURCE_TYPE_FILE);
    write_csv(&types, &result.resource_analysis.top_resource_types)?;
    Ok(vec![json, categories, impacts, types])
}

#[derive(Debug, Clone, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "Metric")]
    pub metric: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Human-readable headline figures for the console.
pub fn summary_rows(result: &AnalysisResult) -> Vec<SummaryRow> {
    let d = &result.dashboard_metrics;
    let savings_label = if d.has_cost_data {
        "Annual savings (reported)"
    } else {
        "Annual savings (estimated)"
    };
    let row = |metric: &'static str, value: String| SummaryRow { metric, value };
    vec![
        row("Recommendations", format_int(d.total_recommendations as u64)),
        row("High impact", format_int(d.high_impact_count as u64)),
        row(
            "Top category",
            d.top_category.clone().unwrap_or_else(|| "-".to_string()),
        ),
        row(
            savings_label,
            format!("{} {}", format_number(d.projected_annual_savings, 2), d.currency),
        ),
        row("Working hours", format_number(d.total_working_hours, 1)),
        row("Data quality", format_number(d.data_quality_score, 1)),
        row("Diversity index", format_number(d.diversity_index, 3)),
        row(
            "Advisor score",
            format!("{} ({:?})", format_number(d.advisor_score, 1), d.advisor_rating),
        ),
    ]
}

/// Console lines describing what a load kept and skipped.
pub fn load_notes(report: &LoadReport) -> Vec<String> {
    let mut notes = vec![format!(
        "Processing export... ({} rows read, {} kept)",
        format_int(report.total_rows as u64),
        format_int(report.kept_rows as u64)
    )];
    if report.parse_errors > 0 {
        notes.push(format!(
            "Note: {} rows skipped due to decode errors.",
            format_int(report.parse_errors as u64)
        ));
    }
    if report.truncated_rows > 0 {
        notes.push(format!(
            "Note: {} rows past the row cap were ignored.",
            format_int(report.truncated_rows as u64)
        ));
    }
    notes
}

pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", title);
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::analyze;
    use crate::types::RawTable;

    fn sample() -> AnalysisResult {
        let table = RawTable::from_records(
            &["Category", "Business Impact", "Type"],
            vec![
                vec!["Cost".into(), "High".into(), "vm".into()],
                vec!["Security".into(), "Low".into(), "storage".into()],
            ],
        );
        analyze(&table).unwrap()
    }

    #[test]
    fn reports_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_reports(dir.path(), &sample()).unwrap();
        assert_eq!(files.len(), 4);
        for f in &files {
            assert!(f.exists(), "{} missing", f.display());
        }
        let csv = std::fs::read_to_string(dir.path().join(IMPACT_FILE)).unwrap();
        assert!(csv.starts_with("Label,Count,Percentage"));
        assert!(csv.contains("High,1,50.0"));
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
        assert_eq!(json["basic_metrics"]["total_records"], 2);
        assert_eq!(
            json["cost_analysis"]["estimation_method"],
            "conservative_per_recommendation"
        );
    }

    #[test]
    fn load_notes_mention_skipped_rows() {
        let report = LoadReport {
            total_rows: 12_500,
            kept_rows: 10_000,
            parse_errors: 0,
            truncated_rows: 2_500,
        };
        let notes = load_notes(&report);
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0], "Processing export... (12,500 rows read, 10,000 kept)");
        assert!(notes[1].contains("2,500 rows past the row cap"));
    }

    #[test]
    fn summary_marks_estimated_savings() {
        let rows = summary_rows(&sample());
        assert!(rows
            .iter()
            .any(|r| r.metric == "Annual savings (estimated)" && r.value == "300.00 USD"));
    }
}

use crate::scoring::AdvisorRating;
use crate::types::{ColumnMapping, Distribution, DistributionEntry, LogicalField};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// The full analysis of one export. Every presentation layer reads this shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub basic_metrics: BasicMetrics,
    pub category_analysis: CategoryAnalysis,
    pub impact_analysis: ImpactAnalysis,
    pub resource_analysis: ResourceAnalysis,
    pub cost_analysis: CostAnalysis,
    pub time_analysis: TimeAnalysis,
    pub dashboard_metrics: DashboardMetrics,
    pub advisor_score: f64,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicMetrics {
    pub total_records: usize,
    pub data_quality_score: f64,
    pub analysis_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryAnalysis {
    #[serde(flatten)]
    pub distribution: Distribution,
    pub top_category: Option<String>,
    pub category_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImpactAnalysis {
    #[serde(flatten)]
    pub distribution: Distribution,
    /// Weighted mean impact (Low=1 .. High=3); 0 without records.
    pub priority_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResourceAnalysis {
    pub top_resource_types: Vec<DistributionEntry>,
    pub top_resource_groups: Vec<DistributionEntry>,
    /// Resources carrying the most recommendations.
    pub top_resources: Vec<DistributionEntry>,
    pub type_count: usize,
    pub group_count: usize,
    pub resource_count: usize,
    pub diversity_index: f64,
}

/// How the projected savings figure was obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMethod {
    ReportedSavings,
    #[default]
    ConservativePerRecommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostAnalysis {
    pub has_cost_data: bool,
    pub estimation_method: EstimationMethod,
    pub currency: String,
    /// Sum of reported savings; 0 without cost data.
    pub total_annual_savings: f64,
    /// Projected annual savings: the reported total, or the conservative estimate.
    pub annual_savings_estimate: f64,
    pub monthly_savings: f64,
    pub average_saving: f64,
    pub records_with_savings: usize,
    pub savings_by_category: IndexMap<String, f64>,
    pub total_implementation_cost: f64,
    pub roi_percentage: f64,
    pub payback_months: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeAnalysis {
    pub total_working_hours: f64,
    pub hours_by_impact: IndexMap<String, f64>,
    pub hours_by_category: IndexMap<String, f64>,
    /// `category hours * hourly_rate`.
    pub investment_by_category: IndexMap<String, f64>,
    pub hourly_rate: f64,
    pub estimated_days: f64,
    pub estimated_weeks: f64,
}

/// Flat view for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total_recommendations: usize,
    pub high_impact_count: usize,
    pub medium_impact_count: usize,
    pub low_impact_count: usize,
    pub high_impact_percentage: f64,
    pub top_category: Option<String>,
    pub category_count: usize,
    pub resource_type_count: usize,
    pub affected_resources: usize,
    pub has_cost_data: bool,
    pub currency: String,
    pub projected_annual_savings: f64,
    pub projected_monthly_savings: f64,
    pub total_working_hours: f64,
    pub estimated_days: f64,
    pub data_quality_score: f64,
    pub priority_score: f64,
    pub diversity_index: f64,
    pub advisor_score: f64,
    pub advisor_rating: AdvisorRating,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub analysis_timestamp: DateTime<Utc>,
    pub engine_version: &'static str,
    pub column_mapping: ColumnMapping,
    pub missing_columns: Vec<LogicalField>,
    pub total_rows: usize,
    pub rows_processed: usize,
    pub rows_discarded: usize,
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    /// Pretty JSON for storage or an API response.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn has_warnings(&self) -> bool {
        !self.metadata.warnings.is_empty() || !self.metadata.missing_columns.is_empty()
    }
}

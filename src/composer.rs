//! Runs the pipeline and packages every stage's output into one
//! [`AnalysisResult`].

use crate::aggregate::{distribution, top_entries, GroupBy};
use crate::cleaner::{clean, CleanOutput};
use crate::config::AnalyzerConfig;
use crate::error::{AnalysisError, InputErrorKind, Result};
use crate::estimator::{estimate_cost, estimate_time};
use crate::result::{
    AnalysisResult, BasicMetrics, CategoryAnalysis, CostAnalysis, DashboardMetrics,
    ImpactAnalysis, Metadata, ResourceAnalysis, TimeAnalysis,
};
use crate::schema::build_mapping;
use crate::scoring::{
    advisor_score, data_quality_score, diversity_index, priority_score, AdvisorRating,
};
use crate::types::{ColumnMapping, Impact, LogicalField, RawTable};
use chrono::{DateTime, Utc};

/// Version of the metric definitions stamped into `metadata`.
pub const ENGINE_VERSION: &str = "1.0";

/// Analyze an export with the default configuration.
///
/// Returns an error only for structurally unreadable input; every softer
/// problem is reported in `metadata.warnings` and `metadata.missing_columns`.
pub fn analyze(table: &RawTable) -> Result<AnalysisResult> {
    analyze_with(table, &AnalyzerConfig::default())
}

/// Analyze an export with an explicit configuration.
pub fn analyze_with(table: &RawTable, config: &AnalyzerConfig) -> Result<AnalysisResult> {
    if table.columns.is_empty() && !table.rows.is_empty() {
        return Err(AnalysisError::unreadable(
            "recommendation table",
            InputErrorKind::NoColumns {
                rows: table.rows.len(),
            },
        ));
    }
    Ok(compose(table, config, Utc::now()))
}

fn compose(table: &RawTable, config: &AnalyzerConfig, now: DateTime<Utc>) -> AnalysisResult {
    let mut warnings = Vec::new();

    let mapping = build_mapping(&table.columns, &config.column_aliases);
    let missing_columns = mapping.missing();
    if mapping.resolved_count() == 0 && !table.columns.is_empty() {
        warnings.push("no recognizable columns; nothing could be analyzed".to_string());
    }

    let cleaned = clean(table, &mapping, config);
    collect_clean_warnings(&cleaned, &mut warnings);
    let records = &cleaned.records;

    let categories = distribution(records, GroupBy::Category);
    let impacts = distribution(records, GroupBy::Impact);
    let types = distribution(records, GroupBy::ResourceType);
    let groups = distribution(records, GroupBy::ResourceGroup);
    let resources = distribution(records, GroupBy::ResourceName);

    let time = checked_time(estimate_time(records, config), config, &mut warnings);
    let implementation_cost: f64 = time.investment_by_category.values().sum();
    let cost = checked_cost(
        estimate_cost(records, &cleaned.currency, implementation_cost, config),
        &cleaned.currency,
        &mut warnings,
    );

    let quality = finite_or(
        data_quality_score(&mapping, records),
        0.0,
        "data quality score",
        &mut warnings,
    );
    let priority = finite_or(
        priority_score(&impacts, config),
        0.0,
        "priority score",
        &mut warnings,
    );
    let diversity = finite_or(diversity_index(&types), 0.0, "diversity index", &mut warnings);
    let advisor = finite_or(
        advisor_score(&impacts, config),
        config.neutral_advisor_score,
        "advisor score",
        &mut warnings,
    );

    let category_analysis = CategoryAnalysis {
        top_category: categories.top_label().map(String::from),
        category_count: categories.counts.len(),
        distribution: categories,
    };
    let resource_analysis = ResourceAnalysis {
        top_resource_types: top_entries(&types, config.top_n),
        top_resource_groups: top_entries(&groups, config.top_n),
        top_resources: top_entries(&resources, config.top_n),
        type_count: types.counts.len(),
        group_count: groups.counts.len(),
        resource_count: resources.counts.len(),
        diversity_index: diversity,
    };

    let dashboard_metrics = DashboardMetrics {
        total_recommendations: records.len(),
        high_impact_count: impacts.count(Impact::High.as_str()),
        medium_impact_count: impacts.count(Impact::Medium.as_str()),
        low_impact_count: impacts.count(Impact::Low.as_str()),
        high_impact_percentage: impacts.percentage(Impact::High.as_str()),
        top_category: category_analysis.top_category.clone(),
        category_count: category_analysis.category_count,
        resource_type_count: resource_analysis.type_count,
        affected_resources: resource_analysis.resource_count,
        has_cost_data: cost.has_cost_data,
        currency: cost.currency.clone(),
        projected_annual_savings: cost.annual_savings_estimate,
        projected_monthly_savings: cost.monthly_savings,
        total_working_hours: time.total_working_hours,
        estimated_days: time.estimated_days,
        data_quality_score: quality,
        priority_score: priority,
        diversity_index: diversity,
        advisor_score: advisor,
        advisor_rating: AdvisorRating::from_score(advisor),
    };

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "analysis completed with warnings");
    }
    tracing::debug!(
        records = records.len(),
        discarded = cleaned.discarded_count,
        advisor_score = advisor,
        "analysis composed"
    );

    AnalysisResult {
        basic_metrics: BasicMetrics {
            total_records: records.len(),
            data_quality_score: quality,
            analysis_timestamp: now,
        },
        category_analysis,
        impact_analysis: ImpactAnalysis {
            distribution: impacts,
            priority_score: priority,
        },
        resource_analysis,
        cost_analysis: cost,
        time_analysis: time,
        dashboard_metrics,
        advisor_score: advisor,
        metadata: metadata(table, mapping, missing_columns, &cleaned, warnings, now),
    }
}

fn metadata(
    table: &RawTable,
    column_mapping: ColumnMapping,
    missing_columns: Vec<LogicalField>,
    cleaned: &CleanOutput,
    warnings: Vec<String>,
    now: DateTime<Utc>,
) -> Metadata {
    Metadata {
        analysis_timestamp: now,
        engine_version: ENGINE_VERSION,
        column_mapping,
        missing_columns,
        total_rows: table.rows.len(),
        rows_processed: cleaned.records.len(),
        rows_discarded: cleaned.discarded_count,
        warnings,
    }
}

fn collect_clean_warnings(cleaned: &CleanOutput, warnings: &mut Vec<String>) {
    if cleaned.discarded_count > 0 {
        warnings.push(format!(
            "{} rows discarded: no usable category",
            cleaned.discarded_count
        ));
    }
    if cleaned.defaulted_impacts > 0 {
        warnings.push(format!(
            "{} unrecognized impact values defaulted to Medium",
            cleaned.defaulted_impacts
        ));
    }
    if cleaned.invalid_savings > 0 {
        warnings.push(format!(
            "{} savings values could not be parsed and were ignored",
            cleaned.invalid_savings
        ));
    }
}

fn finite_or(value: f64, fallback: f64, name: &str, warnings: &mut Vec<String>) -> f64 {
    if value.is_finite() {
        value
    } else {
        warnings.push(format!("{name} was not a finite number; reset to {fallback}"));
        fallback
    }
}

fn checked_time(
    time: TimeAnalysis,
    config: &AnalyzerConfig,
    warnings: &mut Vec<String>,
) -> TimeAnalysis {
    let scalars = [time.total_working_hours, time.estimated_days, time.estimated_weeks];
    let maps = time
        .hours_by_impact
        .values()
        .chain(time.hours_by_category.values())
        .chain(time.investment_by_category.values());
    if scalars.iter().chain(maps).all(|v| v.is_finite()) {
        return time;
    }
    warnings.push("effort estimate overflowed; time analysis reset to zero".to_string());
    TimeAnalysis {
        hourly_rate: config.hourly_rate,
        ..TimeAnalysis::default()
    }
}

fn checked_cost(cost: CostAnalysis, currency: &str, warnings: &mut Vec<String>) -> CostAnalysis {
    let scalars = [
        cost.total_annual_savings,
        cost.annual_savings_estimate,
        cost.monthly_savings,
        cost.average_saving,
        cost.total_implementation_cost,
        cost.roi_percentage,
        cost.payback_months,
    ];
    if scalars
        .iter()
        .chain(cost.savings_by_category.values())
        .all(|v| v.is_finite())
    {
        return cost;
    }
    warnings.push("savings total overflowed; cost analysis reset to zero".to_string());
    CostAnalysis {
        has_cost_data: cost.has_cost_data,
        estimation_method: cost.estimation_method,
        currency: currency.to_string(),
        ..CostAnalysis::default()
    }
}

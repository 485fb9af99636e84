//! Savings and remediation-effort estimates.

use crate::config::AnalyzerConfig;
use crate::result::{CostAnalysis, EstimationMethod, TimeAnalysis};
use crate::types::{CanonicalRecord, Impact};
use crate::util::{average, ratio};
use indexmap::IndexMap;

/// Working hours per impact level and per category.
pub fn estimate_time(records: &[CanonicalRecord], config: &AnalyzerConfig) -> TimeAnalysis {
    let mut hours_by_impact: IndexMap<String, f64> = Impact::ALL
        .iter()
        .map(|level| (level.as_str().to_string(), 0.0))
        .collect();
    let mut by_category: IndexMap<String, f64> = IndexMap::new();

    for r in records {
        let hours = config.effort_hours.weight(r.impact);
        *hours_by_impact.entry(r.impact.as_str().to_string()).or_insert(0.0) += hours;
        *by_category.entry(r.category.clone()).or_insert(0.0) += hours;
    }
    let hours_by_category = sorted_desc(by_category);
    let investment_by_category = hours_by_category
        .iter()
        .map(|(category, hours)| (category.clone(), hours * config.hourly_rate))
        .collect();

    let total_working_hours: f64 = hours_by_impact.values().sum();
    TimeAnalysis {
        total_working_hours,
        hours_by_impact,
        hours_by_category,
        investment_by_category,
        hourly_rate: config.hourly_rate,
        estimated_days: total_working_hours / config.hours_per_day,
        estimated_weeks: total_working_hours / config.hours_per_week,
    }
}

/// Projected savings. Uses reported savings when at least one record has them,
/// otherwise a fixed per-recommendation estimate.
///
/// `implementation_cost` is the total remediation investment, used for ROI and
/// payback figures.
pub fn estimate_cost(
    records: &[CanonicalRecord],
    currency: &str,
    implementation_cost: f64,
    config: &AnalyzerConfig,
) -> CostAnalysis {
    let reported: Vec<(&str, f64)> = records
        .iter()
        .filter_map(|r| r.annual_savings.map(|s| (r.category.as_str(), s)))
        .collect();

    let mut cost = CostAnalysis {
        currency: currency.to_string(),
        total_implementation_cost: implementation_cost,
        ..CostAnalysis::default()
    };

    if reported.is_empty() {
        cost.has_cost_data = false;
        cost.estimation_method = EstimationMethod::ConservativePerRecommendation;
        cost.annual_savings_estimate =
            records.len() as f64 * config.conservative_saving_per_recommendation;
    } else {
        let mut by_category: IndexMap<String, f64> = IndexMap::new();
        for (category, saving) in &reported {
            *by_category.entry((*category).to_string()).or_insert(0.0) += saving;
        }
        let amounts: Vec<f64> = reported.iter().map(|(_, s)| *s).collect();
        let total: f64 = amounts.iter().sum();
        cost.has_cost_data = true;
        cost.estimation_method = EstimationMethod::ReportedSavings;
        cost.total_annual_savings = total;
        cost.annual_savings_estimate = total;
        cost.records_with_savings = reported.len();
        cost.average_saving = average(&amounts);
        cost.savings_by_category = sorted_desc(by_category);
    }

    cost.monthly_savings = cost.annual_savings_estimate / 12.0;
    cost.roi_percentage = ratio(
        cost.annual_savings_estimate - implementation_cost,
        implementation_cost,
    ) * 100.0;
    cost.payback_months = ratio(implementation_cost, cost.monthly_savings);
    cost
}

fn sorted_desc(map: IndexMap<String, f64>) -> IndexMap<String, f64> {
    let mut entries: Vec<(String, f64)> = map.into_iter().collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, impact: Impact, savings: Option<f64>) -> CanonicalRecord {
        CanonicalRecord {
            category: category.into(),
            impact,
            impact_specified: true,
            recommendation: None,
            resource_name: "vm".into(),
            resource_type: "virtualmachines".into(),
            resource_group: "rg".into(),
            annual_savings: savings,
            currency: "USD".into(),
        }
    }

    #[test]
    fn reported_savings_are_summed_and_averaged() {
        let config = AnalyzerConfig::default();
        let records = vec![
            record("Cost", Impact::High, Some(1200.0)),
            record("Cost", Impact::Medium, Some(2400.0)),
            record("Security", Impact::Low, None),
        ];
        let cost = estimate_cost(&records, "USD", 0.0, &config);
        assert!(cost.has_cost_data);
        assert_eq!(cost.estimation_method, EstimationMethod::ReportedSavings);
        assert_eq!(cost.total_annual_savings, 3600.0);
        assert_eq!(cost.average_saving, 1800.0);
        assert_eq!(cost.monthly_savings, 300.0);
        assert_eq!(cost.records_with_savings, 2);
        assert_eq!(cost.savings_by_category.get("Cost"), Some(&3600.0));
        assert_eq!(cost.roi_percentage, 0.0);
    }

    #[test]
    fn conservative_estimate_without_cost_data() {
        let config = AnalyzerConfig::default();
        let records: Vec<_> = (0..100).map(|_| record("Cost", Impact::Low, None)).collect();
        let cost = estimate_cost(&records, "USD", 0.0, &config);
        assert!(!cost.has_cost_data);
        assert_eq!(
            cost.estimation_method,
            EstimationMethod::ConservativePerRecommendation
        );
        assert_eq!(cost.annual_savings_estimate, 15000.0);
        assert_eq!(cost.total_annual_savings, 0.0);
        assert_eq!(cost.monthly_savings, 1250.0);
    }

    #[test]
    fn roi_and_payback_follow_implementation_cost() {
        let config = AnalyzerConfig::default();
        let records = vec![record("Cost", Impact::High, Some(1200.0))];
        let cost = estimate_cost(&records, "EUR", 600.0, &config);
        assert_eq!(cost.currency, "EUR");
        assert_eq!(cost.roi_percentage, 100.0);
        assert_eq!(cost.payback_months, 6.0);
    }

    #[test]
    fn effort_hours_follow_impact_weights() {
        let config = AnalyzerConfig::default();
        let records = vec![
            record("Cost", Impact::High, None),
            record("Cost", Impact::Medium, None),
            record("Security", Impact::Low, None),
            record("Security", Impact::Low, None),
        ];
        let time = estimate_time(&records, &config);
        assert_eq!(time.total_working_hours, 4.0);
        assert_eq!(time.hours_by_impact["High"], 2.0);
        assert_eq!(time.hours_by_impact["Low"], 1.0);
        assert_eq!(time.estimated_days, 0.5);
        assert_eq!(time.estimated_weeks, 0.1);
        assert_eq!(time.hours_by_category["Cost"], 3.0);
        assert_eq!(time.investment_by_category["Cost"], 225.0);
        assert_eq!(time.investment_by_category["Security"], 75.0);
    }

    #[test]
    fn hourly_rate_comes_from_config() {
        let config = AnalyzerConfig {
            hourly_rate: 50.0,
            ..AnalyzerConfig::default()
        };
        let time = estimate_time(&[record("Cost", Impact::High, None)], &config);
        assert_eq!(time.investment_by_category["Cost"], 100.0);
        assert_eq!(time.hourly_rate, 50.0);
    }

    #[test]
    fn empty_records_yield_zero_effort() {
        let time = estimate_time(&[], &AnalyzerConfig::default());
        assert_eq!(time.total_working_hours, 0.0);
        assert_eq!(time.hours_by_impact.len(), 3);
        assert!(time.hours_by_category.is_empty());
    }
}

//! Data-quality, priority, diversity and advisor scores.

use crate::config::AnalyzerConfig;
use crate::types::{CanonicalRecord, ColumnMapping, Distribution, Impact, LogicalField};
use serde::Serialize;

/// `(resolved required fields / 3) * completeness * 100`.
///
/// Completeness is the share of records with a value in every resolved
/// required field (category, impact, recommendation text).
pub fn data_quality_score(mapping: &ColumnMapping, records: &[CanonicalRecord]) -> f64 {
    let resolved: Vec<LogicalField> = LogicalField::REQUIRED
        .into_iter()
        .filter(|f| mapping.is_resolved(*f))
        .collect();
    if resolved.is_empty() || records.is_empty() {
        return 0.0;
    }
    let complete = records
        .iter()
        .filter(|r| resolved.iter().all(|f| has_value(r, *f)))
        .count();
    let completeness = complete as f64 / records.len() as f64;
    let coverage = resolved.len() as f64 / LogicalField::REQUIRED.len() as f64;
    (coverage * completeness * 100.0).clamp(0.0, 100.0)
}

fn has_value(r: &CanonicalRecord, field: LogicalField) -> bool {
    match field {
        LogicalField::Category => !r.category.is_empty(),
        LogicalField::Impact => r.impact_specified,
        LogicalField::RecommendationText => r.recommendation.is_some(),
        _ => true,
    }
}

/// Weighted mean impact over an impact distribution; 0 when empty.
pub fn priority_score(impacts: &Distribution, config: &AnalyzerConfig) -> f64 {
    let total = impacts.total();
    if total == 0 {
        return 0.0;
    }
    let weighted: f64 = Impact::ALL
        .iter()
        .map(|level| impacts.count(level.as_str()) as f64 * config.priority_weights.weight(*level))
        .sum();
    weighted / total as f64
}

/// Shannon entropy (natural log) of a distribution's counts.
pub fn diversity_index(dist: &Distribution) -> f64 {
    let total = dist.total();
    if total == 0 {
        return 0.0;
    }
    let entropy: f64 = dist
        .counts
        .values()
        .filter(|n| **n > 0)
        .map(|n| {
            let p = *n as f64 / total as f64;
            -p * p.ln()
        })
        .sum();
    // A single label yields -0.0
    entropy.max(0.0)
}

/// Composite backlog health in [0, 100]; higher means fewer high and medium
/// impact findings relative to the total.
pub fn advisor_score(impacts: &Distribution, config: &AnalyzerConfig) -> f64 {
    let total = impacts.total();
    if total == 0 {
        return config.neutral_advisor_score;
    }
    let high = impacts.count(Impact::High.as_str()) as f64 / total as f64;
    let medium = impacts.count(Impact::Medium.as_str()) as f64 / total as f64;
    let score = 100.0
        - high * config.advisor_penalties.high
        - medium * config.advisor_penalties.medium;
    score.clamp(0.0, 100.0)
}

/// Band of an advisor score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdvisorRating {
    /// 85-100
    Excellent,
    /// 70-84
    Good,
    /// 50-69
    Fair,
    /// Below 50
    Poor,
}

impl AdvisorRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Excellent
        } else if score >= 70.0 {
            Self::Good
        } else if score >= 50.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::from_counts;
    use crate::config::ColumnAliases;
    use crate::schema::build_mapping;

    fn impacts(high: usize, medium: usize, low: usize) -> Distribution {
        from_counts(vec![
            ("High".into(), high),
            ("Medium".into(), medium),
            ("Low".into(), low),
        ])
    }

    fn record(impact_specified: bool, recommendation: Option<&str>) -> CanonicalRecord {
        CanonicalRecord {
            category: "Cost".into(),
            impact: Impact::Medium,
            impact_specified,
            recommendation: recommendation.map(String::from),
            resource_name: "vm".into(),
            resource_type: "vm".into(),
            resource_group: "rg".into(),
            annual_savings: None,
            currency: "USD".into(),
        }
    }

    #[test]
    fn priority_score_is_weighted_mean() {
        let config = AnalyzerConfig::default();
        assert_eq!(priority_score(&impacts(40, 40, 20), &config), 2.2);
        assert_eq!(priority_score(&impacts(1, 0, 0), &config), 3.0);
        assert_eq!(priority_score(&Distribution::default(), &config), 0.0);
    }

    #[test]
    fn advisor_score_penalizes_high_and_medium() {
        let config = AnalyzerConfig::default();
        // 100 - 0.4*60 - 0.4*20
        assert!((advisor_score(&impacts(40, 40, 20), &config) - 68.0).abs() < 1e-9);
        assert_eq!(advisor_score(&impacts(0, 0, 5), &config), 100.0);
        assert_eq!(advisor_score(&impacts(5, 0, 0), &config), 40.0);
        assert_eq!(advisor_score(&Distribution::default(), &config), 50.0);
    }

    #[test]
    fn advisor_score_clamps_with_heavy_penalties() {
        let config = AnalyzerConfig {
            advisor_penalties: crate::config::AdvisorPenalties {
                high: 300.0,
                medium: 0.0,
            },
            ..AnalyzerConfig::default()
        };
        assert_eq!(advisor_score(&impacts(1, 0, 0), &config), 0.0);
    }

    #[test]
    fn diversity_is_zero_for_one_type() {
        let one = from_counts(vec![("vm".into(), 7)]);
        assert_eq!(diversity_index(&one), 0.0);
        assert_eq!(diversity_index(&Distribution::default()), 0.0);
    }

    #[test]
    fn diversity_of_even_split_is_ln_n() {
        let even = from_counts(vec![("a".into(), 5), ("b".into(), 5)]);
        assert!((diversity_index(&even) - 2f64.ln()).abs() < 1e-12);
        let skewed = from_counts(vec![("a".into(), 9), ("b".into(), 1)]);
        assert!(diversity_index(&skewed) > 0.0);
        assert!(diversity_index(&skewed) < diversity_index(&even));
    }

    #[test]
    fn quality_score_scales_with_coverage_and_completeness() {
        let aliases = ColumnAliases::default();
        let full = build_mapping(&["Category", "Impact", "Recommendation"], &aliases);
        let records = vec![record(true, Some("Resize")), record(true, None)];
        assert_eq!(data_quality_score(&full, &records), 50.0);

        let partial = build_mapping(&["Category", "Impact"], &aliases);
        let records = vec![record(true, None), record(true, None)];
        let score = data_quality_score(&partial, &records);
        assert!((score - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn defaulted_impact_counts_as_incomplete() {
        let aliases = ColumnAliases::default();
        let full = build_mapping(&["Category", "Impact", "Recommendation"], &aliases);
        let records = vec![
            record(false, Some("Resize")),
            record(true, Some("Resize")),
            record(true, Some("Enable MFA")),
            record(false, Some("Use zones")),
        ];
        assert_eq!(data_quality_score(&full, &records), 50.0);
        let all_defaulted = vec![record(false, Some("Resize"))];
        assert_eq!(data_quality_score(&full, &all_defaulted), 0.0);
    }

    #[test]
    fn quality_score_is_zero_without_records() {
        let aliases = ColumnAliases::default();
        let full = build_mapping(&["Category", "Impact", "Recommendation"], &aliases);
        assert_eq!(data_quality_score(&full, &[]), 0.0);
    }

    #[test]
    fn ratings_band_scores() {
        assert_eq!(AdvisorRating::from_score(92.0), AdvisorRating::Excellent);
        assert_eq!(AdvisorRating::from_score(70.0), AdvisorRating::Good);
        assert_eq!(AdvisorRating::from_score(50.0), AdvisorRating::Fair);
        assert_eq!(AdvisorRating::from_score(10.0), AdvisorRating::Poor);
    }
}

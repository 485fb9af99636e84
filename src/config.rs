//! Analyzer configuration.
//!
//! Column aliases, label aliases and every heuristic constant the engine uses
//! live here so callers and tests can substitute their own values.

use crate::error::{AnalysisError, Result};
use crate::types::{Impact, LogicalField};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub column_aliases: ColumnAliases,
    /// Export label -> canonical category. Keys match ignoring case, spaces,
    /// underscores and hyphens.
    pub category_aliases: IndexMap<String, String>,
    /// Bucket for labels absent from `category_aliases`; `None` keeps the label.
    pub unknown_category: Option<String>,
    /// Working hours per recommendation.
    pub effort_hours: ImpactWeights,
    pub priority_weights: ImpactWeights,
    pub advisor_penalties: AdvisorPenalties,
    pub neutral_advisor_score: f64,
    pub hourly_rate: f64,
    /// Annual saving assumed per recommendation when the export has no cost data.
    pub conservative_saving_per_recommendation: f64,
    pub default_currency: String,
    pub top_n: usize,
    pub hours_per_day: f64,
    pub hours_per_week: f64,
    pub max_rows: Option<usize>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let category_aliases = [
            ("Cost", "Cost"),
            ("Security", "Security"),
            ("Reliability", "Reliability"),
            ("HighAvailability", "Reliability"),
            ("OperationalExcellence", "Operational Excellence"),
            ("Performance", "Performance"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            column_aliases: ColumnAliases::default(),
            category_aliases,
            unknown_category: None,
            effort_hours: ImpactWeights {
                high: 2.0,
                medium: 1.0,
                low: 0.5,
            },
            priority_weights: ImpactWeights {
                high: 3.0,
                medium: 2.0,
                low: 1.0,
            },
            advisor_penalties: AdvisorPenalties::default(),
            neutral_advisor_score: 50.0,
            hourly_rate: 75.0,
            conservative_saving_per_recommendation: 150.0,
            default_currency: "USD".to_string(),
            top_n: 10,
            hours_per_day: 8.0,
            hours_per_week: 40.0,
            max_rows: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load a YAML configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validated()
    }

    /// Return `self` if valid, otherwise a `Config` error listing every issue.
    pub fn validated(self) -> Result<Self> {
        let issues = self.validate();
        if issues.is_empty() {
            return Ok(self);
        }
        let joined = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(AnalysisError::Config(joined))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let non_negative = [
            ("effort_hours.high", self.effort_hours.high),
            ("effort_hours.medium", self.effort_hours.medium),
            ("effort_hours.low", self.effort_hours.low),
            ("priority_weights.high", self.priority_weights.high),
            ("priority_weights.medium", self.priority_weights.medium),
            ("priority_weights.low", self.priority_weights.low),
            ("advisor_penalties.high", self.advisor_penalties.high),
            ("advisor_penalties.medium", self.advisor_penalties.medium),
            ("hourly_rate", self.hourly_rate),
            (
                "conservative_saving_per_recommendation",
                self.conservative_saving_per_recommendation,
            ),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                issues.push(ConfigIssue::new(
                    field,
                    format!("must be a finite non-negative number, got {value}"),
                ));
            }
        }
        for (field, value) in [
            ("hours_per_day", self.hours_per_day),
            ("hours_per_week", self.hours_per_week),
        ] {
            if !value.is_finite() || value <= 0.0 {
                issues.push(ConfigIssue::new(
                    field,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }
        if !(0.0..=100.0).contains(&self.neutral_advisor_score) {
            issues.push(ConfigIssue::new(
                "neutral_advisor_score",
                "must be within 0-100",
            ));
        }
        if self.top_n == 0 {
            issues.push(ConfigIssue::new("top_n", "must be at least 1"));
        }
        if self.default_currency.trim().is_empty() {
            issues.push(ConfigIssue::new("default_currency", "must not be blank"));
        }
        if self.max_rows == Some(0) {
            issues.push(ConfigIssue::new("max_rows", "must be at least 1 when set"));
        }
        for field in LogicalField::ALL {
            if self.column_aliases.aliases(field).is_empty() {
                issues.push(ConfigIssue::new(
                    format!("column_aliases.{field}"),
                    "needs at least one alias",
                ));
            }
        }
        issues
    }

    /// Canonical category for an export label.
    pub fn canonical_category(&self, label: &str) -> String {
        let key = category_key(label);
        self.category_aliases
            .iter()
            .find(|(alias, _)| category_key(alias) == key)
            .map(|(_, canonical)| canonical.clone())
            .or_else(|| self.unknown_category.clone())
            .unwrap_or_else(|| label.to_string())
    }
}

fn category_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Accepted source column names per logical field, in priority order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub category: Vec<String>,
    pub impact: Vec<String>,
    pub recommendation_text: Vec<String>,
    pub resource_name: Vec<String>,
    pub resource_type: Vec<String>,
    pub resource_group: Vec<String>,
    pub annual_savings: Vec<String>,
    pub currency: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            category: names(&["Category", "Categoria", "Type"]),
            impact: names(&["Business Impact", "Impact", "Priority"]),
            recommendation_text: names(&["Recommendation", "Description", "Title"]),
            resource_name: names(&["Resource Name", "Resource"]),
            resource_type: names(&["Type", "Resource Type"]),
            resource_group: names(&["Resource Group"]),
            annual_savings: names(&[
                "Potential Annual Cost Savings",
                "Savings",
                "Monthly Savings",
            ]),
            currency: names(&["Potential Cost Savings Currency", "Currency"]),
        }
    }
}

impl ColumnAliases {
    pub fn aliases(&self, field: LogicalField) -> &[String] {
        match field {
            LogicalField::Category => &self.category,
            LogicalField::Impact => &self.impact,
            LogicalField::RecommendationText => &self.recommendation_text,
            LogicalField::ResourceName => &self.resource_name,
            LogicalField::ResourceType => &self.resource_type,
            LogicalField::ResourceGroup => &self.resource_group,
            LogicalField::AnnualSavings => &self.annual_savings,
            LogicalField::Currency => &self.currency,
        }
    }
}

/// A number per impact level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactWeights {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl ImpactWeights {
    pub const fn weight(&self, impact: Impact) -> f64 {
        match impact {
            Impact::High => self.high,
            Impact::Medium => self.medium,
            Impact::Low => self.low,
        }
    }
}

/// Points removed from the advisor score per unit of impact ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisorPenalties {
    pub high: f64,
    pub medium: f64,
}

impl Default for AdvisorPenalties {
    fn default() -> Self {
        Self {
            high: 60.0,
            medium: 20.0,
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

//! Resolves export column names to logical fields.

use crate::config::ColumnAliases;
use crate::types::{ColumnMapping, LogicalField};
use indexmap::IndexMap;

/// Build the column mapping for a table's columns.
///
/// For each field the alias list is scanned in priority order and the first
/// alias matching any column (trimmed, case-insensitive) wins, so the result
/// does not depend on the column order of the export.
pub fn build_mapping<S: AsRef<str>>(columns: &[S], aliases: &ColumnAliases) -> ColumnMapping {
    let normalized: Vec<(String, &str)> = columns
        .iter()
        .map(|c| (c.as_ref().trim().to_lowercase(), c.as_ref()))
        .collect();

    let mut resolved = IndexMap::new();
    for field in LogicalField::ALL {
        let hit = aliases.aliases(field).iter().find_map(|alias| {
            let alias = alias.trim().to_lowercase();
            normalized
                .iter()
                .find(|(name, _)| *name == alias)
                .map(|(_, original)| (*original).to_string())
        });
        if hit.is_none() {
            tracing::debug!("no column found for logical field {field}");
        }
        resolved.insert(field, hit);
    }
    ColumnMapping::from_resolved(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(columns: &[&str]) -> ColumnMapping {
        build_mapping(columns, &ColumnAliases::default())
    }

    #[test]
    fn azure_export_headers_resolve() {
        let m = mapping(&[
            "Category",
            "Business Impact",
            "Recommendation",
            "Resource Name",
            "Type",
            "Resource Group",
            "Potential Annual Cost Savings",
            "Potential Cost Savings Currency",
        ]);
        assert_eq!(m.column(LogicalField::Category), Some("Category"));
        assert_eq!(m.column(LogicalField::Impact), Some("Business Impact"));
        assert_eq!(m.column(LogicalField::ResourceType), Some("Type"));
        assert_eq!(
            m.column(LogicalField::AnnualSavings),
            Some("Potential Annual Cost Savings")
        );
        assert!(m.missing().is_empty());
        assert_eq!(m.resolved_count(), 8);
    }

    #[test]
    fn matching_is_case_insensitive_and_keeps_source_name() {
        let m = mapping(&["  CATEGORIA ", "impact", "DESCRIPTION"]);
        assert_eq!(m.column(LogicalField::Category), Some("  CATEGORIA "));
        assert_eq!(m.column(LogicalField::Impact), Some("impact"));
        assert_eq!(m.column(LogicalField::RecommendationText), Some("DESCRIPTION"));
    }

    #[test]
    fn alias_priority_beats_column_order() {
        let forward = mapping(&["Priority", "Business Impact"]);
        let backward = mapping(&["Business Impact", "Priority"]);
        assert_eq!(forward, backward);
        assert_eq!(forward.column(LogicalField::Impact), Some("Business Impact"));
    }

    #[test]
    fn type_falls_back_to_category_when_no_category_column() {
        let m = mapping(&["Type", "Impact"]);
        assert_eq!(m.column(LogicalField::Category), Some("Type"));
        assert_eq!(m.column(LogicalField::ResourceType), Some("Type"));
    }

    #[test]
    fn unmatched_fields_are_missing() {
        let m = mapping(&["Foo", "Bar"]);
        assert_eq!(m.resolved_count(), 0);
        assert_eq!(m.missing(), LogicalField::ALL.to_vec());
    }
}

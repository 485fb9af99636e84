use crate::types::{CanonicalRecord, Distribution, DistributionEntry, Impact};
use std::collections::HashMap;

/// Field a distribution is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Category,
    Impact,
    ResourceName,
    ResourceType,
    ResourceGroup,
}

impl GroupBy {
    fn key(self, r: &CanonicalRecord) -> &str {
        match self {
            GroupBy::Category => &r.category,
            GroupBy::Impact => r.impact.as_str(),
            GroupBy::ResourceName => &r.resource_name,
            GroupBy::ResourceType => &r.resource_type,
            GroupBy::ResourceGroup => &r.resource_group,
        }
    }
}

/// Count records per label, ordered by count (desc) then label (asc).
///
/// Impact distributions always list High, Medium and Low in that order.
pub fn distribution(records: &[CanonicalRecord], by: GroupBy) -> Distribution {
    if records.is_empty() {
        return Distribution::default();
    }
    if by == GroupBy::Impact {
        return impact_distribution(records);
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(by.key(r)).or_insert(0) += 1;
    }
    let mut ordered: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    from_counts(ordered)
}

fn impact_distribution(records: &[CanonicalRecord]) -> Distribution {
    let counts = Impact::ALL
        .iter()
        .map(|level| {
            let n = records.iter().filter(|r| r.impact == *level).count();
            (level.as_str().to_string(), n)
        })
        .collect();
    from_counts(counts)
}

/// Build a distribution from ordered counts.
///
/// Each percentage is the count's share rounded to one decimal. When the
/// rounded tenths do not add up to exactly 100, single tenths are moved
/// between the labels with the largest rounding error until they do. Ties go
/// to the label listed first.
pub fn from_counts(counts: Vec<(String, usize)>) -> Distribution {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Distribution::default();
    }
    let total = total as u64;

    // Work in tenths of a percent to keep the arithmetic exact.
    let mut tenths: Vec<u64> = counts
        .iter()
        .map(|(_, n)| (2 * *n as u64 * 1000 + total) / (2 * total))
        .collect();
    // Scaled rounding error: exact share minus assigned tenths, times `total`.
    let errors: Vec<i64> = counts
        .iter()
        .zip(&tenths)
        .map(|((_, n), t)| *n as i64 * 1000 - (*t * total) as i64)
        .collect();

    let assigned: i64 = tenths.iter().sum::<u64>() as i64;
    let drift = assigned - 1000;
    if drift != 0 {
        let mut order: Vec<usize> = (0..counts.len()).collect();
        if drift > 0 {
            // Rounded up the most: most negative error first.
            order.sort_by_key(|&i| (errors[i], i));
            let mut remaining = drift as usize;
            for &i in &order {
                if remaining == 0 {
                    break;
                }
                if tenths[i] > 0 {
                    tenths[i] -= 1;
                    remaining -= 1;
                }
            }
        } else {
            order.sort_by_key(|&i| (std::cmp::Reverse(errors[i]), i));
            for &i in order.iter().take(drift.unsigned_abs() as usize) {
                tenths[i] += 1;
            }
        }
        tracing::debug!(drift, "rebalanced rounded percentages");
    }

    let mut dist = Distribution::default();
    for ((label, count), t) in counts.into_iter().zip(tenths) {
        dist.percentages.insert(label.clone(), t as f64 / 10.0);
        dist.counts.insert(label, count);
    }
    dist
}

/// The first `n` entries of a distribution.
pub fn top_entries(dist: &Distribution, n: usize) -> Vec<DistributionEntry> {
    dist.entries().into_iter().take(n).collect()
}

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::types::{CuttingPlan, Inventory};

/// A distinct way of cutting a bar and how many bars were cut that way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// `(length, count)` in the order the lengths appear on the bar.
    pub groups: Vec<(u32, u32)>,
    pub label: String,
    pub bars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternSummary {
    /// Most used pattern first.
    #[serde(rename = "cuts", serialize_with = "serialize_patterns")]
    pub patterns: Vec<Pattern>,
    pub total_bars: usize,
    pub total_waste: u64,
    pub total_pieces_cut: u64,
    pub leftover: Inventory,
}

/// Groups equal lengths, keeping the order in which each length first appears.
pub fn group_lengths(pieces: &[u32]) -> Vec<(u32, u32)> {
    let mut groups: Vec<(u32, u32)> = Vec::new();
    for &length in pieces {
        match groups.iter_mut().find(|(l, _)| *l == length) {
            Some((_, count)) => *count += 1,
            None => groups.push((length, 1)),
        }
    }
    groups
}

/// Renders groups as e.g. `1200 x 3, 800`.
pub fn pattern_label(groups: &[(u32, u32)]) -> String {
    groups
        .iter()
        .map(|&(length, count)| {
            if count > 1 {
                format!("{} x {}", length, count)
            } else {
                length.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn aggregate(plan: &CuttingPlan) -> PatternSummary {
    let mut patterns: Vec<Pattern> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for bar in &plan.bars {
        let groups = group_lengths(&bar.pieces);
        let label = pattern_label(&groups);
        match index.get(&label) {
            Some(&i) => patterns[i].bars += 1,
            None => {
                index.insert(label.clone(), patterns.len());
                patterns.push(Pattern {
                    groups,
                    label,
                    bars: 1,
                });
            }
        }
    }

    // stable: equal counts keep first-seen order
    patterns.sort_by(|a, b| b.bars.cmp(&a.bars));

    PatternSummary {
        total_bars: patterns.iter().map(|p| p.bars).sum(),
        total_waste: plan.metrics.total_waste,
        total_pieces_cut: plan.metrics.total_pieces_cut,
        leftover: plan.leftover.clone(),
        patterns,
    }
}

fn serialize_patterns<S: Serializer>(
    patterns: &[Pattern],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(patterns.len()))?;
    for p in patterns {
        map.serialize_entry(&p.label, &p.bars)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BarCut, PieceType, PlanMetrics};

    fn plan_of(bars: &[&[u32]], bar_length: u32) -> CuttingPlan {
        let bars: Vec<BarCut> = bars
            .iter()
            .map(|pieces| BarCut {
                pieces: pieces.to_vec(),
                waste: bar_length - pieces.iter().sum::<u32>(),
            })
            .collect();
        let metrics = PlanMetrics {
            total_waste: bars.iter().map(|b| b.waste as u64).sum(),
            total_pieces_cut: bars.iter().map(|b| b.pieces.len() as u64).sum(),
        };
        CuttingPlan {
            bar_length,
            bars,
            metrics,
            leftover: Inventory::new([PieceType::new(700, 1)]),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(pattern_label(&group_lengths(&[100, 100])), "100 x 2");
        assert_eq!(pattern_label(&group_lengths(&[60, 40])), "60, 40");
        assert_eq!(
            pattern_label(&group_lengths(&[90, 50, 90, 10])),
            "90 x 2, 50, 10"
        );
        assert_eq!(pattern_label(&[]), "");
    }

    #[test]
    fn test_counts_sorted_descending_ties_first_seen() {
        let plan = plan_of(
            &[&[60, 40], &[100, 100], &[70], &[100, 100], &[70], &[100, 100]],
            200,
        );
        let summary = aggregate(&plan);
        let got: Vec<(&str, usize)> = summary
            .patterns
            .iter()
            .map(|p| (p.label.as_str(), p.bars))
            .collect();
        assert_eq!(got, vec![("100 x 2", 3), ("70", 2), ("60, 40", 1)]);
        assert_eq!(summary.total_bars, 6);
        assert_eq!(summary.total_waste, plan.metrics.total_waste);
        assert_eq!(summary.total_pieces_cut, 10);
        assert_eq!(summary.patterns[0].groups, vec![(100, 2)]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let plan = plan_of(&[&[50, 50, 50], &[100, 100], &[50, 50, 50]], 200);
        assert_eq!(aggregate(&plan), aggregate(&plan));
    }

    #[test]
    fn test_json_keeps_frequency_order() {
        let plan = plan_of(&[&[60, 40], &[70], &[70]], 100);
        let json = serde_json::to_string(&aggregate(&plan)).unwrap();
        assert_eq!(
            json,
            r#"{"cuts":{"70":2,"60, 40":1},"total_bars":3,"total_waste":60,"total_pieces_cut":4,"leftover":[[700,1]]}"#
        );
    }

    #[test]
    fn test_empty_plan() {
        let summary = aggregate(&plan_of(&[], 100));
        assert!(summary.patterns.is_empty());
        assert_eq!(summary.total_bars, 0);
    }
}

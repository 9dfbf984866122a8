//! Derived statistics over a finished [`CdsReport`].
//!
//! Rankings, unique counts and cross-tier duplicates are computed here so the
//! text layout only has to print them.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use cds_core::formatting::percentage;
use cds_core::models::{CdsReport, CompilationTier, TierEntries};
use serde::Serialize;
use tracing::warn;

// ── Row types ─────────────────────────────────────────────────────────────────

/// Classes restored by one class loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderCount {
    pub loader: String,
    pub classes: usize,
}

/// A class and the number of distinct members counted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub class_name: String,
    pub count: usize,
}

/// Entries recorded under one compilation tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierCount {
    pub tier: CompilationTier,
    pub entries: usize,
}

/// An nmethod identifier read back under two different tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTierDuplicate {
    pub identifier: String,
    pub lower: CompilationTier,
    pub higher: CompilationTier,
}

// ── ReportSummary ─────────────────────────────────────────────────────────────

/// Everything the text report prints beyond the raw report fields.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub top_n: usize,
    pub loaders: Vec<LoaderCount>,
    pub unique_metadata_methods: usize,
    pub top_metadata_classes: Vec<ClassCount>,
    pub recreated: usize,
    pub restored: usize,
    /// Classes restored through any loader.
    pub unshareable_total: usize,
    /// Recreated plus restored mirrors.
    pub mirrored_total: usize,
    pub scc_total_entries: u64,
    pub nmethods_by_tier: Vec<TierCount>,
    pub cross_tier_duplicates: Vec<CrossTierDuplicate>,
    pub total_nmethods: usize,
    pub unique_nmethods: usize,
    /// Distinct array classes among the unique nmethods.
    pub array_classes: usize,
    pub top_nmethod_classes: Vec<ClassCount>,
    /// Restored nmethods as a percentage of the declared SCC entries.
    pub restored_share: f64,
}

impl ReportSummary {
    pub fn from_report(report: &CdsReport, top_n: usize) -> Self {
        let loaders = report
            .unshareable()
            .iter()
            .map(|(loader, classes)| LoaderCount {
                loader: loader.clone(),
                classes: classes.len(),
            })
            .collect();

        let metadata_methods = unique_identifiers(report.scc());
        let nmethods = unique_identifiers(report.scc_nmethod());
        let nmethod_classes = members_per_class(&nmethods);

        let total_nmethods: usize = report.scc_nmethod().values().map(Vec::len).sum();

        let summary = Self {
            top_n,
            loaders,
            unique_metadata_methods: metadata_methods.len(),
            top_metadata_classes: top_classes(members_per_class(&metadata_methods), top_n),
            recreated: report.mirror().recreate.len(),
            restored: report.mirror().restored.len(),
            unshareable_total: report.unshareable_total(),
            mirrored_total: report.mirror().total(),
            scc_total_entries: report.scc_total_entries(),
            nmethods_by_tier: report
                .scc_nmethod()
                .iter()
                .map(|(tier, entries)| TierCount {
                    tier: *tier,
                    entries: entries.len(),
                })
                .collect(),
            cross_tier_duplicates: cross_tier_duplicates(report.scc_nmethod()),
            total_nmethods,
            unique_nmethods: nmethods.len(),
            array_classes: nmethod_classes
                .keys()
                .filter(|class_name| is_array_class(class_name))
                .count(),
            top_nmethod_classes: top_classes(nmethod_classes, top_n),
            restored_share: percentage(total_nmethods as u64, report.scc_total_entries(), 2),
        };

        if summary.has_load_mirror_mismatch() {
            warn!(
                "Classes loaded ({}) and mirrored ({}) don't match",
                summary.unshareable_total, summary.mirrored_total
            );
        }

        summary
    }

    /// Loader restores and mirror events should account for the same
    /// classes; a difference hints at missing or extra mirror work.
    pub fn has_load_mirror_mismatch(&self) -> bool {
        self.unshareable_total != self.mirrored_total
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Class part of a `Class::member(...)` identifier.
pub fn class_of(identifier: &str) -> &str {
    identifier
        .split_once("::")
        .map_or(identifier, |(class_name, _)| class_name)
}

fn is_array_class(class_name: &str) -> bool {
    class_name.contains('[')
}

fn unique_identifiers(entries: &TierEntries) -> HashSet<&str> {
    entries
        .values()
        .flatten()
        .map(String::as_str)
        .collect()
}

fn members_per_class<'a>(identifiers: &HashSet<&'a str>) -> HashMap<&'a str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for &identifier in identifiers {
        *counts.entry(class_of(identifier)).or_default() += 1;
    }
    counts
}

/// Highest counts first; ties by class name so the output is stable.
fn top_classes(counts: HashMap<&str, usize>, top_n: usize) -> Vec<ClassCount> {
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(class_name, count)| ClassCount {
            class_name: class_name.to_string(),
            count,
        })
        .collect()
}

/// Every identifier present in two tiers, for each tier pair lower < higher.
fn cross_tier_duplicates(entries: &TierEntries) -> Vec<CrossTierDuplicate> {
    let per_tier: BTreeMap<CompilationTier, BTreeSet<&str>> = entries
        .iter()
        .map(|(tier, ids)| (*tier, ids.iter().map(String::as_str).collect()))
        .collect();

    let mut duplicates = Vec::new();
    for (lower, lower_ids) in &per_tier {
        for (higher, higher_ids) in per_tier.range(lower..).skip(1) {
            for identifier in lower_ids.intersection(higher_ids) {
                duplicates.push(CrossTierDuplicate {
                    identifier: identifier.to_string(),
                    lower: *lower,
                    higher: *higher,
                });
            }
        }
    }
    duplicates
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cds_core::models::ReportParts;

    fn tier(level: u32) -> CompilationTier {
        CompilationTier::new(level)
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn sample_report() -> CdsReport {
        let mut parts = ReportParts::default();
        parts
            .unshareable
            .insert("boot".to_string(), ids(&["A", "B", "C"]));
        parts.unshareable.insert("app".to_string(), ids(&["D"]));
        parts.mirror.recreate = ids(&["A"]);
        parts.mirror.restored = ids(&["B", "C", "D"]);
        parts.scc.insert(
            tier(1),
            ids(&["A::a()V", "A::b()V", "B::a()V", "A::a()V"]),
        );
        parts.scc_nmethod.insert(
            tier(1),
            ids(&["A::a()V", "[LFoo;::clone()Ljava/lang/Object;", "B::x()V"]),
        );
        parts
            .scc_nmethod
            .insert(tier(3), ids(&["A::a()V", "B::x()V", "B::y()V"]));
        parts.scc_nmethod.insert(tier(4), ids(&["A::a()V"]));
        parts.scc_total_entries = 14;
        CdsReport::freeze(parts)
    }

    // ── class_of ──────────────────────────────────────────────────────────────

    #[test]
    fn test_class_of() {
        assert_eq!(class_of("java.lang.String::length()I"), "java.lang.String");
        assert_eq!(class_of("NoSeparator"), "NoSeparator");
    }

    // ── from_report ───────────────────────────────────────────────────────────

    #[test]
    fn test_loader_counts_sorted_by_loader() {
        let summary = ReportSummary::from_report(&sample_report(), 10);
        assert_eq!(
            summary.loaders,
            vec![
                LoaderCount {
                    loader: "app".to_string(),
                    classes: 1
                },
                LoaderCount {
                    loader: "boot".to_string(),
                    classes: 3
                },
            ]
        );
    }

    #[test]
    fn test_metadata_methods_unique_and_ranked() {
        let summary = ReportSummary::from_report(&sample_report(), 10);
        assert_eq!(summary.unique_metadata_methods, 3);
        assert_eq!(summary.top_metadata_classes[0].class_name, "A");
        assert_eq!(summary.top_metadata_classes[0].count, 2);
        assert_eq!(summary.top_metadata_classes[1].class_name, "B");
    }

    #[test]
    fn test_top_n_limits_rankings() {
        let summary = ReportSummary::from_report(&sample_report(), 1);
        assert_eq!(summary.top_metadata_classes.len(), 1);
        assert_eq!(summary.top_nmethod_classes.len(), 1);
    }

    #[test]
    fn test_ranking_ties_broken_by_name() {
        let mut counts = HashMap::new();
        counts.insert("Zeta", 2);
        counts.insert("Alpha", 2);
        counts.insert("Mid", 5);
        let ranked = top_classes(counts, 10);
        let names: Vec<&str> = ranked.iter().map(|c| c.class_name.as_str()).collect();
        assert_eq!(names, vec!["Mid", "Alpha", "Zeta"]);
    }

    #[test]
    fn test_mirror_totals_match() {
        let summary = ReportSummary::from_report(&sample_report(), 10);
        assert_eq!(summary.recreated, 1);
        assert_eq!(summary.restored, 3);
        assert_eq!(summary.unshareable_total, 4);
        assert_eq!(summary.mirrored_total, 4);
        assert!(!summary.has_load_mirror_mismatch());
    }

    #[test]
    fn test_mirror_mismatch_detected() {
        let mut parts = ReportParts::default();
        parts.unshareable.insert("boot".to_string(), ids(&["A", "B"]));
        parts.mirror.restored = ids(&["A"]);
        let summary = ReportSummary::from_report(&CdsReport::freeze(parts), 10);
        assert!(summary.has_load_mirror_mismatch());
    }

    #[test]
    fn test_nmethod_counts() {
        let summary = ReportSummary::from_report(&sample_report(), 10);
        assert_eq!(summary.total_nmethods, 7);
        assert_eq!(summary.unique_nmethods, 4);
        assert_eq!(summary.array_classes, 1);
        assert_eq!(
            summary.nmethods_by_tier,
            vec![
                TierCount {
                    tier: tier(1),
                    entries: 3
                },
                TierCount {
                    tier: tier(3),
                    entries: 3
                },
                TierCount {
                    tier: tier(4),
                    entries: 1
                },
            ]
        );
        assert_eq!(summary.top_nmethod_classes[0].class_name, "B");
        assert_eq!(summary.top_nmethod_classes[0].count, 2);
    }

    #[test]
    fn test_restored_share() {
        let summary = ReportSummary::from_report(&sample_report(), 10);
        assert!((summary.restored_share - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_restored_share_without_declared_total() {
        let summary = ReportSummary::from_report(&CdsReport::default(), 10);
        assert_eq!(summary.restored_share, 0.0);
    }

    // ── cross_tier_duplicates ─────────────────────────────────────────────────

    #[test]
    fn test_cross_tier_duplicates_all_pairs() {
        let summary = ReportSummary::from_report(&sample_report(), 10);
        let found: Vec<(String, u32, u32)> = summary
            .cross_tier_duplicates
            .iter()
            .map(|d| (d.identifier.clone(), d.lower.level(), d.higher.level()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("A::a()V".to_string(), 1, 3),
                ("B::x()V".to_string(), 1, 3),
                ("A::a()V".to_string(), 1, 4),
                ("A::a()V".to_string(), 3, 4),
            ]
        );
    }

    #[test]
    fn test_cross_tier_duplicates_ignores_repeats_within_a_tier() {
        let mut entries = TierEntries::new();
        entries.insert(tier(2), ids(&["X::m()V", "X::m()V"]));
        assert!(cross_tier_duplicates(&entries).is_empty());
    }

    #[test]
    fn test_empty_report_summary() {
        let summary = ReportSummary::from_report(&CdsReport::default(), 10);
        assert!(summary.loaders.is_empty());
        assert_eq!(summary.unique_metadata_methods, 0);
        assert!(summary.top_metadata_classes.is_empty());
        assert!(summary.nmethods_by_tier.is_empty());
        assert!(summary.cross_tier_duplicates.is_empty());
        assert_eq!(summary.total_nmethods, 0);
        assert!(!summary.has_load_mirror_mismatch());
    }
}

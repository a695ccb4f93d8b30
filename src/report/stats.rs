//! Statistics and rollups for test results.
//!
//! This module regroups a section's flattened leaves by test group and then by
//! configuration variant, and computes `GroupStats` at each level. Every leaf
//! is counted exactly once per level.

use crate::anchor::{Anchor, AnchorScope, anchor};
use crate::classify::classify;
use crate::types::{Chapter, DisplayStatus, LeafResult, Section, TestStatus};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use std::fmt;

/// Counts and duration for one aggregation level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub expected_failure: usize,
    pub total: usize,
    /// Last non-empty duration seen while folding, or the sum of child
    /// durations once levels are merged.
    pub duration: Option<f64>,
}

impl GroupStats {
    /// Fold leaves in order. The duration of the last leaf that has one wins.
    pub fn from_leaves<'a>(leaves: impl IntoIterator<Item = &'a LeafResult>) -> Self {
        let mut stats = GroupStats::default();
        for leaf in leaves {
            stats.record(leaf);
        }
        stats
    }

    /// Count one leaf.
    pub fn record(&mut self, leaf: &LeafResult) {
        match leaf.status {
            TestStatus::Success => self.passed += 1,
            TestStatus::Failure => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::ExpectedFailure => self.expected_failure += 1,
        }
        self.total += 1;

        if let Some(duration) = leaf.duration
            && duration > 0.0
        {
            self.duration = Some(duration);
        }
    }

    /// Merge a disjoint level into this one: counts add, durations add.
    pub fn add(&mut self, other: &GroupStats) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.expected_failure += other.expected_failure;
        self.total += other.total;
        self.duration = match (self.duration, other.duration) {
            (Some(a), Some(b)) => Some(a + b),
            (a, b) => a.or(b),
        };
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.passed + self.failed + self.skipped + self.expected_failure
    }
}

/// `count / total * 100` rounded to a whole number; `0` when `total` is zero.
pub fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "0".to_string();
    }
    format!("{:.0}", (count as f64 / total as f64 * 100.0).round())
}

/// Identity of a configuration variant within a group.
///
/// Runs of the same test under different configurations share an
/// identifier; a leaf without one is its own singleton variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantKey {
    Identifier(String),
    Anonymous(usize),
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantKey::Identifier(id) => write!(f, "{}", id),
            VariantKey::Anonymous(ordinal) => write!(f, "#{}", ordinal),
        }
    }
}

/// All runs of one test within a group.
#[derive(Debug, Clone)]
pub struct VariantRollup<'a> {
    pub key: VariantKey,
    pub leaves: Vec<&'a LeafResult>,
    pub stats: GroupStats,
}

impl<'a> VariantRollup<'a> {
    pub fn status(&self) -> Option<DisplayStatus> {
        let statuses: Vec<TestStatus> = self.leaves.iter().map(|l| l.status).collect();
        classify(&statuses)
    }

    /// Display name of the first run.
    pub fn name(&self) -> &'a str {
        self.leaves.first().copied().map(|l| l.name.as_str()).unwrap_or_default()
    }

    pub fn failing_leaves(&self) -> impl Iterator<Item = &'a LeafResult> + '_ {
        self.leaves.iter().copied().filter(|l| l.status == TestStatus::Failure)
    }
}

/// One test group (e.g. a test class) and its variants.
#[derive(Debug, Clone)]
pub struct GroupRollup<'a> {
    pub name: &'a str,
    pub leaves: Vec<&'a LeafResult>,
    pub variants: IndexMap<VariantKey, VariantRollup<'a>>,
    pub stats: GroupStats,
}

impl<'a> GroupRollup<'a> {
    fn new(name: &'a str, leaves: Vec<&'a LeafResult>) -> Self {
        let mut variants: IndexMap<VariantKey, Vec<&'a LeafResult>> = IndexMap::new();
        for (ordinal, leaf) in leaves.iter().copied().enumerate() {
            let key = match &leaf.identifier {
                Some(id) => VariantKey::Identifier(id.clone()),
                None => VariantKey::Anonymous(ordinal),
            };
            variants.entry(key).or_default().push(leaf);
        }

        let variants: IndexMap<VariantKey, VariantRollup<'a>> = variants
            .into_iter()
            .map(|(key, members)| {
                let stats = GroupStats::from_leaves(members.iter().copied());
                (key.clone(), VariantRollup { key, leaves: members, stats })
            })
            .collect();

        let stats = GroupStats::from_leaves(leaves.iter().copied());
        debug_assert_eq!(variants.values().map(|v| v.stats.total).sum::<usize>(), stats.total);

        Self { name, leaves, variants, stats }
    }
}

/// Rollup of one section: group name -> group rollup, in first-appearance order.
#[derive(Debug, Clone)]
pub struct SectionRollup<'a> {
    pub name: &'a str,
    pub groups: IndexMap<&'a str, GroupRollup<'a>>,
    pub stats: GroupStats,
}

impl<'a> SectionRollup<'a> {
    pub fn new(section: &'a Section) -> Self {
        let mut members: IndexMap<&'a str, Vec<&'a LeafResult>> = IndexMap::new();
        for leaf in &section.leaves {
            members.entry(leaf.group.as_str()).or_default().push(leaf);
        }

        let groups: IndexMap<&'a str, GroupRollup<'a>> =
            members.into_iter().map(|(name, leaves)| (name, GroupRollup::new(name, leaves))).collect();

        let mut stats = GroupStats::default();
        for group in groups.values() {
            stats.add(&group.stats);
        }

        debug!("Section {}: {} groups, {} leaves", section.name, groups.len(), stats.total);
        Self { name: section.name.as_str(), groups, stats }
    }
}

/// Rollup of all sections of a chapter. Totals are computed once here.
#[derive(Debug, Clone)]
pub struct ChapterRollup<'a> {
    /// Leading anchor part, unique per chapter within one report.
    pub key: String,
    pub sections: Vec<SectionRollup<'a>>,
    pub totals: GroupStats,
}

impl<'a> ChapterRollup<'a> {
    /// `ordinal` is the chapter's 1-based position in the run.
    pub fn new(chapter: &'a Chapter, ordinal: usize) -> Self {
        let sections: Vec<SectionRollup<'a>> = chapter.sections.values().map(SectionRollup::new).collect();
        let mut totals = GroupStats::default();
        for section in &sections {
            totals.add(&section.stats);
        }
        Self { key: ordinal.to_string(), sections, totals }
    }

    /// Anchor for `parts` scoped to this chapter.
    pub fn anchor(&self, scope: AnchorScope, parts: &[&str]) -> Anchor {
        let mut keyed = Vec::with_capacity(parts.len() + 1);
        keyed.push(self.key.as_str());
        keyed.extend_from_slice(parts);
        anchor(scope, &keyed)
    }
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod stats_test;

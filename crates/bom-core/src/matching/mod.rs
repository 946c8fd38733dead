//! The filter → score → select matching pipeline.
//!
//! For each component: retrieve inventory candidates by category, drop those
//! failing the hard filters (package equality, value compatibility with
//! tolerance substitution), score the survivors on weighted technical
//! dimensions, then select deterministically — lower priority rank first,
//! higher score within a rank, lexical IPN as the final tie-break.
//!
//! Matching one component is a pure function of (component, index, config);
//! the batch entry point may fan out across rayon workers but always
//! collects results in component input order, so output never depends on
//! thread completion order.

mod filter;
mod score;
mod select;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::inventory::InventoryIndex;
use crate::{Category, Component};

pub(crate) use filter::{effective_tolerance, hard_filter, Rejection};

/// Policy for inventory rows that omit a tolerance/rating field entirely.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTolerance {
    /// Assume the loosest category-default tolerance (worst case).
    #[default]
    WorstCase,
    /// Treat the row as incomplete and reject it for tolerance-bearing
    /// requirements that carry an explicit tolerance.
    Reject,
}

/// Matching configuration. A value of this type plus the component and the
/// index fully determine a [`MatchResult`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Scores are compared in buckets of this width (centipoints); scores
    /// falling in the same bucket count as equal and fall through to the
    /// IPN tie-break. Default: 5.
    pub score_epsilon: i64,
    pub missing_tolerance: MissingTolerance,
    /// Fan per-component matching out across rayon workers.
    pub parallel: bool,
    /// How many next-best alternates to retain for diagnostics.
    pub alternates: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            score_epsilon: 5,
            missing_tolerance: MissingTolerance::default(),
            parallel: false,
            alternates: 2,
        }
    }
}

/// Why a component ended up without a match. A soft, expected outcome —
/// tallied in the coverage summary, never an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    NoCategoryEntries,
    NoValueMatch,
    NoPackageMatch,
}

impl UnmatchedReason {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnmatchedReason::NoCategoryEntries => "no_category_entries",
            UnmatchedReason::NoValueMatch => "no_value_match",
            UnmatchedReason::NoPackageMatch => "no_package_match",
        }
    }
}

/// A candidate that survived the hard filters, with its technical score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub ipn: String,
    pub priority: u32,
    /// Technical score in centipoints; higher is better.
    pub score: i64,
}

/// Outcome of matching one component against the inventory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best: Option<ScoredCandidate>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alternates: Vec<ScoredCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<UnmatchedReason>,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        self.best.is_some()
    }

    fn unmatched(reference: &str, reason: UnmatchedReason) -> Self {
        MatchResult {
            reference: reference.to_string(),
            best: None,
            alternates: Vec::new(),
            reason: Some(reason),
        }
    }
}

/// Match a single component. Pure in (component, index, config).
pub fn match_component(
    component: &Component,
    index: &InventoryIndex,
    config: &MatchConfig,
) -> MatchResult {
    if component.category == Category::Unknown || !index.has_category(component.category) {
        return MatchResult::unmatched(&component.reference, UnmatchedReason::NoCategoryEntries);
    }

    let mut survivors = Vec::new();
    let mut saw_package_reject = false;

    for item in index.candidates(component.category) {
        match hard_filter(component, item, config) {
            Ok(()) => survivors.push(ScoredCandidate {
                ipn: item.ipn.clone(),
                priority: item.priority,
                score: score::technical_score(component, item),
            }),
            Err(Rejection::Package) => saw_package_reject = true,
            Err(Rejection::Value) => {}
        }
    }

    if survivors.is_empty() {
        let reason = if saw_package_reject {
            UnmatchedReason::NoPackageMatch
        } else {
            UnmatchedReason::NoValueMatch
        };
        return MatchResult::unmatched(&component.reference, reason);
    }

    let (best, alternates) = select::select(survivors, config);
    log::debug!(
        "{}: matched {} ({} alternates)",
        component.reference,
        best.ipn,
        alternates.len()
    );
    MatchResult {
        reference: component.reference.clone(),
        best: Some(best),
        alternates,
        reason: None,
    }
}

/// Match every component, in input order. With `config.parallel` the
/// per-component work runs on rayon; results are still collected into an
/// index-ordered buffer.
pub fn match_components(
    components: &[Component],
    index: &InventoryIndex,
    config: &MatchConfig,
) -> Vec<MatchResult> {
    if config.parallel {
        components
            .par_iter()
            .map(|c| match_component(c, index, config))
            .collect()
    } else {
        components
            .iter()
            .map(|c| match_component(c, index, config))
            .collect()
    }
}

//! Run-level coverage reporting.
//!
//! Matching failures, value parse failures, and fabricator gaps are soft:
//! the pipeline always produces a BOM, and this report tells the reader
//! what needs attention before ordering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::matching::MatchResult;

/// Summary of how well inventory and fabricator data covered the design.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CoverageReport {
    pub matched: usize,
    pub unmatched: usize,
    /// Unmatched count per reason code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reasons: BTreeMap<String, usize>,
    /// References whose value string failed normalization.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_parse_failures: Vec<String>,
    /// First reference of each BOM line without a fabricator part number.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fabricator_gaps: Vec<String>,
    /// Reference -> alternate IPNs, populated only when diagnostics are on.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub alternates: BTreeMap<String, Vec<String>>,
}

impl CoverageReport {
    /// Tally match results. Alternates are collected only when
    /// `diagnostics` is set, keeping the default report small.
    pub fn from_matches(results: &[MatchResult], diagnostics: bool) -> Self {
        let mut report = Self::default();
        for result in results {
            if result.is_matched() {
                report.matched += 1;
                if diagnostics && !result.alternates.is_empty() {
                    report.alternates.insert(
                        result.reference.clone(),
                        result.alternates.iter().map(|a| a.ipn.clone()).collect(),
                    );
                }
            } else {
                report.unmatched += 1;
                if let Some(reason) = &result.reason {
                    *report
                        .reasons
                        .entry(reason.as_str().to_string())
                        .or_default() += 1;
                }
            }
        }
        report
    }

    pub fn is_clean(&self) -> bool {
        self.unmatched == 0
            && self.value_parse_failures.is_empty()
            && self.fabricator_gaps.is_empty()
    }
}

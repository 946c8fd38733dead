//! End-to-end BOM generation.
//!
//! The engine is the only entry point that composes the stages: normalize
//! and classify the design components, build the inventory index, run the
//! matching pipeline, enrich matched components with inventory properties,
//! aggregate into BOM lines, resolve fabricator part numbers, and assemble
//! the final document plus a coverage report.
//!
//! Soft problems (unparseable values, unmatched components, missing part
//! numbers) are recorded in the report; only structural failures — an
//! inconsistent inventory, or a design with nothing left to populate —
//! return `Err`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, AggregationPolicy};
use crate::assemble::BomDocument;
use crate::classify::classify;
use crate::fabricator::{resolve_part_numbers, FabricatorConfig};
use crate::inventory::{InventoryConflictError, InventoryIndex, InventoryItem};
use crate::matching::{match_components, MatchConfig, MatchResult};
use crate::report::CoverageReport;
use crate::{CanonicalValue, Category, Component};

/// Property key the engine writes the matched inventory part number under.
pub const IPN_FIELD: &str = "IPN";

#[derive(Debug, thiserror::Error)]
pub enum BomError {
    #[error(transparent)]
    Inventory(#[from] InventoryConflictError),
    #[error("no populatable components after applying the aggregation policy")]
    NoUsableInput,
}

/// Full engine configuration; every stage's knobs in one place.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub matching: MatchConfig,
    #[serde(default)]
    pub policy: AggregationPolicy,
    /// Fabricator profile for part-number resolution. `None` skips
    /// resolution entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabricator: Option<FabricatorConfig>,
    /// Collect per-component alternates into the report.
    #[serde(default)]
    pub diagnostics: bool,
}

/// Everything one run produces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BomRun {
    pub document: BomDocument,
    /// Per-component match outcomes, in design order.
    pub matches: Vec<MatchResult>,
    pub report: CoverageReport,
}

/// Generate a BOM for `project` from design components and inventory rows.
pub fn generate(
    project: &str,
    sources: Vec<String>,
    components: Vec<Component>,
    inventory: Vec<InventoryItem>,
    config: &EngineConfig,
) -> Result<BomRun, BomError> {
    let index = InventoryIndex::build(inventory)?;

    let mut parse_failures = Vec::new();
    let mut active: Vec<Component> = components
        .into_iter()
        .map(|c| normalize(c, &mut parse_failures))
        .filter(|c| config.policy.admits(c))
        .collect();
    if active.is_empty() {
        return Err(BomError::NoUsableInput);
    }
    log::info!(
        "matching {} components against {} inventory items",
        active.len(),
        index.len()
    );

    let matches = match_components(&active, &index, &config.matching);
    enrich(&mut active, &matches, &index);

    let mut entries = aggregate(&active, &config.policy);
    let mut report = CoverageReport::from_matches(&matches, config.diagnostics);
    report.value_parse_failures = parse_failures;
    if let Some(fabricator) = &config.fabricator {
        report.fabricator_gaps = resolve_part_numbers(&mut entries, fabricator);
    }

    Ok(BomRun {
        document: BomDocument::new(project, sources, entries),
        matches,
        report,
    })
}

/// Fill in category and canonical value where the reader left them blank.
fn normalize(mut component: Component, parse_failures: &mut Vec<String>) -> Component {
    if component.category == Category::Unknown {
        component.category = classify(&component);
    }
    if component.value.is_none() && !component.raw_value.trim().is_empty() {
        if let Some(unit) = component.category.default_unit() {
            match CanonicalValue::parse(&component.raw_value, unit) {
                Ok(value) => component.value = Some(value),
                Err(err) => {
                    log::warn!(
                        "{}: value '{}' did not parse: {err}",
                        component.reference,
                        component.raw_value
                    );
                    parse_failures.push(component.reference.clone());
                }
            }
        }
    }
    component
}

/// Copy the matched inventory row's properties onto each matched component
/// (design fields win) and record the IPN, so aggregation and part-number
/// resolution see sourcing data.
fn enrich(components: &mut [Component], matches: &[MatchResult], index: &InventoryIndex) {
    let by_ipn: HashMap<&str, &InventoryItem> = index
        .items()
        .iter()
        .map(|item| (item.ipn.as_str(), item))
        .collect();

    for (component, result) in components.iter_mut().zip(matches) {
        let Some(best) = &result.best else { continue };
        let Some(item) = by_ipn.get(best.ipn.as_str()) else { continue };
        component
            .properties
            .insert(IPN_FIELD.to_string(), item.ipn.clone());
        for (field, value) in &item.properties {
            component
                .properties
                .entry(field.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

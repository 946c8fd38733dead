//! Grouping of filtered components into BOM line entries.
//!
//! Components surviving the population policy are grouped by aggregation
//! key (category, canonical value, footprint, DNP status), references are
//! kept in designator-natural order, quantities are group sizes, and
//! property maps merge field-by-field with first-non-empty-wins semantics.
//! Fields that conflict are retained per-value for audit so part-number
//! resolution can be deferred rather than silently picking a side.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::natural::NaturalString;
use crate::{CanonicalValue, Category, Component, PropertyMap};

/// Which flagged components are admitted into the BOM. The default excludes
/// DNP, excluded-from-BOM, and reserved-prefix virtual references.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregationPolicy {
    pub include_dnp: bool,
    pub include_excluded: bool,
    pub include_virtual: bool,
    /// Reference prefixes treated as virtual parts (fiducials, mounting
    /// holes, test points) in addition to the explicit flag.
    pub virtual_prefixes: Vec<String>,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            include_dnp: false,
            include_excluded: false,
            include_virtual: false,
            virtual_prefixes: ["#", "FID", "MH", "TP"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AggregationPolicy {
    /// Whether the component survives the population filter.
    pub fn admits(&self, component: &Component) -> bool {
        if component.dnp && !self.include_dnp {
            return false;
        }
        if component.exclude_from_bom && !self.include_excluded {
            return false;
        }
        if !self.include_virtual && self.is_virtual(component) {
            return false;
        }
        true
    }

    fn is_virtual(&self, component: &Component) -> bool {
        component.virtual_part
            || self
                .virtual_prefixes
                .iter()
                .any(|p| component.reference.starts_with(p.as_str()))
    }
}

/// One aggregated BOM line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CanonicalValue>,
    /// Display form of the value (EIA-preferred rendering, or the raw
    /// string when no canonical value exists).
    pub display_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footprint: Option<String>,
    pub references: BTreeSet<NaturalString>,
    pub quantity: usize,
    #[serde(default, skip_serializing_if = "PropertyMap::is_empty")]
    pub properties: PropertyMap,
    /// Per-field audit of conflicting property values across the group,
    /// in first-seen order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conflicts: BTreeMap<String, Vec<String>>,
    /// Fabricator part number, filled in by the resolver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_number: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dnp: bool,
}

impl BomEntry {
    /// First reference in natural order; entries always hold at least one.
    pub fn first_reference(&self) -> &NaturalString {
        self.references.iter().next().expect("non-empty entry")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct AggKey {
    category: Category,
    value_repr: String,
    /// Effective tolerance fraction, so `4k7` and `4k7 1%` share a line
    /// while `4k7 5%` does not.
    tolerance: Decimal,
    footprint: Option<String>,
    dnp: bool,
}

fn agg_key(component: &Component) -> AggKey {
    let (value_repr, tolerance) = match &component.value {
        Some(v) => (
            magnitude_display(v),
            v.tolerance_or_default(bom_units::default_tolerance_for(v.unit)),
        ),
        None => (component.raw_value.trim().to_string(), Decimal::ZERO),
    };
    AggKey {
        category: component.category,
        value_repr,
        tolerance,
        footprint: component.footprint.clone(),
        dnp: component.dnp,
    }
}

/// Display string of the magnitude and unit alone, without the tolerance
/// token, used both as group key component and as the entry display value.
fn magnitude_display(value: &CanonicalValue) -> String {
    CanonicalValue {
        tolerance: Decimal::ZERO,
        ..*value
    }
    .to_string()
}

/// Group policy-admitted components into BOM entries. Entry order follows
/// first-reference natural order via the key map, so output is stable for
/// identical inputs.
pub fn aggregate(components: &[Component], policy: &AggregationPolicy) -> Vec<BomEntry> {
    let mut groups: BTreeMap<AggKey, Vec<&Component>> = BTreeMap::new();
    for component in components.iter().filter(|c| policy.admits(c)) {
        groups.entry(agg_key(component)).or_default().push(component);
    }

    groups
        .into_iter()
        .map(|(key, members)| build_entry(key, &members))
        .collect()
}

fn build_entry(key: AggKey, members: &[&Component]) -> BomEntry {
    let references: BTreeSet<NaturalString> = members
        .iter()
        .map(|c| NaturalString::from(c.reference.as_str()))
        .collect();

    let (properties, conflicts) = merge_properties(members);
    if !conflicts.is_empty() {
        log::info!(
            "property conflicts in group {} ({} refs): {}",
            key.value_repr,
            references.len(),
            conflicts.keys().join(", ")
        );
    }

    BomEntry {
        category: key.category,
        value: members[0].value,
        display_value: key.value_repr,
        footprint: key.footprint,
        quantity: members.len(),
        references,
        properties,
        conflicts,
        part_number: None,
        dnp: key.dnp,
    }
}

/// Merge free-form property maps field-by-field: the first non-empty value
/// across the group wins; fields with disagreeing non-empty values are
/// additionally recorded per-value for audit.
fn merge_properties(members: &[&Component]) -> (PropertyMap, BTreeMap<String, Vec<String>>) {
    let mut merged = PropertyMap::new();
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for component in members {
        for (field, value) in &component.properties {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            merged
                .entry(field.clone())
                .or_insert_with(|| value.to_string());
            let values = seen.entry(field.clone()).or_default();
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }
    }

    let conflicts: BTreeMap<String, Vec<String>> = seen
        .into_iter()
        .filter(|(_, values)| values.len() > 1)
        .collect();
    (merged, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Unit;

    fn resistor(reference: &str, value: &str, footprint: &str) -> Component {
        Component {
            reference: reference.to_string(),
            category: Category::Resistor,
            raw_value: value.to_string(),
            value: CanonicalValue::parse(value, Unit::Ohms).ok(),
            symbol: None,
            footprint: Some(footprint.to_string()),
            sheet: String::new(),
            properties: PropertyMap::new(),
            dnp: false,
            exclude_from_bom: false,
            virtual_part: false,
        }
    }

    #[test]
    fn test_grouping_by_value_and_footprint() {
        let components = vec![
            resistor("R1", "4k7", "0603"),
            resistor("R10", "4k7", "0603"),
            resistor("R2", "4k7", "0603"),
            resistor("R3", "4k7", "0402"),
            resistor("R4", "10k", "0603"),
        ];
        let entries = aggregate(&components, &AggregationPolicy::default());
        assert_eq!(entries.len(), 3);

        let big = entries
            .iter()
            .find(|e| e.display_value == "4.7k" && e.footprint.as_deref() == Some("0603"))
            .unwrap();
        assert_eq!(big.quantity, 3);
        let refs: Vec<&str> = big.references.iter().map(|r| r.as_ref()).collect();
        assert_eq!(refs, ["R1", "R2", "R10"]);
    }

    #[test]
    fn test_equivalent_spellings_group_together() {
        // "4k7" and "4.7k" normalize identically and must share a line.
        let components = vec![
            resistor("R1", "4k7", "0603"),
            resistor("R2", "4.7k", "0603"),
        ];
        let entries = aggregate(&components, &AggregationPolicy::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 2);
    }

    #[test]
    fn test_effective_tolerance_drives_grouping() {
        // Implicit default (1% for resistors) and explicit 1% share a
        // line; an explicit 5% part is a different line.
        let components = vec![
            resistor("R1", "4k7", "0603"),
            resistor("R2", "4k7 1%", "0603"),
            resistor("R3", "4k7 5%", "0603"),
        ];
        let entries = aggregate(&components, &AggregationPolicy::default());
        assert_eq!(entries.len(), 2);
        let shared = entries.iter().find(|e| e.quantity == 2).unwrap();
        assert_eq!(shared.display_value, "4.7k");
    }

    #[test]
    fn test_quantity_conservation() {
        let components: Vec<_> = (1..=7)
            .map(|i| {
                resistor(
                    &format!("R{i}"),
                    if i % 2 == 0 { "4k7" } else { "10k" },
                    "0603",
                )
            })
            .collect();
        let entries = aggregate(&components, &AggregationPolicy::default());
        let total: usize = entries.iter().map(|e| e.quantity).sum();
        assert_eq!(total, components.len());
    }

    #[test]
    fn test_dnp_excluded_by_default() {
        let mut dnp = resistor("R1", "4k7", "0603");
        dnp.dnp = true;
        let fitted = resistor("R2", "4k7", "0603");
        let components = vec![dnp, fitted];

        let entries = aggregate(&components, &AggregationPolicy::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].quantity, 1);

        let include = AggregationPolicy {
            include_dnp: true,
            ..AggregationPolicy::default()
        };
        let entries = aggregate(&components, &include);
        // DNP stays on its own line even when included.
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.dnp && e.quantity == 1));
    }

    #[test]
    fn test_virtual_prefix_excluded() {
        let mut fid = resistor("FID1", "", "Fiducial");
        fid.value = None;
        fid.category = Category::Unknown;
        let components = vec![fid, resistor("R1", "4k7", "0603")];
        let entries = aggregate(&components, &AggregationPolicy::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].references.iter().next().unwrap().as_ref(), "R1");
    }

    #[test]
    fn test_excluded_flag_can_be_reincluded() {
        let mut tp = resistor("R9", "1k", "0603");
        tp.exclude_from_bom = true;
        let components = vec![tp];
        assert!(aggregate(&components, &AggregationPolicy::default()).is_empty());

        let include = AggregationPolicy {
            include_excluded: true,
            ..AggregationPolicy::default()
        };
        assert_eq!(aggregate(&components, &include).len(), 1);
    }

    #[test]
    fn test_property_merge_first_non_empty_wins() {
        let mut a = resistor("R1", "4k7", "0603");
        a.properties
            .insert("MPN".to_string(), "RC0603FR-074K7L".to_string());
        let mut b = resistor("R2", "4k7", "0603");
        b.properties.insert("MPN".to_string(), "".to_string());
        b.properties
            .insert("Manufacturer".to_string(), "Yageo".to_string());

        let entries = aggregate(&[a, b], &AggregationPolicy::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].properties.get("MPN").map(String::as_str),
            Some("RC0603FR-074K7L")
        );
        assert_eq!(
            entries[0].properties.get("Manufacturer").map(String::as_str),
            Some("Yageo")
        );
        assert!(entries[0].conflicts.is_empty());
    }

    #[test]
    fn test_conflicting_fields_retained_for_audit() {
        let mut a = resistor("R1", "4k7", "0603");
        a.properties
            .insert("MPN".to_string(), "PART-A".to_string());
        let mut b = resistor("R2", "4k7", "0603");
        b.properties
            .insert("MPN".to_string(), "PART-B".to_string());

        let entries = aggregate(&[a, b], &AggregationPolicy::default());
        assert_eq!(entries.len(), 1);
        // First non-empty still wins in the merged view...
        assert_eq!(
            entries[0].properties.get("MPN").map(String::as_str),
            Some("PART-A")
        );
        // ...but both values are kept for audit.
        assert_eq!(
            entries[0].conflicts.get("MPN").unwrap(),
            &["PART-A".to_string(), "PART-B".to_string()]
        );
    }
}

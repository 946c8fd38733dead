//! Technical scoring of filtered candidates.
//!
//! Scores are integer centipoints so candidate ordering is exact and
//! deterministic. Dimensions: exact-value bonus, tolerance closeness (with
//! an over-specification penalty past a small grace gap), voltage headroom
//! closeness, and manufacturer/package exactness bonuses.

use bom_units::default_tolerance_for;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::inventory::InventoryItem;
use crate::Component;

use super::{effective_tolerance, filter::voltage_property};

const EXACT_VALUE_BONUS: i64 = 100;
const TOLERANCE_BONUS_MAX: i64 = 50;
/// A candidate up to this many times tighter than the requirement keeps the
/// full closeness bonus; beyond it the bonus decays.
const TOLERANCE_GRACE_RATIO: i64 = 2;
const VOLTAGE_BONUS_MAX: i64 = 30;
const MANUFACTURER_BONUS: i64 = 20;
const PACKAGE_BONUS: i64 = 20;

pub(crate) fn technical_score(component: &Component, item: &InventoryItem) -> i64 {
    let mut score = 0;

    if let (Some(req), Some(cand)) = (&component.value, &item.value) {
        if req.unit == cand.unit && req.value == cand.value {
            score += EXACT_VALUE_BONUS;
        }
        if component.category.tolerance_bearing() {
            score += tolerance_closeness(component, item);
        }
    }

    score += voltage_headroom(component, item);

    if let (Some(a), Some(b)) = (
        component.property("Manufacturer"),
        item.property("Manufacturer"),
    ) {
        if a.eq_ignore_ascii_case(b) {
            score += MANUFACTURER_BONUS;
        }
    }

    if let (Some(a), Some(b)) = (component.footprint.as_deref(), item.package.as_deref()) {
        if a.trim().eq_ignore_ascii_case(b.trim()) {
            score += PACKAGE_BONUS;
        }
    }

    score
}

/// Full marks for a candidate at or near the required tolerance; a
/// candidate much tighter than necessary loses the bonus step by step.
/// Over-specification is not rewarded unboundedly.
fn tolerance_closeness(component: &Component, item: &InventoryItem) -> i64 {
    let (Some(req), Some(cand)) = (&component.value, &item.value) else {
        return 0;
    };
    let req_tol = effective_tolerance(req, component.property("Tolerance"))
        .unwrap_or_else(|| default_tolerance_for(req.unit));
    let cand_tol = effective_tolerance(cand, item.property("Tolerance"))
        .unwrap_or_else(|| default_tolerance_for(cand.unit));
    if cand_tol.is_zero() || cand_tol > req_tol {
        return 0;
    }

    let ratio = decimal_to_i64(req_tol / cand_tol);
    if ratio <= TOLERANCE_GRACE_RATIO {
        TOLERANCE_BONUS_MAX
    } else {
        (TOLERANCE_BONUS_MAX - (ratio - TOLERANCE_GRACE_RATIO) * 5).max(0)
    }
}

/// Closer-to-requirement voltage headroom is preferred over excess; the
/// bonus decays with every 10% of headroom beyond the requirement.
fn voltage_headroom(component: &Component, item: &InventoryItem) -> i64 {
    let (Some(req), Some(cand)) = (
        voltage_property(&component.properties),
        voltage_property(&item.properties),
    ) else {
        return 0;
    };
    if req.unit != cand.unit || req.value.is_zero() || cand.value < req.value {
        return 0;
    }
    let excess_tenths = decimal_to_i64((cand.value - req.value) / req.value * Decimal::TEN);
    (VOLTAGE_BONUS_MAX - excess_tenths).max(0)
}

fn decimal_to_i64(d: Decimal) -> i64 {
    d.trunc().to_i64().unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CanonicalValue, Category, PropertyMap, Unit};

    fn resistor(value: &str, props: &[(&str, &str)]) -> Component {
        Component {
            reference: "R1".to_string(),
            category: Category::Resistor,
            raw_value: value.to_string(),
            value: Some(CanonicalValue::parse(value, Unit::Ohms).unwrap()),
            symbol: None,
            footprint: Some("0603".to_string()),
            sheet: String::new(),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            dnp: false,
            exclude_from_bom: false,
            virtual_part: false,
        }
    }

    fn item(value: &str, props: &[(&str, &str)]) -> InventoryItem {
        InventoryItem {
            ipn: "RES_X".to_string(),
            category: Category::Resistor,
            value: Some(CanonicalValue::parse(value, Unit::Ohms).unwrap()),
            package: Some("0603".to_string()),
            priority: 1,
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_exact_value_beats_window_match() {
        let c = resistor("10k 1%", &[]);
        let exact = item("10k 1%", &[]);
        let near = item("10.1k 0.1%", &[]);
        assert!(technical_score(&c, &exact) > technical_score(&c, &near));
    }

    #[test]
    fn test_overspecification_penalized() {
        // 1% requirement: a 0.5% part keeps full marks (inside the grace
        // gap), a 0.01% part does not.
        let c = resistor("10k 1%", &[]);
        let close = item("10k 0.5%", &[]);
        let overspec = item("10k 0.01%", &[]);
        assert!(technical_score(&c, &close) > technical_score(&c, &overspec));
        assert_eq!(tolerance_closeness(&c, &close), TOLERANCE_BONUS_MAX);
    }

    #[test]
    fn test_voltage_closer_preferred_over_excess() {
        let c = resistor("10k 1%", &[("Voltage", "50V")]);
        let close = item("10k 1%", &[("Voltage", "75V")]);
        let excess = item("10k 1%", &[("Voltage", "500V")]);
        assert!(technical_score(&c, &close) > technical_score(&c, &excess));
    }

    #[test]
    fn test_manufacturer_and_package_bonuses() {
        let c = resistor("10k 1%", &[("Manufacturer", "Yageo")]);
        let same = item("10k 1%", &[("Manufacturer", "yageo")]);
        let other = item("10k 1%", &[("Manufacturer", "Vishay")]);
        assert_eq!(
            technical_score(&c, &same) - technical_score(&c, &other),
            MANUFACTURER_BONUS
        );
    }
}

//! Hard candidate filters: package equality and value compatibility.

use bom_units::{default_tolerance_for, parse_percent, CanonicalValue};
use rust_decimal::Decimal;

use crate::inventory::InventoryItem;
use crate::{Component, PropertyMap};

use super::{MatchConfig, MissingTolerance};

/// Which hard filter a candidate failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Rejection {
    Package,
    Value,
}

/// Apply the hard filters. Package equality only binds when both sides
/// specify a package; value compatibility is exact canonical equality, or a
/// tolerance-substitution window for tolerance-bearing categories.
pub(crate) fn hard_filter(
    component: &Component,
    item: &InventoryItem,
    config: &MatchConfig,
) -> Result<(), Rejection> {
    // Evaluate value first so that a survivor of the value check that fails
    // on package alone can surface `no_package_match`.
    value_compatible(component, item, config)?;
    package_compatible(component, item)?;
    rating_adequate(component, item)?;
    Ok(())
}

fn package_compatible(component: &Component, item: &InventoryItem) -> Result<(), Rejection> {
    match (component.footprint.as_deref(), item.package.as_deref()) {
        (Some(a), Some(b)) if !a.trim().eq_ignore_ascii_case(b.trim()) => Err(Rejection::Package),
        _ => Ok(()),
    }
}

fn value_compatible(
    component: &Component,
    item: &InventoryItem,
    config: &MatchConfig,
) -> Result<(), Rejection> {
    let (req, cand) = match (&component.value, &item.value) {
        // Neither side carries a value: category + package suffice.
        (None, None) => return Ok(()),
        // One-sided values never match; an unparseable component value
        // lands here too (soft ValueParseError upstream).
        (None, Some(_)) | (Some(_), None) => return Err(Rejection::Value),
        (Some(req), Some(cand)) => (req, cand),
    };

    if req.unit != cand.unit {
        return Err(Rejection::Value);
    }

    if !component.category.tolerance_bearing() {
        return if req.value == cand.value {
            Ok(())
        } else {
            Err(Rejection::Value)
        };
    }

    let req_tol = effective_tolerance(req, component.property("Tolerance"))
        .unwrap_or_else(|| default_tolerance_for(req.unit));

    let cand_tol = match effective_tolerance(cand, item.property("Tolerance")) {
        Some(t) => t,
        None => match config.missing_tolerance {
            MissingTolerance::WorstCase => default_tolerance_for(cand.unit),
            MissingTolerance::Reject => return Err(Rejection::Value),
        },
    };

    // Substitution never loosens: candidate tolerance must be at or below
    // the requirement, and its band must sit inside the required window.
    if cand_tol > req_tol {
        return Err(Rejection::Value);
    }
    let fits = cand.min_value(cand_tol) >= req.min_value(req_tol)
        && cand.max_value(cand_tol) <= req.max_value(req_tol);
    if fits {
        Ok(())
    } else {
        Err(Rejection::Value)
    }
}

/// Voltage/rating adequacy is a hard requirement: a candidate rated below
/// the component's stated voltage is never eligible. Headroom closeness is
/// scored separately.
fn rating_adequate(component: &Component, item: &InventoryItem) -> Result<(), Rejection> {
    let Some(req) = voltage_property(&component.properties) else {
        return Ok(());
    };
    match voltage_property(&item.properties) {
        Some(cand) if cand.unit == req.unit && cand.value >= req.value => Ok(()),
        // An unrated row against an explicit requirement cannot be assumed
        // adequate, regardless of the missing-tolerance policy.
        Some(_) | None => Err(Rejection::Value),
    }
}

/// Explicit tolerance of a value: the parsed `±x%` token if present,
/// otherwise a `Tolerance` property. `None` when genuinely unspecified.
pub(crate) fn effective_tolerance(
    value: &CanonicalValue,
    tolerance_property: Option<&str>,
) -> Option<Decimal> {
    if !value.tolerance.is_zero() {
        return Some(value.tolerance);
    }
    tolerance_property.and_then(|s| parse_percent(s).ok())
}

pub(crate) fn voltage_property(properties: &PropertyMap) -> Option<CanonicalValue> {
    properties
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Voltage") || k.eq_ignore_ascii_case("Voltage Rating"))
        .and_then(|(_, v)| CanonicalValue::parse(v, bom_units::Unit::Volts).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Unit};

    fn resistor(value: &str, footprint: Option<&str>) -> Component {
        Component {
            reference: "R1".to_string(),
            category: Category::Resistor,
            raw_value: value.to_string(),
            value: (!value.is_empty())
                .then(|| CanonicalValue::parse(value, Unit::Ohms).unwrap()),
            symbol: None,
            footprint: footprint.map(str::to_string),
            sheet: String::new(),
            properties: PropertyMap::new(),
            dnp: false,
            exclude_from_bom: false,
            virtual_part: false,
        }
    }

    fn item(value: &str, package: Option<&str>) -> InventoryItem {
        InventoryItem {
            ipn: "RES_X".to_string(),
            category: Category::Resistor,
            value: (!value.is_empty())
                .then(|| CanonicalValue::parse(value, Unit::Ohms).unwrap()),
            package: package.map(str::to_string),
            priority: 1,
            properties: PropertyMap::new(),
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_package_binds_only_when_both_specify() {
        let cfg = MatchConfig::default();
        assert!(hard_filter(&resistor("1k 1%", Some("0603")), &item("1k 1%", None), &cfg).is_ok());
        assert!(hard_filter(&resistor("1k 1%", None), &item("1k 1%", Some("0603")), &cfg).is_ok());
        assert_eq!(
            hard_filter(
                &resistor("1k 1%", Some("0402")),
                &item("1k 1%", Some("0603")),
                &cfg
            ),
            Err(Rejection::Package)
        );
    }

    #[test]
    fn test_tolerance_monotonicity() {
        let cfg = MatchConfig::default();
        let req = resistor("10k 1%", None);
        // Equal and tighter tolerances are eligible; looser never is.
        assert!(hard_filter(&req, &item("10k 1%", None), &cfg).is_ok());
        assert!(hard_filter(&req, &item("10k 0.1%", None), &cfg).is_ok());
        assert_eq!(
            hard_filter(&req, &item("10k 5%", None), &cfg),
            Err(Rejection::Value)
        );
    }

    #[test]
    fn test_tolerance_property_fallback() {
        let cfg = MatchConfig::default();
        let req = resistor("10k 1%", None);
        let mut loose = item("10k", None);
        loose
            .properties
            .insert("Tolerance".to_string(), "5%".to_string());
        assert_eq!(hard_filter(&req, &loose, &cfg), Err(Rejection::Value));

        let mut tight = item("10k", None);
        tight
            .properties
            .insert("tolerance".to_string(), "±0.5%".to_string());
        assert!(hard_filter(&req, &tight, &cfg).is_ok());
    }

    #[test]
    fn test_missing_tolerance_policy() {
        // 10k requirement at 1%, candidate with no tolerance anywhere.
        let req = resistor("10k 1%", None);
        let bare = item("10k", None);

        // Worst case assumes the 1% resistor default: not tighter than the
        // requirement but equal to it, so eligible.
        let worst = MatchConfig::default();
        assert!(hard_filter(&req, &bare, &worst).is_ok());

        let reject = MatchConfig {
            missing_tolerance: MissingTolerance::Reject,
            ..MatchConfig::default()
        };
        assert_eq!(hard_filter(&req, &bare, &reject), Err(Rejection::Value));
    }

    #[test]
    fn test_unit_mismatch_rejected() {
        let cfg = MatchConfig::default();
        let req = resistor("10k 1%", None);
        let mut cap = item("", None);
        cap.value = Some(CanonicalValue::parse("100n", Unit::Farads).unwrap());
        assert_eq!(hard_filter(&req, &cap, &cfg), Err(Rejection::Value));
    }

    #[test]
    fn test_voltage_rating_must_meet_or_exceed() {
        let cfg = MatchConfig::default();
        let mut req = resistor("10k 1%", None);
        req.properties
            .insert("Voltage".to_string(), "50V".to_string());

        let mut adequate = item("10k 1%", None);
        adequate
            .properties
            .insert("Voltage".to_string(), "75V".to_string());
        assert!(hard_filter(&req, &adequate, &cfg).is_ok());

        let mut inadequate = item("10k 1%", None);
        inadequate
            .properties
            .insert("Voltage".to_string(), "25V".to_string());
        assert_eq!(hard_filter(&req, &inadequate, &cfg), Err(Rejection::Value));

        // Unrated row against an explicit requirement is not assumed adequate.
        let unrated = item("10k 1%", None);
        assert_eq!(hard_filter(&req, &unrated, &cfg), Err(Rejection::Value));
    }

    #[test]
    fn test_non_tolerance_category_exact_equality() {
        let cfg = MatchConfig::default();
        let mut crystal = resistor("32.768kHz", None);
        crystal.category = Category::Crystal;
        crystal.value = Some(CanonicalValue::parse("32.768kHz", Unit::Hertz).unwrap());

        let mut exact = item("", None);
        exact.category = Category::Crystal;
        exact.value = Some(CanonicalValue::parse("32.768kHz", Unit::Hertz).unwrap());
        assert!(hard_filter(&crystal, &exact, &cfg).is_ok());

        let mut off = exact.clone();
        off.value = Some(CanonicalValue::parse("16MHz", Unit::Hertz).unwrap());
        assert_eq!(hard_filter(&crystal, &off, &cfg), Err(Rejection::Value));
    }
}

//! Fabricator output profiles and part-number resolution.
//!
//! A fabricator configuration names the destination (JLCPCB, a contract
//! assembler, an in-house picker) and carries an ordered list of property
//! fields probed for the orderable part number. The first field with a
//! non-empty value wins; a line with no hit is a coverage gap, reported
//! but never fatal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::BomEntry;
use crate::PropertyMap;

/// Output profile for one fabricator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FabricatorConfig {
    pub name: String,
    /// Output column name -> source property field. Consumed by renderers;
    /// resolution itself only needs the part-number probe order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub columns: BTreeMap<String, String>,
    /// Property fields probed in priority order for the part number.
    pub part_number_fields: Vec<String>,
}

impl FabricatorConfig {
    /// Profile for JLCPCB assembly: LCSC stock numbers first, falling back
    /// through common manufacturer part number spellings.
    pub fn jlcpcb() -> Self {
        Self {
            name: "JLCPCB".to_string(),
            columns: BTreeMap::new(),
            part_number_fields: ["LCSC", "LCSC Part", "JLC", "JLCPCB", "MPN", "MFGPN"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Resolve the part number for one property map. Field names are
    /// matched case-insensitively with surrounding whitespace ignored.
    pub fn resolve(&self, properties: &PropertyMap) -> Option<String> {
        self.part_number_fields
            .iter()
            .find_map(|field| lookup(properties, field))
    }
}

fn lookup(properties: &PropertyMap, field: &str) -> Option<String> {
    let field = field.trim();
    properties.iter().find_map(|(key, value)| {
        let value = value.trim();
        (key.trim().eq_ignore_ascii_case(field) && !value.is_empty())
            .then(|| value.to_string())
    })
}

/// Fill `part_number` on every entry and return the references of lines
/// left without one.
pub fn resolve_part_numbers(entries: &mut [BomEntry], config: &FabricatorConfig) -> Vec<String> {
    let mut gaps = Vec::new();
    for entry in entries.iter_mut() {
        entry.part_number = config.resolve(&entry.properties);
        if entry.part_number.is_none() {
            log::warn!(
                "no {} part number for {} ({} refs)",
                config.name,
                entry.display_value,
                entry.quantity
            );
            gaps.push(entry.first_reference().as_ref().to_string());
        }
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> PropertyMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_priority_order_falls_through() {
        let config = FabricatorConfig::jlcpcb();
        let properties = props(&[("MPN", "RC0805FR"), ("Manufacturer", "Yageo")]);
        assert_eq!(config.resolve(&properties).as_deref(), Some("RC0805FR"));
    }

    #[test]
    fn test_earlier_field_wins() {
        let config = FabricatorConfig::jlcpcb();
        let properties = props(&[("LCSC", "C17414"), ("MPN", "RC0805FR")]);
        assert_eq!(config.resolve(&properties).as_deref(), Some("C17414"));
    }

    #[test]
    fn test_empty_values_skipped() {
        let config = FabricatorConfig::jlcpcb();
        let properties = props(&[("LCSC", "   "), ("MPN", "RC0805FR")]);
        assert_eq!(config.resolve(&properties).as_deref(), Some("RC0805FR"));
    }

    #[test]
    fn test_case_insensitive_field_match() {
        let config = FabricatorConfig::jlcpcb();
        let properties = props(&[("lcsc part", "C17414")]);
        assert_eq!(config.resolve(&properties).as_deref(), Some("C17414"));
    }

    #[test]
    fn test_no_hit_is_none() {
        let config = FabricatorConfig::jlcpcb();
        let properties = props(&[("Manufacturer", "Yageo")]);
        assert_eq!(config.resolve(&properties), None);
    }
}

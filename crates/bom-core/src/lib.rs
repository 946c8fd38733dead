//! Component matching, scoring and BOM aggregation engine.
//!
//! The crate turns two already-materialized inputs — an ordered sequence of
//! design [`Component`]s and one or more ordered sequences of
//! [`inventory::InventoryItem`]s — into a fabrication-ready
//! [`assemble::BomDocument`]:
//!
//! * `bom_units` normalizes free-form value strings into canonical form,
//! * [`classify`] resolves a [`Category`] per component,
//! * [`inventory`] validates and indexes sourceable parts by category/IPN,
//! * [`matching`] runs the filter → score → select pipeline per component,
//! * [`aggregate`] merges matched components into BOM line entries,
//! * [`fabricator`] resolves a fabricator-specific part number per entry,
//! * [`assemble`] produces the final ordered document with totals.
//!
//! The engine performs no I/O: readers, writers and distributor lookups are
//! external collaborators. Everything here is a pure function of its inputs,
//! and repeated runs over identical inputs produce byte-identical output.

pub mod aggregate;
pub mod assemble;
pub mod classify;
pub mod engine;
pub mod fabricator;
pub mod inventory;
pub mod matching;
pub mod natural;
pub mod report;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use bom_units::{CanonicalValue, ParseError, Unit};

/// Ordered free-form key-value properties attached to components and
/// inventory rows. `BTreeMap` keeps iteration (and serialization) stable.
pub type PropertyMap = BTreeMap<String, String>;

/// Component category used for type-aware candidate filtering.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Category {
    Resistor,
    Capacitor,
    Inductor,
    Diode,
    Led,
    Transistor,
    Crystal,
    Connector,
    Switch,
    IntegratedCircuit,
    /// Could not be classified; retained for listing but excluded from
    /// type-aware matching.
    Unknown,
}

impl Category {
    /// Unit assumed for bare numeric values of this category, if any.
    pub const fn default_unit(&self) -> Option<Unit> {
        match self {
            Category::Resistor => Some(Unit::Ohms),
            Category::Capacitor => Some(Unit::Farads),
            Category::Inductor => Some(Unit::Henries),
            Category::Crystal => Some(Unit::Hertz),
            _ => None,
        }
    }

    /// Whether tolerance-substitution windows apply during value filtering.
    pub const fn tolerance_bearing(&self) -> bool {
        matches!(
            self,
            Category::Resistor | Category::Capacitor | Category::Inductor
        )
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Resistor => "resistor",
            Category::Capacitor => "capacitor",
            Category::Inductor => "inductor",
            Category::Diode => "diode",
            Category::Led => "led",
            Category::Transistor => "transistor",
            Category::Crystal => "crystal",
            Category::Connector => "connector",
            Category::Switch => "switch",
            Category::IntegratedCircuit => "ic",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A design component as produced by an external design-file reader.
/// Immutable once produced; the engine works on enriched copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Reference designator, e.g. `R12`.
    pub reference: String,
    /// Resolved category; readers may leave this `Unknown` and let the
    /// classifier fill it in.
    #[serde(default = "unknown_category")]
    pub category: Category,
    /// Raw value field straight from the design file.
    #[serde(default)]
    pub raw_value: String,
    /// Canonical value, once normalization has run (or `None` when the raw
    /// string does not parse for the category's grammar).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CanonicalValue>,
    /// Library/symbol identifier, e.g. `Device:R`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footprint: Option<String>,
    /// Hierarchical sheet path the component lives on.
    #[serde(default)]
    pub sheet: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: PropertyMap,
    /// Do-not-populate flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dnp: bool,
    /// Explicitly excluded from BOM output by the design.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exclude_from_bom: bool,
    /// Virtual part (fiducial, mounting hole, net tie...).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub virtual_part: bool,
}

fn unknown_category() -> Category {
    Category::Unknown
}

impl Component {
    /// Case-insensitive property lookup with trimming; empty values read
    /// as absent.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

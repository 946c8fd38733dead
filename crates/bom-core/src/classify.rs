//! Component category resolution.
//!
//! Resolution order: explicit `Category`/`Type` property, then the
//! library/symbol identifier prefix, then footprint name patterns. An
//! unresolved component stays [`Category::Unknown`] — that is not fatal, it
//! is simply excluded from type-aware matching.

use std::sync::OnceLock;

use regex::Regex;

use crate::{Category, Component};

/// Resolve the category for a component. Returns the component's own
/// category untouched when the reader already assigned one.
pub fn classify(component: &Component) -> Category {
    if component.category != Category::Unknown {
        return component.category;
    }
    from_property(component)
        .or_else(|| component.symbol.as_deref().and_then(from_symbol))
        .or_else(|| component.footprint.as_deref().and_then(from_footprint))
        .unwrap_or(Category::Unknown)
}

fn from_property(component: &Component) -> Option<Category> {
    let value = component
        .property("Category")
        .or_else(|| component.property("Type"))?;
    parse_category(value)
}

/// Map a category/type property value. Unrecognized spellings resolve to
/// nothing rather than erroring.
pub fn parse_category(s: &str) -> Option<Category> {
    let c = match s.trim().to_ascii_lowercase().as_str() {
        "resistor" | "res" | "r" => Category::Resistor,
        "capacitor" | "cap" | "c" => Category::Capacitor,
        "inductor" | "ind" | "l" | "ferrite" | "ferrite_bead" => Category::Inductor,
        "diode" | "d" => Category::Diode,
        "led" => Category::Led,
        "transistor" | "q" | "mosfet" | "bjt" | "fet" => Category::Transistor,
        "crystal" | "oscillator" | "xtal" | "y" => Category::Crystal,
        "connector" | "conn" | "j" | "header" => Category::Connector,
        "switch" | "sw" | "button" => Category::Switch,
        "ic" | "integrated_circuit" | "u" => Category::IntegratedCircuit,
        _ => return None,
    };
    Some(c)
}

/// Classify from a library/symbol identifier such as `Device:R` or
/// `Device:C_Polarized`. The part after the last `:` is matched on its
/// leading alphabetic token.
fn from_symbol(symbol: &str) -> Option<Category> {
    let name = symbol.rsplit(':').next().unwrap_or(symbol);
    let head: String = name
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    match head.as_str() {
        "R" => Some(Category::Resistor),
        "C" => Some(Category::Capacitor),
        "L" | "FB" | "FerriteBead" => Some(Category::Inductor),
        "LED" => Some(Category::Led),
        "D" => Some(Category::Diode),
        "Q" => Some(Category::Transistor),
        "Y" | "Crystal" | "XTAL" => Some(Category::Crystal),
        "J" | "P" | "Conn" => Some(Category::Connector),
        "SW" => Some(Category::Switch),
        "U" | "IC" => Some(Category::IntegratedCircuit),
        _ => parse_category(name),
    }
}

struct FootprintPattern {
    regex: Regex,
    category: Category,
}

fn footprint_patterns() -> &'static [FootprintPattern] {
    static PATTERNS: OnceLock<Vec<FootprintPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let table: &[(&str, Category)] = &[
            (r"(?i)^(R_|Resistor)", Category::Resistor),
            (r"(?i)^(C_|CP_|Capacitor)", Category::Capacitor),
            (r"(?i)^(L_|Inductor|Ferrite)", Category::Inductor),
            (r"(?i)^(LED)", Category::Led),
            (r"(?i)^(D_|Diode)", Category::Diode),
            (r"(?i)^(Q_|SOT-?\d)", Category::Transistor),
            (r"(?i)^(Crystal|XTAL|Osc)", Category::Crystal),
            (r"(?i)^(Conn|PinHeader|PinSocket|USB|Jack)", Category::Connector),
            (r"(?i)^(SW_|Switch|Button)", Category::Switch),
        ];
        table
            .iter()
            .map(|(pattern, category)| FootprintPattern {
                regex: Regex::new(pattern).expect("static footprint pattern"),
                category: *category,
            })
            .collect()
    })
}

fn from_footprint(footprint: &str) -> Option<Category> {
    // Strip a library prefix ("Resistor_SMD:R_0603_1608Metric" -> footprint name).
    let name = footprint.rsplit(':').next().unwrap_or(footprint);
    footprint_patterns()
        .iter()
        .find(|p| p.regex.is_match(name))
        .map(|p| p.category)
}

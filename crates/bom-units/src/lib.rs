//! Canonical component value handling for BOM generation.
//!
//! A free-form value string from a schematic field (`"4k7"`, `"100nF 20%"`,
//! `"2R2"`) is parsed into a [`CanonicalValue`] — an exact
//! `rust_decimal::Decimal` magnitude plus a tolerance fraction and a
//! [`Unit`]. The same type renders back to an EIA-preferred display string,
//! and `parse(format(v)) == v` holds for every representable value.

pub mod series;

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const ONE_HUNDRED: Decimal = dec!(100);

/// Electrical unit of a canonical value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Ohms,
    Farads,
    Henries,
    Volts,
    Amperes,
    Hertz,
}

impl Unit {
    /// Display suffix. Resistance uses the bare EIA convention (no suffix).
    pub const fn suffix(&self) -> &'static str {
        match self {
            Unit::Ohms => "",
            Unit::Farads => "F",
            Unit::Henries => "H",
            Unit::Volts => "V",
            Unit::Amperes => "A",
            Unit::Hertz => "Hz",
        }
    }

    pub const fn quantity(&self) -> &'static str {
        match self {
            Unit::Ohms => "Resistance",
            Unit::Farads => "Capacitance",
            Unit::Henries => "Inductance",
            Unit::Volts => "Voltage",
            Unit::Amperes => "Current",
            Unit::Hertz => "Frequency",
        }
    }

    fn from_suffix(s: &str) -> Option<Unit> {
        match s {
            "R" | "Ohm" | "Ohms" | "ohm" | "ohms" | "Ω" => Some(Unit::Ohms),
            "F" => Some(Unit::Farads),
            "H" => Some(Unit::Henries),
            "V" => Some(Unit::Volts),
            "A" => Some(Unit::Amperes),
            "Hz" => Some(Unit::Hertz),
            _ => None,
        }
    }
}

/// Errors produced while parsing a value string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty value string")]
    Empty,
    #[error("invalid number: '{0}'")]
    InvalidNumber(String),
    #[error("invalid unit: '{0}'")]
    InvalidUnit(String),
    #[error("invalid tolerance: '{0}'")]
    InvalidTolerance(String),
}

/// Normalized (magnitude, tolerance, unit) representation of a component
/// value, independent of display formatting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalValue {
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tolerance: Decimal,
    pub unit: Unit,
}

impl CanonicalValue {
    pub fn new(value: Decimal, tolerance: Decimal, unit: Unit) -> Self {
        Self {
            value,
            tolerance,
            unit,
        }
    }

    /// Parse a free-form value string against a category default unit.
    ///
    /// Handles SI multiplier suffixes (`k`, `M`, `m`, `u`/`µ`, `n`, `p`,
    /// ...), RKM inline-decimal shorthand (`4k7`, `2R2`, `1M5`), explicit
    /// unit spellings (`Ohm`, `F`, `V`, `Hz`, ...) and a trailing tolerance
    /// token (`1%`, `±5%`). Bare numbers and bare multipliers take
    /// `default_unit`.
    pub fn parse(raw: &str, default_unit: Unit) -> Result<Self, ParseError> {
        let s = raw.trim().replace('µ', "u");
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        // Peel a trailing tolerance token before joining the rest.
        let parts: Vec<&str> = s.split_whitespace().collect();
        let mut tolerance = Decimal::ZERO;
        let value_unit = if parts.len() > 1 && parts.last().unwrap().ends_with('%') {
            tolerance = parse_tolerance(parts.last().unwrap())?;
            parts[..parts.len() - 1].join("")
        } else {
            parts.join("")
        };

        // RKM shorthand: the multiplier letter doubles as the decimal point.
        if let Some(value) = parse_rkm_infix(&value_unit) {
            return Ok(CanonicalValue::new(value, tolerance, default_unit));
        }

        let split_pos = value_unit
            .find(|ch: char| !ch.is_ascii_digit() && ch != '.' && ch != '-' && ch != '+')
            .unwrap_or(value_unit.len());
        if split_pos == 0 {
            return Err(ParseError::InvalidNumber(raw.trim().to_string()));
        }

        let (number_str, unit_str) = value_unit.split_at(split_pos);
        let base: Decimal = number_str
            .parse()
            .map_err(|_| ParseError::InvalidNumber(number_str.to_string()))?;

        let (value, unit) = apply_unit_suffix(unit_str, base, default_unit)?;
        Ok(CanonicalValue::new(value, tolerance, unit))
    }

    /// Effective tolerance, falling back to a default when unspecified.
    pub fn tolerance_or_default(&self, default: Decimal) -> Decimal {
        if self.tolerance.is_zero() {
            default
        } else {
            self.tolerance
        }
    }

    pub fn min_value(&self, tolerance: Decimal) -> Decimal {
        self.value * (Decimal::ONE - tolerance)
    }

    pub fn max_value(&self, tolerance: Decimal) -> Decimal {
        self.value * (Decimal::ONE + tolerance)
    }

    /// Check whether this value's tolerance band fits entirely within
    /// another value's band, applying `default_tolerance` on either side
    /// where no explicit tolerance is given.
    pub fn fits_within(&self, other: &CanonicalValue, default_tolerance: Decimal) -> bool {
        if self.unit != other.unit {
            return false;
        }
        let other_tolerance = other.tolerance_or_default(default_tolerance);
        let self_tolerance = self.tolerance_or_default(default_tolerance);
        self.min_value(self_tolerance) >= other.min_value(other_tolerance)
            && self.max_value(self_tolerance) <= other.max_value(other_tolerance)
    }

    /// `fits_within` with unit-default tolerances: 1% for resistors,
    /// 10% for capacitors, 1% otherwise.
    pub fn fits_within_default(&self, other: &CanonicalValue) -> bool {
        self.fits_within(other, default_tolerance_for(other.unit))
    }

    /// Compare magnitudes; `None` when the units differ.
    pub fn partial_cmp_value(&self, other: &CanonicalValue) -> Option<Ordering> {
        (self.unit == other.unit).then(|| self.value.cmp(&other.value))
    }
}

/// Unit-default tolerance fraction used when a value carries none.
pub fn default_tolerance_for(unit: Unit) -> Decimal {
    match unit {
        Unit::Farads => dec!(0.1),
        _ => dec!(0.01),
    }
}

/// Parse a standalone percentage token (`"1%"`, `"±5%"`, `"0.1%"`) into a
/// tolerance fraction. Used for `Tolerance` property fields as well as the
/// trailing token of a value string.
pub fn parse_percent(s: &str) -> Result<Decimal, ParseError> {
    parse_tolerance(s.trim())
}

fn parse_tolerance(s: &str) -> Result<Decimal, ParseError> {
    let inner = s
        .trim_start_matches('±')
        .strip_suffix('%')
        .ok_or_else(|| ParseError::InvalidTolerance(s.to_string()))?;
    let pct: Decimal = inner
        .parse()
        .map_err(|_| ParseError::InvalidTolerance(s.to_string()))?;
    Ok(pct / ONE_HUNDRED)
}

const SI_PREFIXES: [(i32, &str); 17] = [
    (24, "Y"),
    (21, "Z"),
    (18, "E"),
    (15, "P"),
    (12, "T"),
    (9, "G"),
    (6, "M"),
    (3, "k"),
    (0, ""),
    (-3, "m"),
    (-6, "u"),
    (-9, "n"),
    (-12, "p"),
    (-15, "f"),
    (-18, "a"),
    (-21, "z"),
    (-24, "y"),
];

/// RKM letters usable as an inline decimal separator, with their exponent.
const RKM_LETTERS: [(char, i32); 9] = [
    ('G', 9),
    ('M', 6),
    ('k', 3),
    ('K', 3),
    ('R', 0),
    ('m', -3),
    ('u', -6),
    ('n', -9),
    ('p', -12),
];

#[inline]
fn pow10(exp: i32) -> Decimal {
    if exp >= 0 {
        Decimal::from_i128_with_scale(10i128.pow(exp as u32), 0)
    } else {
        Decimal::new(1, (-exp) as u32)
    }
}

/// Parse `<digits><letter><digits>` RKM shorthand, e.g. `4k7` -> 4700,
/// `2R2` -> 2.2. Requires digits on both sides of the letter; `100n` is
/// handled by the ordinary SI-prefix path instead.
fn parse_rkm_infix(s: &str) -> Option<Decimal> {
    let (pos, exp) = s.char_indices().find_map(|(i, ch)| {
        RKM_LETTERS
            .iter()
            .find(|(letter, _)| *letter == ch)
            .map(|(_, exp)| (i, *exp))
    })?;

    let before = &s[..pos];
    let after = &s[pos + 1..];
    if before.is_empty()
        || after.is_empty()
        || !before
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
        || !after.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole: Decimal = before.parse().ok()?;
    let frac: Decimal = after.parse().ok()?;
    let combined = whole + frac * pow10(-(after.len() as i32));
    Some(combined * pow10(exp))
}

fn apply_unit_suffix(
    unit_str: &str,
    base: Decimal,
    default_unit: Unit,
) -> Result<(Decimal, Unit), ParseError> {
    if unit_str.is_empty() {
        return Ok((base, default_unit));
    }

    // Full unit spelling without a multiplier ("Ohm", "F", "Hz", ...).
    if let Some(unit) = Unit::from_suffix(unit_str) {
        return Ok((base, unit));
    }

    for &(exp, prefix) in &SI_PREFIXES {
        if prefix.is_empty() {
            continue;
        }
        if let Some(rest) = unit_str.strip_prefix(prefix) {
            let scaled = base * pow10(exp);
            if rest.is_empty() {
                return Ok((scaled, default_unit));
            }
            if let Some(unit) = Unit::from_suffix(rest) {
                return Ok((scaled, unit));
            }
        }
    }

    Err(ParseError::InvalidUnit(unit_str.to_string()))
}

fn scale_to_si(raw: Decimal) -> (Decimal, &'static str) {
    for &(exp, sym) in &SI_PREFIXES {
        let factor = pow10(exp);
        if raw.abs() >= factor {
            return (raw / factor, sym);
        }
    }
    (raw, "")
}

fn fmt_significant(x: Decimal) -> String {
    let formatted = format!("{}", x);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

impl fmt::Display for CanonicalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (scaled, prefix) = scale_to_si(self.value);
        write!(f, "{}{}{}", fmt_significant(scaled), prefix, self.unit.suffix())?;
        if !self.tolerance.is_zero() {
            write!(f, " {}%", fmt_significant(self.tolerance * ONE_HUNDRED))?;
        }
        Ok(())
    }
}

//! EIA standard value series (E6..E96) and preferred-value helpers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ESeries {
    E6,
    E12,
    E24,
    E96,
}

const E6: [Decimal; 6] = [
    dec!(1.0),
    dec!(1.5),
    dec!(2.2),
    dec!(3.3),
    dec!(4.7),
    dec!(6.8),
];

const E12: [Decimal; 12] = [
    dec!(1.0),
    dec!(1.2),
    dec!(1.5),
    dec!(1.8),
    dec!(2.2),
    dec!(2.7),
    dec!(3.3),
    dec!(3.9),
    dec!(4.7),
    dec!(5.6),
    dec!(6.8),
    dec!(8.2),
];

const E24: [Decimal; 24] = [
    dec!(1.0),
    dec!(1.1),
    dec!(1.2),
    dec!(1.3),
    dec!(1.5),
    dec!(1.6),
    dec!(1.8),
    dec!(2.0),
    dec!(2.2),
    dec!(2.4),
    dec!(2.7),
    dec!(3.0),
    dec!(3.3),
    dec!(3.6),
    dec!(3.9),
    dec!(4.3),
    dec!(4.7),
    dec!(5.1),
    dec!(5.6),
    dec!(6.2),
    dec!(6.8),
    dec!(7.5),
    dec!(8.2),
    dec!(9.1),
];

const E96: [Decimal; 96] = [
    dec!(1.00),
    dec!(1.02),
    dec!(1.05),
    dec!(1.07),
    dec!(1.10),
    dec!(1.13),
    dec!(1.15),
    dec!(1.18),
    dec!(1.21),
    dec!(1.24),
    dec!(1.27),
    dec!(1.30),
    dec!(1.33),
    dec!(1.37),
    dec!(1.40),
    dec!(1.43),
    dec!(1.47),
    dec!(1.50),
    dec!(1.54),
    dec!(1.58),
    dec!(1.62),
    dec!(1.65),
    dec!(1.69),
    dec!(1.74),
    dec!(1.78),
    dec!(1.82),
    dec!(1.87),
    dec!(1.91),
    dec!(1.96),
    dec!(2.00),
    dec!(2.05),
    dec!(2.10),
    dec!(2.15),
    dec!(2.21),
    dec!(2.26),
    dec!(2.32),
    dec!(2.37),
    dec!(2.43),
    dec!(2.49),
    dec!(2.55),
    dec!(2.61),
    dec!(2.67),
    dec!(2.74),
    dec!(2.80),
    dec!(2.87),
    dec!(2.94),
    dec!(3.01),
    dec!(3.09),
    dec!(3.16),
    dec!(3.24),
    dec!(3.32),
    dec!(3.40),
    dec!(3.48),
    dec!(3.57),
    dec!(3.65),
    dec!(3.74),
    dec!(3.83),
    dec!(3.92),
    dec!(4.02),
    dec!(4.12),
    dec!(4.22),
    dec!(4.32),
    dec!(4.42),
    dec!(4.53),
    dec!(4.64),
    dec!(4.75),
    dec!(4.87),
    dec!(4.99),
    dec!(5.11),
    dec!(5.23),
    dec!(5.36),
    dec!(5.49),
    dec!(5.62),
    dec!(5.76),
    dec!(5.90),
    dec!(6.04),
    dec!(6.19),
    dec!(6.34),
    dec!(6.49),
    dec!(6.65),
    dec!(6.81),
    dec!(6.98),
    dec!(7.15),
    dec!(7.32),
    dec!(7.50),
    dec!(7.68),
    dec!(7.87),
    dec!(8.06),
    dec!(8.25),
    dec!(8.45),
    dec!(8.66),
    dec!(8.87),
    dec!(9.09),
    dec!(9.31),
    dec!(9.53),
    dec!(9.76),
];

impl ESeries {
    pub fn values(&self) -> &'static [Decimal] {
        match self {
            ESeries::E6 => &E6,
            ESeries::E12 => &E12,
            ESeries::E24 => &E24,
            ESeries::E96 => &E96,
        }
    }
}

/// Decompose a positive magnitude into (mantissa in [1, 10), decade factor).
fn decompose(value: Decimal) -> Option<(Decimal, Decimal)> {
    if value <= Decimal::ZERO {
        return None;
    }
    let ten = Decimal::TEN;
    let mut mantissa = value;
    let mut decade = Decimal::ONE;
    while mantissa >= ten {
        mantissa /= ten;
        decade *= ten;
    }
    while mantissa < Decimal::ONE {
        mantissa *= ten;
        decade /= ten;
    }
    Some((mantissa, decade))
}

/// Nearest preferred value in the given series, ties toward the lower value.
pub fn nearest_preferred(value: Decimal, series: ESeries) -> Option<Decimal> {
    let (mantissa, decade) = decompose(value)?;
    let table = series.values();

    // Candidates: all table entries plus 10.0 (first entry of the next decade).
    let mut best = table[0];
    let mut best_dist = (mantissa - best).abs();
    for &entry in table.iter().skip(1).chain(std::iter::once(&Decimal::TEN)) {
        let dist = (mantissa - entry).abs();
        if dist < best_dist {
            best = entry;
            best_dist = dist;
        }
    }
    Some(best * decade)
}

/// Whether `value` is exactly a preferred value of the series.
pub fn is_preferred(value: Decimal, series: ESeries) -> bool {
    nearest_preferred(value, series) == Some(value)
}

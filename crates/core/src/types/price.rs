//! Type-safe price representation using decimal arithmetic.
//!
//! Cart totals arrive from the commerce backend as decimal strings together
//! with an ISO 4217 code. [`format_price`] turns that pair into the string
//! shown to shoppers, e.g. `$1,234.50` or `¥500`.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Error returned when a currency code is not one the storefront knows.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    JPY,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::CAD => "CA$",
            Self::AUD => "A$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::JPY => "¥",
        }
    }

    /// Number of digits after the decimal separator.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::JPY => 0,
            _ => 2,
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            "JPY" => Ok(Self::JPY),
            _ => Err(UnknownCurrency(s.to_owned())),
        }
    }
}

/// Format an amount in the given currency for display.
///
/// Known currencies render with their symbol and minor units (`$19.99`,
/// `¥500`). Unknown codes fall back to two decimals followed by the code
/// (`19.99 XYZ`).
#[must_use]
pub fn format_price(amount: Decimal, currency_code: &str) -> String {
    match currency_code.parse::<CurrencyCode>() {
        Ok(currency) => render(amount, currency.symbol(), currency.minor_units(), None),
        Err(_) => render(amount, "", 2, Some(currency_code.trim())),
    }
}

fn render(amount: Decimal, symbol: &str, minor_units: u32, suffix: Option<&str>) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(minor_units, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(minor_units);

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().to_string();
    let (whole, fraction) = digits
        .split_once('.')
        .map_or((digits.as_str(), None), |(w, f)| (w, Some(f)));

    let mut out = format!("{sign}{symbol}{}", group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    if let Some(code) = suffix {
        out.push(' ');
        out.push_str(code);
    }
    out
}

fn group_thousands(whole: &str) -> String {
    let len = whole.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

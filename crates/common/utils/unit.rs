use std::fmt::Display;

use crate::constants::{ETHER_DECIMALS, GWEI_DECIMALS};

/// Renders an integer amount of base units as a decimal with `decimals`
/// fractional digits, dropping trailing zeros.
pub fn format_units(value: impl Display, decimals: u32) -> String {
    let display = value.to_string();
    let (sign, digits) = match display.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", display.as_str()),
    };
    let decimals = decimals as usize;
    let padded = format!("{digits:0>decimals$}");
    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    let integer = if integer.is_empty() { "0" } else { integer };
    match fraction.trim_end_matches('0') {
        "" => format!("{sign}{integer}"),
        fraction => format!("{sign}{integer}.{fraction}"),
    }
}

pub fn format_gwei(wei: impl Display) -> String {
    format_units(wei, GWEI_DECIMALS)
}

pub fn format_ether(wei: impl Display) -> String {
    format_units(wei, ETHER_DECIMALS)
}

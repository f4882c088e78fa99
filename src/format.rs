use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DisplayConfig;

fn group_int_digits(int_part: &str) -> String {
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn pad_fraction_to_dp(s: &str, dp: u32) -> String {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    if dp == 0 {
        return int_part.to_string();
    }

    let dp = dp as usize;
    let mut frac: String = frac_part.chars().take(dp).collect();
    while frac.len() < dp {
        frac.push('0');
    }
    format!("{int_part}.{frac}")
}

fn group_number_string(s: &str) -> String {
    match s.split_once('.') {
        Some((int_part, frac)) if !frac.is_empty() => {
            format!("{}.{frac}", group_int_digits(int_part))
        }
        Some((int_part, _)) => group_int_digits(int_part),
        None => group_int_digits(s),
    }
}

/// Format a USD amount for terminal output: `$1,234.50`.
///
/// Rounds half away from zero to exactly `decimals` places. Negative values
/// put the sign before the symbol.
pub fn format_usd(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let s = pad_fraction_to_dp(&rounded.abs().normalize().to_string(), decimals);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_number_string(&s));
    out
}

/// Format a token quantity. Without `decimals` the exact value is printed
/// with trailing zeros stripped.
pub fn format_quantity(value: Decimal, decimals: Option<u32>) -> String {
    let rounded = match decimals {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    };
    group_number_string(&rounded.normalize().to_string())
}

/// Formatting knobs bundled from the `[display]` config table.
#[derive(Debug, Clone, Copy)]
pub struct DisplayFormat {
    pub currency_decimals: u32,
    pub quantity_decimals: Option<u32>,
}

impl DisplayFormat {
    pub fn usd(&self, value: Decimal) -> String {
        format_usd(value, self.currency_decimals)
    }

    pub fn quantity(&self, value: Decimal) -> String {
        format_quantity(value, self.quantity_decimals)
    }
}

impl From<&DisplayConfig> for DisplayFormat {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            currency_decimals: config.currency_decimals,
            quantity_decimals: config.quantity_decimals,
        }
    }
}

//! Korean won formatting with 조/억/만 unit groups.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

const JO: u128 = 1_000_000_000_000;
const EOK: u128 = 100_000_000;
const MAN: u128 = 10_000;

/// Whether non-negative amounts get an explicit `+`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignStyle {
    #[default]
    Plain,
    Signed,
}

/// Format an amount in won, e.g. `150000000 -> "1억 5,000만원"`.
///
/// Amounts are rounded to whole won. Below 10,000 the comma-grouped number is
/// printed as is.
pub fn format_korean_money(amount: Decimal, style: SignStyle) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let magnitude = rounded.abs().to_u128().unwrap_or(0);
    let sign = if rounded < Decimal::ZERO && magnitude > 0 {
        "-"
    } else if style == SignStyle::Signed {
        "+"
    } else {
        ""
    };
    format!("{sign}{}원", unit_groups(magnitude))
}

/// Float entry point; NaN and infinities format as zero. Finite values
/// beyond the `Decimal` range clamp to `Decimal::MAX` or `Decimal::MIN`.
pub fn format_korean_money_f64(amount: f64, style: SignStyle) -> String {
    let amount = if !amount.is_finite() {
        Decimal::ZERO
    } else if let Some(amount) = Decimal::from_f64(amount) {
        amount
    } else if amount > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    };
    format_korean_money(amount, style)
}

fn unit_groups(n: u128) -> String {
    if n < MAN {
        return group_digits(n);
    }
    let groups = [(n / JO, "조"), ((n % JO) / EOK, "억"), ((n % EOK) / MAN, "만")];
    let mut parts: Vec<String> = groups
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", group_digits(*value), unit))
        .collect();
    let rest = n % MAN;
    if rest > 0 {
        parts.push(group_digits(rest));
    }
    parts.join(" ")
}

fn group_digits(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn won(n: i64) -> String {
        format_korean_money(Decimal::from(n), SignStyle::Plain)
    }

    #[test]
    fn plain_digits_below_man() {
        assert_eq!(won(0), "0원");
        assert_eq!(won(9_999), "9,999원");
        assert_eq!(won(512), "512원");
    }

    #[test]
    fn unit_groups_most_significant_first() {
        assert_eq!(won(10_000), "1만원");
        assert_eq!(won(100_000_000), "1억원");
        assert_eq!(won(12_345), "1만 2,345원");
        assert_eq!(won(150_000_000), "1억 5,000만원");
        assert_eq!(won(34_000_000), "3,400만원");
        assert_eq!(won(1_200_000_050_000), "1조 2,000억 5만원");
        assert_eq!(won(12_345_000_000_000_000), "12,345조원");
    }

    #[test]
    fn signs() {
        let signed = |n: i64| format_korean_money(Decimal::from(n), SignStyle::Signed);
        assert_eq!(signed(-5_000), "-5,000원");
        assert_eq!(signed(5_000), "+5,000원");
        assert_eq!(won(-11_000_000), "-1,100만원");
        assert_eq!(signed(0), "+0원");
    }

    #[test]
    fn rounds_to_whole_won() {
        assert_eq!(format_korean_money(Decimal::new(99_995, 1), SignStyle::Plain), "1만원");
        assert_eq!(format_korean_money(Decimal::new(-4, 1), SignStyle::Plain), "0원");
    }

    #[test]
    fn non_finite_floats_are_zero() {
        assert_eq!(format_korean_money_f64(f64::NAN, SignStyle::Plain), "0원");
        assert_eq!(format_korean_money_f64(f64::INFINITY, SignStyle::Signed), "+0원");
        assert_eq!(format_korean_money_f64(25_000.4, SignStyle::Plain), "2만 5,000원");
    }

    #[test]
    fn oversized_floats_clamp_to_decimal_bounds() {
        let top = format_korean_money_f64(1e30, SignStyle::Plain);
        assert_eq!(top, format_korean_money(Decimal::MAX, SignStyle::Plain));
        assert_ne!(top, "0원");
        assert!(top.ends_with("원") && top.contains("조"));
        assert_eq!(
            format_korean_money_f64(-1e30, SignStyle::Plain),
            format_korean_money(Decimal::MIN, SignStyle::Plain)
        );
        assert!(format_korean_money_f64(-1e30, SignStyle::Plain).starts_with('-'));
    }
}

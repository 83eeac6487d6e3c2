//! Finance primitives: burn, runway, status and payroll.

use crate::{CostModel, RunwayStatus};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Runway at or below this many months is `Danger`.
pub const RUNWAY_DANGER_THRESHOLD: f64 = 3.0;
/// Runway at or below this many months (and above danger) is `Warning`.
pub const RUNWAY_WARNING_THRESHOLD: f64 = 6.0;
/// Runway that fills the castle health gauge.
pub const HEALTH_FULL_RUNWAY_MONTHS: f64 = 12.0;

/// Monthly burn = personnel + marketing + office. Negative components count as zero.
/// Saturates at `Decimal::MAX`.
pub fn compute_monthly_burn(personnel: Decimal, marketing: Decimal, office: Decimal) -> Decimal {
    personnel
        .max(Decimal::ZERO)
        .saturating_add(marketing.max(Decimal::ZERO))
        .saturating_add(office.max(Decimal::ZERO))
}

/// Months of runway. Infinite when burn is zero or negative.
pub fn compute_runway(cash: Decimal, monthly_burn: Decimal) -> f64 {
    if monthly_burn <= Decimal::ZERO {
        return f64::INFINITY;
    }
    let cash = cash.to_f64().unwrap_or(0.0);
    let burn = monthly_burn.to_f64().unwrap_or(f64::MAX);
    cash / burn
}

/// Classify runway: danger (<= 3), warning (<= 6), safe (> 6). NaN is danger.
pub fn get_runway_status(runway: f64) -> RunwayStatus {
    if runway.is_nan() || runway <= RUNWAY_DANGER_THRESHOLD {
        RunwayStatus::Danger
    } else if runway <= RUNWAY_WARNING_THRESHOLD {
        RunwayStatus::Warning
    } else {
        RunwayStatus::Safe
    }
}

/// Payroll for `employees` heads; zero for an empty (or negative) headcount,
/// otherwise at least `cost_model.minimum`.
pub fn compute_personnel_cost(employees: i64, cost_model: &CostModel) -> Decimal {
    if employees <= 0 {
        return Decimal::ZERO;
    }
    let payroll = Decimal::from(employees).saturating_mul(cost_model.unit_cost);
    payroll.max(cost_model.minimum)
}

/// `revenue - burn`, clamped to the representable range.
pub fn compute_monthly_profit(revenue: Decimal, burn: Decimal) -> Decimal {
    revenue.saturating_sub(burn)
}

/// `amount * numerator / denominator` without overflowing.
///
/// Multiplies first so whole-won amounts over percent denominators stay
/// exact; when the product does not fit, divides first and saturates at
/// the `Decimal` bounds. Zero `denominator` gives zero.
pub fn scale_amount(amount: Decimal, numerator: i64, denominator: i64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    let (numerator, denominator) = (Decimal::from(numerator), Decimal::from(denominator));
    match amount.checked_mul(numerator) {
        Some(product) => product.checked_div(denominator),
        None => amount
            .checked_div(denominator)
            .map(|share| share.saturating_mul(numerator)),
    }
    .unwrap_or_else(|| saturated(amount, numerator, denominator))
}

fn saturated(amount: Decimal, numerator: Decimal, denominator: Decimal) -> Decimal {
    let positive = amount.is_sign_positive()
        == (numerator.is_sign_positive() == denominator.is_sign_positive());
    if positive {
        Decimal::MAX
    } else {
        Decimal::MIN
    }
}

/// Castle HP in percent: 12 months of runway is a full bar.
pub fn runway_health_pct(runway: f64) -> f64 {
    if runway.is_nan() || runway <= 0.0 {
        return 0.0;
    }
    (runway / HEALTH_FULL_RUNWAY_MONTHS * 100.0).min(100.0)
}

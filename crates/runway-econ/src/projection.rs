//! One-month strategy projection.

use runway_core::{
    compute_monthly_burn, compute_monthly_profit, compute_personnel_cost, compute_runway,
    scale_amount, CostModel, FinancialData, StrategyProjection, StrategySettings,
};
use rust_decimal::Decimal;
use tracing::debug;

const PERCENT: i64 = 100;
const ANNUAL_PERCENT: i64 = 12 * PERCENT;

/// `amount * (1 + pct / 100)`: a percentage applied once.
pub fn apply_percent(amount: Decimal, percent: i32) -> Decimal {
    scale_amount(amount, PERCENT + i64::from(percent), PERCENT)
}

/// One month of an annual percentage: `amount * (1200 + pct) / 1200`.
///
/// Computed as a ratio of integers rather than through `1 + pct / 1200`,
/// whose decimal expansion repeats for most levers.
pub fn apply_annualized_percent(amount: Decimal, percent: i32) -> Decimal {
    scale_amount(amount, ANNUAL_PERCENT + i64::from(percent), ANNUAL_PERCENT)
}

/// Monthly burn implied by a strategy.
///
/// Headcount is `employees + headcountChange`, floored at zero; marketing is
/// scaled by `marketingIncrease`; office cost is unchanged.
pub fn strategy_burn(
    baseline: &FinancialData,
    settings: &StrategySettings,
    cost_model: &CostModel,
) -> Decimal {
    let settings = settings.normalized();
    let headcount = (i64::from(baseline.employees) + i64::from(settings.headcount_change)).max(0);
    let personnel = compute_personnel_cost(headcount, cost_model);
    let marketing = apply_percent(baseline.marketing_cost, settings.marketing_increase);
    compute_monthly_burn(personnel, marketing, baseline.office_cost)
}

/// Project next month under `settings` with the default cost model.
pub fn project_one_month(baseline: &FinancialData, settings: &StrategySettings) -> StrategyProjection {
    project_one_month_with(baseline, settings, &CostModel::default())
}

/// Project next month under `settings`.
///
/// Uses the current cash balance, not a running one: runway is
/// `baseline.cash / projected burn`.
pub fn project_one_month_with(
    baseline: &FinancialData,
    settings: &StrategySettings,
    cost_model: &CostModel,
) -> StrategyProjection {
    let settings = settings.normalized();
    let revenue = apply_percent(baseline.monthly_revenue, settings.revenue_growth);
    let burn = strategy_burn(baseline, &settings, cost_model);
    let projection = StrategyProjection {
        revenue,
        burn,
        runway: compute_runway(baseline.cash, burn),
        profit: compute_monthly_profit(revenue, burn),
    };
    debug!(?settings, burn = %projection.burn, runway = projection.runway, "projected one month");
    projection
}

//! 24-month runway simulation and outcome judgment.

use crate::projection::{apply_annualized_percent, apply_percent, strategy_burn};
use runway_core::{
    compute_monthly_profit, compute_runway, runway_serde, CostModel, FinancialData,
    SimulationPoint, StrategyProjection, StrategySettings,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Length of a simulation run in months.
pub const SIMULATION_MONTHS: u32 = 24;
/// Final runway a run must exceed to count as successful.
pub const SUCCESS_RUNWAY_MONTHS: f64 = 6.0;

/// Simulate 24 months with the default cost model.
pub fn simulate(baseline: &FinancialData, settings: &StrategySettings) -> Vec<SimulationPoint> {
    simulate_with(baseline, settings, &CostModel::default())
}

/// Simulate 24 months forward from `baseline`.
///
/// Revenue compounds by `revenueGrowth / 1200` per month and receives the
/// one-time `priceIncrease` in month 1. Burn is fixed for the whole run.
/// Cash keeps accumulating after it turns negative; the run is never cut
/// short. Amounts saturate at the `Decimal` bounds.
pub fn simulate_with(
    baseline: &FinancialData,
    settings: &StrategySettings,
    cost_model: &CostModel,
) -> Vec<SimulationPoint> {
    let settings = settings.normalized();
    let burn = strategy_burn(baseline, &settings, cost_model);

    let mut revenue = baseline.monthly_revenue;
    let mut cash = baseline.cash;
    let mut points = Vec::with_capacity(SIMULATION_MONTHS as usize);
    for month in 1..=SIMULATION_MONTHS {
        revenue = apply_annualized_percent(revenue, settings.revenue_growth);
        if month == 1 {
            revenue = apply_percent(revenue, settings.price_increase);
        }
        let profit = compute_monthly_profit(revenue, burn);
        cash = cash.saturating_add(profit);
        points.push(SimulationPoint {
            month,
            revenue,
            burn,
            profit,
            cash,
            runway: compute_runway(cash, burn),
        });
    }
    points
}

/// How a finished run reads to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// More cash than at the start and over six months of runway left.
    Victory,
    /// Still solvent but not successful.
    Strained,
    /// Treasury empty at the end of the run.
    Fallen,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Victory => "승리의 전략!",
            Verdict::Strained => "조정 필요",
            Verdict::Fallen => "전략 재검토 필요",
        }
    }
}

/// Simulation series plus derived markers. Months are 1-based.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub points: Vec<SimulationPoint>,
    pub successful: bool,
    /// First month with positive profit.
    pub break_even_month: Option<u32>,
    /// First month whose closing cash is <= 0.
    pub cashout_month: Option<u32>,
    /// Month with the highest closing cash (earliest on ties).
    pub peak_cash_month: Option<u32>,
    pub final_cash: Decimal,
    #[serde(with = "runway_serde")]
    pub final_runway: f64,
}

impl SimulationOutcome {
    pub fn verdict(&self) -> Verdict {
        if self.successful {
            Verdict::Victory
        } else if self.final_cash > Decimal::ZERO {
            Verdict::Strained
        } else {
            Verdict::Fallen
        }
    }

    pub fn final_point(&self) -> Option<&SimulationPoint> {
        self.points.last()
    }
}

/// Derive the outcome markers of a run against its starting baseline.
pub fn judge(baseline: &FinancialData, points: Vec<SimulationPoint>) -> SimulationOutcome {
    let (final_cash, final_runway) = points
        .last()
        .map(|p| (p.cash, p.runway))
        .unwrap_or((baseline.cash, baseline.runway));
    let successful =
        !points.is_empty() && final_cash > baseline.cash && final_runway > SUCCESS_RUNWAY_MONTHS;
    let break_even_month = points.iter().find(|p| p.profit > Decimal::ZERO).map(|p| p.month);
    let cashout_month = points.iter().find(|p| p.cash <= Decimal::ZERO).map(|p| p.month);
    let peak_cash_month = points
        .iter()
        .fold(None::<&SimulationPoint>, |best, p| match best {
            Some(b) if b.cash >= p.cash => Some(b),
            _ => Some(p),
        })
        .map(|p| p.month);
    debug!(
        successful,
        ?break_even_month,
        ?cashout_month,
        ?peak_cash_month,
        "judged simulation"
    );
    SimulationOutcome {
        points,
        successful,
        break_even_month,
        cashout_month,
        peak_cash_month,
        final_cash,
        final_runway,
    }
}

/// Simulate and judge in one call with the default cost model.
pub fn run_simulation(baseline: &FinancialData, settings: &StrategySettings) -> SimulationOutcome {
    run_simulation_with(baseline, settings, &CostModel::default())
}

pub fn run_simulation_with(
    baseline: &FinancialData,
    settings: &StrategySettings,
    cost_model: &CostModel,
) -> SimulationOutcome {
    judge(baseline, simulate_with(baseline, settings, cost_model))
}

/// One bar of the strategy screen's timeline preview.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBar {
    pub month: u32,
    pub revenue: Decimal,
    pub profit: Decimal,
}

/// Preview bars: the projected revenue compounded by `revenueGrowth / 1200`
/// per month from month 1, against the projected (constant) burn.
pub fn preview_timeline(
    projection: &StrategyProjection,
    settings: &StrategySettings,
) -> Vec<TimelineBar> {
    let growth = settings.normalized().revenue_growth;
    let mut revenue = projection.revenue;
    (1..=SIMULATION_MONTHS)
        .map(|month| {
            if month > 1 {
                revenue = apply_annualized_percent(revenue, growth);
            }
            TimelineBar {
                month,
                revenue,
                profit: compute_monthly_profit(revenue, projection.burn),
            }
        })
        .collect()
}

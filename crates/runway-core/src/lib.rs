#![deny(warnings)]

//! Core domain models and invariants for the castle runway planner.
//!
//! This crate defines the serializable types shared by the projection engine,
//! the simulator and the strategy advisor, together with the helpers that keep
//! derived fields consistent:
//! - `monthly_burn` always equals personnel + marketing + office cost
//! - `runway` is always recomputed from the current cash/burn pair
//! - strategy levers are clamped to their ranges and snapped to their steps

pub mod finance;
pub mod money;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub use finance::*;
pub use money::{format_korean_money, format_korean_money_f64, SignStyle};

/// Serde adapter for runway values: infinite runway travels as `null`.
pub mod runway_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

fn infinite_runway() -> f64 {
    f64::INFINITY
}

/// Per-head personnel cost model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CostModel {
    /// Monthly cost of one employee.
    pub unit_cost: Decimal,
    /// Floor applied to a non-empty payroll.
    pub minimum: Decimal,
}

impl CostModel {
    pub const DEFAULT_UNIT_COST: i64 = 3_000_000;

    pub fn with_unit_cost(unit_cost: Decimal) -> Self {
        Self {
            unit_cost,
            minimum: Decimal::ZERO,
        }
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::with_unit_cost(Decimal::new(Self::DEFAULT_UNIT_COST, 0))
    }
}

/// One past period of the business.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalRecord {
    /// Display label, e.g. "9월".
    pub month: String,
    pub revenue: Decimal,
    pub burn: Decimal,
}

/// Baseline financial snapshot ("the castle").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialData {
    /// Treasury, >= 0.
    pub cash: Decimal,
    pub monthly_revenue: Decimal,
    /// Derived: personnel + marketing + office.
    pub monthly_burn: Decimal,
    /// Derived: cash / burn in months, infinite when burn <= 0.
    #[serde(with = "runway_serde", default = "infinite_runway")]
    pub runway: f64,
    pub employees: u32,
    /// Derived from `employees` through a [`CostModel`].
    pub personnel_cost: Decimal,
    pub marketing_cost: Decimal,
    pub office_cost: Decimal,
    #[serde(default)]
    pub historical_data: Vec<HistoricalRecord>,
}

fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

impl FinancialData {
    /// Build a snapshot from raw inputs, deriving personnel cost, burn and runway.
    /// Negative amounts are clamped to zero.
    pub fn new(
        cash: Decimal,
        monthly_revenue: Decimal,
        employees: u32,
        marketing_cost: Decimal,
        office_cost: Decimal,
        historical_data: Vec<HistoricalRecord>,
        cost_model: &CostModel,
    ) -> Self {
        let personnel_cost = compute_personnel_cost(i64::from(employees), cost_model);
        let marketing_cost = non_negative(marketing_cost);
        let office_cost = non_negative(office_cost);
        let monthly_burn = compute_monthly_burn(personnel_cost, marketing_cost, office_cost);
        let cash = non_negative(cash);
        Self {
            cash,
            monthly_revenue: non_negative(monthly_revenue),
            monthly_burn,
            runway: compute_runway(cash, monthly_burn),
            employees,
            personnel_cost,
            marketing_cost,
            office_cost,
            historical_data,
        }
    }

    /// Demo company used by the CLI and tests.
    pub fn sample() -> Self {
        let record = |month: &str, revenue: i64, burn: i64| HistoricalRecord {
            month: month.to_string(),
            revenue: Decimal::new(revenue, 0),
            burn: Decimal::new(burn, 0),
        };
        Self::new(
            Decimal::new(150_000_000, 0),
            Decimal::new(45_000_000, 0),
            8,
            Decimal::new(8_000_000, 0),
            Decimal::new(2_000_000, 0),
            vec![
                record("9월", 38_000_000, 32_000_000),
                record("10월", 42_000_000, 33_000_000),
                record("11월", 40_000_000, 36_000_000),
                record("12월", 43_000_000, 34_000_000),
                record("1월", 44_000_000, 35_000_000),
                record("2월", 45_000_000, 34_000_000),
            ],
            &CostModel::default(),
        )
    }

    pub fn with_cash(&self, cash: Decimal) -> Self {
        let cash = non_negative(cash);
        Self {
            cash,
            runway: compute_runway(cash, self.monthly_burn),
            ..self.clone()
        }
    }

    pub fn with_monthly_revenue(&self, monthly_revenue: Decimal) -> Self {
        Self {
            monthly_revenue: non_negative(monthly_revenue),
            ..self.clone()
        }
    }

    pub fn with_employees(&self, employees: u32, cost_model: &CostModel) -> Self {
        let personnel = compute_personnel_cost(i64::from(employees), cost_model);
        let mut next = self.with_costs(personnel, self.marketing_cost, self.office_cost);
        next.employees = employees;
        next
    }

    pub fn with_marketing_cost(&self, marketing_cost: Decimal) -> Self {
        self.with_costs(self.personnel_cost, marketing_cost, self.office_cost)
    }

    pub fn with_office_cost(&self, office_cost: Decimal) -> Self {
        self.with_costs(self.personnel_cost, self.marketing_cost, office_cost)
    }

    /// Re-establish burn/runway after a cost change and rewrite the latest
    /// historical record with the new figures.
    fn with_costs(&self, personnel: Decimal, marketing: Decimal, office: Decimal) -> Self {
        let personnel_cost = non_negative(personnel);
        let marketing_cost = non_negative(marketing);
        let office_cost = non_negative(office);
        let monthly_burn = compute_monthly_burn(personnel_cost, marketing_cost, office_cost);
        let mut historical_data = self.historical_data.clone();
        if let Some(latest) = historical_data.last_mut() {
            latest.revenue = self.monthly_revenue;
            latest.burn = monthly_burn;
        }
        debug!(%monthly_burn, "cost components changed");
        Self {
            monthly_burn,
            runway: compute_runway(self.cash, monthly_burn),
            personnel_cost,
            marketing_cost,
            office_cost,
            historical_data,
            ..self.clone()
        }
    }

    /// Monthly profit at the current revenue and burn.
    pub fn monthly_profit(&self) -> Decimal {
        compute_monthly_profit(self.monthly_revenue, self.monthly_burn)
    }

    pub fn runway_status(&self) -> RunwayStatus {
        get_runway_status(compute_runway(self.cash, self.monthly_burn))
    }
}

/// Inclusive range and step of one strategy lever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LeverRange {
    pub min: i32,
    pub max: i32,
    pub step: i32,
}

impl LeverRange {
    pub const fn new(min: i32, max: i32, step: i32) -> Self {
        Self { min, max, step }
    }

    /// Clamp to `[min, max]`, then snap to the nearest step counted from `min`.
    pub fn normalize(&self, value: f64) -> i32 {
        let (min, max, step) = (self.min as f64, self.max as f64, self.step as f64);
        if value.is_nan() {
            return self.min;
        }
        let clamped = value.clamp(min, max);
        let snapped = min + ((clamped - min) / step).round() * step;
        (snapped as i32).clamp(self.min, self.max)
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value) && (value - self.min) % self.step == 0
    }
}

/// Ranges for all four levers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyLimits {
    pub revenue_growth: LeverRange,
    pub headcount_change: LeverRange,
    pub marketing_increase: LeverRange,
    pub price_increase: LeverRange,
}

pub const STRATEGY_LIMITS: StrategyLimits = StrategyLimits {
    revenue_growth: LeverRange::new(-50, 100, 5),
    headcount_change: LeverRange::new(-5, 10, 1),
    marketing_increase: LeverRange::new(-50, 200, 10),
    price_increase: LeverRange::new(-20, 50, 5),
};

/// Adjustable strategy vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrategySettings {
    /// Percent, [-50, 100] step 5.
    pub revenue_growth: i32,
    /// Employee delta, [-5, 10] step 1.
    pub headcount_change: i32,
    /// Percent applied to marketing cost, [-50, 200] step 10.
    pub marketing_increase: i32,
    /// One-time percent applied to revenue, [-20, 50] step 5.
    pub price_increase: i32,
}

impl StrategySettings {
    /// Starting lever positions of a new session.
    pub fn sample() -> Self {
        Self {
            revenue_growth: 30,
            headcount_change: 2,
            marketing_increase: 50,
            price_increase: 10,
        }
    }

    /// Copy with every lever clamped and snapped to [`STRATEGY_LIMITS`].
    pub fn normalized(&self) -> Self {
        let l = &STRATEGY_LIMITS;
        Self {
            revenue_growth: l.revenue_growth.normalize(f64::from(self.revenue_growth)),
            headcount_change: l.headcount_change.normalize(f64::from(self.headcount_change)),
            marketing_increase: l
                .marketing_increase
                .normalize(f64::from(self.marketing_increase)),
            price_increase: l.price_increase.normalize(f64::from(self.price_increase)),
        }
    }

    pub fn is_within_limits(&self) -> bool {
        let l = &STRATEGY_LIMITS;
        l.revenue_growth.contains(self.revenue_growth)
            && l.headcount_change.contains(self.headcount_change)
            && l.marketing_increase.contains(self.marketing_increase)
            && l.price_increase.contains(self.price_increase)
    }
}

/// Untrusted, possibly partial lever values (e.g. parsed from model output).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawStrategySettings {
    pub revenue_growth: Option<f64>,
    pub headcount_change: Option<f64>,
    pub marketing_increase: Option<f64>,
    pub price_increase: Option<f64>,
}

impl RawStrategySettings {
    /// Validate against the limits; missing or non-finite fields take the
    /// value from `current`.
    pub fn normalize_against(&self, current: &StrategySettings) -> StrategySettings {
        fn pick(value: Option<f64>, fallback: i32) -> f64 {
            value
                .filter(|v| v.is_finite())
                .unwrap_or(f64::from(fallback))
        }
        let l = &STRATEGY_LIMITS;
        StrategySettings {
            revenue_growth: l
                .revenue_growth
                .normalize(pick(self.revenue_growth, current.revenue_growth)),
            headcount_change: l
                .headcount_change
                .normalize(pick(self.headcount_change, current.headcount_change)),
            marketing_increase: l
                .marketing_increase
                .normalize(pick(self.marketing_increase, current.marketing_increase)),
            price_increase: l
                .price_increase
                .normalize(pick(self.price_increase, current.price_increase)),
        }
    }
}

impl From<StrategySettings> for RawStrategySettings {
    fn from(s: StrategySettings) -> Self {
        Self {
            revenue_growth: Some(f64::from(s.revenue_growth)),
            headcount_change: Some(f64::from(s.headcount_change)),
            marketing_increase: Some(f64::from(s.marketing_increase)),
            price_increase: Some(f64::from(s.price_increase)),
        }
    }
}

/// One-month outcome of applying a strategy to a baseline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyProjection {
    pub revenue: Decimal,
    pub burn: Decimal,
    #[serde(with = "runway_serde", default = "infinite_runway")]
    pub runway: f64,
    pub profit: Decimal,
}

/// One month of a multi-month simulation run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPoint {
    /// 1-based month index.
    pub month: u32,
    pub revenue: Decimal,
    pub burn: Decimal,
    pub profit: Decimal,
    /// Running cash balance after this month.
    pub cash: Decimal,
    #[serde(with = "runway_serde", default = "infinite_runway")]
    pub runway: f64,
}

/// Runway classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwayStatus {
    Danger,
    Warning,
    Safe,
}

impl RunwayStatus {
    /// Korean UI label.
    pub fn label(&self) -> &'static str {
        match self {
            RunwayStatus::Danger => "위험",
            RunwayStatus::Warning => "주의",
            RunwayStatus::Safe => "안전",
        }
    }
}

impl fmt::Display for RunwayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunwayStatus::Danger => "danger",
            RunwayStatus::Warning => "warning",
            RunwayStatus::Safe => "safe",
        };
        f.write_str(s)
    }
}

/// Scenario mode picked before tuning the levers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioId {
    Defense,
    Maintain,
    Attack,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 3] = [ScenarioId::Defense, ScenarioId::Maintain, ScenarioId::Attack];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioId::Defense => "defense",
            ScenarioId::Maintain => "maintain",
            ScenarioId::Attack => "attack",
        }
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown scenario: {0} (expected defense, maintain or attack)")]
pub struct ParseScenarioError(pub String);

impl FromStr for ScenarioId {
    type Err = ParseScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "defense" => Ok(ScenarioId::Defense),
            "maintain" => Ok(ScenarioId::Maintain),
            "attack" => Ok(ScenarioId::Attack),
            other => Err(ParseScenarioError(other.to_string())),
        }
    }
}

/// Validation errors for snapshot invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Monetary field below zero.
    #[error("negative monetary value in {0}")]
    NegativeMoney(&'static str),
    /// Burn does not equal the sum of its components.
    #[error("monthly burn {actual} does not match cost components {expected}")]
    BurnMismatch { expected: Decimal, actual: Decimal },
    /// Runway was not recomputed after cash or burn changed.
    #[error("runway {actual} is stale, expected {expected}")]
    StaleRunway { expected: f64, actual: f64 },
    /// Runway is NaN.
    #[error("non-finite numeric value encountered")]
    NonFinite,
}

/// Validate a snapshot's derived fields against its inputs.
pub fn validate_financial_data(data: &FinancialData) -> Result<(), ValidationError> {
    let money = [
        ("cash", data.cash),
        ("monthlyRevenue", data.monthly_revenue),
        ("personnelCost", data.personnel_cost),
        ("marketingCost", data.marketing_cost),
        ("officeCost", data.office_cost),
    ];
    for (field, value) in money {
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(field));
        }
    }
    let expected = compute_monthly_burn(data.personnel_cost, data.marketing_cost, data.office_cost);
    if expected != data.monthly_burn {
        return Err(ValidationError::BurnMismatch {
            expected,
            actual: data.monthly_burn,
        });
    }
    if data.runway.is_nan() {
        return Err(ValidationError::NonFinite);
    }
    let runway = compute_runway(data.cash, data.monthly_burn);
    let stale = if runway.is_finite() {
        (runway - data.runway).abs() > 1e-6
    } else {
        runway != data.runway
    };
    if stale {
        return Err(ValidationError::StaleRunway {
            expected: runway,
            actual: data.runway,
        });
    }
    Ok(())
}

/// Runway in whole-and-tenth months for display, or "무한" when unbounded.
pub fn describe_runway(runway: f64) -> String {
    if runway.is_finite() {
        format!("{:.1}개월", runway)
    } else {
        "무한".to_string()
    }
}

/// Lossy view of an amount for ratios and charts.
pub fn to_f64(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sample_matches_documented_baseline() {
        let data = FinancialData::sample();
        assert_eq!(data.personnel_cost, Decimal::new(24_000_000, 0));
        assert_eq!(data.monthly_burn, Decimal::new(34_000_000, 0));
        assert!((data.runway - 150.0 / 34.0).abs() < 1e-9);
        assert_eq!(data.runway_status(), RunwayStatus::Warning);
        validate_financial_data(&data).unwrap();
    }

    #[test]
    fn cost_changes_keep_burn_invariant_and_rewrite_latest_record() {
        let data = FinancialData::sample();
        let next = data.with_marketing_cost(Decimal::new(12_000_000, 0));
        assert_eq!(next.monthly_burn, Decimal::new(38_000_000, 0));
        validate_financial_data(&next).unwrap();
        let latest = next.historical_data.last().unwrap();
        assert_eq!(latest.month, "2월");
        assert_eq!(latest.burn, Decimal::new(38_000_000, 0));
        assert_eq!(latest.revenue, Decimal::new(45_000_000, 0));
        // earlier records untouched, input untouched
        assert_eq!(next.historical_data[0], data.historical_data[0]);
        assert_eq!(data.monthly_burn, Decimal::new(34_000_000, 0));
    }

    #[test]
    fn office_cost_change_rewrites_burn_and_latest_record() {
        let data = FinancialData::sample();
        let next = data.with_office_cost(Decimal::new(5_000_000, 0));
        assert_eq!(next.office_cost, Decimal::new(5_000_000, 0));
        assert_eq!(next.monthly_burn, Decimal::new(37_000_000, 0));
        assert!((next.runway - 150.0 / 37.0).abs() < 1e-9);
        validate_financial_data(&next).unwrap();
        assert_eq!(next.historical_data.last().unwrap().burn, Decimal::new(37_000_000, 0));

        let cleared = data.with_office_cost(Decimal::new(-1, 0));
        assert_eq!(cleared.office_cost, Decimal::ZERO);
        assert_eq!(cleared.monthly_burn, Decimal::new(32_000_000, 0));
    }

    #[test]
    fn employees_change_recomputes_personnel() {
        let data = FinancialData::sample().with_employees(0, &CostModel::default());
        assert_eq!(data.personnel_cost, Decimal::ZERO);
        assert_eq!(data.monthly_burn, Decimal::new(10_000_000, 0));
        assert!((data.runway - 15.0).abs() < 1e-9);
        validate_financial_data(&data).unwrap();
    }

    #[test]
    fn zero_costs_give_infinite_runway() {
        let data = FinancialData::new(
            Decimal::new(1_000, 0),
            Decimal::ZERO,
            0,
            Decimal::ZERO,
            Decimal::ZERO,
            vec![],
            &CostModel::default(),
        );
        assert!(data.runway.is_infinite());
        assert_eq!(data.runway_status(), RunwayStatus::Safe);
        validate_financial_data(&data).unwrap();
        let json = serde_json::to_value(&data).unwrap();
        assert!(json["runway"].is_null());
        let back: FinancialData = serde_json::from_value(json).unwrap();
        assert!(back.runway.is_infinite());
    }

    #[test]
    fn validation_flags_tampered_fields() {
        let mut data = FinancialData::sample();
        data.monthly_burn = Decimal::new(1, 0);
        assert!(matches!(
            validate_financial_data(&data),
            Err(ValidationError::BurnMismatch { .. })
        ));
        let mut data = FinancialData::sample();
        data.cash = Decimal::new(10, 0);
        assert!(matches!(
            validate_financial_data(&data),
            Err(ValidationError::StaleRunway { .. })
        ));
        let mut data = FinancialData::sample();
        data.office_cost = Decimal::new(-1, 0);
        assert_eq!(
            validate_financial_data(&data),
            Err(ValidationError::NegativeMoney("officeCost"))
        );
    }

    #[test]
    fn normalize_clamps_then_snaps() {
        let g = STRATEGY_LIMITS.revenue_growth;
        assert_eq!(g.normalize(137.0), 100);
        assert_eq!(g.normalize(-80.0), -50);
        assert_eq!(g.normalize(12.0), 10);
        assert_eq!(g.normalize(13.0), 15);
        assert_eq!(STRATEGY_LIMITS.marketing_increase.normalize(33.0), 30);
        assert_eq!(STRATEGY_LIMITS.headcount_change.normalize(2.6), 3);
        assert_eq!(STRATEGY_LIMITS.price_increase.normalize(f64::INFINITY), 50);
    }

    #[test]
    fn raw_settings_fall_back_to_current() {
        let current = StrategySettings::sample();
        let raw = RawStrategySettings {
            revenue_growth: Some(f64::NAN),
            headcount_change: None,
            marketing_increase: Some(500.0),
            price_increase: Some(-3.0),
        };
        let s = raw.normalize_against(&current);
        assert_eq!(s.revenue_growth, 30);
        assert_eq!(s.headcount_change, 2);
        assert_eq!(s.marketing_increase, 200);
        assert_eq!(s.price_increase, -5);
    }

    #[test]
    fn scenario_parses_case_insensitively() {
        assert_eq!("Attack".parse::<ScenarioId>().unwrap(), ScenarioId::Attack);
        assert!("siege".parse::<ScenarioId>().is_err());
    }

    proptest! {
        #[test]
        fn normalized_settings_are_within_limits(
            g in -1_000i32..1_000,
            h in -100i32..100,
            m in -1_000i32..1_000,
            p in -1_000i32..1_000,
        ) {
            let s = StrategySettings {
                revenue_growth: g,
                headcount_change: h,
                marketing_increase: m,
                price_increase: p,
            }.normalized();
            prop_assert!(s.is_within_limits());
            prop_assert_eq!(s.normalized(), s);
        }

        #[test]
        fn raw_values_always_land_on_a_step(v in proptest::num::f64::ANY) {
            let raw = RawStrategySettings {
                revenue_growth: Some(v),
                headcount_change: Some(v),
                marketing_increase: Some(v),
                price_increase: Some(v),
            };
            let s = raw.normalize_against(&StrategySettings::default());
            prop_assert!(s.is_within_limits());
        }
    }
}

//! YAML run configuration for the CLI.
//!
//! ```yaml
//! baseline:
//!   cash: 150000000
//!   monthlyRevenue: 45000000
//!   employees: 8
//!   marketingCost: 8000000
//!   officeCost: 2000000
//! settings:
//!   revenueGrowth: 30
//!   headcountChange: 2
//! cost_model:
//!   unitCost: 3000000
//! advisor:
//!   base_url: http://localhost:11434
//!   model: llama3.1:latest
//! ```
//!
//! Every section is optional. Advisor fields are then overlaid with the
//! `OLLAMA_*` environment variables.

use anyhow::{Context, Result};
use runway_ai::AdvisorConfig;
use runway_core::{CostModel, FinancialData, HistoricalRecord, StrategySettings};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Raw baseline inputs; derived fields are recomputed on load.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BaselineInput {
    pub cash: Decimal,
    pub monthly_revenue: Decimal,
    pub employees: u32,
    pub marketing_cost: Decimal,
    pub office_cost: Decimal,
    pub historical_data: Vec<HistoricalRecord>,
}

impl Default for BaselineInput {
    fn default() -> Self {
        let sample = FinancialData::sample();
        Self {
            cash: sample.cash,
            monthly_revenue: sample.monthly_revenue,
            employees: sample.employees,
            marketing_cost: sample.marketing_cost,
            office_cost: sample.office_cost,
            historical_data: sample.historical_data,
        }
    }
}

impl BaselineInput {
    pub fn build(&self, cost_model: &CostModel) -> FinancialData {
        FinancialData::new(
            self.cash,
            self.monthly_revenue,
            self.employees,
            self.marketing_cost,
            self.office_cost,
            self.historical_data.clone(),
            cost_model,
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub baseline: BaselineInput,
    pub settings: StrategySettings,
    pub cost_model: CostModel,
    pub advisor: AdvisorConfig,
}

impl RunConfig {
    /// Read `path` if given, else start from defaults with the advisor taken
    /// from the environment. File settings are overlaid with the advisor
    /// environment overrides too.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                advisor: AdvisorConfig::from_env(),
                ..Self::default()
            });
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    fn with_env_overrides(mut self) -> Self {
        self.advisor = self.advisor.with_env_overrides();
        self
    }

    pub fn baseline(&self) -> FinancialData {
        self.baseline.build(&self.cost_model)
    }
}

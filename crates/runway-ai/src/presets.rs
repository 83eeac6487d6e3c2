//! Deterministic conservative / balanced / aggressive presets.

use crate::advisor::{Recommendation, RecommendationSource};
use runway_core::{CostModel, FinancialData, StrategySettings};
use runway_econ::project_one_month_with;

/// Title and reason for each preset, in preset order.
pub const PRESET_COPY: [(&str, &str); 3] = [
    (
        "안정 수비형",
        "현금 소진 속도를 늦추면서 최소한의 성장률은 지키는 보수적인 조합입니다.",
    ),
    (
        "균형 성장형",
        "매출 성장과 비용 증가를 함께 관리해 런웨이와 성장률을 동시에 챙기는 조합입니다.",
    ),
    (
        "공격 확장형",
        "단기 런웨이 감소를 감수하고 성장 속도를 끌어올리는 실험적인 조합입니다.",
    ),
];

/// Raise to `floor` without passing `ceiling`.
fn raise_within(value: i32, floor: i32, ceiling: i32) -> i32 {
    value.max(floor).min(ceiling)
}

/// Three presets biased by the current settings, each within limits.
///
/// Levers already past a preset's floor keep their value up to the preset's
/// ceiling, so the presets follow the player's direction.
pub fn fallback_presets(current: &StrategySettings) -> [StrategySettings; 3] {
    let c = current.normalized();
    let conservative = StrategySettings {
        revenue_growth: c.revenue_growth.max(15),
        headcount_change: c.headcount_change.min(1),
        marketing_increase: c.marketing_increase.min(20),
        price_increase: c.price_increase.max(0),
    };
    let balanced = StrategySettings {
        revenue_growth: c.revenue_growth.max(30),
        headcount_change: raise_within(c.headcount_change, 1, 3),
        marketing_increase: raise_within(c.marketing_increase, 35, 60),
        price_increase: raise_within(c.price_increase, 5, 15),
    };
    let aggressive = StrategySettings {
        revenue_growth: raise_within(c.revenue_growth, 45, 75),
        headcount_change: raise_within(c.headcount_change, 2, 5),
        marketing_increase: raise_within(c.marketing_increase, 70, 120),
        price_increase: raise_within(c.price_increase, 8, 18),
    };
    [
        conservative.normalized(),
        balanced.normalized(),
        aggressive.normalized(),
    ]
}

/// The presets as recommendations with their one-month projections.
pub fn fallback_recommendations(
    baseline: &FinancialData,
    current: &StrategySettings,
    cost_model: &CostModel,
) -> Vec<Recommendation> {
    fallback_presets(current)
        .into_iter()
        .zip(PRESET_COPY)
        .map(|(settings, (title, reason))| Recommendation {
            title: title.to_string(),
            reason: reason.to_string(),
            settings,
            projection: project_one_month_with(baseline, &settings, cost_model),
            source: RecommendationSource::Fallback,
        })
        .collect()
}

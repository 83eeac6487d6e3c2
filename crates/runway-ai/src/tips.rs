//! Follow-up tips shown after a simulation run.

use runway_core::StrategySettings;
use runway_econ::SimulationOutcome;
use serde::Serialize;

const MAX_TIPS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionTip {
    pub icon: &'static str,
    pub text: String,
}

impl ActionTip {
    fn new(icon: &'static str, text: impl Into<String>) -> Self {
        Self {
            icon,
            text: text.into(),
        }
    }
}

/// Up to three tips, in priority order: marketing, hiring, pricing, then
/// the final runway.
pub fn action_tips(settings: &StrategySettings, outcome: &SimulationOutcome) -> Vec<ActionTip> {
    let s = settings.normalized();
    let mut tips = Vec::with_capacity(4);
    if s.marketing_increase > 30 {
        tips.push(ActionTip::new("📢", "마케팅 ROI를 주간 단위로 모니터링하세요"));
    }
    if s.headcount_change > 0 {
        let first_hire = (s.headcount_change + 1) / 2;
        tips.push(ActionTip::new("👥", format!("{first_hire}월차에 첫 채용 시작")));
    }
    if s.price_increase > 0 {
        tips.push(ActionTip::new(
            "💸",
            format!("{}% 가격 인상을 A/B 테스트로 검증", s.price_increase),
        ));
    }
    if outcome.final_runway < 6.0 {
        tips.push(ActionTip::new("⚠️", "비상 자금 확보 또는 비용 재조정 필요"));
    } else if outcome.final_runway > 18.0 {
        tips.push(ActionTip::new("🚀", "공격적 마케팅/채용 기회 검토"));
    }
    tips.truncate(MAX_TIPS);
    tips
}

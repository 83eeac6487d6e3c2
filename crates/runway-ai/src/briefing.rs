//! Deterministic scenario briefing: three options and a recommendation
//! whose numbers come from the current snapshot.

use runway_core::{
    compute_runway, describe_runway, format_korean_money, to_f64, FinancialData, ScenarioId,
    SignStyle,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// Share of monthly burn per cost item, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComposition {
    pub personnel_share: f64,
    pub marketing_share: f64,
    pub office_share: f64,
}

impl CostComposition {
    /// All zero when the burn is zero.
    pub fn of(data: &FinancialData) -> Self {
        let burn = to_f64(data.monthly_burn);
        if burn <= 0.0 {
            return Self::default();
        }
        let share = |part: Decimal| to_f64(part) / burn * 100.0;
        Self {
            personnel_share: share(data.personnel_cost),
            marketing_share: share(data.marketing_cost),
            office_share: share(data.office_cost),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BriefingOption {
    pub title: String,
    pub action: String,
    pub expected: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Briefing {
    pub scenario: ScenarioId,
    pub composition: CostComposition,
    pub summary: String,
    pub options: [BriefingOption; 3],
    pub recommendation: String,
}

fn option(title: &str, action: &str, expected: String) -> BriefingOption {
    BriefingOption {
        title: title.to_string(),
        action: action.to_string(),
        expected,
    }
}

fn won(amount: Decimal) -> String {
    format_korean_money(amount, SignStyle::Plain)
}

fn pct(numerator: i64) -> Decimal {
    Decimal::new(numerator, 2)
}

/// Build the briefing for `scenario`. Pure; the same inputs always give
/// the same text.
pub fn build_briefing(scenario: ScenarioId, data: &FinancialData) -> Briefing {
    let composition = CostComposition::of(data);
    let profit = data.monthly_profit();
    let summary = format!(
        "현금 {}, 월 지출 {}, 런웨이 {}. 지출 구성은 인건비 {:.0}% · 마케팅 {:.0}% · 사무실 {:.0}%입니다.",
        won(data.cash),
        won(data.monthly_burn),
        describe_runway(data.runway),
        composition.personnel_share,
        composition.marketing_share,
        composition.office_share,
    );
    let (options, recommendation) = match scenario {
        ScenarioId::Defense => defense(data),
        ScenarioId::Maintain => maintain(data, &composition, profit),
        ScenarioId::Attack => attack(data, &composition),
    };
    Briefing {
        scenario,
        composition,
        summary,
        options,
        recommendation,
    }
}

fn defense(data: &FinancialData) -> ([BriefingOption; 3], String) {
    let trimmed_burn = data.monthly_burn * pct(70);
    let marketing_saving = data.marketing_cost * pct(50);
    let options = [
        option(
            "고정비 30% 절감",
            "인건비와 사무실 비용을 포함한 전체 지출을 30% 줄입니다",
            format!(
                "월 지출 {} → 런웨이 {}",
                won(trimmed_burn),
                describe_runway(compute_runway(data.cash, trimmed_burn)),
            ),
        ),
        option(
            "마케팅 예산 절반 축소",
            "성과가 낮은 채널부터 마케팅 예산을 50% 줄입니다",
            format!(
                "월 {} 절감 → 런웨이 {}",
                won(marketing_saving),
                describe_runway(compute_runway(
                    data.cash,
                    data.monthly_burn - marketing_saving
                )),
            ),
        ),
        option(
            "채용 동결",
            "신규 채용을 멈추고 현재 인원으로 운영합니다",
            format!("인건비 월 {} 유지", won(data.personnel_cost)),
        ),
    ];
    let recommendation = if data.runway < 6.0 {
        "런웨이가 6개월 미만입니다. 고정비 30% 절감을 즉시 실행하세요.".to_string()
    } else {
        "런웨이에 여유가 있습니다. 마케팅 축소부터 단계적으로 진행하세요.".to_string()
    };
    (options, recommendation)
}

fn maintain(
    data: &FinancialData,
    composition: &CostComposition,
    profit: Decimal,
) -> ([BriefingOption; 3], String) {
    let (label, amount, share) = [
        ("인건비", data.personnel_cost, composition.personnel_share),
        ("마케팅", data.marketing_cost, composition.marketing_share),
        ("사무실", data.office_cost, composition.office_share),
    ]
    .into_iter()
    .fold(("인건비", Decimal::ZERO, 0.0), |best, item| {
        if item.1 > best.1 {
            item
        } else {
            best
        }
    });
    let options = [
        option(
            "가격 5% 인상",
            "이탈 위험이 낮은 고객군부터 가격을 5% 올립니다",
            format!("월 매출 +{}", won(data.monthly_revenue * pct(5))),
        ),
        option(
            "최대 비용 항목 점검",
            "가장 큰 지출 항목의 효율을 점검합니다",
            format!("{label} 월 {} (지출의 {share:.0}%)", won(amount)),
        ),
        option(
            "현금흐름 주간 점검",
            "현재 코스를 유지하며 손익을 매주 확인합니다",
            format!("월 손익 {}", format_korean_money(profit, SignStyle::Signed)),
        ),
    ];
    let recommendation = if profit >= Decimal::ZERO {
        "흑자 구조입니다. 현 코스를 유지하며 가격 인상을 시험해 보세요.".to_string()
    } else {
        format!(
            "매월 {} 적자입니다. {label} 지출부터 줄이세요.",
            won(-profit)
        )
    };
    (options, recommendation)
}

fn attack(data: &FinancialData, composition: &CostComposition) -> ([BriefingOption; 3], String) {
    let extra_marketing = data.marketing_cost * pct(50);
    let per_head = if data.employees > 0 {
        data.personnel_cost / Decimal::from(data.employees)
    } else {
        Decimal::ZERO
    };
    let options = [
        option(
            "마케팅 50% 증액",
            "성과가 검증된 채널에 마케팅 예산을 50% 더 씁니다",
            format!(
                "월 지출 +{} → 런웨이 {}",
                won(extra_marketing),
                describe_runway(compute_runway(
                    data.cash,
                    data.monthly_burn.saturating_add(extra_marketing)
                )),
            ),
        ),
        option(
            "핵심 인력 2명 채용",
            "영업과 개발에 한 명씩 충원합니다",
            format!("월 인건비 +{}", won(per_head.saturating_mul(Decimal::from(2)))),
        ),
        option(
            "가격 10% 인상",
            "신규 고객부터 프리미엄 요금제를 적용합니다",
            format!("월 매출 +{}", won(data.monthly_revenue * pct(10))),
        ),
    ];
    let recommendation = if composition.marketing_share < 20.0 {
        format!(
            "마케팅 비중이 {:.0}%로 낮습니다. 마케팅 증액으로 성장 여력을 확보하세요.",
            composition.marketing_share
        )
    } else {
        format!(
            "마케팅 비중이 이미 {:.0}%입니다. 가격 인상으로 성장 재원을 마련하세요.",
            composition.marketing_share
        )
    };
    (options, recommendation)
}

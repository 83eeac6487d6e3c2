//! Model-backed strategy advisor with a deterministic fallback.

use crate::config::AdvisorConfig;
use crate::error::AdvisorError;
use crate::presets::fallback_recommendations;
use crate::transport::{ChatMessage, ChatRequest, ChatTransport, HttpTransport};
use runway_core::{
    CostModel, FinancialData, LeverRange, RawStrategySettings, StrategyProjection,
    StrategySettings, STRATEGY_LIMITS,
};
use runway_econ::project_one_month_with;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str =
    "You return strategy recommendations as JSON only. Put every explanation inside `reason`.";
const DEFAULT_REASON: &str = "재무 균형을 고려한 자동 추천입니다.";
const MAX_RECOMMENDATIONS: usize = 3;

/// Who produced a recommendation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    Model,
    Fallback,
}

/// A proposed strategy with its one-month projection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub reason: String,
    pub settings: StrategySettings,
    pub projection: StrategyProjection,
    pub source: RecommendationSource,
}

/// Always exactly three recommendations.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorResult {
    pub recommendations: Vec<Recommendation>,
    pub source: RecommendationSource,
    pub model: String,
    pub base_url: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ModelPayload {
    #[serde(default)]
    recommendations: Vec<ModelItem>,
}

/// One model item; fields stay loosely typed until validation.
#[derive(Debug, Default, Deserialize)]
struct ModelItem {
    #[serde(default)]
    title: Value,
    #[serde(default)]
    reason: Value,
    #[serde(default)]
    settings: Value,
}

fn text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Numbers, or numeric strings such as `"15"` / `"20%"`.
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

impl ModelItem {
    fn raw_settings(&self) -> RawStrategySettings {
        let lever = |key: &str| number(self.settings.get(key));
        RawStrategySettings {
            revenue_growth: lever("revenueGrowth"),
            headcount_change: lever("headcountChange"),
            marketing_increase: lever("marketingIncrease"),
            price_increase: lever("priceIncrease"),
        }
    }
}

/// Locate the JSON object in model output: the outermost `{...}` span of
/// the first code fence, or of the whole text when the fence holds none.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    fenced_body(raw)
        .and_then(outermost_braces)
        .or_else(|| outermost_braces(raw))
}

fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn fenced_body(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    let rest = &raw[open + 3..];
    // skip a language tag such as `json`
    let tag_end = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let body = &rest[tag_end..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

fn parse_model_items(content: &str) -> Result<Vec<ModelItem>, AdvisorError> {
    let json = extract_json_object(content).ok_or(AdvisorError::MissingJson)?;
    let payload: ModelPayload = serde_json::from_str(json)?;
    let items: Vec<ModelItem> = payload
        .recommendations
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .collect();
    if items.is_empty() {
        return Err(AdvisorError::Empty);
    }
    Ok(items)
}

fn range_line(name: &str, range: &LeverRange) -> String {
    format!("- {name}: {}..{} (step {})", range.min, range.max, range.step)
}

fn build_prompt(baseline: &FinancialData, current: &StrategySettings) -> String {
    let limits = &STRATEGY_LIMITS;
    let snapshot = json!({
        "cash": baseline.cash,
        "monthlyRevenue": baseline.monthly_revenue,
        "monthlyBurn": baseline.monthly_burn,
        "employees": baseline.employees,
        "marketingCost": baseline.marketing_cost,
        "officeCost": baseline.office_cost,
        "runway": baseline.runway.is_finite().then_some(baseline.runway),
    });
    [
        "You are the strategy aide of a startup CFO simulation.".to_string(),
        "Goal: propose 3 strategies that balance 24-month survival against monthly profit.".to_string(),
        "The three must differ in temperament: conservative, balanced, aggressive.".to_string(),
        "Write `title` and `reason` in Korean. Reply with pure JSON only.".to_string(),
        "JSON schema:".to_string(),
        r#"{"recommendations":[{"title":"string","reason":"string","settings":{"revenueGrowth":number,"headcountChange":number,"marketingIncrease":number,"priceIncrease":number}}]}"#.to_string(),
        "Allowed values:".to_string(),
        range_line("revenueGrowth", &limits.revenue_growth),
        range_line("headcountChange", &limits.headcount_change),
        range_line("marketingIncrease", &limits.marketing_increase),
        range_line("priceIncrease", &limits.price_increase),
        "Current financials:".to_string(),
        snapshot.to_string(),
        "Current strategy:".to_string(),
        json!(current).to_string(),
    ]
    .join("\n")
}

/// Asks a chat model for three strategies; never fails.
#[derive(Clone, Debug)]
pub struct StrategyAdvisor<T = HttpTransport> {
    config: AdvisorConfig,
    transport: T,
    cost_model: CostModel,
}

impl StrategyAdvisor<HttpTransport> {
    /// HTTP advisor bounded by `config.timeout()`.
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisorError> {
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: ChatTransport> StrategyAdvisor<T> {
    pub fn with_transport(config: AdvisorConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            cost_model: CostModel::default(),
        }
    }

    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Three recommendations for `baseline` under the player's `current`
    /// settings. Any model failure (transport, status, timeout, missing or
    /// malformed JSON, empty list) yields the fallback presets instead.
    pub async fn recommend(
        &self,
        baseline: &FinancialData,
        current: &StrategySettings,
    ) -> AdvisorResult {
        let current = current.normalized();
        let (recommendations, source, message) =
            match self.request_recommendations(baseline, &current).await {
                Ok(recommendations) => {
                    info!(model = %self.config.model, "model recommendations accepted");
                    (
                        recommendations,
                        RecommendationSource::Model,
                        format!("모델({}) 판단 완료", self.config.model),
                    )
                }
                Err(err) => {
                    warn!(error = %err, model = %self.config.model, "advisor unavailable, using fallback presets");
                    (
                        fallback_recommendations(baseline, &current, &self.cost_model),
                        RecommendationSource::Fallback,
                        format!("모델 연결 실패로 기본 추천을 사용했습니다. ({err})"),
                    )
                }
            };
        AdvisorResult {
            recommendations,
            source,
            model: self.config.model.clone(),
            base_url: self.config.base_url.clone(),
            message,
        }
    }

    fn build_request(&self, baseline: &FinancialData, current: &StrategySettings) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            stream: false,
            format: "json".to_string(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(baseline, current)),
            ],
        }
    }

    async fn request_recommendations(
        &self,
        baseline: &FinancialData,
        current: &StrategySettings,
    ) -> Result<Vec<Recommendation>, AdvisorError> {
        let request = self.build_request(baseline, current);
        let url = self.config.chat_url();
        let timeout = self.config.timeout();
        debug!(%url, "requesting model recommendations");
        let response = tokio::time::timeout(timeout, self.transport.send(&url, &request))
            .await
            .map_err(|_| AdvisorError::Timeout(timeout.as_secs()))??;
        let items = parse_model_items(response.content())?;
        Ok(self.assemble(baseline, current, &items))
    }

    /// Validate model items; positions the model left empty keep the
    /// fallback preset for that position.
    fn assemble(
        &self,
        baseline: &FinancialData,
        current: &StrategySettings,
        items: &[ModelItem],
    ) -> Vec<Recommendation> {
        fallback_recommendations(baseline, current, &self.cost_model)
            .into_iter()
            .enumerate()
            .map(|(index, preset)| match items.get(index) {
                Some(item) => {
                    let settings = item.raw_settings().normalize_against(current);
                    Recommendation {
                        title: text(&item.title)
                            .unwrap_or_else(|| format!("AI 추천안 {}", index + 1)),
                        reason: text(&item.reason).unwrap_or_else(|| DEFAULT_REASON.to_string()),
                        settings,
                        projection: project_one_month_with(baseline, &settings, &self.cost_model),
                        source: RecommendationSource::Model,
                    }
                }
                None => preset,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{fallback_presets, PRESET_COPY};
    use crate::transport::ChatResponse;
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers every request with the same reply and records what it saw.
    struct Canned {
        reply: Result<String, u16>,
        seen: Mutex<Vec<(String, ChatRequest)>>,
    }

    impl Canned {
        fn content(content: &str) -> Self {
            Self {
                reply: Ok(content.to_string()),
                seen: Mutex::new(vec![]),
            }
        }

        fn status(code: u16) -> Self {
            Self {
                reply: Err(code),
                seen: Mutex::new(vec![]),
            }
        }
    }

    impl ChatTransport for Canned {
        fn send(
            &self,
            url: &str,
            request: &ChatRequest,
        ) -> impl Future<Output = Result<ChatResponse, AdvisorError>> + Send {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), request.clone()));
            let reply = match &self.reply {
                Ok(content) => Ok(ChatResponse::with_content(content.clone())),
                Err(code) => Err(AdvisorError::Status(*code)),
            };
            std::future::ready(reply)
        }
    }

    struct Unreachable;

    impl ChatTransport for Unreachable {
        fn send(
            &self,
            _url: &str,
            _request: &ChatRequest,
        ) -> impl Future<Output = Result<ChatResponse, AdvisorError>> + Send {
            std::future::ready(Err(AdvisorError::Unreachable(
                "connection refused".to_string(),
            )))
        }
    }

    struct Stalled;

    impl ChatTransport for Stalled {
        fn send(
            &self,
            _url: &str,
            _request: &ChatRequest,
        ) -> impl Future<Output = Result<ChatResponse, AdvisorError>> + Send {
            async {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Ok(ChatResponse::default())
            }
        }
    }

    fn advisor<T: ChatTransport>(transport: T) -> StrategyAdvisor<T> {
        StrategyAdvisor::with_transport(AdvisorConfig::default(), transport)
    }

    fn assert_fallback(result: &AdvisorResult, current: &StrategySettings) {
        assert_eq!(result.source, RecommendationSource::Fallback);
        assert_eq!(result.recommendations.len(), 3);
        let presets = fallback_presets(current);
        for ((rec, preset), (title, _)) in result.recommendations.iter().zip(presets).zip(PRESET_COPY) {
            assert_eq!(rec.source, RecommendationSource::Fallback);
            assert_eq!(rec.settings, preset);
            assert_eq!(rec.title, title);
            assert!(rec.settings.is_within_limits());
        }
    }

    const THREE_ITEMS: &str = r#"Sure! Here is my plan:
```json
{"recommendations":[
  {"title":"  현금 방어  ","reason":"비용을 줄입니다","settings":{"revenueGrowth":137,"headcountChange":-9,"marketingIncrease":33,"priceIncrease":"12"}},
  {"title":"","reason":null,"settings":{"revenueGrowth":25,"headcountChange":2.6,"marketingIncrease":"60%","priceIncrease":5}},
  {"title":"확장","reason":"공격","settings":{"revenueGrowth":"lots","marketingIncrease":150}}
]}
```
Good luck."#;

    #[tokio::test]
    async fn model_answer_is_validated_and_projected() {
        let base = FinancialData::sample();
        let current = StrategySettings::sample();
        let result = advisor(Canned::content(THREE_ITEMS)).recommend(&base, &current).await;

        assert_eq!(result.source, RecommendationSource::Model);
        assert_eq!(result.message, "모델(llama3.1:latest) 판단 완료");
        let recs = &result.recommendations;
        assert_eq!(recs.len(), 3);

        assert_eq!(recs[0].title, "현금 방어");
        assert_eq!(
            recs[0].settings,
            StrategySettings {
                revenue_growth: 100,
                headcount_change: -5,
                marketing_increase: 30,
                price_increase: 10,
            }
        );
        assert_eq!(recs[1].title, "AI 추천안 2");
        assert_eq!(recs[1].reason, DEFAULT_REASON);
        assert_eq!(recs[1].settings.headcount_change, 3);
        assert_eq!(recs[1].settings.marketing_increase, 60);
        // unusable or missing levers keep the current values
        assert_eq!(recs[2].settings.revenue_growth, current.revenue_growth);
        assert_eq!(recs[2].settings.headcount_change, current.headcount_change);
        assert_eq!(recs[2].settings.price_increase, current.price_increase);
        assert_eq!(recs[2].settings.marketing_increase, 150);

        for rec in recs {
            assert_eq!(rec.source, RecommendationSource::Model);
            assert!(rec.settings.is_within_limits());
            assert_eq!(rec.projection, runway_econ::project_one_month(&base, &rec.settings));
        }
    }

    #[tokio::test]
    async fn request_carries_model_ranges_and_state() {
        let transport = Canned::content(r#"{"recommendations":[{"title":"a","settings":{}}]}"#);
        let advisor = advisor(transport);
        advisor
            .recommend(&FinancialData::sample(), &StrategySettings::sample())
            .await;
        let seen = advisor.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (url, request) = &seen[0];
        assert_eq!(url, "http://localhost:11434/api/chat");
        assert_eq!(*url, advisor.config().chat_url());
        assert_eq!(request.model, advisor.config().model);
        assert!(!request.stream);
        assert_eq!(request.format, "json");
        assert_eq!(request.messages[0].role, "system");
        let prompt = &request.messages[1].content;
        assert!(prompt.contains("- revenueGrowth: -50..100 (step 5)"));
        assert!(prompt.contains("- headcountChange: -5..10 (step 1)"));
        assert!(prompt.contains("- marketingIncrease: -50..200 (step 10)"));
        assert!(prompt.contains("- priceIncrease: -20..50 (step 5)"));
        assert!(prompt.contains(r#""revenueGrowth":30"#));
        assert!(prompt.contains(r#""employees":8"#));
    }

    #[tokio::test]
    async fn short_answer_is_padded_with_presets() {
        let base = FinancialData::sample();
        let current = StrategySettings::default();
        let content = r#"{"recommendations":[{"title":"하나뿐","reason":"r","settings":{"revenueGrowth":20}}]}"#;
        let result = advisor(Canned::content(content)).recommend(&base, &current).await;
        assert_eq!(result.source, RecommendationSource::Model);
        let recs = &result.recommendations;
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].source, RecommendationSource::Model);
        assert_eq!(recs[0].settings.revenue_growth, 20);
        let presets = fallback_presets(&current);
        assert_eq!(recs[1].source, RecommendationSource::Fallback);
        assert_eq!(recs[1].settings, presets[1]);
        assert_eq!(recs[2].title, PRESET_COPY[2].0);
    }

    #[tokio::test]
    async fn extra_items_are_dropped() {
        let item = r#"{"title":"t","reason":"r","settings":{"revenueGrowth":10}}"#;
        let content = format!(r#"{{"recommendations":[{item},{item},{item},{item},{item}]}}"#);
        let result = advisor(Canned::content(&content))
            .recommend(&FinancialData::sample(), &StrategySettings::default())
            .await;
        assert_eq!(result.recommendations.len(), 3);
        assert!(result
            .recommendations
            .iter()
            .all(|r| r.source == RecommendationSource::Model));
    }

    #[tokio::test]
    async fn every_failure_class_falls_back() {
        let base = FinancialData::sample();
        let current = StrategySettings::sample();
        let cases = [
            Canned::content("I cannot help with that."),
            Canned::content(r#"{"recommendations":[]}"#),
            Canned::content(r#"{"recommendations":"soon"}"#),
            Canned::content(r#"{"recommendations":[{"title":"x",}]}"#),
            Canned::content(""),
            Canned::status(500),
        ];
        for transport in cases {
            let result = advisor(transport).recommend(&base, &current).await;
            assert_fallback(&result, &current);
            assert!(result.message.starts_with("모델 연결 실패로 기본 추천을 사용했습니다."));
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back() {
        let current = StrategySettings::sample();
        let result = advisor(Unreachable)
            .recommend(&FinancialData::sample(), &current)
            .await;
        assert_fallback(&result, &current);
        assert!(result.message.contains("connection refused"));
        assert_eq!(result.base_url, "http://localhost:11434");
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_endpoint_times_out_into_fallback() {
        let current = StrategySettings::default();
        let result = advisor(Stalled)
            .recommend(&FinancialData::sample(), &current)
            .await;
        assert_fallback(&result, &current);
        assert!(result.message.contains("20 s"));
    }

    #[tokio::test]
    async fn out_of_range_current_settings_are_normalized_first() {
        let wild = StrategySettings {
            revenue_growth: 999,
            headcount_change: -99,
            marketing_increase: 7,
            price_increase: 51,
        };
        let result = advisor(Unreachable)
            .recommend(&FinancialData::sample(), &wild)
            .await;
        assert_fallback(&result, &wild.normalized());
    }

    #[test]
    fn json_extraction() {
        assert_eq!(extract_json_object(r#"{"a":1}"#), Some(r#"{"a":1}"#));
        assert_eq!(
            extract_json_object("```json\n{\"a\":{\"b\":2}}\n```"),
            Some("{\"a\":{\"b\":2}}")
        );
        assert_eq!(extract_json_object("```\n{\"a\":1}\n```"), Some("{\"a\":1}"));
        assert_eq!(
            extract_json_object("Result: {\"a\":1} hope it helps"),
            Some("{\"a\":1}")
        );
        assert_eq!(
            extract_json_object("Here is code:\n```text\nnote\n```\n{\"recommendations\":[]}"),
            Some("{\"recommendations\":[]}")
        );
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("```\nnothing\n```"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn lenient_numbers() {
        assert_eq!(number(Some(&json!(15))), Some(15.0));
        assert_eq!(number(Some(&json!(" 20% "))), Some(20.0));
        assert_eq!(number(Some(&json!("many"))), None);
        assert_eq!(number(Some(&json!(null))), None);
        assert_eq!(number(None), None);
    }
}

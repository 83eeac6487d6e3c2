#![deny(warnings)]

//! Headless CLI for the runway planner: baseline status, one-month
//! projection, 24-month simulation, scenario briefing and model advice.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::RunConfig;
use runway_ai::{action_tips, build_briefing, AdvisorResult, StrategyAdvisor};
use runway_core::{
    describe_runway, format_korean_money, get_runway_status, runway_health_pct,
    validate_financial_data, FinancialData, RunwayStatus, ScenarioId, SignStyle,
    StrategyProjection, StrategySettings,
};
use runway_econ::{preview_timeline, project_one_month_with, run_simulation_with};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "runway")]
#[command(version = VERSION)]
#[command(about = "Startup runway planner: project, simulate and get strategy advice")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to a YAML run configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show burn, runway and status of the baseline
    Status,
    /// Project one month under the strategy levers
    Project(LeverArgs),
    /// Run the 24-month simulation
    Simulate(LeverArgs),
    /// Write the briefing for a scenario mode
    Briefing {
        /// defense, maintain or attack
        #[arg(long, default_value = "maintain")]
        scenario: ScenarioId,
    },
    /// Ask the model advisor for three strategies
    Recommend(LeverArgs),
}

/// Lever overrides on top of the configured settings.
#[derive(clap::Args, Debug, Default)]
struct LeverArgs {
    /// Revenue growth in percent
    #[arg(long, allow_hyphen_values = true)]
    growth: Option<i32>,
    /// Headcount change
    #[arg(long, allow_hyphen_values = true)]
    headcount: Option<i32>,
    /// Marketing increase in percent
    #[arg(long, allow_hyphen_values = true)]
    marketing: Option<i32>,
    /// One-time price increase in percent
    #[arg(long, allow_hyphen_values = true)]
    price: Option<i32>,
}

impl LeverArgs {
    fn apply(&self, base: StrategySettings) -> StrategySettings {
        StrategySettings {
            revenue_growth: self.growth.unwrap_or(base.revenue_growth),
            headcount_change: self.headcount.unwrap_or(base.headcount_change),
            marketing_increase: self.marketing.unwrap_or(base.marketing_increase),
            price_increase: self.price.unwrap_or(base.price_increase),
        }
        .normalized()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    data: &'a FinancialData,
    monthly_profit: Decimal,
    status: RunwayStatus,
    health_pct: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectionReport {
    settings: StrategySettings,
    projection: StrategyProjection,
    status: RunwayStatus,
}

fn won(amount: Decimal) -> String {
    format_korean_money(amount, SignStyle::Plain)
}

fn signed(amount: Decimal) -> String {
    format_korean_money(amount, SignStyle::Signed)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn status(data: &FinancialData, json: bool) -> Result<()> {
    let report = StatusReport {
        data,
        monthly_profit: data.monthly_profit(),
        status: data.runway_status(),
        health_pct: runway_health_pct(data.runway),
    };
    if json {
        return print_json(&report);
    }
    println!("현금     {}", won(data.cash));
    println!("월 매출  {}", won(data.monthly_revenue));
    println!(
        "월 지출  {} (인건비 {} · 마케팅 {} · 사무실 {})",
        won(data.monthly_burn),
        won(data.personnel_cost),
        won(data.marketing_cost),
        won(data.office_cost)
    );
    println!("월 손익  {}", signed(report.monthly_profit));
    println!(
        "런웨이   {} ({}) | 체력 {:.0}%",
        describe_runway(data.runway),
        report.status.label(),
        report.health_pct
    );
    Ok(())
}

fn project(
    config: &RunConfig,
    data: &FinancialData,
    settings: StrategySettings,
    json: bool,
) -> Result<()> {
    let projection = project_one_month_with(data, &settings, &config.cost_model);
    let report = ProjectionReport {
        settings,
        projection,
        status: get_runway_status(projection.runway),
    };
    if json {
        return print_json(&report);
    }
    println!(
        "레버     성장 {}% · 인원 {:+} · 마케팅 {}% · 가격 {}%",
        settings.revenue_growth,
        settings.headcount_change,
        settings.marketing_increase,
        settings.price_increase
    );
    println!("월 매출  {}", won(projection.revenue));
    println!("월 지출  {}", won(projection.burn));
    println!("월 손익  {}", signed(projection.profit));
    println!(
        "런웨이   {} ({})",
        describe_runway(projection.runway),
        report.status.label()
    );
    let bars = preview_timeline(&projection, &settings);
    if let Some(last) = bars.last() {
        println!("{}개월 후 월 손익 {}", last.month, signed(last.profit));
    }
    Ok(())
}

fn simulate(
    config: &RunConfig,
    data: &FinancialData,
    settings: StrategySettings,
    json: bool,
) -> Result<()> {
    let outcome = run_simulation_with(data, &settings, &config.cost_model);
    let tips = action_tips(&settings, &outcome);
    if json {
        #[derive(Serialize)]
        struct Report<'a> {
            outcome: &'a runway_econ::SimulationOutcome,
            verdict: runway_econ::Verdict,
            tips: &'a [runway_ai::ActionTip],
        }
        return print_json(&Report {
            outcome: &outcome,
            verdict: outcome.verdict(),
            tips: &tips,
        });
    }
    println!("{:>4}  {:>16}  {:>16}  {:>18}  {:>8}", "월", "매출", "손익", "현금", "런웨이");
    for p in &outcome.points {
        println!(
            "{:>4}  {:>16}  {:>16}  {:>18}  {:>8}",
            p.month,
            won(p.revenue),
            signed(p.profit),
            won(p.cash),
            describe_runway(p.runway)
        );
    }
    let month = |m: Option<u32>| m.map_or_else(|| "없음".to_string(), |m| format!("{m}개월차"));
    println!();
    println!("결과     {}", outcome.verdict().label());
    println!(
        "최종     현금 {} · 런웨이 {}",
        won(outcome.final_cash),
        describe_runway(outcome.final_runway)
    );
    if let Some(last) = outcome.final_point() {
        println!(
            "{}개월차 월 매출 {} · 월 손익 {}",
            last.month,
            won(last.revenue),
            signed(last.profit)
        );
    }
    println!(
        "흑자 전환 {} · 현금 고갈 {} · 현금 최고 {}",
        month(outcome.break_even_month),
        month(outcome.cashout_month),
        month(outcome.peak_cash_month)
    );
    for tip in &tips {
        println!("{} {}", tip.icon, tip.text);
    }
    Ok(())
}

fn briefing(data: &FinancialData, scenario: ScenarioId, json: bool) -> Result<()> {
    let briefing = build_briefing(scenario, data);
    if json {
        return print_json(&briefing);
    }
    println!("{}", briefing.summary);
    for (i, option) in briefing.options.iter().enumerate() {
        println!("{}. {} - {}", i + 1, option.title, option.action);
        println!("   {}", option.expected);
    }
    println!("추천: {}", briefing.recommendation);
    Ok(())
}

fn print_advice(result: &AdvisorResult) {
    println!("{} [{}]", result.message, result.base_url);
    for (i, rec) in result.recommendations.iter().enumerate() {
        let s = &rec.settings;
        println!(
            "{}. {} ({:?}) 성장 {}% · 인원 {:+} · 마케팅 {}% · 가격 {}%",
            i + 1,
            rec.title,
            rec.source,
            s.revenue_growth,
            s.headcount_change,
            s.marketing_increase,
            s.price_increase
        );
        println!("   {}", rec.reason);
        println!(
            "   월 손익 {} · 런웨이 {}",
            signed(rec.projection.profit),
            describe_runway(rec.projection.runway)
        );
    }
}

async fn recommend(
    config: &RunConfig,
    data: &FinancialData,
    settings: StrategySettings,
    json: bool,
) -> Result<()> {
    let advisor = StrategyAdvisor::new(config.advisor.clone())
        .context("building advisor http client")?
        .with_cost_model(config.cost_model.clone());
    info!(
        model = %advisor.config().model,
        url = %advisor.config().chat_url(),
        "asking advisor"
    );
    let result = advisor.recommend(data, &settings).await;
    if json {
        return print_json(&result);
    }
    print_advice(&result);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = RunConfig::load(args.config.as_deref())?;
    let data = config.baseline();
    validate_financial_data(&data).context("baseline snapshot is inconsistent")?;
    info!(command = ?args.command, runway = data.runway, "starting runway");

    match &args.command {
        Commands::Status => status(&data, args.json),
        Commands::Project(levers) => {
            project(&config, &data, levers.apply(config.settings), args.json)
        }
        Commands::Simulate(levers) => {
            simulate(&config, &data, levers.apply(config.settings), args.json)
        }
        Commands::Briefing { scenario } => briefing(&data, *scenario, args.json),
        Commands::Recommend(levers) => {
            recommend(&config, &data, levers.apply(config.settings), args.json).await
        }
    }
}

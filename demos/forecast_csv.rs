use anyhow::Context;
use dotenv::dotenv;
use receivables_forecast_builder::llm::{ForecastingAgent, GeminiClient};
use receivables_forecast_builder::{
    load_billing_csv, merge_for_display, prepare_history, ForecastBuilderError, ForecastSettings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .context("usage: forecast_csv <billing.csv> [segment]")?;
    let segment_key = args.next().unwrap_or_else(|| "total".to_string());

    println!("📂 Loading {}", path);
    let dataset = load_billing_csv(&path).await?;
    println!(
        "   {} months, classes: {}",
        dataset.total_by_date.len(),
        dataset.available_classes.join(", ")
    );

    let segment = dataset.segment_for_key(&segment_key);
    let settings = ForecastSettings::from_env();
    let history = prepare_history(&dataset, &segment, &settings)?;
    let agent = ForecastingAgent::new(GeminiClient::from_env()?, settings)?;

    println!("🧠 Forecasting {} with {}", segment, agent.settings().model);
    let result = match agent.forecast(&dataset, &segment).await {
        Ok(result) => result,
        Err(e @ ForecastBuilderError::RateLimited(_)) => {
            eprintln!("⏳ {}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("\n📈 Trend: {}", result.trend);
    println!("   {}\n", result.reasoning);
    for point in merge_for_display(&history, &result) {
        let actual = point.actual.map(|v| format!("{:>14.2}", v)).unwrap_or_default();
        let forecast = point
            .forecast
            .map(|v| format!("{:>14.2}", v))
            .unwrap_or_default();
        println!("   {}  {:>14}  {:>14}", point.date, actual, forecast);
    }

    Ok(())
}

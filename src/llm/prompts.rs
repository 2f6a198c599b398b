use crate::error::Result;
use crate::schema::{ForecastResult, MonthlyPoint};
use schemars::schema_for;

pub const SYSTEM_PROMPT_FORECAST: &str = r#"
You are a Senior Financial Analyst specializing in accounts-receivable forecasting.

## YOUR MISSION
Study a monthly billing history and predict the billed amount for the requested future months.

## HOW TO ANALYZE
- Look for the long-run trend (growth, decline, flat).
- Look for seasonality: repeating shapes at the same calendar months across years.
- Treat isolated spikes or negative months (credits, adjustments) as one-offs unless they repeat.
- Months may be missing from the history. Do not assume a missing month was zero.

## OUTPUT RULES
- Return ONLY valid JSON matching the schema you are given. No prose outside the JSON.
- `forecast` must contain exactly the requested months, in order, formatted YYYY-MM.
- `amount` values are plain numbers with no currency symbols or thousands separators.
- `reasoning` is two or three sentences explaining the patterns you used.
- `trend` is a short label such as "Growing", "Stable", "Declining" or "Seasonal".
"#;

pub fn build_forecast_prompt(
    segment_label: &str,
    history: &[MonthlyPoint],
    months_to_predict: &[String],
) -> Result<String> {
    let history_json = serde_json::to_string_pretty(history)?;
    let schema_json = serde_json::to_string_pretty(&schema_for!(ForecastResult))?;

    Ok(format!(
        "## SEGMENT\n{}\n\n\
         ## MONTHLY HISTORY ({} months)\n```json\n{}\n```\n\n\
         ## MONTHS TO PREDICT\n{}\n\n\
         ## RESPONSE SCHEMA\n```json\n{}\n```",
        segment_label,
        history.len(),
        history_json,
        months_to_predict.join(", "),
        schema_json
    ))
}

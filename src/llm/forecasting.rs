use futures::future::join_all;
use log::{info, warn};

use crate::error::Result;
use crate::forecast::{parse_forecast_response, prepare_history, ForecastSettings};
use crate::llm::client::GeminiClient;
use crate::llm::prompts::{build_forecast_prompt, SYSTEM_PROMPT_FORECAST};
use crate::llm::types::ForecastEvent;
use crate::schema::{Dataset, ForecastResult, MonthlyPoint, Segment};
use crate::utils::following_months;

pub struct ForecastingAgent {
    client: GeminiClient,
    settings: ForecastSettings,
}

impl ForecastingAgent {
    pub fn new(client: GeminiClient, settings: ForecastSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    /// Forecasts the months following the last month of `segment`.
    ///
    /// Short or unknown segments fail before the model is called.
    pub async fn forecast(&self, dataset: &Dataset, segment: &Segment) -> Result<ForecastResult> {
        self.forecast_with_progress(dataset, segment, |_| {}).await
    }

    pub async fn forecast_with_progress<F>(
        &self,
        dataset: &Dataset,
        segment: &Segment,
        mut on_event: F,
    ) -> Result<ForecastResult>
    where
        F: FnMut(ForecastEvent),
    {
        let history = prepare_history(dataset, segment, &self.settings)?;
        on_event(ForecastEvent::Starting {
            segment: segment.label().to_string(),
            months: history.len(),
        });

        let outcome = self.request_forecast(segment, &history, &mut on_event).await;
        match &outcome {
            Ok(result) => {
                info!("Forecast for {}: trend {}", segment, result.trend);
                on_event(ForecastEvent::Success {
                    trend: result.trend.clone(),
                });
            }
            Err(e) => {
                warn!("Forecast for {} failed: {}", segment, e);
                on_event(ForecastEvent::Failed {
                    reason: e.to_string(),
                });
            }
        }
        outcome
    }

    async fn request_forecast<F>(
        &self,
        segment: &Segment,
        history: &[MonthlyPoint],
        on_event: &mut F,
    ) -> Result<ForecastResult>
    where
        F: FnMut(ForecastEvent),
    {
        // prepare_history guarantees at least min_history_months points
        let last = &history[history.len() - 1];
        let months = following_months(&last.date, self.settings.horizon)?;
        let user_prompt = build_forecast_prompt(segment.label(), history, &months)?;

        info!(
            "Requesting {}-month forecast for {} from {} ({} months of history)",
            self.settings.horizon,
            segment,
            self.settings.model,
            history.len()
        );
        on_event(ForecastEvent::Requesting {
            model: self.settings.model.clone(),
        });

        let text = self
            .client
            .generate_content(
                &self.settings.model,
                SYSTEM_PROMPT_FORECAST,
                &user_prompt,
                self.settings.temperature,
            )
            .await?;

        on_event(ForecastEvent::Validating);
        parse_forecast_response(&text, history, &self.settings)
    }

    /// Forecasts several segments concurrently. Each segment succeeds or
    /// fails on its own.
    pub async fn forecast_segments(
        &self,
        dataset: &Dataset,
        segments: &[Segment],
    ) -> Vec<(Segment, Result<ForecastResult>)> {
        let requests = segments.iter().map(|segment| async move {
            let result = self.forecast(dataset, segment).await;
            (segment.clone(), result)
        });
        join_all(requests).await
    }
}

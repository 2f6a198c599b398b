use crate::error::{ForecastBuilderError, Result};
use crate::schema::{Dataset, ForecastResult, MonthlyPoint, Segment};
use crate::utils::{following_months, is_month_key};
use log::warn;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub model: String,
    /// Segments with fewer monthly points are rejected before any request.
    pub min_history_months: usize,
    /// Only the most recent months are sent to the model.
    pub history_window: usize,
    pub horizon: usize,
    pub temperature: f32,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            min_history_months: 6,
            history_window: 36,
            horizon: 6,
            temperature: 0.2,
        }
    }
}

impl ForecastSettings {
    /// Defaults with `GEMINI_MODEL` applied when set.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                settings.model = model.trim().to_string();
            }
        }
        settings
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ForecastBuilderError::InvalidSettings(
                "model name must not be empty".to_string(),
            ));
        }
        if self.horizon == 0 {
            return Err(ForecastBuilderError::InvalidSettings(
                "horizon must be at least 1 month".to_string(),
            ));
        }
        if self.min_history_months == 0 || self.history_window < self.min_history_months {
            return Err(ForecastBuilderError::InvalidSettings(format!(
                "history_window ({}) must be at least min_history_months ({}) and both non-zero",
                self.history_window, self.min_history_months
            )));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ForecastBuilderError::InvalidSettings(format!(
                "temperature {} must be between 0.0 and 2.0",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Selects the history sent to the forecaster for `segment`.
///
/// Fails before any request is made when the segment is unknown or too short.
pub fn prepare_history(
    dataset: &Dataset,
    segment: &Segment,
    settings: &ForecastSettings,
) -> Result<Vec<MonthlyPoint>> {
    let series = dataset
        .series(segment)
        .ok_or_else(|| ForecastBuilderError::UnknownSegment(segment.key().to_string()))?;

    if series.len() < settings.min_history_months {
        return Err(ForecastBuilderError::InsufficientHistory {
            segment: segment.label().to_string(),
            available: series.len(),
            required: settings.min_history_months,
        });
    }

    let start = series.len().saturating_sub(settings.history_window);
    Ok(series[start..].to_vec())
}

/// Decodes and checks the model's JSON answer.
///
/// The first `horizon` forecast points are kept and keyed to the months that
/// follow the last historical month.
pub fn parse_forecast_response(
    text: &str,
    history: &[MonthlyPoint],
    settings: &ForecastSettings,
) -> Result<ForecastResult> {
    let last = history.last().ok_or_else(|| {
        ForecastBuilderError::MalformedResponse("no history to anchor the forecast".to_string())
    })?;

    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ForecastBuilderError::MalformedResponse(
            "empty response".to_string(),
        ));
    }

    let mut result: ForecastResult = serde_json::from_str(body).map_err(|e| {
        ForecastBuilderError::MalformedResponse(format!("response is not valid forecast JSON: {}", e))
    })?;

    if result.forecast.len() < settings.horizon {
        return Err(ForecastBuilderError::MalformedResponse(format!(
            "expected {} forecast months, got {}",
            settings.horizon,
            result.forecast.len()
        )));
    }
    result.forecast.truncate(settings.horizon);

    if result.trend.trim().is_empty() {
        return Err(ForecastBuilderError::MalformedResponse(
            "missing trend label".to_string(),
        ));
    }

    if let Some(bad) = result.forecast.iter().find(|p| !p.amount.is_finite()) {
        return Err(ForecastBuilderError::MalformedResponse(format!(
            "non-finite forecast amount for {}",
            bad.date
        )));
    }

    let expected = following_months(&last.date, settings.horizon)?;
    for (point, month) in result.forecast.iter_mut().zip(expected) {
        if point.date != month {
            if is_month_key(&point.date) {
                warn!(
                    "Forecast month {} re-keyed to {} to follow {}",
                    point.date, month, last.date
                );
            } else {
                warn!("Forecast month '{}' is not YYYY-MM, using {}", point.date, month);
            }
            point.date = month;
        }
    }

    Ok(result)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

use crate::schema::{ForecastResult, MonthlyPoint};
use serde::{Deserialize, Serialize};

/// One month on a combined history/forecast timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
}

/// Merges history and forecast into one chronological sequence.
///
/// The last historical month also carries its actual value as a forecast
/// value so the two lines join without a gap.
pub fn merge_for_display(history: &[MonthlyPoint], result: &ForecastResult) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = history
        .iter()
        .map(|p| ChartPoint {
            date: p.date.clone(),
            actual: Some(p.amount),
            forecast: None,
        })
        .collect();

    if let Some(last) = points.last_mut() {
        if !result.forecast.is_empty() {
            last.forecast = last.actual;
        }
    }

    let last_month = history.last().map(|p| p.date.as_str());
    points.extend(
        result
            .forecast
            .iter()
            .filter(|p| last_month.map_or(true, |last| p.date.as_str() > last))
            .map(|p| ChartPoint {
                date: p.date.clone(),
                actual: None,
                forecast: Some(p.amount),
            }),
    );

    points
}

use crate::aggregator::Aggregator;
use crate::error::{ForecastBuilderError, Result};
use crate::headers::ColumnMap;
use crate::normalizer::{classify_row, DiscardReason, RowOutcome};
use crate::schema::Dataset;
use crate::tokenizer::tokenize_line;
use log::{debug, info};
use serde::Serialize;
use std::collections::BTreeMap;

/// Diagnostics for one parse pass. Skipped rows never fail the parse; they
/// are only counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionStats {
    pub data_lines: usize,
    pub valid_rows: usize,
    pub skipped: BTreeMap<DiscardReason, usize>,
}

impl IngestionStats {
    pub fn skipped_rows(&self) -> usize {
        self.skipped.values().sum()
    }
}

pub fn parse_billing_csv(text: &str) -> Result<Dataset> {
    parse_billing_csv_with_stats(text).map(|(dataset, _)| dataset)
}

pub fn parse_billing_csv_with_stats(text: &str) -> Result<(Dataset, IngestionStats)> {
    if text.trim().is_empty() {
        return Err(ForecastBuilderError::EmptyFile);
    }

    let mut lines = text.split('\n');
    let header_line = lines.next().unwrap_or_default();
    let data_lines: Vec<&str> = lines.collect();
    if data_lines.is_empty() {
        return Err(ForecastBuilderError::TooFewLines);
    }

    let columns = ColumnMap::resolve(&tokenize_line(header_line))?;
    debug!(
        "Resolved columns: date={}, amount={}, class={:?}",
        columns.date, columns.amount, columns.class
    );

    let mut aggregator = Aggregator::new();
    let mut stats = IngestionStats::default();

    for line in data_lines {
        if line.trim().is_empty() {
            continue;
        }
        stats.data_lines += 1;

        match classify_row(&tokenize_line(line), &columns) {
            RowOutcome::Valid(record) => aggregator.fold(&record),
            RowOutcome::Discarded(reason) => {
                *stats.skipped.entry(reason).or_insert(0) += 1;
            }
        }
    }

    stats.valid_rows = aggregator.valid_rows();
    for (reason, count) in &stats.skipped {
        debug!("Skipped {} row(s): {:?}", count, reason);
    }

    let dataset = aggregator.finish()?;

    info!(
        "Parsed {} of {} billing rows into {} months across {} account classes",
        stats.valid_rows,
        stats.data_lines,
        dataset.total_by_date.len(),
        dataset.available_classes.len()
    );

    Ok((dataset, stats))
}

/// Async entry point for callers that are already inside a runtime.
///
/// The parse itself runs to completion without yielding.
pub async fn parse_billing_csv_async(text: String) -> Result<Dataset> {
    parse_billing_csv(&text)
}

/// Reads a CSV export from disk and parses it.
#[cfg(feature = "gemini")]
pub async fn load_billing_csv(path: impl AsRef<std::path::Path>) -> Result<Dataset> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    parse_billing_csv(&text)
}

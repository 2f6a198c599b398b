use crate::error::{ForecastBuilderError, Result};
use crate::normalizer::BillingRecord;
use crate::schema::{Dataset, MonthlyPoint};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Running monthly sums for one parse pass.
///
/// Keys are discovered at runtime and stored unordered; ordering is only
/// imposed in [`Aggregator::finish`], so the result never depends on map
/// iteration order.
#[derive(Debug, Default)]
pub struct Aggregator {
    total_by_date: HashMap<String, f64>,
    class_by_date: HashMap<String, HashMap<String, f64>>,
    classes: HashSet<String>,
    valid_rows: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, record: &BillingRecord) {
        *self
            .total_by_date
            .entry(record.month.clone())
            .or_insert(0.0) += record.amount;

        *self
            .class_by_date
            .entry(record.class.clone())
            .or_default()
            .entry(record.month.clone())
            .or_insert(0.0) += record.amount;

        self.classes.insert(record.class.clone());
        self.valid_rows += 1;
    }

    pub fn valid_rows(&self) -> usize {
        self.valid_rows
    }

    /// Materializes the sorted dataset and drops the accumulation maps.
    ///
    /// Fails when no record was folded, or when a monthly sum left the finite
    /// range.
    pub fn finish(self) -> Result<Dataset> {
        if self.valid_rows == 0 {
            return Err(ForecastBuilderError::NoProcessableData);
        }

        let overflowed = self
            .total_by_date
            .iter()
            .chain(self.class_by_date.values().flatten())
            .filter(|(_, amount)| !amount.is_finite())
            .map(|(month, _)| month)
            .min();
        if let Some(month) = overflowed {
            return Err(ForecastBuilderError::AmountOverflow {
                month: month.clone(),
            });
        }

        let total_by_date = to_sorted_series(&self.total_by_date);

        let mut available_classes: Vec<String> = self.classes.into_iter().collect();
        available_classes.sort();

        let by_class: BTreeMap<String, Vec<MonthlyPoint>> = available_classes
            .iter()
            .map(|class| {
                let series = self
                    .class_by_date
                    .get(class)
                    .map(to_sorted_series)
                    .unwrap_or_default();
                (class.clone(), series)
            })
            .collect();

        Ok(Dataset {
            total_by_date,
            by_class,
            available_classes,
        })
    }
}

// "YYYY-MM" is fixed width, so lexicographic order is chronological order.
fn to_sorted_series(by_month: &HashMap<String, f64>) -> Vec<MonthlyPoint> {
    let mut points: Vec<MonthlyPoint> = by_month
        .iter()
        .map(|(month, amount)| MonthlyPoint::new(month.clone(), *amount))
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

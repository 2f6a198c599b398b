use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const UNCLASSIFIED: &str = "Unclassified";
pub const UNKNOWN_CLASS: &str = "Unknown";
pub const TOTAL_SEGMENT_KEY: &str = "total";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyPoint {
    #[schemars(description = "Canonical month in YYYY-MM format")]
    pub date: String,

    #[schemars(description = "Billed amount for the month. Negative values are credits")]
    pub amount: f64,
}

impl MonthlyPoint {
    pub fn new(date: impl Into<String>, amount: f64) -> Self {
        Self {
            date: date.into(),
            amount,
        }
    }
}

/// Monthly receivables totals, overall and per account class.
///
/// Built once per CSV submission and never mutated afterwards; a new file
/// produces a new `Dataset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub total_by_date: Vec<MonthlyPoint>,
    pub by_class: BTreeMap<String, Vec<MonthlyPoint>>,
    pub available_classes: Vec<String>,
}

impl Dataset {
    pub fn series(&self, segment: &Segment) -> Option<&[MonthlyPoint]> {
        match segment {
            Segment::Total => Some(&self.total_by_date),
            Segment::Class(name) => self.by_class.get(name).map(Vec::as_slice),
        }
    }

    /// Resolves a segment key against this dataset.
    ///
    /// A class with exactly this name wins, so a class called "Total" stays
    /// selectable. Otherwise `"total"` (any case) selects the whole portfolio
    /// and any other key names a class, which may not exist.
    pub fn segment_for_key(&self, key: &str) -> Segment {
        if self.by_class.contains_key(key) {
            Segment::Class(key.to_string())
        } else if key.eq_ignore_ascii_case(TOTAL_SEGMENT_KEY) {
            Segment::Total
        } else {
            Segment::Class(key.to_string())
        }
    }

    /// Every segment available for forecasting, total first.
    pub fn segments(&self) -> Vec<Segment> {
        std::iter::once(Segment::Total)
            .chain(self.available_classes.iter().cloned().map(Segment::Class))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Total,
    Class(String),
}

impl Segment {
    pub fn key(&self) -> &str {
        match self {
            Segment::Total => TOTAL_SEGMENT_KEY,
            Segment::Class(name) => name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Segment::Total => "Total Portfolio",
            Segment::Class(name) => name,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastResult {
    #[schemars(description = "Exactly 6 predicted months following the last historical month")]
    pub forecast: Vec<MonthlyPoint>,

    #[schemars(description = "Short explanation of the patterns behind the forecast")]
    pub reasoning: String,

    #[schemars(description = "Short trend label, e.g. 'Growing', 'Stable', 'Declining', 'Seasonal'")]
    pub trend: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset {
        let mut by_class = BTreeMap::new();
        by_class.insert(
            "Retail".to_string(),
            vec![MonthlyPoint::new("2023-01", 10.0)],
        );
        Dataset {
            total_by_date: vec![MonthlyPoint::new("2023-01", 10.0)],
            by_class,
            available_classes: vec!["Retail".to_string()],
        }
    }

    #[test]
    fn test_segment_for_key() {
        let dataset = sample_dataset();
        assert_eq!(dataset.segment_for_key("total"), Segment::Total);
        assert_eq!(dataset.segment_for_key("TOTAL"), Segment::Total);
        assert_eq!(
            dataset.segment_for_key("Retail"),
            Segment::Class("Retail".to_string())
        );
        assert_eq!(Segment::Total.key(), "total");
        assert_eq!(Segment::Total.to_string(), "Total Portfolio");
    }

    #[test]
    fn test_class_named_total_is_selectable() {
        let mut dataset = sample_dataset();
        dataset
            .by_class
            .insert("Total".to_string(), vec![MonthlyPoint::new("2023-01", 5.0)]);
        dataset.available_classes = vec!["Retail".to_string(), "Total".to_string()];
        dataset.total_by_date = vec![MonthlyPoint::new("2023-01", 15.0)];

        let segment = dataset.segment_for_key("Total");
        assert_eq!(segment, Segment::Class("Total".to_string()));
        assert_eq!(dataset.series(&segment).unwrap()[0].amount, 5.0);

        // a different casing still reaches the portfolio
        assert_eq!(dataset.segment_for_key("total"), Segment::Total);
        assert_eq!(
            dataset.series(&dataset.segment_for_key("total")).unwrap()[0].amount,
            15.0
        );
    }

    #[test]
    fn test_dataset_series_lookup() {
        let dataset = sample_dataset();
        assert_eq!(dataset.series(&Segment::Total).unwrap().len(), 1);
        assert!(dataset
            .series(&Segment::Class("Retail".to_string()))
            .is_some());
        assert!(dataset
            .series(&Segment::Class("Wholesale".to_string()))
            .is_none());
        assert_eq!(
            dataset.segments(),
            vec![Segment::Total, Segment::Class("Retail".to_string())]
        );
    }

    #[test]
    fn test_dataset_serializes_camel_case() {
        let json = serde_json::to_value(sample_dataset()).unwrap();
        assert!(json.get("totalByDate").is_some());
        assert!(json.get("byClass").is_some());
        assert_eq!(json["availableClasses"][0], "Retail");
        assert_eq!(json["totalByDate"][0]["date"], "2023-01");
    }
}

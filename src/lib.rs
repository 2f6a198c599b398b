//! # Receivables Forecast Builder
//!
//! A library for turning loosely structured accounts-receivable CSV exports
//! into clean monthly time series, and for forecasting those series with an
//! LLM.
//!
//! ## Core Concepts
//!
//! - **Canonical month key**: every billing date is reduced to `YYYY-MM`, the only time axis
//! - **Segment**: the total portfolio or a single account class, each with its own series
//! - **Row-level defects**: short rows, blank or unparseable dates and amounts are skipped, never fatal
//! - **Input errors**: empty files, missing columns or files with no usable rows fail the whole parse
//!
//! ## Example
//!
//! ```rust
//! use receivables_forecast_builder::*;
//!
//! let csv = "billPeriod,amount,accountClass\n\
//!            202309,\"1,234.50\",Retail\n\
//!            20231015,200,Wholesale\n\
//!            2023-10-20,50,Retail\n";
//!
//! let dataset = parse_billing_csv(csv).unwrap();
//! assert_eq!(dataset.total_by_date.len(), 2);
//! assert_eq!(dataset.total_by_date[0].amount, 1234.5);
//! assert_eq!(dataset.available_classes, vec!["Retail", "Wholesale"]);
//! ```
//!
//! With the `gemini` feature, [`llm::ForecastingAgent`] sends a segment's
//! history to Gemini and returns a validated [`ForecastResult`].

pub mod aggregator;
pub mod chart;
pub mod error;
pub mod forecast;
pub mod headers;
pub mod ingestion;
pub mod normalizer;
pub mod schema;
pub mod tokenizer;
pub mod utils;

#[cfg(feature = "gemini")]
pub mod llm;

pub use aggregator::Aggregator;
pub use chart::{merge_for_display, ChartPoint};
pub use error::{ForecastBuilderError, Result};
pub use forecast::{parse_forecast_response, prepare_history, ForecastSettings};
pub use headers::{normalize_header, ColumnMap};
pub use ingestion::*;
pub use normalizer::{
    classify_row, normalize_month_key, parse_amount, BillingRecord, DiscardReason, RowOutcome,
};
pub use schema::*;
pub use tokenizer::tokenize_line;
pub use utils::*;

#[cfg(test)]
mod tests {
    use super::*;

    const BILLING_CSV: &str = "\
Customer,billPeriod,Amount,accountClass
Acme,202301,1000,Retail
Beta,202301,\"2,500.00\",Wholesale
Acme,20230215,1100,Retail
Gamma,2023-02-03,-200,\"Revenue, Net\"
Beta,202303,2600,Wholesale
Delta,202303,300,
Omega,Q1,999,Retail
";

    #[test]
    fn test_end_to_end_processing() {
        let dataset = parse_billing_csv(BILLING_CSV).unwrap();

        assert_eq!(
            dataset.total_by_date,
            vec![
                MonthlyPoint::new("2023-01", 3500.0),
                MonthlyPoint::new("2023-02", 900.0),
                MonthlyPoint::new("2023-03", 2900.0),
            ]
        );
        assert_eq!(
            dataset.available_classes,
            vec!["Retail", "Revenue, Net", "Unknown", "Wholesale"]
        );
        assert_eq!(
            dataset.by_class["Revenue, Net"],
            vec![MonthlyPoint::new("2023-02", -200.0)]
        );
        assert_eq!(
            dataset.by_class["Unknown"],
            vec![MonthlyPoint::new("2023-03", 300.0)]
        );
    }

    #[test]
    fn test_class_sums_match_totals() {
        let dataset = parse_billing_csv(BILLING_CSV).unwrap();

        for point in &dataset.total_by_date {
            let class_sum: f64 = dataset
                .by_class
                .values()
                .flat_map(|series| series.iter())
                .filter(|p| p.date == point.date)
                .map(|p| p.amount)
                .sum();
            assert!(
                (class_sum - point.amount).abs() < 1e-9,
                "{}: classes {} vs total {}",
                point.date,
                class_sum,
                point.amount
            );
        }
    }

    #[test]
    fn test_no_class_column_is_unclassified() {
        let csv = "monthly,amount\n202301,10\n202302,20\n";
        let dataset = parse_billing_csv(csv).unwrap();
        assert_eq!(dataset.available_classes, vec!["Unclassified"]);
        assert_eq!(dataset.by_class["Unclassified"], dataset.total_by_date);
    }
}

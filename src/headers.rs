use crate::error::{ForecastBuilderError, Result};

pub const DATE_HEADERS: &[&str] = &["billperiod", "monthly"];
pub const AMOUNT_HEADERS: &[&str] = &["amount"];
// "account_class" normalizes to "accountclass"; the lookup order is kept as-is.
pub const CLASS_HEADERS: &[&str] = &["accountclass", "actcode", "account_class"];

/// Lowercases a header and drops everything that is not `[a-z0-9]`.
pub fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Column positions for the three semantic roles of a billing export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub amount: usize,
    /// `None` when the file has no class column at all.
    pub class: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(header_fields: &[String]) -> Result<Self> {
        let normalized: Vec<String> = header_fields.iter().map(|h| normalize_header(h)).collect();

        let date = find_column(&normalized, DATE_HEADERS);
        let amount = find_column(&normalized, AMOUNT_HEADERS);
        let class = find_column(&normalized, CLASS_HEADERS);

        match (date, amount) {
            (Some(date), Some(amount)) => Ok(Self {
                date,
                amount,
                class,
            }),
            _ => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push("billPeriod".to_string());
                }
                if amount.is_none() {
                    missing.push("amount".to_string());
                }
                Err(ForecastBuilderError::MissingColumns { missing })
            }
        }
    }

    /// Minimum field count for a row to carry both date and amount.
    pub fn required_width(&self) -> usize {
        self.date.max(self.amount) + 1
    }
}

fn find_column(normalized: &[String], candidates: &[&str]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        let key = normalize_header(candidate);
        normalized.iter().position(|h| *h == key)
    })
}

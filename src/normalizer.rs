use crate::headers::ColumnMap;
use crate::schema::{UNCLASSIFIED, UNKNOWN_CLASS};
use crate::utils::{format_month_key, month_key_for_date};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// A billing row that passed every check and is ready to aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingRecord {
    pub month: String,
    pub amount: f64,
    pub class: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    ShortRow,
    MissingDate,
    MissingAmount,
    UnparseableDate,
    UnparseableAmount,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Valid(BillingRecord),
    Discarded(DiscardReason),
}

pub fn classify_row(fields: &[String], columns: &ColumnMap) -> RowOutcome {
    if fields.len() < columns.required_width() {
        return RowOutcome::Discarded(DiscardReason::ShortRow);
    }

    let raw_date = fields[columns.date].trim();
    let raw_amount = fields[columns.amount].trim();
    let raw_class = match columns.class {
        Some(idx) => fields.get(idx).map(String::as_str).unwrap_or(""),
        None => UNCLASSIFIED,
    };

    if raw_date.is_empty() {
        return RowOutcome::Discarded(DiscardReason::MissingDate);
    }
    if raw_amount.is_empty() {
        return RowOutcome::Discarded(DiscardReason::MissingAmount);
    }

    let Some(month) = normalize_month_key(raw_date) else {
        return RowOutcome::Discarded(DiscardReason::UnparseableDate);
    };
    let Some(amount) = parse_amount(raw_amount) else {
        return RowOutcome::Discarded(DiscardReason::UnparseableAmount);
    };

    RowOutcome::Valid(BillingRecord {
        month,
        amount,
        class: normalize_class(raw_class),
    })
}

/// Converts a raw billing date into a canonical "YYYY-MM" key.
///
/// Compact encodings are tried first: six digits as `YYYYMM`, eight as
/// `YYYYMMDD`. A value made only of digits is taken at face value for any
/// year. When separators were stripped to get the digits, a split with a year
/// outside 1900-2100 is not accepted, so values such as `10/2011` reach
/// calendar parsing instead. A month outside 01-12 is never accepted.
/// Calendar parsing only runs for values containing `-` or `/` and always
/// resolves in UTC.
pub fn normalize_month_key(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let digit_only = digits.len() == raw.len();

    let compact = match digits.len() {
        6 | 8 => split_year_month(&digits[..6], digit_only),
        _ => None,
    };

    compact.or_else(|| {
        if raw.contains('-') || raw.contains('/') {
            parse_calendar_date(raw).map(month_key_for_date)
        } else {
            None
        }
    })
}

// Separated values splitting outside this window are treated as some other layout.
const SEPARATED_COMPACT_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

fn split_year_month(digits: &str, digit_only: bool) -> Option<String> {
    let year: i32 = digits[..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let year_ok = digit_only || SEPARATED_COMPACT_YEARS.contains(&year);
    (year_ok && (1..=12).contains(&month)).then(|| format_month_key(year, month))
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d-%b-%Y", "%d-%B-%Y", "%b-%d-%Y",
];

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// Parsed by prefixing a synthetic day of month.
const MONTH_YEAR_FORMATS: &[&str] = &["%m/%Y", "%m-%Y", "%Y/%m", "%b-%Y", "%B-%Y", "%b/%Y"];

/// General calendar-date parsing with UTC semantics.
///
/// Timestamps with an offset are shifted to UTC before the month is taken;
/// naive values are read as UTC exactly as written.
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
        .or_else(|| {
            let anchored = format!("01 {}", raw);
            MONTH_YEAR_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(&anchored, &format!("%d {}", fmt)).ok()
            })
        })
}

/// Parses an amount after stripping thousands separators. Non-finite values
/// are rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|&c| c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn normalize_class(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_CLASS.to_string()
    } else {
        trimmed.to_string()
    }
}

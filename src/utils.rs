use crate::error::{ForecastBuilderError, Result};
use chrono::{Datelike, NaiveDate};

pub fn format_month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

pub fn month_key_for_date(date: NaiveDate) -> String {
    format_month_key(date.year(), date.month())
}

/// True when `key` has the canonical `YYYY-MM` shape with a month in 1..=12.
pub fn is_month_key(key: &str) -> bool {
    parse_month_key(key).is_ok()
}

/// Parses a canonical "YYYY-MM" key into (year, month).
pub fn parse_month_key(key: &str) -> Result<(i32, u32)> {
    let invalid = || {
        ForecastBuilderError::MalformedResponse(format!(
            "Invalid month key: {}. Expected YYYY-MM",
            key
        ))
    };

    let bytes = key.as_bytes();
    if !key.is_ascii() || bytes.len() != 7 || bytes[4] != b'-' {
        return Err(invalid());
    }
    if !key[..4].bytes().all(|b| b.is_ascii_digit()) || !key[5..].bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let year: i32 = key[..4].parse().map_err(|_| invalid())?;
    let month: u32 = key[5..].parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }

    Ok((year, month))
}

pub fn next_month_key(key: &str) -> Result<String> {
    let (year, month) = parse_month_key(key)?;
    let (year, month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    Ok(format_month_key(year, month))
}

/// The `count` month keys that follow `last`, in order.
pub fn following_months(last: &str, count: usize) -> Result<Vec<String>> {
    let mut months = Vec::with_capacity(count);
    let mut current = last.to_string();
    for _ in 0..count {
        current = next_month_key(&current)?;
        months.push(current.clone());
    }
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_month_key() {
        assert_eq!(format_month_key(2023, 9), "2023-09");
        assert_eq!(format_month_key(999, 12), "0999-12");
        assert_eq!(
            month_key_for_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            "2024-02"
        );
    }

    #[test]
    fn test_parse_month_key() {
        assert_eq!(parse_month_key("2023-09").unwrap(), (2023, 9));
        assert!(parse_month_key("2023-13").is_err());
        assert!(parse_month_key("2023-00").is_err());
        assert!(parse_month_key("2023-9").is_err());
        assert!(parse_month_key("202309").is_err());
        assert!(parse_month_key("2023-+9").is_err());
        assert!(!is_month_key("Sept 2023"));
    }

    #[test]
    fn test_next_month_key_rolls_year() {
        assert_eq!(next_month_key("2023-11").unwrap(), "2023-12");
        assert_eq!(next_month_key("2023-12").unwrap(), "2024-01");
    }

    #[test]
    fn test_following_months() {
        assert_eq!(
            following_months("2023-10", 6).unwrap(),
            vec!["2023-11", "2023-12", "2024-01", "2024-02", "2024-03", "2024-04"]
        );
        assert!(following_months("2023-10", 0).unwrap().is_empty());
    }
}

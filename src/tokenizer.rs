const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Splits one raw CSV line into trimmed field values.
///
/// A `"` toggles the quoted state and delimiters inside quotes are kept as
/// literal text. Malformed quoting never fails: an unbalanced quote simply
/// keeps the rest of the line inside one field.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            DELIMITER if !in_quotes => {
                fields.push(clean_field(&current));
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(clean_field(&current));

    fields
}

fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    let unwrapped = trimmed
        .strip_prefix(QUOTE)
        .and_then(|s| s.strip_suffix(QUOTE))
        .unwrap_or(trimmed);

    unwrapped
        .chars()
        .filter(|&c| c != QUOTE && c != '\r')
        .collect()
}

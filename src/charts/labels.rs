//! Bar label formatting.

use crate::config::BarLabelFormat;

/// Render a group mean for display above its bar.
pub fn format_bar_label(value: f64, format: &BarLabelFormat) -> String {
    match format {
        BarLabelFormat::Currency { symbol } => format!("{}{}", symbol, group_thousands(value)),
        BarLabelFormat::Plain => {
            if value.is_nan() {
                "nan".to_string()
            } else {
                format!("{:.2}", value)
            }
        }
    }
}

/// Two decimals with comma thousands separators: `-1234567.891` -> `-1,234,567.89`.
fn group_thousands(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

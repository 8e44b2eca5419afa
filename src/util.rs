use chrono::{DateTime, Utc};
use serde_json::Value;

/// Coerce free-text revenue input to a non-negative amount.
///
/// Empty, unparsable, non-finite and negative input all become 0.
pub fn parse_revenue(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Coerce a stored revenue value (number, numeric string or null).
pub fn coerce_revenue(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(0.0),
        Value::String(s) => parse_revenue(s),
        _ => 0.0,
    }
}

/// Round to one decimal place (42.857 -> 42.9).
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Format an amount as Brazilian reais: `R$ 3.500` or `R$ 1.234,56`.
pub fn format_brl(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    if frac == 0 {
        format!("{}R$ {}", sign, grouped)
    } else {
        format!("{}R$ {},{:02}", sign, grouped, frac)
    }
}

/// `dd/mm/yyyy` in the given zone.
pub fn format_date_br(at: &DateTime<Utc>, tz: chrono_tz::Tz) -> String {
    at.with_timezone(&tz).format("%d/%m/%Y").to_string()
}

/// Accept string or integer ids from the backend.
pub fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_revenue() {
        assert_eq!(parse_revenue("150"), 150.0);
        assert_eq!(parse_revenue(" 99.5 "), 99.5);
        assert_eq!(parse_revenue(""), 0.0);
        assert_eq!(parse_revenue("abc"), 0.0);
        assert_eq!(parse_revenue("-20"), 0.0);
        assert_eq!(parse_revenue("inf"), 0.0);
        assert_eq!(parse_revenue("NaN"), 0.0);
    }

    #[test]
    fn test_coerce_revenue_from_stored_values() {
        assert_eq!(coerce_revenue(&json!(1000)), 1000.0);
        assert_eq!(coerce_revenue(&json!("2500.75")), 2500.75);
        assert_eq!(coerce_revenue(&json!(null)), 0.0);
        assert_eq!(coerce_revenue(&json!({"x": 1})), 0.0);
    }

    #[test]
    fn test_round_one_decimal() {
        assert_eq!(round_one_decimal(300.0 / 7.0), 42.9);
        assert_eq!(round_one_decimal(50.0), 50.0);
        assert_eq!(round_one_decimal(33.333), 33.3);
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(0.0), "R$ 0");
        assert_eq!(format_brl(3500.0), "R$ 3.500");
        assert_eq!(format_brl(1234567.0), "R$ 1.234.567");
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(999.0), "R$ 999");
    }

    #[test]
    fn test_format_date_br_uses_zone() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 1, 30, 0).unwrap();
        assert_eq!(format_date_br(&at, chrono_tz::UTC), "01/03/2025");
        // 01:30 UTC is still the previous evening in São Paulo
        assert_eq!(
            format_date_br(&at, chrono_tz::America::Sao_Paulo),
            "28/02/2025"
        );
    }

    #[test]
    fn test_id_to_string() {
        assert_eq!(id_to_string(&json!("abc-1")), Some("abc-1".into()));
        assert_eq!(id_to_string(&json!(42)), Some("42".into()));
        assert_eq!(id_to_string(&json!("")), None);
        assert_eq!(id_to_string(&json!(null)), None);
    }
}

/// Format a float with thousands separators and two decimals: 1,234.56
pub fn currency(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let fixed = format!("{:.2}", abs);
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative && fixed != "0.00" {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Render a decimal for flat-file output. Whole values keep one decimal
/// place (`10.0`) so they still read back as decimals.
pub fn decimal(val: f64) -> String {
    if val.is_finite() && val.fract() == 0.0 {
        format!("{val:.1}")
    } else {
        format!("{val}")
    }
}

pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_formatting() {
        assert_eq!(currency(1234.56), "1,234.56");
        assert_eq!(currency(-500.00), "-500.00");
        assert_eq!(currency(0.0), "0.00");
        assert_eq!(currency(1545000.5), "1,545,000.50");
        assert_eq!(currency(42.10), "42.10");
        assert_eq!(currency(999.999), "1,000.00");
    }

    #[test]
    fn test_decimal_keeps_one_place_for_whole_values() {
        assert_eq!(decimal(10.0), "10.0");
        assert_eq!(decimal(4.94), "4.94");
        assert_eq!(decimal(0.5), "0.5");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }
}

/// Group the digits of `value` in threes with `.` (rupiah convention).
pub fn format_grouped_int(value: i64) -> String {
    let grouped = group_digits(value.unsigned_abs());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// `Rp 1.250.000`, or `-Rp 50.000` for losses.
pub fn format_money(value: i64, currency_symbol: &str) -> String {
    let grouped = group_digits(value.unsigned_abs());
    if value < 0 {
        format!("-{currency_symbol} {grouped}")
    } else {
        format!("{currency_symbol} {grouped}")
    }
}

fn group_digits(magnitude: u64) -> String {
    let digits = magnitude.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_grouped_int(0), "0");
        assert_eq!(format_grouped_int(999), "999");
        assert_eq!(format_grouped_int(1000), "1.000");
        assert_eq!(format_grouped_int(1_250_000), "1.250.000");
        assert_eq!(format_grouped_int(-45_000), "-45.000");
    }

    #[test]
    fn money_keeps_sign_before_symbol() {
        assert_eq!(format_money(150_000, "Rp"), "Rp 150.000");
        assert_eq!(format_money(-50_000, "Rp"), "-Rp 50.000");
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert_eq!(format_money(i64::MIN, "Rp"), "-Rp 9.223.372.036.854.775.808");
        assert_eq!(format_money(i64::MAX, "Rp"), "Rp 9.223.372.036.854.775.807");
        assert_eq!(format_grouped_int(i64::MIN), "-9.223.372.036.854.775.808");
    }
}

//! Shared utility functions for propdash crates.

/// Date utility functions
pub mod dates {
    use chrono::NaiveDate;

    /// Short month-year format used by the transaction export: "Jan-24".
    pub const SALE_DATE_FORMAT: &str = "%b-%y";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Parse a short month-year string ("Jan-24") into the first day of that month.
    ///
    /// chrono cannot build a date without a day, so the day is pinned to 1
    /// before parsing.
    pub fn parse_month_year(s: &str) -> anyhow::Result<NaiveDate> {
        let pinned = format!("01-{}", s.trim());
        Ok(NaiveDate::parse_from_str(&pinned, "%d-%b-%y")?)
    }

    /// Format a date back into the short month-year form ("Jan-24").
    pub fn format_month_year(date: &NaiveDate) -> String {
        date.format(SALE_DATE_FORMAT).to_string()
    }

}

/// Number parsing and display helpers
pub mod numbers {
    /// Remove thousands separators, currency symbols and whitespace from a
    /// numeric-looking cell ("$1,250,000" -> "1250000").
    pub fn strip_numeric(s: &str) -> String {
        s.chars()
            .filter(|c| !matches!(c, ',' | '$' | '€' | '£' | '¥') && !c.is_whitespace())
            .collect()
    }

    /// Strip and parse a cell, returning `None` unless the residue is a finite number.
    pub fn parse_finite(s: &str) -> Option<f64> {
        let stripped = strip_numeric(s);
        if stripped.is_empty() {
            return None;
        }
        stripped.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Round to an integer and insert thousands separators: 1234567.4 -> "1,234,567".
    pub fn format_thousands(value: f64) -> String {
        let rounded = value.round();
        let digits = format!("{}", rounded.abs() as u64);
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if rounded < 0.0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    /// Revenue card text: scale to billions, millions or thousands and print
    /// the rounded value with its suffix ("$12 B").
    pub fn format_revenue(total: f64) -> String {
        let (value, scale) = if total >= 1e9 {
            (total / 1e9, "B")
        } else if total >= 1e6 {
            (total / 1e6, "M")
        } else {
            (total / 1e3, "K")
        };
        format!("${} {}", format_thousands(value), scale)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_strip_numeric() {
            assert_eq!(strip_numeric("$1,250,000"), "1250000");
            assert_eq!(strip_numeric(" 3,229.2 "), "3229.2");
        }

        #[test]
        fn test_parse_finite() {
            assert_eq!(parse_finite("$1,250,000"), Some(1_250_000.0));
            assert_eq!(parse_finite("12.5"), Some(12.5));
            assert_eq!(parse_finite(""), None);
            assert_eq!(parse_finite("-"), None);
            assert_eq!(parse_finite("n/a"), None);
            assert_eq!(parse_finite("inf"), None);
            assert_eq!(parse_finite("NaN"), None);
        }

        #[test]
        fn test_format_thousands() {
            assert_eq!(format_thousands(0.0), "0");
            assert_eq!(format_thousands(999.0), "999");
            assert_eq!(format_thousands(1000.0), "1,000");
            assert_eq!(format_thousands(1_234_567.4), "1,234,567");
            assert_eq!(format_thousands(-45_000.0), "-45,000");
        }

        #[test]
        fn test_format_revenue() {
            assert_eq!(format_revenue(2_500_000_000.0), "$3 B");
            assert_eq!(format_revenue(1_500_000_000_000.0), "$1,500 B");
            assert_eq!(format_revenue(42_000_000.0), "$42 M");
            assert_eq!(format_revenue(600.0), "$1 K");
        }
    }
}

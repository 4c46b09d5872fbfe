//! Output tables and number formatting.

mod writer;

pub use writer::{read_table, write_bytes, write_table};

/// Format a decimal for output: rounded to 4 places, shortest form, no `-0`.
///
/// ```
/// use ticketflow::output::format_decimal;
///
/// assert_eq!(format_decimal(42.0), "42");
/// assert_eq!(format_decimal(1.0 / 3.0), "0.3333");
/// ```
pub fn format_decimal(value: f64) -> String {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(42.0), "42");
        assert_eq!(format_decimal(42.5), "42.5");
        assert_eq!(format_decimal(0.123456), "0.1235");
        assert_eq!(format_decimal(-0.00001), "0");
        assert_eq!(format_decimal(90.0), "90");
    }
}

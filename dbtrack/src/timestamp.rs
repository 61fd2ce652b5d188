//! Datetime formatting shared by diff history, pieces, and pickups.

use chrono::NaiveDateTime;

/// Display format used in history keys and pickup datetimes.
pub const DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Compact format used inside piece file names.
pub const FILENAME_FORMAT: &str = "%Y%m%d-%H%M%S%3f";

/// Format a datetime for history keys and pickup datetimes.
pub fn format_display(dt: NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Parse a display-format datetime, with or without the millisecond part.
pub fn parse_display(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y/%m/%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y/%m/%d %H:%M:%S"))
}

/// Format a datetime for embedding into a piece file name.
pub fn format_filename(dt: NaiveDateTime) -> String {
    dt.format(FILENAME_FORMAT).to_string()
}

/// Current local time, for use as the injected clock in production code.
///
/// Engines never call this directly; it is passed in at the call site so
/// tests can substitute a fixed clock.
pub fn system_clock() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 6)
            .unwrap()
            .and_hms_milli_opt(12, 34, 56, 789)
            .unwrap()
    }

    #[test]
    fn test_display_round_trip() {
        let formatted = format_display(sample());
        assert_eq!(formatted, "2026/08/06 12:34:56.789");
        assert_eq!(parse_display(&formatted).unwrap(), sample());
    }

    #[test]
    fn test_parse_without_millis() {
        let parsed = parse_display("2026/08/06 12:34:56").unwrap();
        assert_eq!(format_display(parsed), "2026/08/06 12:34:56.000");
    }

    #[test]
    fn test_filename_format() {
        assert_eq!(format_filename(sample()), "20260806-123456789");
    }
}

//! Clock and relative-time formatting
//!
//! All times are Unix epoch seconds in UTC. `None` means the clock was never
//! set.

use core::fmt::Write;

use heapless::String;

/// Longest formatted clock, `"HH:MM"`
pub const CLOCK_TEXT_LEN: usize = 5;
/// Longest formatted relative time, e.g. `"yesterday"`
pub const RELATIVE_TEXT_LEN: usize = 16;

pub type ClockText = String<CLOCK_TEXT_LEN>;
pub type RelativeText = String<RELATIVE_TEXT_LEN>;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: i64 = 24 * SECS_PER_HOUR;

/// Format the time of day as `"HH:MM"`, or `"--:--"` when unknown
pub fn format_clock(now: Option<u32>) -> ClockText {
    let mut out = ClockText::new();
    let _ = match now {
        Some(unix) => {
            let secs_of_day = i64::from(unix) % SECS_PER_DAY;
            write!(
                out,
                "{:02}:{:02}",
                secs_of_day / SECS_PER_HOUR,
                (secs_of_day % SECS_PER_HOUR) / SECS_PER_MINUTE
            )
        }
        None => out.write_str("--:--"),
    };
    out
}

/// Format how long ago `timestamp` was, relative to `now`
///
/// ```text
/// < 10 s or in the future   now
/// < 1 min                   42s ago
/// < 1 h                     5m ago
/// < 1 day                   3h ago
/// 1 day                     yesterday
/// < 1 week                  4d ago
/// older                     DD/MM
/// ```
pub fn format_relative(now: Option<u32>, timestamp: u32) -> RelativeText {
    let mut out = RelativeText::new();

    let now = match now {
        Some(now) if now != 0 && timestamp != 0 => now,
        _ => {
            let _ = out.write_str("unknown");
            return out;
        }
    };

    let diff = i64::from(now) - i64::from(timestamp);
    let _ = if diff < 10 {
        out.write_str("now")
    } else if diff < SECS_PER_MINUTE {
        write!(out, "{}s ago", diff)
    } else if diff < SECS_PER_HOUR {
        write!(out, "{}m ago", diff / SECS_PER_MINUTE)
    } else if diff < SECS_PER_DAY {
        write!(out, "{}h ago", diff / SECS_PER_HOUR)
    } else if diff < 7 * SECS_PER_DAY {
        match diff / SECS_PER_DAY {
            1 => out.write_str("yesterday"),
            days => write!(out, "{}d ago", days),
        }
    } else {
        let (_, month, day) = civil_from_days(i64::from(timestamp) / SECS_PER_DAY);
        write!(out, "{:02}/{:02}", day, month)
    };
    out
}

/// Convert days since 1970-01-01 to a (year, month, day) date
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-15 14:30:00 UTC
    const NOW: u32 = 1_710_513_000;

    #[test]
    fn test_clock() {
        assert_eq!(format_clock(Some(NOW)).as_str(), "14:30");
        assert_eq!(format_clock(Some(0)).as_str(), "00:00");
        assert_eq!(format_clock(Some(NOW + 9 * 3600 + 29 * 60)).as_str(), "23:59");
        assert_eq!(format_clock(None).as_str(), "--:--");
    }

    #[test]
    fn test_relative_unknown() {
        assert_eq!(format_relative(None, NOW).as_str(), "unknown");
        assert_eq!(format_relative(Some(NOW), 0).as_str(), "unknown");
    }

    #[test]
    fn test_relative_ranges() {
        let cases: [(u32, &str); 9] = [
            (0, "now"),
            (9, "now"),
            (42, "42s ago"),
            (60, "1m ago"),
            (59 * 60 + 59, "59m ago"),
            (3 * 3600, "3h ago"),
            (86_400, "yesterday"),
            (2 * 86_400 + 5, "2d ago"),
            (6 * 86_400, "6d ago"),
        ];
        for (age, expected) in cases {
            assert_eq!(format_relative(Some(NOW), NOW - age).as_str(), expected);
        }
    }

    #[test]
    fn test_relative_future_is_now() {
        assert_eq!(format_relative(Some(NOW), NOW + 3600).as_str(), "now");
    }

    #[test]
    fn test_relative_old_shows_date() {
        // 2024-03-01 is 14 days before NOW
        assert_eq!(format_relative(Some(NOW), NOW - 14 * 86_400).as_str(), "01/03");
        // 2023-12-25 12:00 UTC
        assert_eq!(format_relative(Some(NOW), 1_703_505_600).as_str(), "25/12");
    }

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(19_797), (2024, 3, 15));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
    }
}

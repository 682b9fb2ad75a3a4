//! Human-readable formatting helpers shared by the driver and CLI.

use chrono::{DateTime, Utc};

/// Format a second count as a human-readable duration.
///
/// Units are included only when non-zero, so short runs read as
/// `1.25 secs` and long ones as `2 days 3 hrs 4 mins 5.00 secs`.
pub fn readable_time(value: f64) -> String {
    let (minutes, seconds) = (value.div_euclid(60.0), value.rem_euclid(60.0));
    let (hours, minutes) = (minutes.div_euclid(60.0), minutes.rem_euclid(60.0));
    let (days, hours) = (hours.div_euclid(24.0), hours.rem_euclid(24.0));

    let mut parts = Vec::new();
    if days >= 1.0 {
        let unit = if days > 1.0 { "days" } else { "day" };
        parts.push(format!("{} {unit}", days as u64));
    }
    if hours >= 1.0 {
        let unit = if hours > 1.0 { "hrs" } else { "hr" };
        parts.push(format!("{} {unit}", hours as u64));
    }
    if minutes >= 1.0 {
        let unit = if minutes > 1.0 { "mins" } else { "min" };
        parts.push(format!("{} {unit}", minutes as u64));
    }
    parts.push(format!("{seconds:.2} secs"));
    parts.join(" ")
}

/// Format a byte count using binary units.
pub fn readable_size(value: u64) -> String {
    const KILOS: u64 = 1024;
    const MEGS: u64 = KILOS * 1024;
    const GIGS: u64 = MEGS * 1024;
    const TERAS: u64 = GIGS * 1024;

    let scaled = |unit: u64| (value as f64) / (unit as f64);
    if value >= TERAS {
        format!("{:.2} TB", scaled(TERAS))
    } else if value >= GIGS {
        format!("{:.2} GB", scaled(GIGS))
    } else if value >= MEGS {
        format!("{:.2} MB", scaled(MEGS))
    } else if value >= KILOS {
        format!("{:.2} KB", scaled(KILOS))
    } else {
        format!("{value} bytes")
    }
}

/// Format a run timestamp for summaries.
pub fn timestamp(moment: DateTime<Utc>) -> String {
    moment.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn readable_time_includes_only_nonzero_units() {
        assert_eq!(readable_time(1.25), "1.25 secs");
        assert_eq!(readable_time(61.0), "1 min 1.00 secs");
        assert_eq!(readable_time(3_725.5), "1 hr 2 mins 5.50 secs");
        assert_eq!(readable_time(90_000.0), "1 day 1 hr 0.00 secs");
        assert_eq!(readable_time(180_125.0), "2 days 2 hrs 2 mins 5.00 secs");
    }

    #[test]
    fn readable_size_scales_binary_units() {
        assert_eq!(readable_size(512), "512 bytes");
        assert_eq!(readable_size(2_048), "2.00 KB");
        assert_eq!(readable_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(readable_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn timestamp_is_second_precise() {
        let moment = Utc.with_ymd_and_hms(2025, 2, 25, 9, 30, 5).unwrap();
        assert_eq!(timestamp(moment), "2025-02-25 09:30:05");
    }
}

//! Display helpers for numbers and durations.

const SUFFIXES: &[&str] = &["", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc"];

/// Abbreviate a point amount: `999`, `1.5K`, `2.0M`, ...
pub fn format_number(n: f64) -> String {
    if n < 1000.0 {
        return format!("{:.0}", n);
    }
    let mut order = 0;
    let mut scaled = n;
    while scaled >= 1000.0 && order < SUFFIXES.len() - 1 {
        scaled /= 1000.0;
        order += 1;
    }
    format!("{:.1}{}", scaled, SUFFIXES[order])
}

/// Human-readable duration: `45s`, `2m 5s`, `1h 30m`.
pub fn format_time(seconds: f64) -> String {
    let s = seconds.max(0.0);
    if s < 60.0 {
        return format!("{}s", s.floor() as u64);
    }
    if s < 3600.0 {
        return format!("{}m {}s", (s / 60.0).floor() as u64, (s % 60.0).floor() as u64);
    }
    format!(
        "{}h {}m",
        (s / 3600.0).floor() as u64,
        ((s % 3600.0) / 60.0).floor() as u64
    )
}

/// Seconds until `target` at the given income rate; `None` without income.
pub fn time_to_target(current: f64, target: f64, points_per_second: f64) -> Option<f64> {
    if points_per_second <= 0.0 {
        return None;
    }
    if current >= target {
        return Some(0.0);
    }
    Some((target - current) / points_per_second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn small_numbers_are_whole() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(12.4), "12");
        assert_eq!(format_number(999.0), "999");
    }

    #[test]
    fn large_numbers_get_suffixes() {
        assert_eq!(format_number(1_000.0), "1.0K");
        assert_eq!(format_number(1_500.0), "1.5K");
        assert_eq!(format_number(2_000_000.0), "2.0M");
        assert_eq!(format_number(3.2e9), "3.2B");
        assert_eq!(format_number(1e12), "1.0T");
    }

    #[test]
    fn suffix_caps_at_last() {
        assert!(format_number(1e40).ends_with("Dc"));
    }

    #[test]
    fn time_formats() {
        assert_eq!(format_time(45.7), "45s");
        assert_eq!(format_time(125.0), "2m 5s");
        assert_eq!(format_time(5_400.0), "1h 30m");
    }

    #[test]
    fn time_to_target_cases() {
        assert_eq!(time_to_target(0.0, 100.0, 0.0), None);
        assert_eq!(time_to_target(200.0, 100.0, 5.0), Some(0.0));
        assert_eq!(time_to_target(50.0, 100.0, 5.0), Some(10.0));
    }

    proptest! {
        #[test]
        fn prop_format_number_no_panic(n in 0.0f64..1e30) {
            let _ = format_number(n);
        }

        #[test]
        fn prop_below_thousand_has_no_suffix(n in 0.0f64..999.4) {
            let s = format_number(n);
            prop_assert!(s.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

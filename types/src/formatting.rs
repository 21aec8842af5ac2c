//! Number formatting for detail tables.
//!
//! Supports European-style number formatting (swapping `.` and `,`).

/// Swap `.` and `,` in a formatted numeric string.
fn europeanize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '.' => ',',
            ',' => '.',
            _ => c,
        })
        .collect()
}

#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format an amount with K/M suffix for compact display.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_amount;
/// assert_eq!(format_amount(500.0, false), "500");
/// assert_eq!(format_amount(1_500.0, false), "1.50K");
/// assert_eq!(format_amount(1_500_000.0, true), "1,50M");
/// ```
pub fn format_amount(n: f64, european: bool) -> String {
    let n_abs = n.abs();
    let s = if n_abs >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n_abs >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.0}", n)
    };
    maybe_eu(s, european)
}

/// Format a per-second rate with one decimal place below 1K.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_rate;
/// assert_eq!(format_rate(97.5, false), "97.5/s");
/// assert_eq!(format_rate(97.5, true), "97,5/s");
/// assert_eq!(format_rate(2_500.0, false), "2.50K/s");
/// ```
pub fn format_rate(per_second: f64, european: bool) -> String {
    if per_second.abs() >= 1_000.0 {
        format!("{}/s", format_amount(per_second, european))
    } else {
        maybe_eu(format!("{:.1}/s", per_second), european)
    }
}

/// Format a share of `part` in `total` as a percentage.
///
/// Returns `"0%"` if total is zero.
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_share;
/// assert_eq!(format_share(3.0, 10.0, false), "30.0%");
/// assert_eq!(format_share(3.0, 10.0, true), "30,0%");
/// assert_eq!(format_share(0.0, 0.0, false), "0%");
/// ```
pub fn format_share(part: f64, total: f64, european: bool) -> String {
    if total == 0.0 {
        return "0%".to_string();
    }
    maybe_eu(format!("{:.1}%", part / total * 100.0), european)
}

/// Format seconds as `M:SS` (rounded).
///
/// # Examples
/// ```
/// use raidlens_types::formatting::format_duration;
/// assert_eq!(format_duration(125.7), "2:06");
/// assert_eq!(format_duration(0.0), "0:00");
/// ```
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

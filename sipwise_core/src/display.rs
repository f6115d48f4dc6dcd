//! Display helpers derived from a [`BacResult`](crate::BacResult).
//!
//! Nothing here feeds back into the engine. The gauge and countdown are
//! recomputed from the latest result on every tick.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// BAC that fills the gauge completely
pub const GAUGE_CEILING_BAC: f64 = 0.20;

/// Fraction of the gauge to fill for `bac`, clamped to `[0, 1]`
pub fn gauge_fraction(bac: f64) -> f64 {
    if !bac.is_finite() || bac <= 0.0 {
        return 0.0;
    }
    (bac / GAUGE_CEILING_BAC).min(1.0)
}

/// Render a gauge fraction as a fixed-width text bar, e.g. `[#####-----]`
pub fn gauge_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Instant at which the projection reaches zero, saturating at the last
/// representable instant
pub fn sober_at(now: DateTime<Utc>, minutes_to_sober: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::minutes(i64::from(minutes_to_sober)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Live countdown to sobriety, re-derived against wall-clock time each tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    Remaining { hours: i64, minutes: i64, seconds: i64 },
    Sober,
}

impl Countdown {
    /// Countdown from `wall_now` to `sober_at`
    pub fn at(sober_at: DateTime<Utc>, wall_now: DateTime<Utc>) -> Self {
        let remaining_ms = (sober_at - wall_now).num_milliseconds();
        if remaining_ms <= 0 {
            return Countdown::Sober;
        }

        let total_seconds = remaining_ms / 1000;
        Countdown::Remaining {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
        }
    }

    pub fn is_sober(&self) -> bool {
        matches!(self, Countdown::Sober)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Remaining {
                hours,
                minutes,
                seconds,
            } => write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds),
            Countdown::Sober => f.write_str("You are sober!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_gauge_fraction_clamps() {
        assert_eq!(gauge_fraction(0.0), 0.0);
        assert_eq!(gauge_fraction(-0.1), 0.0);
        assert!((gauge_fraction(0.05) - 0.25).abs() < 1e-12);
        assert_eq!(gauge_fraction(0.20), 1.0);
        assert_eq!(gauge_fraction(0.35), 1.0);
    }

    #[test]
    fn test_gauge_bar() {
        assert_eq!(gauge_bar(0.0, 4), "[----]");
        assert_eq!(gauge_bar(0.5, 4), "[##--]");
        assert_eq!(gauge_bar(2.0, 4), "[####]");
    }

    #[test]
    fn test_countdown_formats_hms() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap();
        let target = sober_at(now, 110);

        let countdown = Countdown::at(target, now);
        assert_eq!(countdown.to_string(), "01:50:00");

        let later = now + Duration::seconds(3_599);
        assert_eq!(Countdown::at(target, later).to_string(), "00:50:01");
    }

    #[test]
    fn test_countdown_elapsed_is_sober() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap();

        assert!(Countdown::at(sober_at(now, 0), now).is_sober());
        assert_eq!(
            Countdown::at(sober_at(now, 5), now + Duration::minutes(6)).to_string(),
            "You are sober!"
        );
    }

    #[test]
    fn test_sober_at_saturates_near_end_of_time() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(sober_at(late, u32::MAX), DateTime::<Utc>::MAX_UTC);
        assert!(!Countdown::at(sober_at(late, u32::MAX), late).is_sober());
    }
}

//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Wire format for envelope timestamps (`HH:MM`).
pub const CLOCK_FORMAT: &str = "%H:%M";

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Renders the wall-clock time in the server's local zone as `HH:MM`.
    pub fn to_clock_string(&self) -> String {
        self.0.with_timezone(&Local).format(CLOCK_FORMAT).to_string()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.0 >= before);
        assert!(ts.0 <= after);
    }

    #[test]
    fn later_timestamps_order_after_earlier_ones() {
        let ts1 = Timestamp::now();
        sleep(Duration::from_millis(10));
        let ts2 = Timestamp::now();

        assert!(ts1 < ts2);
    }

    #[test]
    fn clock_string_is_hours_and_minutes() {
        let ts = Timestamp::now();
        let rendered = ts.to_clock_string();

        assert_eq!(rendered.len(), 5);
        assert_eq!(&rendered[2..3], ":");
        assert!(rendered[..2].chars().all(|c| c.is_ascii_digit()));
        assert!(rendered[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn clock_string_uses_local_zone() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let local = dt.with_timezone(&Local);
        let expected = format!("{:02}:{:02}", local.hour(), local.minute());

        assert_eq!(Timestamp(dt).to_clock_string(), expected);
    }
}

//! Time utilities: local calendar days for due dates and recurrence.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Wall-clock snapshot used by every date-sensitive query.
///
/// The core never reads the system clock itself; callers build a `Clock`
/// once per update pass and hand it down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    pub now: DateTime<Utc>,
    pub tz: Tz,
}

impl Clock {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self { now, tz }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        Self { now, tz: Tz::UTC }
    }

    /// Build from an IANA zone name such as "America/Chicago".
    pub fn with_zone(now: DateTime<Utc>, tz: &str) -> Result<Self> {
        Ok(Self { now, tz: parse_tz(tz)? })
    }

    /// Today's calendar date in the local zone.
    pub fn today(&self) -> NaiveDate {
        self.local_date(self.now)
    }

    /// Calendar date of `dt` in the local zone.
    pub fn local_date(&self, dt: DateTime<Utc>) -> NaiveDate {
        dt.with_timezone(&self.tz).date_naive()
    }
}

pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Parse a local time like "2026-02-20 23:59" in an IANA tz like "America/Chicago",
/// returning UTC.
pub fn parse_local_datetime_to_utc(local: &str, tz: &str) -> Result<DateTime<Utc>> {
    let tz = parse_tz(tz)?;

    let ndt = NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M")
        .map_err(|e| anyhow::anyhow!("invalid local datetime '{local}': {e}"))?;

    let local_dt = tz
        .from_local_datetime(&ndt)
        .single()
        .ok_or_else(|| anyhow::anyhow!("ambiguous or invalid local time (DST?): {local} {tz}"))?;

    Ok(local_dt.with_timezone(&Utc))
}

/// Whole days elapsed from `from` to `to` (truncated toward zero).
pub fn whole_days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

/// True when `date` is the final calendar day of its month.
pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date.succ_opt().is_none_or(|next| next.month() != date.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_parse_chicago_local_time() {
        // Feb is CST (UTC-6)
        let utc = parse_local_datetime_to_utc("2026-02-20 23:59", "America/Chicago").unwrap();
        assert_eq!(utc.to_rfc3339(), "2026-02-21T05:59:00+00:00");
    }

    #[test]
    fn test_invalid_zone_is_error() {
        assert!(parse_local_datetime_to_utc("2026-02-20 23:59", "Mars/Olympus").is_err());
    }

    #[test]
    fn test_today_follows_zone() {
        let now = Utc.with_ymd_and_hms(2026, 2, 21, 3, 0, 0).unwrap();
        let chicago = Clock::with_zone(now, "America/Chicago").unwrap();
        assert_eq!(chicago.today(), NaiveDate::from_ymd_opt(2026, 2, 20).unwrap());
        assert_eq!(Clock::utc(now).today(), NaiveDate::from_ymd_opt(2026, 2, 21).unwrap());
    }

    #[test]
    fn test_whole_days_truncate() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(whole_days_between(a, a + Duration::hours(47)), 1);
        assert_eq!(whole_days_between(a + Duration::hours(47), a), -1);
    }

    #[test]
    fn test_last_day_of_month() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert!(is_last_day_of_month(d(2024, 2, 29)));
        assert!(!is_last_day_of_month(d(2024, 2, 28)));
        assert!(is_last_day_of_month(d(2023, 2, 28)));
        assert!(is_last_day_of_month(d(2026, 4, 30)));
        assert!(is_last_day_of_month(d(2026, 12, 31)));
        assert!(!is_last_day_of_month(d(2026, 1, 30)));
    }
}

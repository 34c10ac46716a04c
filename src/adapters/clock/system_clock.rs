//! Fixed-civil-timezone `Clock` implementation (spec §4.1, §6 `clock`).

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::domain::ports::clock::Clock;

pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn from_config_str(timezone: &str) -> Result<Self, chrono_tz::ParseError> {
        Ok(Self::new(timezone.parse()?))
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone).date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn at_hour(&self, date: NaiveDate, hour: u32) -> DateTime<Utc> {
        let naive = date.and_hms_opt(hour, 0, 0).unwrap_or_else(|| date.and_hms_opt(0, 0, 0).unwrap());
        match self.zone.from_local_datetime(&naive) {
            chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
            chrono::LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
            chrono::LocalResult::None => {
                // DST gap: fall forward to the next representable instant.
                self.zone
                    .from_local_datetime(&(naive + chrono::Duration::hours(1)))
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(Utc::now)
            }
        }
    }
}

/// A fixed-instant clock for deterministic tests (spec §8 scenarios).
/// Not test-gated: integration tests under `tests/` depend on it as a
/// regular part of the library's public surface.
pub struct FixedClock {
    pub fixed_now: DateTime<Utc>,
    pub zone: Tz,
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.fixed_now.with_timezone(&self.zone).date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now
    }

    fn at_hour(&self, date: NaiveDate, hour: u32) -> DateTime<Utc> {
        let naive = date.and_hms_opt(hour, 0, 0).unwrap();
        self.zone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(self.fixed_now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_hour_uses_fixed_zone_not_utc() {
        let clock = SystemClock::new(chrono_tz::Europe::Amsterdam);
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        let morning = clock.at_hour(date, 9);
        // Amsterdam is UTC+2 in June (CEST), so 09:00 local is 07:00 UTC.
        assert_eq!(morning.with_timezone(&Utc).format("%H:%M").to_string(), "07:00");
    }
}

//! Job schedules
//!
//! Three shapes cover every CRM job:
//! - `every <N>s|m|h`: fixed interval from the previous fire
//! - `daily HH:MM`: once a day (UTC)
//! - `weekly <mon..sun> HH:MM`: once a week (UTC)

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveTime, Utc, Weekday};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Every(Duration),
    Daily { at: NaiveTime },
    Weekly { weekday: Weekday, at: NaiveTime },
}

impl Schedule {
    /// Next fire time strictly after `now`
    ///
    /// `None` when that instant is beyond the representable calendar.
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Schedule::Every(interval) => ChronoDuration::from_std(interval)
                .ok()
                .and_then(|step| now.checked_add_signed(step)),
            Schedule::Daily { at } => {
                let today = now.date_naive().and_time(at).and_utc();
                if today > now {
                    Some(today)
                } else {
                    today.checked_add_signed(ChronoDuration::days(1))
                }
            }
            Schedule::Weekly { weekday, at } => {
                let days_ahead = (7 + weekday.num_days_from_monday()
                    - now.weekday().num_days_from_monday())
                    % 7;
                let candidate = now
                    .date_naive()
                    .checked_add_signed(ChronoDuration::days(days_ahead as i64))?
                    .and_time(at)
                    .and_utc();
                if candidate > now {
                    Some(candidate)
                } else {
                    candidate.checked_add_signed(ChronoDuration::weeks(1))
                }
            }
        }
    }
}

fn parse_interval(raw: &str) -> Result<Duration, DomainError> {
    let invalid = || DomainError::InvalidSchedule(format!("bad interval '{}'", raw));
    let (unit_at, _) = raw.char_indices().last().ok_or_else(invalid)?;
    let (amount, unit) = raw.split_at(unit_at);
    let amount: u64 = amount.parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(DomainError::InvalidSchedule(
            "interval must be greater than zero".to_string(),
        ));
    }
    let too_long = || DomainError::InvalidSchedule(format!("interval '{}' is too long", raw));
    let secs = match unit {
        "s" => Some(amount),
        "m" => amount.checked_mul(60),
        "h" => amount.checked_mul(3600),
        _ => return Err(invalid()),
    }
    .ok_or_else(too_long)?;

    let interval = Duration::from_secs(secs);
    let reachable = ChronoDuration::from_std(interval)
        .ok()
        .and_then(|step| Utc::now().checked_add_signed(step))
        .is_some();
    if !reachable {
        return Err(too_long());
    }
    Ok(interval)
}

fn parse_time(raw: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| DomainError::InvalidSchedule(format!("bad time of day '{}'", raw)))
}

impl FromStr for Schedule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            ["every", interval] => Ok(Schedule::Every(parse_interval(interval)?)),
            ["daily", time] => Ok(Schedule::Daily {
                at: parse_time(time)?,
            }),
            ["weekly", day, time] => {
                let weekday = day.parse::<Weekday>().map_err(|_| {
                    DomainError::InvalidSchedule(format!("bad weekday '{}'", day))
                })?;
                Ok(Schedule::Weekly {
                    weekday,
                    at: parse_time(time)?,
                })
            }
            _ => Err(DomainError::InvalidSchedule(format!(
                "'{}' (expected 'every <N>s|m|h', 'daily HH:MM' or 'weekly <day> HH:MM')",
                s
            ))),
        }
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Every(interval) => {
                let secs = interval.as_secs();
                if secs % 3600 == 0 {
                    write!(f, "every {}h", secs / 3600)
                } else if secs % 60 == 0 {
                    write!(f, "every {}m", secs / 60)
                } else {
                    write!(f, "every {}s", secs)
                }
            }
            Schedule::Daily { at } => write!(f, "daily {}", at.format("%H:%M")),
            Schedule::Weekly { weekday, at } => {
                write!(
                    f,
                    "weekly {} {}",
                    weekday.to_string().to_lowercase(),
                    at.format("%H:%M")
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            "every 5m".parse::<Schedule>().unwrap(),
            Schedule::Every(Duration::from_secs(300))
        );
        assert_eq!(
            "daily 08:00".parse::<Schedule>().unwrap(),
            Schedule::Daily {
                at: NaiveTime::from_hms_opt(8, 0, 0).unwrap()
            }
        );
        assert_eq!(
            "weekly mon 06:00".parse::<Schedule>().unwrap(),
            Schedule::Weekly {
                weekday: Weekday::Mon,
                at: NaiveTime::from_hms_opt(6, 0, 0).unwrap()
            }
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("every 0m".parse::<Schedule>().is_err());
        assert!("every 5d".parse::<Schedule>().is_err());
        assert!("daily 25:00".parse::<Schedule>().is_err());
        assert!("weekly funday 06:00".parse::<Schedule>().is_err());
        assert!("hourly".parse::<Schedule>().is_err());
        assert!("every".parse::<Schedule>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["every 5m", "every 12h", "every 45s", "daily 08:00", "weekly mon 06:00"] {
            assert_eq!(raw.parse::<Schedule>().unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_daily_next_after() {
        let schedule: Schedule = "daily 08:00".parse().unwrap();
        assert_eq!(
            schedule.next_after(at(2025, 6, 2, 7, 59)),
            Some(at(2025, 6, 2, 8, 0))
        );
        // Exactly at fire time: next one is tomorrow
        assert_eq!(
            schedule.next_after(at(2025, 6, 2, 8, 0)),
            Some(at(2025, 6, 3, 8, 0))
        );
    }

    #[test]
    fn test_weekly_next_after() {
        let schedule: Schedule = "weekly mon 06:00".parse().unwrap();
        // 2025-06-04 is a Wednesday
        assert_eq!(
            schedule.next_after(at(2025, 6, 4, 12, 0)),
            Some(at(2025, 6, 9, 6, 0))
        );
        // Monday before fire time
        assert_eq!(
            schedule.next_after(at(2025, 6, 2, 5, 0)),
            Some(at(2025, 6, 2, 6, 0))
        );
        // Monday after fire time
        assert_eq!(
            schedule.next_after(at(2025, 6, 2, 6, 30)),
            Some(at(2025, 6, 9, 6, 0))
        );
    }

    #[test]
    fn test_every_next_after() {
        let schedule: Schedule = "every 12h".parse().unwrap();
        assert_eq!(
            schedule.next_after(at(2025, 6, 2, 1, 0)),
            Some(at(2025, 6, 2, 13, 0))
        );
    }

    #[test]
    fn test_overflowing_interval_rejected() {
        let err = "every 9000000000000000000h".parse::<Schedule>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidSchedule(ref msg) if msg.contains("too long")));
        assert!("every 18446744073709551615m".parse::<Schedule>().is_err());
    }

    #[test]
    fn test_interval_past_calendar_end_rejected() {
        // Fits in a chrono duration, but no date that far ahead exists
        assert!("every 3000000000h".parse::<Schedule>().is_err());
        // Does not fit in a chrono duration at all
        assert!("every 4000000000000h".parse::<Schedule>().is_err());
        // Long but valid
        assert!("every 87600h".parse::<Schedule>().is_ok());
    }

    #[test]
    fn test_unreachable_next_fire_is_none() {
        let now = at(2025, 6, 2, 0, 0);
        for interval in [
            Duration::from_secs(3_000_000_000 * 3600),
            Duration::from_secs(4_000_000_000_000 * 3600),
            Duration::from_secs(u64::MAX),
        ] {
            assert_eq!(Schedule::Every(interval).next_after(now), None);
        }
    }

    #[test]
    fn test_next_fire_is_strictly_later() {
        let now = at(2025, 6, 2, 6, 0);
        for raw in ["every 1s", "every 12h", "daily 06:00", "weekly mon 06:00"] {
            let schedule: Schedule = raw.parse().unwrap();
            let next = schedule.next_after(now).unwrap();
            assert!(next > now, "{} fired at {}", raw, next);
        }
    }
}

//! Rotation decisions, schedule arithmetic and rotated file names
//!
//! Nothing here touches the filesystem. The writer core feeds in the current
//! time and size and acts on the returned [`Decision`].

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDateTime, TimeDelta, TimeZone, Timelike};

/// What a write should do with the current file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Keep appending
    None,
    /// The rotation interval elapsed
    Scheduled,
    /// The size ceiling was reached
    Overflow,
}

/// Outcome of one policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rotation: Rotation,
    /// The scheduled instant has passed and must be advanced, even when the
    /// rotation itself was skipped because the file is empty
    pub reschedule: bool,
}

impl Decision {
    const KEEP: Decision = Decision {
        rotation: Rotation::None,
        reschedule: false,
    };
}

/// Validated rotation triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    size_ceiling: Option<u64>,
    interval: Option<TimeDelta>,
}

impl Policy {
    /// A zero ceiling or a non-positive interval disables that trigger
    pub fn new(size_ceiling: Option<u64>, interval: Option<TimeDelta>) -> Self {
        Self {
            size_ceiling: size_ceiling.filter(|&bytes| bytes > 0),
            interval: interval.filter(|delta| delta.num_seconds() > 0),
        }
    }

    pub fn size_ceiling(&self) -> Option<u64> {
        self.size_ceiling
    }

    pub fn interval(&self) -> Option<TimeDelta> {
        self.interval
    }

    /// Whether scheduled names carry the minute
    pub fn is_sub_hour(&self) -> bool {
        self.interval.is_some_and(|delta| delta < TimeDelta::hours(1))
    }

    /// Decide what to do before appending to a file of `size` bytes.
    ///
    /// The schedule wins over the size ceiling. An elapsed schedule on an
    /// empty file yields no rotation but still asks for a reschedule.
    pub fn decide<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        next_rotation: Option<&DateTime<Tz>>,
        size: u64,
    ) -> Decision {
        if let (Some(_), Some(next)) = (self.interval, next_rotation) {
            if now >= next {
                let rotation = if size == 0 {
                    Rotation::None
                } else {
                    Rotation::Scheduled
                };
                return Decision {
                    rotation,
                    reschedule: true,
                };
            }
        }

        match self.size_ceiling {
            Some(ceiling) if size >= ceiling => Decision {
                rotation: Rotation::Overflow,
                reschedule: false,
            },
            _ => Decision::KEEP,
        }
    }

    /// First scheduled instant for a logger created at `now`.
    ///
    /// Intervals under an hour are laid on a grid starting at the top of the
    /// current hour. Longer intervals start one interval after the top of the
    /// current hour and never run past the next midnight.
    pub fn first_rotation<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let interval = self.interval?;
        let local = now.naive_local();
        let since_midnight = TimeDelta::seconds(i64::from(local.num_seconds_from_midnight()))
            + TimeDelta::nanoseconds(i64::from(local.nanosecond()));
        let midnight = local - since_midnight;
        let hour = midnight + TimeDelta::hours(i64::from(local.hour()));

        let next = if interval < TimeDelta::hours(1) {
            let step = interval.num_seconds();
            let elapsed = (local - hour).num_seconds();
            hour + TimeDelta::seconds((elapsed / step + 1) * step)
        } else {
            (hour + interval).min(midnight + TimeDelta::days(1))
        };

        Some(resolve_local(now, next))
    }

    /// Move `next_rotation` forward by whole intervals until it lies after `now`.
    ///
    /// After an idle stretch longer than one interval a single step would
    /// leave the instant in the past, and every following write would rotate
    /// again into a name already taken in the same minute.
    pub fn advance<Tz: TimeZone>(
        &self,
        next_rotation: &DateTime<Tz>,
        now: &DateTime<Tz>,
    ) -> DateTime<Tz> {
        let Some(interval) = self.interval else {
            return next_rotation.clone();
        };
        let step = interval.num_seconds();
        let steps = if now >= next_rotation {
            (now.clone() - next_rotation.clone()).num_seconds() / step + 1
        } else {
            1
        };
        next_rotation.clone() + TimeDelta::seconds(step * steps)
    }
}

/// Map a wall-clock time back into `now`'s zone; a time skipped by a DST jump
/// is shifted by the same offset as `now`
fn resolve_local<Tz: TimeZone>(now: &DateTime<Tz>, local: NaiveDateTime) -> DateTime<Tz> {
    now.timezone()
        .from_local_datetime(&local)
        .earliest()
        .unwrap_or_else(|| now.clone() + (local - now.naive_local()))
}

/// `<path>YYYYMMDD_HH`, plus `_MM` for sub-hour intervals
pub fn scheduled_name<Tz: TimeZone>(path: &Path, now: &DateTime<Tz>, sub_hour: bool) -> PathBuf {
    let mut suffix = String::with_capacity(14);
    let _ = write!(
        suffix,
        "{:04}{:02}{:02}_{:02}",
        now.year(),
        now.month(),
        now.day(),
        now.hour()
    );
    if sub_hour {
        let _ = write!(suffix, "_{:02}", now.minute());
    }
    with_suffix(path, &suffix)
}

/// `<path>YYYYMMDD_HH_mm.<ordinal>`
pub fn overflow_name<Tz: TimeZone>(path: &Path, now: &DateTime<Tz>, ordinal: u32) -> PathBuf {
    let suffix = format!(
        "{:04}{:02}{:02}_{:02}_{:02}.{}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        ordinal
    );
    with_suffix(path, &suffix)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn at(day: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
            .and_utc()
    }

    fn hourly(hours: i64, ceiling: Option<u64>) -> Policy {
        Policy::new(ceiling, Some(TimeDelta::hours(hours)))
    }

    #[test]
    fn test_decide_no_triggers() {
        let policy = Policy::new(None, None);
        let now = at(1, 12, 0, 0);
        assert_eq!(policy.decide(&now, None, u64::MAX).rotation, Rotation::None);
    }

    #[test]
    fn test_decide_overflow_at_ceiling() {
        let policy = Policy::new(Some(1024), None);
        let now = at(1, 12, 0, 0);
        assert_eq!(policy.decide(&now, None, 1023), Decision::KEEP);

        let decision = policy.decide(&now, None, 1024);
        assert_eq!(decision.rotation, Rotation::Overflow);
        assert!(!decision.reschedule);
    }

    #[test]
    fn test_schedule_takes_precedence_over_overflow() {
        let policy = hourly(1, Some(10));
        let next = at(1, 13, 0, 0);

        let decision = policy.decide(&at(1, 13, 0, 0), Some(&next), 5_000);
        assert_eq!(decision.rotation, Rotation::Scheduled);
        assert!(decision.reschedule);

        let decision = policy.decide(&at(1, 12, 59, 59), Some(&next), 5_000);
        assert_eq!(decision.rotation, Rotation::Overflow);
    }

    #[test]
    fn test_scheduled_on_empty_file_only_reschedules() {
        let policy = hourly(1, None);
        let next = at(1, 13, 0, 0);
        let decision = policy.decide(&at(1, 14, 30, 0), Some(&next), 0);
        assert_eq!(decision.rotation, Rotation::None);
        assert!(decision.reschedule);
    }

    #[test]
    fn test_first_rotation_sub_hour_aligns_to_interval() {
        let policy = Policy::new(None, Some(TimeDelta::minutes(1)));
        assert_eq!(
            policy.first_rotation(&at(1, 10, 17, 42)),
            Some(at(1, 10, 18, 0))
        );

        let policy = Policy::new(None, Some(TimeDelta::minutes(15)));
        assert_eq!(
            policy.first_rotation(&at(1, 10, 17, 42)),
            Some(at(1, 10, 30, 0))
        );
        assert_eq!(
            policy.first_rotation(&at(1, 10, 45, 0)),
            Some(at(1, 11, 0, 0))
        );
    }

    #[test]
    fn test_first_rotation_hourly_is_next_top_of_hour() {
        assert_eq!(
            hourly(1, None).first_rotation(&at(1, 10, 17, 42)),
            Some(at(1, 11, 0, 0))
        );
        assert_eq!(
            hourly(1, None).first_rotation(&at(1, 23, 59, 59)),
            Some(at(2, 0, 0, 0))
        );
    }

    #[test]
    fn test_first_rotation_multi_hour_counts_from_creation_hour() {
        assert_eq!(
            hourly(6, None).first_rotation(&at(1, 14, 5, 0)),
            Some(at(1, 20, 0, 0))
        );
        assert_eq!(
            hourly(2, None).first_rotation(&at(1, 13, 30, 0)),
            Some(at(1, 15, 0, 0))
        );
        assert_eq!(
            hourly(6, None).first_rotation(&at(1, 3, 0, 0)),
            Some(at(1, 9, 0, 0))
        );
        assert_eq!(
            hourly(6, None).first_rotation(&at(1, 18, 0, 0)),
            Some(at(2, 0, 0, 0))
        );
        assert_eq!(
            hourly(6, None).first_rotation(&at(1, 21, 45, 0)),
            Some(at(2, 0, 0, 0))
        );
    }

    #[test]
    fn test_first_rotation_capped_at_midnight() {
        assert_eq!(
            hourly(25, None).first_rotation(&at(1, 3, 0, 0)),
            Some(at(2, 0, 0, 0))
        );
        assert_eq!(
            hourly(24, None).first_rotation(&at(1, 0, 0, 1)),
            Some(at(2, 0, 0, 0))
        );
    }

    #[test]
    fn test_first_rotation_disabled() {
        assert_eq!(Policy::new(Some(1), None).first_rotation(&at(1, 1, 1, 1)), None);
    }

    #[test]
    fn test_advance_by_one_interval() {
        let policy = hourly(1, None);
        let next = at(1, 11, 0, 0);
        assert_eq!(policy.advance(&next, &at(1, 11, 0, 0)), at(1, 12, 0, 0));
        assert_eq!(policy.advance(&next, &at(1, 11, 59, 59)), at(1, 12, 0, 0));
    }

    #[test]
    fn test_advance_skips_missed_intervals_without_drift() {
        let policy = Policy::new(None, Some(TimeDelta::minutes(1)));
        let next = at(1, 10, 1, 0);
        // quiet for 90 seconds past the boundary
        assert_eq!(policy.advance(&next, &at(1, 10, 2, 30)), at(1, 10, 3, 0));

        let policy = hourly(1, None);
        assert_eq!(policy.advance(&next, &at(1, 15, 30, 0)), at(1, 16, 1, 0));
    }

    #[test]
    fn test_scheduled_name_hourly() {
        let path = Path::new("/var/log/app.log");
        let now = at(9, 7, 4, 0);
        assert_eq!(
            scheduled_name(path, &now, false),
            PathBuf::from("/var/log/app.log20240509_07")
        );
    }

    #[test]
    fn test_scheduled_name_sub_hour_adds_minute() {
        let path = Path::new("app.log");
        assert_eq!(
            scheduled_name(path, &at(9, 7, 4, 0), true),
            PathBuf::from("app.log20240509_07_04")
        );
    }

    #[test]
    fn test_overflow_name() {
        let path = Path::new("logs/app.log");
        assert_eq!(
            overflow_name(path, &at(9, 23, 58, 12), 3),
            PathBuf::from("logs/app.log20240509_23_58.3")
        );
    }

    #[test]
    fn test_is_sub_hour() {
        assert!(Policy::new(None, Some(TimeDelta::minutes(59))).is_sub_hour());
        assert!(!hourly(1, None).is_sub_hour());
        assert!(!Policy::new(None, None).is_sub_hour());
    }
}

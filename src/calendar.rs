//! Calendar bucketing of epoch timestamps in a fixed timezone.

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Number of hour-of-day time periods.
pub const PERIODS_PER_DAY: usize = 24;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Weekday/weekend classification of a day.
///
/// Demand statistics are kept separately for each class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayClass {
    Weekday,
    Weekend,
}

impl DayClass {
    pub const ALL: [DayClass; 2] = [DayClass::Weekday, DayClass::Weekend];

    pub fn index(self) -> usize {
        match self {
            DayClass::Weekday => 0,
            DayClass::Weekend => 1,
        }
    }
}

/// Peak/non-peak condition, used to pick a zone's center intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeakCondition {
    NonPeak,
    Peak,
}

impl PeakCondition {
    pub const ALL: [PeakCondition; 2] = [PeakCondition::NonPeak, PeakCondition::Peak];

    pub fn index(self) -> usize {
        match self {
            PeakCondition::NonPeak => 0,
            PeakCondition::Peak => 1,
        }
    }
}

/// Converts epoch seconds into local calendar buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    timezone: Tz,
    slot_minutes: u32,
}

impl Calendar {
    /// `slot_minutes` must divide a day evenly; `ModelConfig::validate` checks it.
    pub fn new(timezone: Tz, slot_minutes: u32) -> Self {
        Self {
            timezone,
            slot_minutes,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    /// Number of time slots in a day.
    pub fn slots_per_day(&self) -> usize {
        (MINUTES_PER_DAY / self.slot_minutes) as usize
    }

    /// Whether `timestamp` is within the range of dates the calendar can represent.
    pub fn is_representable(&self, timestamp: i64) -> bool {
        DateTime::<Utc>::from_timestamp(timestamp, 0).is_some()
    }

    /// Local date-time of `timestamp`. Timestamps outside the representable
    /// range clamp to the Unix epoch; training drops such records.
    fn local(&self, timestamp: i64) -> DateTime<Tz> {
        DateTime::<Utc>::from_timestamp(timestamp, 0)
            .unwrap_or_default()
            .with_timezone(&self.timezone)
    }

    /// Day of the year, 1-based (1..=366).
    pub fn day_of_year(&self, timestamp: i64) -> u32 {
        self.local(timestamp).ordinal()
    }

    /// Day of the week, Monday = 1 through Sunday = 7.
    pub fn day_of_week(&self, timestamp: i64) -> u32 {
        self.local(timestamp).weekday().number_from_monday()
    }

    /// Local hour of day (0..=23).
    pub fn hour(&self, timestamp: i64) -> u32 {
        self.local(timestamp).hour()
    }

    /// Index of the time slot containing the timestamp, starting at 0.
    pub fn time_slot(&self, timestamp: i64) -> usize {
        let local = self.local(timestamp);
        ((local.hour() * 60 + local.minute()) / self.slot_minutes) as usize
    }

    /// Index of the hour-long time period containing the timestamp.
    pub fn time_period(&self, timestamp: i64) -> usize {
        self.hour(timestamp) as usize
    }

    pub fn is_weekday(&self, timestamp: i64) -> bool {
        !matches!(self.local(timestamp).weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn day_class(&self, timestamp: i64) -> DayClass {
        if self.is_weekday(timestamp) {
            DayClass::Weekday
        } else {
            DayClass::Weekend
        }
    }

    /// Weekday peak runs from 17:00 to midnight; weekend peak is 18:00-19:59.
    pub fn is_peak_hours(&self, timestamp: i64) -> bool {
        let hour = self.hour(timestamp);
        if self.is_weekday(timestamp) {
            hour >= 17
        } else {
            hour > 17 && hour < 20
        }
    }

    pub fn peak_condition(&self, timestamp: i64) -> PeakCondition {
        if self.is_peak_hours(timestamp) {
            PeakCondition::Peak
        } else {
            PeakCondition::NonPeak
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        New_York.with_ymd_and_hms(y, m, d, h, min, 0).unwrap().timestamp()
    }

    #[test]
    fn test_buckets_use_local_time() {
        let calendar = Calendar::new(New_York, 15);
        // 2016-01-04 is a Monday
        let t = ts(2016, 1, 4, 8, 47);
        assert_eq!(calendar.hour(t), 8);
        assert_eq!(calendar.time_period(t), 8);
        assert_eq!(calendar.time_slot(t), (8 * 60 + 47) / 15);
        assert_eq!(calendar.day_of_year(t), 4);
        assert_eq!(calendar.day_of_week(t), 1);
    }

    #[test]
    fn test_slots_per_day() {
        assert_eq!(Calendar::new(New_York, 15).slots_per_day(), 96);
        assert_eq!(Calendar::new(New_York, 60).slots_per_day(), 24);
        let last = ts(2016, 1, 4, 23, 59);
        assert_eq!(Calendar::new(New_York, 15).time_slot(last), 95);
    }

    #[test]
    fn test_weekday_and_weekend() {
        let calendar = Calendar::new(New_York, 15);
        assert!(calendar.is_weekday(ts(2016, 1, 8, 12, 0))); // Friday
        assert!(!calendar.is_weekday(ts(2016, 1, 9, 12, 0))); // Saturday
        assert_eq!(calendar.day_class(ts(2016, 1, 10, 12, 0)), DayClass::Weekend);
    }

    #[test]
    fn test_out_of_range_timestamps_clamp_to_epoch() {
        let calendar = Calendar::new(New_York, 15);
        assert!(calendar.is_representable(ts(2016, 1, 4, 8, 0)));
        assert!(!calendar.is_representable(i64::MAX));
        // 1969-12-31 19:00 in New York, a Wednesday
        assert_eq!(calendar.day_of_week(i64::MAX), 3);
        assert_eq!(calendar.hour(i64::MAX), 19);
    }

    #[test]
    fn test_weekday_peak_hours() {
        let calendar = Calendar::new(New_York, 15);
        assert!(!calendar.is_peak_hours(ts(2016, 1, 4, 16, 59)));
        assert!(calendar.is_peak_hours(ts(2016, 1, 4, 17, 0)));
        assert!(calendar.is_peak_hours(ts(2016, 1, 4, 23, 30)));
    }

    #[test]
    fn test_weekend_peak_hours() {
        let calendar = Calendar::new(New_York, 15);
        assert!(!calendar.is_peak_hours(ts(2016, 1, 9, 17, 30)));
        assert!(calendar.is_peak_hours(ts(2016, 1, 9, 18, 0)));
        assert!(calendar.is_peak_hours(ts(2016, 1, 9, 19, 59)));
        assert!(!calendar.is_peak_hours(ts(2016, 1, 9, 20, 0)));
        assert_eq!(calendar.peak_condition(ts(2016, 1, 9, 21, 0)), PeakCondition::NonPeak);
    }
}

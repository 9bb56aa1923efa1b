//! Sprint calendar: the next N working days and their placeholders

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use tracing::debug;

use crate::prompts::Placeholders;

/// Display format for a working day, e.g. `Monday, 19 October 2026`
pub const DATE_FORMAT: &str = "%A, %d %B %Y";

/// True for Monday through Friday
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first `count` weekdays on or after `start`
pub fn working_days_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    debug!(%start, %count, "working_days_from: called");
    let mut days = Vec::with_capacity(count);
    let mut current = start;
    while days.len() < count {
        if is_weekday(current) {
            days.push(current);
        }
        match current.checked_add_days(Days::new(1)) {
            Some(next) => current = next,
            None => break,
        }
    }
    days
}

/// The next `count` working days starting today, formatted for display
pub fn get_working_days(count: usize) -> Vec<String> {
    WorkingDays::from_today(count).labels()
}

/// A fixed run of working days, computed once per session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDays {
    dates: Vec<NaiveDate>,
}

impl WorkingDays {
    pub fn starting(start: NaiveDate, count: usize) -> Self {
        Self {
            dates: working_days_from(start, count),
        }
    }

    pub fn from_today(count: usize) -> Self {
        Self::starting(Local::now().date_naive(), count)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Dates rendered with [`DATE_FORMAT`]
    pub fn labels(&self) -> Vec<String> {
        self.dates.iter().map(|d| d.format(DATE_FORMAT).to_string()).collect()
    }

    /// `{{START_DATE}}`, `{{END_DATE}}`, `{{WORKING_DAYS_LIST}}` and
    /// `{{START_DATE + i}}` for every later day
    pub fn placeholders(&self) -> Placeholders {
        let labels = self.labels();
        debug!(day_count = labels.len(), "WorkingDays::placeholders: called");
        let mut placeholders = Placeholders::new();
        let (Some(first), Some(last)) = (labels.first(), labels.last()) else {
            return placeholders;
        };

        placeholders.insert(Placeholders::token("START_DATE"), first.clone());
        placeholders.insert(Placeholders::token("END_DATE"), last.clone());
        placeholders.insert(Placeholders::token("WORKING_DAYS_LIST"), labels.join("\n"));
        for (i, label) in labels.iter().enumerate().skip(1) {
            placeholders.insert(Placeholders::token(&format!("START_DATE + {}", i)), label.clone());
        }
        placeholders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_starts_today_when_weekday() {
        // 2026-10-19 is a Monday
        let days = working_days_from(date(2026, 10, 19), 3);
        assert_eq!(days, vec![date(2026, 10, 19), date(2026, 10, 20), date(2026, 10, 21)]);
    }

    #[test]
    fn test_skips_weekend() {
        // 2026-10-23 is a Friday
        let days = working_days_from(date(2026, 10, 23), 3);
        assert_eq!(days, vec![date(2026, 10, 23), date(2026, 10, 26), date(2026, 10, 27)]);
    }

    #[test]
    fn test_starting_on_saturday() {
        let days = working_days_from(date(2026, 10, 24), 1);
        assert_eq!(days, vec![date(2026, 10, 26)]);
    }

    #[test]
    fn test_zero_days() {
        assert!(working_days_from(date(2026, 10, 19), 0).is_empty());
        assert!(WorkingDays::starting(date(2026, 10, 19), 0).placeholders().is_empty());
    }

    #[test]
    fn test_get_working_days_ten() {
        let today = Local::now().date_naive();
        let labels = get_working_days(10);
        assert_eq!(labels.len(), 10);

        let parsed: Vec<NaiveDate> = labels
            .iter()
            .map(|l| NaiveDate::parse_from_str(l, DATE_FORMAT).unwrap())
            .collect();
        assert!(parsed.iter().all(|d| is_weekday(*d)));
        assert!(parsed.windows(2).all(|w| w[0] < w[1]));
        assert!(parsed[0] >= today);
    }

    #[test]
    fn test_labels_format() {
        let days = WorkingDays::starting(date(2026, 10, 19), 1);
        assert_eq!(days.labels(), vec!["Monday, 19 October 2026".to_string()]);
    }

    #[test]
    fn test_placeholders() {
        let days = WorkingDays::starting(date(2026, 10, 19), 10);
        let p = days.placeholders();

        assert_eq!(p.get("{{START_DATE}}"), Some("Monday, 19 October 2026"));
        assert_eq!(p.get("{{END_DATE}}"), Some("Friday, 30 October 2026"));
        assert_eq!(p.get("{{START_DATE + 1}}"), Some("Tuesday, 20 October 2026"));
        assert_eq!(p.get("{{START_DATE + 5}}"), Some("Monday, 26 October 2026"));
        assert_eq!(p.get("{{START_DATE + 9}}"), Some("Friday, 30 October 2026"));
        assert!(p.get("{{START_DATE + 10}}").is_none());
        assert!(p.get("{{START_DATE + 0}}").is_none());

        let list = p.get("{{WORKING_DAYS_LIST}}").unwrap();
        assert_eq!(list.lines().count(), 10);
        assert!(list.starts_with("Monday, 19 October 2026\nTuesday, 20 October 2026"));
        // 3 fixed tokens + 9 offsets
        assert_eq!(p.len(), 12);
    }
}

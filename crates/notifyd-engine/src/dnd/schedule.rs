//! Weekly DND windows.
//!
//! A window belongs to the day it starts on. When `start > end` it runs past
//! midnight into the next day, so `22:00-07:00` on Friday covers Friday
//! night and Saturday morning. A window with no days applies every day.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Weekday};

use notifyd_core::config::DndWindowConfig;
use notifyd_core::error::AppError;

/// One parsed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DndWindow {
    start: NaiveTime,
    end: NaiveTime,
    days: Vec<Weekday>,
}

impl DndWindow {
    /// Parse a configured window.
    pub fn from_config(config: &DndWindowConfig) -> Result<Self, AppError> {
        let (start, end) = config.parse_times()?;
        Ok(Self {
            start,
            end,
            days: config.days.iter().map(|&d| d.into()).collect(),
        })
    }

    fn applies_on(&self, day: Weekday) -> bool {
        self.days.is_empty() || self.days.contains(&day)
    }

    fn crosses_midnight(&self) -> bool {
        self.start > self.end
    }

    /// If `at` falls inside this window, when the window ends.
    pub fn end_if_active(&self, at: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = at.date();
        let time = at.time();

        if self.crosses_midnight() {
            // Started today, runs into tomorrow.
            if time >= self.start && self.applies_on(date.weekday()) {
                return date
                    .checked_add_days(Days::new(1))
                    .map(|next| next.and_time(self.end));
            }
            // Started yesterday, still running.
            if time < self.end {
                let yesterday = date.checked_sub_days(Days::new(1))?;
                if self.applies_on(yesterday.weekday()) {
                    return Some(date.and_time(self.end));
                }
            }
            None
        } else if time >= self.start && time < self.end && self.applies_on(date.weekday()) {
            Some(date.and_time(self.end))
        } else {
            None
        }
    }
}

/// The configured set of windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DndSchedule {
    windows: Vec<DndWindow>,
}

impl DndSchedule {
    /// Parse every configured window.
    pub fn from_config(windows: &[DndWindowConfig]) -> Result<Self, AppError> {
        Ok(Self {
            windows: windows
                .iter()
                .map(DndWindow::from_config)
                .collect::<Result<_, _>>()?,
        })
    }

    /// End of the latest-ending window covering `at`, if any.
    pub fn active_until(&self, at: NaiveDateTime) -> Option<NaiveDateTime> {
        self.windows.iter().filter_map(|w| w.end_if_active(at)).max()
    }

    /// Whether any window covers `at`.
    pub fn is_active_at(&self, at: NaiveDateTime) -> bool {
        self.active_until(at).is_some()
    }

    /// Whether no windows are configured.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use notifyd_core::config::Weekday as ConfigWeekday;

    fn window(start: &str, end: &str, days: Vec<ConfigWeekday>) -> DndWindow {
        DndWindow::from_config(&DndWindowConfig {
            start: start.to_string(),
            end: end.to_string(),
            days,
        })
        .unwrap()
    }

    // 2024-06-07 is a Friday.
    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_same_day_window() {
        let w = window("09:00", "17:00", Vec::new());
        assert_eq!(w.end_if_active(at(7, 9, 0)), Some(at(7, 17, 0)));
        assert_eq!(w.end_if_active(at(7, 16, 59)), Some(at(7, 17, 0)));
        assert_eq!(w.end_if_active(at(7, 17, 0)), None);
        assert_eq!(w.end_if_active(at(7, 8, 59)), None);
    }

    #[test]
    fn test_window_across_midnight() {
        assert_eq!(at(7, 0, 0).weekday(), Weekday::Fri);
        let w = window("22:00", "07:00", vec![ConfigWeekday::Friday]);

        assert_eq!(w.end_if_active(at(7, 21, 59)), None);
        assert_eq!(w.end_if_active(at(7, 22, 0)), Some(at(8, 7, 0)));
        // Saturday morning belongs to Friday's window.
        assert_eq!(w.end_if_active(at(8, 6, 30)), Some(at(8, 7, 0)));
        assert_eq!(w.end_if_active(at(8, 7, 0)), None);
        // Saturday night is not scheduled.
        assert_eq!(w.end_if_active(at(8, 23, 0)), None);
        // Friday morning would belong to Thursday's window.
        assert_eq!(w.end_if_active(at(7, 6, 0)), None);
    }

    #[test]
    fn test_schedule_reports_latest_end() {
        let schedule = DndSchedule {
            windows: vec![
                window("12:00", "13:00", Vec::new()),
                window("12:30", "15:00", Vec::new()),
            ],
        };
        assert_eq!(schedule.active_until(at(7, 12, 45)), Some(at(7, 15, 0)));
        assert!(schedule.is_active_at(at(7, 12, 10)));
        assert!(!schedule.is_active_at(at(7, 15, 0)));
        assert!(!DndSchedule::default().is_active_at(at(7, 12, 0)));
    }
}

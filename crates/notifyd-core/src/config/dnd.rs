//! Do-Not-Disturb settings.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Day of week used by schedule windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

/// One scheduled Do-Not-Disturb window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DndWindowConfig {
    /// Start time, `HH:MM` local time.
    pub start: String,
    /// End time, `HH:MM` local time. Earlier than `start` means the window
    /// crosses midnight.
    pub end: String,
    /// Days on which the window starts. Empty means every day.
    #[serde(default)]
    pub days: Vec<Weekday>,
}

impl DndWindowConfig {
    /// Parse and check the start/end times.
    pub fn parse_times(&self) -> Result<(NaiveTime, NaiveTime), AppError> {
        let start = parse_hhmm(&self.start)?;
        let end = parse_hhmm(&self.end)?;
        if start == end {
            return Err(AppError::configuration(format!(
                "DND window {}-{} is empty",
                self.start, self.end
            )));
        }
        Ok((start, end))
    }
}

/// Do-Not-Disturb settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DndConfig {
    /// Manual DND state at startup.
    #[serde(default)]
    pub enabled: bool,
    /// Scheduled windows that force DND on.
    #[serde(default)]
    pub schedule: Vec<DndWindowConfig>,
}

fn parse_hhmm(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
        AppError::configuration(format!("Invalid DND time '{value}', expected HH:MM: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> DndWindowConfig {
        DndWindowConfig {
            start: start.to_string(),
            end: end.to_string(),
            days: Vec::new(),
        }
    }

    #[test]
    fn test_parse_times() {
        let (start, end) = window("22:00", "07:30").parse_times().unwrap();
        assert_eq!(start, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert_eq!(end, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn test_rejects_bad_and_empty_windows() {
        assert!(window("25:00", "07:00").parse_times().is_err());
        assert!(window("9am", "10:00").parse_times().is_err());
        assert!(window("08:00", "08:00").parse_times().is_err());
    }
}

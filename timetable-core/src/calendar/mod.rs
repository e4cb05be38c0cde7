// Calendar export of reconstructed weeks
// - week.rs: ISO week arithmetic (week + dayIndex -> date)
// - ics.rs: iCalendar writer
// - css_color.rs: render fill color -> CSS color name

pub mod css_color;
pub mod ics;
pub mod week;

pub use ics::IcsWriter;

use crate::config::CalendarConfig;
use crate::types::WeekSchedule;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Ics,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Ics => "ics",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ics" | "ical" | "icalendar" => Ok(OutputFormat::Ics),
            "json" => Ok(OutputFormat::Json),
            other => Err(anyhow!("Unknown output format '{other}' (expected ics or json)")),
        }
    }
}

pub fn render_with_format(
    weeks: &[WeekSchedule],
    format: OutputFormat,
    config: &CalendarConfig,
    dtstamp: DateTime<Utc>,
) -> Result<String> {
    match format {
        OutputFormat::Ics => IcsWriter::new(config, dtstamp).write(weeks),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(weeks)?),
    }
}

pub fn save_with_format(
    weeks: &[WeekSchedule],
    path: &str,
    format: OutputFormat,
    config: &CalendarConfig,
) -> Result<()> {
    let content = render_with_format(weeks, format, config, Utc::now())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Lesson, LessonTime};

    fn weeks() -> Vec<WeekSchedule> {
        vec![WeekSchedule::new(
            2026,
            43,
            vec![Lesson {
                day_index: 0,
                start: LessonTime::new(8, 0).unwrap(),
                end: LessonTime::new(9, 0).unwrap(),
                description: "Engelska 6".to_string(),
                color: "#FFCC99".to_string(),
            }],
        )]
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("ics".parse::<OutputFormat>().unwrap(), OutputFormat::Ics);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("graph".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedule.json");
        let config = CalendarConfig::default();
        save_with_format(&weeks(), path.to_str().unwrap(), OutputFormat::Json, &config).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Vec<WeekSchedule> = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded, weeks());
    }

    #[test]
    fn test_ics_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cal.ics");
        let config = CalendarConfig::default();
        save_with_format(&weeks(), path.to_str().unwrap(), OutputFormat::Ics, &config).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("SUMMARY;LANGUAGE=sv-SE:Engelska 6"));
    }
}

//! iCalendar (RFC 5545) export of reconstructed weeks.
//!
//! Lesson times are written as floating local times: the render shows wall
//! clock times without a zone, and that is what the calendar should show.
//! Events are assembled as plain `ical` properties because the crate's event
//! builder always attaches a TZID.

use super::css_color::nearest_named_color;
use crate::config::CalendarConfig;
use crate::types::*;
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use ical::generator::{Emitter, IcalCalendarBuilder, IcalEvent, Property};
use ical::{ical_param, ical_property};
use sha2::{Digest, Sha256};

pub struct IcsWriter<'a> {
    config: &'a CalendarConfig,
    dtstamp: DateTime<Utc>,
}

impl<'a> IcsWriter<'a> {
    pub fn new(config: &'a CalendarConfig, dtstamp: DateTime<Utc>) -> Self {
        Self { config, dtstamp }
    }

    /// One VCALENDAR holding a VEVENT per lesson of every week
    pub fn write(&self, weeks: &[WeekSchedule]) -> Result<String> {
        let mut calendar = IcalCalendarBuilder::version("2.0")
            .gregorian()
            .prodid(&self.config.product_id)
            .build();

        for week in weeks {
            for lesson in &week.lessons {
                let date = week.date_of(lesson).ok_or_else(|| {
                    anyhow!(
                        "No date for day {} of {}-W{:02}",
                        lesson.day_index,
                        week.iso_year,
                        week.week
                    )
                })?;
                calendar.events.push(self.event(date, lesson));
            }
        }

        Ok(calendar.generate())
    }

    fn event(&self, date: NaiveDate, lesson: &Lesson) -> IcalEvent {
        let mut event = IcalEvent::new();
        let properties = &mut event.properties;

        properties.push(ical_property!("UID", event_uid(date, lesson)));
        properties.push(ical_property!(
            "DTSTAMP",
            self.dtstamp.format("%Y%m%dT%H%M%SZ").to_string()
        ));
        properties.push(ical_property!("DTSTART", format_local(date, lesson.start)));
        // DTEND must not precede DTSTART; without it the event is a point in time
        if lesson.end >= lesson.start {
            properties.push(ical_property!("DTEND", format_local(date, lesson.end)));
        } else {
            log::warn!(
                "Lesson on {} {}-{} ends before it starts, exporting without DTEND",
                date,
                lesson.start,
                lesson.end
            );
        }

        let summary = escape_text(&lesson.description);
        if self.config.summary_language.is_empty() {
            properties.push(ical_property!("SUMMARY", summary));
        } else {
            properties.push(ical_property!(
                "SUMMARY",
                summary,
                ical_param!("LANGUAGE", self.config.summary_language.as_str())
            ));
        }

        match nearest_named_color(&lesson.color) {
            Some(name) => properties.push(ical_property!("COLOR", name)),
            None => log::warn!("Unusable lesson color '{}', omitting COLOR", lesson.color),
        }

        event
    }
}

/// Stable across exports, so re-importing updates instead of duplicating
pub fn event_uid(date: NaiveDate, lesson: &Lesson) -> String {
    let mut hasher = Sha256::new();
    hasher.update(date.to_string());
    hasher.update(lesson.start.to_string());
    hasher.update(lesson.end.to_string());
    hasher.update(&lesson.description);
    let digest = format!("{:x}", hasher.finalize());
    format!("{}@timetable-render", &digest[..32])
}

fn format_local(date: NaiveDate, time: LessonTime) -> String {
    // LessonTime is range checked on construction
    let time = NaiveTime::from_hms_opt(time.hour, time.minute, 0).unwrap_or_default();
    NaiveDateTime::new(date, time)
        .format("%Y%m%dT%H%M%S")
        .to_string()
}

/// TEXT value escaping. The emitter only quotes parameters, values go out as given.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lesson(day_index: usize, description: &str, color: &str) -> Lesson {
        Lesson {
            day_index,
            start: LessonTime::new(8, 15).unwrap(),
            end: LessonTime::new(9, 30).unwrap(),
            description: description.to_string(),
            color: color.to_string(),
        }
    }

    fn dtstamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn write(config: &CalendarConfig, lessons: Vec<Lesson>) -> String {
        let weeks = vec![WeekSchedule::new(2026, 43, lessons)];
        IcsWriter::new(config, dtstamp()).write(&weeks).unwrap()
    }

    #[test]
    fn test_event_fields() {
        let ics = write(
            &CalendarConfig::default(),
            vec![lesson(2, "Matematik 2c, B214", "#ADD8E6")],
        );

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nCALSCALE:GREGORIAN\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"));
        assert!(ics.contains("PRODID:-//timetable-render//Timetable Export//EN\r\n"));
        assert!(ics.contains("DTSTAMP:20261019T120000Z\r\n"));
        assert!(ics.contains("DTSTART:20261021T081500\r\n"));
        assert!(ics.contains("DTEND:20261021T093000\r\n"));
        assert!(ics.contains("SUMMARY;LANGUAGE=sv-SE:Matematik 2c\\, B214\r\n"));
        assert!(ics.contains("COLOR:lightblue\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }

    #[test]
    fn test_unusable_color_is_omitted() {
        let ics = write(&CalendarConfig::default(), vec![lesson(0, "Idrott", "none")]);
        assert!(!ics.contains("COLOR:"));
    }

    #[test]
    fn test_inverted_lesson_has_no_dtend() {
        let mut inverted = lesson(0, "Kemi", "#FFFFFF");
        std::mem::swap(&mut inverted.start, &mut inverted.end);
        let ics = write(
            &CalendarConfig::default(),
            vec![inverted, lesson(1, "Fysik", "#FFFFFF")],
        );

        assert!(ics.contains("DTSTART:20261019T093000\r\n"));
        assert!(!ics.contains("DTEND:20261019"));
        assert!(ics.contains("DTEND:20261020T093000\r\n"));
    }

    #[test]
    fn test_empty_language_drops_parameter() {
        let config = CalendarConfig {
            summary_language: String::new(),
            ..CalendarConfig::default()
        };
        let ics = write(&config, vec![lesson(0, "Idrott", "#FFFFFF")]);
        assert!(ics.contains("\r\nSUMMARY:Idrott\r\n"));
    }

    #[test]
    fn test_long_summary_is_folded() {
        let description = "Idrott och hälsa 1 ".repeat(8);
        let ics = write(&CalendarConfig::default(), vec![lesson(0, &description, "#FFFFFF")]);

        for line in ics.split("\r\n") {
            assert!(line.chars().count() <= 75, "line too long: {line}");
        }
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(&format!("SUMMARY;LANGUAGE=sv-SE:{description}\r\n")));
    }

    #[test]
    fn test_invalid_week_fails() {
        let config = CalendarConfig::default();
        let weeks = vec![WeekSchedule::new(2026, 60, vec![lesson(0, "Idrott", "#FFFFFF")])];
        assert!(IcsWriter::new(&config, dtstamp()).write(&weeks).is_err());
    }

    #[test]
    fn test_uid_is_stable_and_content_sensitive() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let a = event_uid(date, &lesson(0, "Fysik", "#FFFFFF"));
        assert_eq!(a, event_uid(date, &lesson(0, "Fysik", "#000000")));
        assert_ne!(a, event_uid(date, &lesson(0, "Kemi", "#FFFFFF")));
        assert!(a.ends_with("@timetable-render"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text(r"a\b;c,d"), r"a\\b\;c\,d");
        assert_eq!(escape_text("two\r\nlines"), "two\\nlines");
    }
}

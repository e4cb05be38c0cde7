use crate::error::{ReconstructError, ReconstructResult};
use crate::types::LessonTime;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::sync::LazyLock;

static DEFAULT_TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})$").unwrap());

/// Recognizes time labels (`H:MM` / `HH:MM` by default) and parses them.
#[derive(Debug, Clone)]
pub struct TimePattern {
    regex: Regex,
}

impl TimePattern {
    /// Compile a pattern exposing hour and minute as capture groups 1 and 2
    pub fn new(pattern: &str) -> Result<Self> {
        let regex =
            Regex::new(pattern).with_context(|| format!("Invalid time pattern '{pattern}'"))?;
        if regex.captures_len() < 3 {
            return Err(anyhow!(
                "Time pattern '{pattern}' must capture hour and minute"
            ));
        }
        Ok(Self { regex })
    }

    pub fn is_time(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn parse(&self, text: &str) -> ReconstructResult<LessonTime> {
        let malformed = || ReconstructError::MalformedTime {
            text: text.to_string(),
        };

        let captures = self.regex.captures(text).ok_or_else(malformed)?;
        // Custom patterns may use Unicode `\d`, which u32 parsing rejects
        let hour = captures
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let minute = captures
            .get(2)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(malformed)?;

        LessonTime::new(hour, minute).ok_or_else(malformed)
    }
}

impl Default for TimePattern {
    fn default() -> Self {
        Self {
            regex: DEFAULT_TIME_REGEX.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_time_labels() {
        let pattern = TimePattern::default();
        assert!(pattern.is_time("8:00"));
        assert!(pattern.is_time("14:35"));
        assert!(!pattern.is_time("8:0"));
        assert!(!pattern.is_time("108:00"));
        assert!(!pattern.is_time("8:00 "));
        assert!(!pattern.is_time("Sal 8:00"));
        assert!(!pattern.is_time("Math"));
    }

    #[test]
    fn test_format_then_parse_round_trip() {
        let pattern = TimePattern::default();
        for hour in 0..24 {
            for minute in 0..60 {
                let time = LessonTime::new(hour, minute).unwrap();
                assert_eq!(pattern.parse(&time.to_string()).unwrap(), time);
            }
        }
    }

    #[test]
    fn test_leading_zero_hour() {
        let pattern = TimePattern::default();
        assert_eq!(pattern.parse("08:15").unwrap(), LessonTime::new(8, 15).unwrap());
    }

    #[test]
    fn test_out_of_range_is_malformed() {
        let pattern = TimePattern::default();
        assert!(pattern.is_time("25:00"));
        assert!(matches!(
            pattern.parse("25:00"),
            Err(ReconstructError::MalformedTime { .. })
        ));
        assert!(pattern.parse("9:75").is_err());
    }

    #[test]
    fn test_only_ascii_digits_are_times() {
        let pattern = TimePattern::default();
        // Arabic-Indic digits are ordinary text
        assert!(!pattern.is_time("٨:٠٠"));
        assert!(!pattern.is_time("١:٣٠"));
        assert!(!pattern.is_time("8:٠٠"));
    }

    #[test]
    fn test_unicode_digit_pattern_is_malformed_on_parse() {
        let pattern = TimePattern::new(r"^(\d{1,2}):(\d{2})$").unwrap();
        assert!(pattern.is_time("٨:٠٠"));
        assert!(matches!(
            pattern.parse("٨:٠٠"),
            Err(ReconstructError::MalformedTime { .. })
        ));
    }

    #[test]
    fn test_pattern_must_have_groups() {
        assert!(TimePattern::new(r"^\d{1,2}:\d{2}$").is_err());
        assert!(TimePattern::new(r"^(\d{1,2})\.(\d{2})$").is_ok());
    }
}

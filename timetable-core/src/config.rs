use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::str::FromStr;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_time_pattern() -> String {
    r"^([0-9]{1,2}):([0-9]{2})$".to_string()
}

/// Locale of the rendered timetable. Decides the weekday header labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    Swedish,
    English,
}

impl Locale {
    pub fn weekday_labels(&self) -> [String; 5] {
        let labels = match self {
            Locale::Swedish => ["Måndag", "Tisdag", "Onsdag", "Torsdag", "Fredag"],
            Locale::English => ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
        };
        labels.map(String::from)
    }

    pub fn language_tag(&self) -> &'static str {
        match self {
            Locale::Swedish => "sv-SE",
            Locale::English => "en-GB",
        }
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "swedish" | "sv" | "sv-se" => Ok(Locale::Swedish),
            "english" | "en" | "en-gb" => Ok(Locale::English),
            other => Err(anyhow!("Unknown locale '{other}' (expected swedish or english)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub locale: Locale,
    /// Weekday header labels in display order, Monday first.
    /// Omitted in YAML: taken from `locale`.
    #[serde(default)]
    pub weekday_labels: [String; 5],
    /// Regex recognizing time labels. Group 1 = hour, group 2 = minute.
    #[serde(default = "default_time_pattern")]
    pub time_pattern: String,
    #[serde(default)]
    pub lesson_selection: LessonSelectionConfig,
    #[serde(default)]
    pub time_scoring: TimeScoringConfig,
    /// Reject lessons whose start label is later than their end label
    #[serde(default)]
    pub strict_time_order: bool,
    /// Process day columns on the rayon thread pool
    #[serde(default = "default_true")]
    pub parallel: bool,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub render_request: RenderRequestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSelectionConfig {
    /// Outline color marking a real lesson box
    pub border_color: String,
    /// Fill color of the grid background box, never a lesson
    pub background_fill_color: String,
    /// Share of a box's width that must lie inside the day column (inclusive)
    pub min_column_overlap: f64,
}

impl Default for LessonSelectionConfig {
    fn default() -> Self {
        Self {
            border_color: "#000000".to_string(),
            background_fill_color: "#CCCCCC".to_string(),
            min_column_overlap: 0.9,
        }
    }
}

/// Score = |dx| + vertical_weight * |dy|^vertical_exponent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeScoringConfig {
    pub vertical_weight: i64,
    pub vertical_exponent: u32,
}

impl Default for TimeScoringConfig {
    fn default() -> Self {
        Self {
            vertical_weight: 5,
            vertical_exponent: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// LANGUAGE parameter on event summaries
    pub summary_language: String,
    pub product_id: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            summary_language: Locale::Swedish.language_tag().to_string(),
            product_id: "-//timetable-render//Timetable Export//EN".to_string(),
        }
    }
}

/// Parameters of the vendor render request. The signature is not stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequestConfig {
    pub url: String,
    pub domain: String,
    pub school_guid: String,
    pub div_width: u32,
    pub div_height: u32,
}

impl Default for RenderRequestConfig {
    fn default() -> Self {
        Self {
            url: "https://web.skola24.se/timetable/timetable-viewer/data/render".to_string(),
            domain: "harryda.skola24.se".to_string(),
            school_guid: "219254f7-917c-472e-ac23-6982156c6164".to_string(),
            div_width: 1500,
            div_height: 550,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    configs: HashMap<Locale, ScheduleConfig>,
    default_config: ScheduleConfig,
}

impl ConfigManager {
    pub fn new() -> Self {
        let mut configs = HashMap::new();
        for locale in [Locale::Swedish, Locale::English] {
            configs.insert(locale, ScheduleConfig::for_locale(locale));
        }

        Self {
            configs,
            default_config: ScheduleConfig::default(),
        }
    }

    pub fn get_config(&self, locale: &Locale) -> &ScheduleConfig {
        self.configs.get(locale).unwrap_or(&self.default_config)
    }

    /// Load a config file over the preset of its locale
    pub fn load_config_from_file(&mut self, path: &str) -> Result<Locale> {
        let config = ScheduleConfig::load_from_file(path)?;
        let locale = config.locale;
        self.configs.insert(locale, config);
        Ok(locale)
    }

    /// Locales with a config, in a stable order
    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = self.configs.keys().copied().collect();
        locales.sort_by_key(|locale| locale.language_tag());
        locales
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleConfig {
    /// Built-in preset for a locale
    pub fn for_locale(locale: Locale) -> Self {
        Self {
            locale,
            weekday_labels: locale.weekday_labels(),
            time_pattern: default_time_pattern(),
            lesson_selection: LessonSelectionConfig::default(),
            time_scoring: TimeScoringConfig::default(),
            strict_time_order: false,
            parallel: true,
            calendar: CalendarConfig {
                summary_language: locale.language_tag().to_string(),
                ..CalendarConfig::default()
            },
            render_request: RenderRequestConfig::default(),
        }
    }

    /// Load config from file path and validate it
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path}"))?;
        Self::from_yaml_str(&content).with_context(|| format!("Invalid config file {path}"))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: ScheduleConfig =
            serde_yaml::from_str(yaml).context("Failed to parse config YAML")?;
        if config.weekday_labels.iter().all(|label| label.is_empty()) {
            config.weekday_labels = config.locale.weekday_labels();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let pattern = Regex::new(&self.time_pattern)
            .with_context(|| format!("Invalid time_pattern '{}'", self.time_pattern))?;
        // Group 0 is the whole match
        if pattern.captures_len() < 3 {
            return Err(anyhow!(
                "time_pattern '{}' must capture hour and minute as groups 1 and 2",
                self.time_pattern
            ));
        }

        if let Some(empty) = self.weekday_labels.iter().position(|l| l.is_empty()) {
            return Err(anyhow!("weekday_labels[{empty}] is empty"));
        }

        let overlap = self.lesson_selection.min_column_overlap;
        if !(overlap > 0.0 && overlap <= 1.0) {
            return Err(anyhow!(
                "lesson_selection.min_column_overlap must be in (0, 1], got {overlap}"
            ));
        }

        if self.time_scoring.vertical_weight < 0 {
            return Err(anyhow!("time_scoring.vertical_weight must not be negative"));
        }

        Ok(())
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_swedish_with_fixed_thresholds() {
        let config = ScheduleConfig::default();
        assert_eq!(config.locale, Locale::Swedish);
        assert_eq!(config.weekday_labels[0], "Måndag");
        assert_eq!(config.weekday_labels[4], "Fredag");
        assert_eq!(config.lesson_selection.min_column_overlap, 0.9);
        assert_eq!(config.time_scoring.vertical_weight, 5);
        assert_eq!(config.time_scoring.vertical_exponent, 3);
        assert!(!config.strict_time_order);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_manager_presets() {
        let manager = ConfigManager::new();
        let english = manager.get_config(&Locale::English);
        assert_eq!(english.weekday_labels[0], "Monday");
        assert_eq!(english.calendar.summary_language, "en-GB");
    }

    #[test]
    fn test_load_minimal_yaml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "locale: English\nweekday_labels: [Mon, Tue, Wed, Thu, Fri]\nstrict_time_order: true"
        )
        .unwrap();

        let config = ScheduleConfig::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.weekday_labels[2], "Wed");
        assert!(config.strict_time_order);
        assert_eq!(config.lesson_selection.border_color, "#000000");
        assert_eq!(config.time_pattern, default_time_pattern());
    }

    #[test]
    fn test_wrong_label_count_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "weekday_labels: [Mon, Tue, Wed]").unwrap();
        assert!(ScheduleConfig::load_from_file(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_pattern_without_groups_is_rejected() {
        let config = ScheduleConfig {
            time_pattern: r"^\d{1,2}:\d{2}$".to_string(),
            ..ScheduleConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_labels_follow_locale_when_omitted() {
        let config = ScheduleConfig::from_yaml_str("locale: English\nstrict_time_order: true").unwrap();
        assert_eq!(config.weekday_labels, Locale::English.weekday_labels());
        assert!(config.strict_time_order);

        let config = ScheduleConfig::from_yaml_str("strict_time_order: false").unwrap();
        assert_eq!(config.weekday_labels, Locale::Swedish.weekday_labels());
    }

    #[test]
    fn test_partially_empty_labels_are_rejected() {
        let yaml = "weekday_labels: [Mon, '', Wed, Thu, Fri]";
        assert!(ScheduleConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ScheduleConfig::load_from_file("/nonexistent/schedule.yaml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/schedule.yaml"));
    }

    #[test]
    fn test_manager_loads_file_over_its_locale() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "locale: English\nparallel: false").unwrap();

        let mut manager = ConfigManager::new();
        let locale = manager
            .load_config_from_file(file.path().to_str().unwrap())
            .unwrap();
        assert_eq!(locale, Locale::English);
        assert!(!manager.get_config(&Locale::English).parallel);
        assert!(manager.get_config(&Locale::Swedish).parallel);
        assert_eq!(manager.locales(), vec![Locale::English, Locale::Swedish]);
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("English".parse::<Locale>().unwrap(), Locale::English);
        assert_eq!("sv".parse::<Locale>().unwrap(), Locale::Swedish);
        assert!("klingon".parse::<Locale>().is_err());
    }
}

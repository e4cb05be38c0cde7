use super::time_pattern::TimePattern;
use crate::types::*;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Builds a lesson description from the text drawn inside its box.
pub struct TextAssembler<'a> {
    pattern: &'a TimePattern,
}

impl<'a> TextAssembler<'a> {
    pub fn new(pattern: &'a TimePattern) -> Self {
        Self { pattern }
    }

    /// Non-time fragments anchored inside the box, joined with single spaces.
    ///
    /// Fragments keep their input order; multi-line layouts are not
    /// re-ordered by position. An empty string is a valid result.
    pub fn assemble(&self, texts: &[TextFragment], lesson_box: &RenderBox) -> String {
        let joined = texts
            .iter()
            .filter(|text| lesson_box.contains(text.anchor()))
            .filter(|text| !self.pattern.is_time(&text.content))
            .map(|text| text.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        WHITESPACE_RUN.replace_all(&joined, " ").into_owned()
    }
}

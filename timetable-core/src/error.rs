use crate::types::{LessonTime, TimeRole};
use thiserror::Error;

/// Which primitive list a malformed record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Text,
    Box,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Text => write!(f, "textList"),
            RecordKind::Box => write!(f, "boxList"),
        }
    }
}

/// Reconstruction failures. Every variant is fatal for the render it came from:
/// partial schedules are never returned.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// A primitive record is missing a required field or has the wrong type
    #[error("Malformed record {kind}[{index}]: {reason}")]
    MalformedRecord {
        kind: RecordKind,
        index: usize,
        reason: String,
    },

    /// A weekday label matched zero or several text fragments
    #[error("Weekday label '{label}' matched {matches} text fragments (expected exactly 1)")]
    AmbiguousLabel { label: String, matches: usize },

    /// A weekday label's anchor lies in zero or several boxes
    #[error("Weekday label '{label}' is enclosed by {matches} boxes (expected exactly 1)")]
    AmbiguousColumn { label: String, matches: usize },

    /// No text fragment in the render looks like a time label
    #[error("No time label candidate found for lesson {role}")]
    NoTimeCandidate { role: TimeRole },

    /// The winning time label could not be turned into an hour and minute
    #[error("Malformed time label '{text}'")]
    MalformedTime { text: String },

    /// Strict mode: a lesson ends before it starts
    #[error("Lesson on day {day_index} starts at {start} but ends at {end}")]
    InvertedTimes {
        day_index: usize,
        start: LessonTime,
        end: LessonTime,
    },

    /// One lesson box qualified for more than one day column
    #[error("Lesson box #{box_index} qualifies for several day columns: {days:?}")]
    ContestedBox { box_index: usize, days: Vec<usize> },
}

pub type ReconstructResult<T> = std::result::Result<T, ReconstructError>;

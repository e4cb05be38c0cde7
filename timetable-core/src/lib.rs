// Timetable render reconstruction library
//
// Turns the flat graphical primitives of a vendor timetable render
// (positioned text + colored boxes) back into weekly lessons, and exports
// them as calendars.

pub mod calendar;
pub mod config;
pub mod error;
pub mod layout;
pub mod primitives;
pub mod processor;
pub mod source;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use calendar::OutputFormat;
pub use config::{ConfigManager, Locale, ScheduleConfig};
pub use error::{ReconstructError, ReconstructResult, RecordKind};
pub use processor::{ReconstructionStages, ScheduleProcessor, StepProfiler};
pub use source::{FileRenderSource, RenderData, RenderSource};

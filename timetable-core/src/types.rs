use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ===== RENDER PRIMITIVES =====
// Parsed 1:1 from the vendor's textList / boxList records.
// All coordinates share one pixel space with y growing downwards.

/// A positioned text label from the render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// Anchor of the rendered text (top-left in practice)
    pub x: i32,
    pub y: i32,
    pub font_size: f64,
    pub color: String,
    pub content: String,
    /// Vendor-assigned id, kept for debugging only
    pub id: i64,
}

impl TextFragment {
    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// An axis-aligned rectangle from the render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Outline color (`fcolor` in the vendor format)
    pub border_color: String,
    /// Fill color (`bcolor` in the vendor format)
    pub fill_color: String,
    pub id: i64,
    pub kind: String,
}

impl RenderBox {
    /// Half-open containment: `x <= px < x + width`, `y <= py < y + height`.
    pub fn contains(&self, point: Point) -> bool {
        let right = self.x as i64 + self.width as i64;
        let bottom = self.y as i64 + self.height as i64;
        let (px, py) = (point.x as i64, point.y as i64);
        px >= self.x as i64 && px < right && py >= self.y as i64 && py < bottom
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(
            self.x.saturating_add(self.width),
            self.y.saturating_add(self.height),
        )
    }

    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Both primitive lists of one render, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Primitives {
    pub texts: Vec<TextFragment>,
    pub boxes: Vec<RenderBox>,
}

// ===== DERIVED LAYOUT =====

/// The rectangle beneath one weekday header. Geometric boundary only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayColumn {
    /// 0 = first configured weekday (Monday)
    pub day_index: usize,
    pub label: String,
    pub column_box: RenderBox,
}

/// Which edge of a lesson box a time label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeRole {
    Start,
    End,
}

impl TimeRole {
    /// Reference corner of the box the label is scored against
    pub fn reference_point(&self, lesson_box: &RenderBox) -> Point {
        match self {
            TimeRole::Start => lesson_box.top_left(),
            TimeRole::End => lesson_box.bottom_right(),
        }
    }
}

impl fmt::Display for TimeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeRole::Start => write!(f, "start"),
            TimeRole::End => write!(f, "end"),
        }
    }
}

// ===== LESSONS =====

/// Wall-clock time of day as printed on the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LessonTime {
    pub hour: u32,
    pub minute: u32,
}

impl LessonTime {
    /// Returns `None` unless hour is 0-23 and minute is 0-59
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }
}

impl fmt::Display for LessonTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub day_index: usize,
    pub start: LessonTime,
    pub end: LessonTime,
    pub description: String,
    /// Fill color of the lesson box, as rendered (e.g. "#FFCC99")
    pub color: String,
}

/// Lessons of one ISO week, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub iso_year: i32,
    pub week: u32,
    pub lessons: Vec<Lesson>,
}

impl WeekSchedule {
    pub fn new(iso_year: i32, week: u32, lessons: Vec<Lesson>) -> Self {
        Self {
            iso_year,
            week,
            lessons,
        }
    }

    /// Calendar date of a lesson's day (dayIndex 0 = Monday of the ISO week)
    pub fn date_of(&self, lesson: &Lesson) -> Option<NaiveDate> {
        crate::calendar::week::date_for(self.iso_year, self.week, lesson.day_index)
    }
}

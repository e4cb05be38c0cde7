use crate::config::LessonSelectionConfig;
use crate::types::*;

/// Picks the boxes of one day column that are real lessons.
pub struct LessonBoxSelector<'a> {
    config: &'a LessonSelectionConfig,
}

impl<'a> LessonBoxSelector<'a> {
    pub fn new(config: &'a LessonSelectionConfig) -> Self {
        Self { config }
    }

    /// Indices into `boxes` of the lesson boxes under `column`, in input order
    pub fn select(&self, boxes: &[RenderBox], column: &DayColumn) -> Vec<usize> {
        let selected: Vec<usize> = boxes
            .iter()
            .enumerate()
            .filter(|(_, candidate)| self.is_lesson_box(candidate, column))
            .map(|(index, _)| index)
            .collect();

        log::debug!(
            "Day {} '{}': {} lesson boxes",
            column.day_index,
            column.label,
            selected.len()
        );
        selected
    }

    pub fn is_lesson_box(&self, candidate: &RenderBox, column: &DayColumn) -> bool {
        // Solid black outline
        if candidate.border_color != self.config.border_color {
            return false;
        }

        // Shared grid background
        if candidate.fill_color == self.config.background_fill_color {
            return false;
        }

        // Strictly below the header row
        if (candidate.y as i64) < column.column_box.bottom() {
            return false;
        }

        self.lies_within_column(candidate, &column.column_box)
    }

    /// At least `min_column_overlap` of the candidate's width inside the column (inclusive).
    /// Boxes without positive width have no ratio and never qualify.
    pub fn lies_within_column(&self, candidate: &RenderBox, column_box: &RenderBox) -> bool {
        if candidate.width <= 0 {
            return false;
        }
        let overlap = horizontal_overlap(candidate, column_box);
        overlap as f64 >= self.config.min_column_overlap * candidate.width as f64
    }
}

/// Width of the shared x-range of two boxes, zero if disjoint
pub fn horizontal_overlap(a: &RenderBox, b: &RenderBox) -> i64 {
    let left = (a.x as i64).max(b.x as i64);
    let right = a.right().min(b.right());
    (right - left).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_box(x: i32, y: i32, width: i32, height: i32, border: &str, fill: &str) -> RenderBox {
        RenderBox {
            x,
            y,
            width,
            height,
            border_color: border.to_string(),
            fill_color: fill.to_string(),
            id: 0,
            kind: "Lesson".to_string(),
        }
    }

    fn lesson(x: i32, y: i32, width: i32) -> RenderBox {
        render_box(x, y, width, 40, "#000000", "#FFCC99")
    }

    fn column() -> DayColumn {
        DayColumn {
            day_index: 0,
            label: "Monday".to_string(),
            column_box: render_box(100, 0, 200, 30, "#000000", "#FFFFFF"),
        }
    }

    #[test]
    fn test_color_filters() {
        let config = LessonSelectionConfig::default();
        let selector = LessonBoxSelector::new(&config);
        let col = column();

        assert!(selector.is_lesson_box(&lesson(100, 50, 200), &col));
        assert!(!selector.is_lesson_box(
            &render_box(100, 50, 200, 40, "#FFFFFF", "#FFCC99"),
            &col
        ));
        assert!(!selector.is_lesson_box(
            &render_box(100, 50, 200, 40, "#000000", "#CCCCCC"),
            &col
        ));
    }

    #[test]
    fn test_header_row_is_excluded() {
        let config = LessonSelectionConfig::default();
        let selector = LessonBoxSelector::new(&config);
        let col = column();

        // The header box itself, and a box overlapping the header row
        assert!(!selector.is_lesson_box(&lesson(100, 0, 200), &col));
        assert!(!selector.is_lesson_box(&lesson(100, 29, 200), &col));
        // Touching the header bottom edge counts as below
        assert!(selector.is_lesson_box(&lesson(100, 30, 200), &col));
    }

    #[test]
    fn test_overlap_threshold_is_inclusive() {
        let config = LessonSelectionConfig::default();
        let selector = LessonBoxSelector::new(&config);
        let col = column();

        // 90 of 100 pixels inside the column: exactly 0.9
        assert!(selector.is_lesson_box(&lesson(90, 50, 100), &col));
        // 89 of 100 pixels inside: 0.89
        assert!(!selector.is_lesson_box(&lesson(89, 50, 100), &col));
        // 899999 of 1000000: 0.899999
        assert!(!selector.is_lesson_box(&lesson(-99_901, 50, 1_000_000), &col_wide()));
        // Right edge straddling the next column
        assert!(selector.is_lesson_box(&lesson(210, 50, 100), &col));
        assert!(!selector.is_lesson_box(&lesson(211, 50, 100), &col));
    }

    fn col_wide() -> DayColumn {
        DayColumn {
            day_index: 0,
            label: "Monday".to_string(),
            column_box: render_box(100, 0, 2_000_000, 30, "#000000", "#FFFFFF"),
        }
    }

    #[test]
    fn test_zero_width_box_is_excluded() {
        let config = LessonSelectionConfig::default();
        let selector = LessonBoxSelector::new(&config);
        assert!(!selector.is_lesson_box(&lesson(150, 50, 0), &column()));
        assert!(!selector.is_lesson_box(&lesson(500, 50, 0), &column()));
    }

    #[test]
    fn test_select_returns_indices_in_input_order() {
        let config = LessonSelectionConfig::default();
        let selector = LessonBoxSelector::new(&config);
        let boxes = vec![
            lesson(100, 200, 200),
            render_box(0, 30, 1000, 500, "#000000", "#CCCCCC"),
            lesson(400, 50, 200),
            lesson(100, 50, 200),
        ];
        assert_eq!(selector.select(&boxes, &column()), vec![0, 3]);
    }

    #[test]
    fn test_horizontal_overlap() {
        let a = lesson(0, 0, 100);
        assert_eq!(horizontal_overlap(&a, &lesson(50, 0, 100)), 50);
        assert_eq!(horizontal_overlap(&a, &lesson(200, 0, 100)), 0);
        assert_eq!(horizontal_overlap(&a, &lesson(10, 0, 20)), 20);
    }
}

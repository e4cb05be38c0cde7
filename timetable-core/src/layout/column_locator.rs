use crate::error::{ReconstructError, ReconstructResult};
use crate::types::*;

/// Finds the weekday header labels and the box around each of them.
///
/// The render contract is strict here: every label must occur exactly once
/// and its anchor must sit in exactly one box. Anything else means the
/// render uses a layout this crate does not understand.
pub struct ColumnLocator<'a> {
    weekday_labels: &'a [String],
}

impl<'a> ColumnLocator<'a> {
    pub fn new(weekday_labels: &'a [String]) -> Self {
        Self { weekday_labels }
    }

    /// One column per configured label, in configured order
    pub fn locate(&self, primitives: &Primitives) -> ReconstructResult<Vec<DayColumn>> {
        self.weekday_labels
            .iter()
            .enumerate()
            .map(|(day_index, label)| self.locate_column(day_index, label, primitives))
            .collect()
    }

    fn locate_column(
        &self,
        day_index: usize,
        label: &str,
        primitives: &Primitives,
    ) -> ReconstructResult<DayColumn> {
        // Headers carry a date suffix ("Måndag 14/10"), hence the prefix match
        let header = exactly_one(
            primitives
                .texts
                .iter()
                .filter(|text| text.content.starts_with(label)),
        )
        .map_err(|matches| ReconstructError::AmbiguousLabel {
            label: label.to_string(),
            matches,
        })?;

        let anchor = header.anchor();
        let column_box = exactly_one(primitives.boxes.iter().filter(|b| b.contains(anchor)))
            .map_err(|matches| ReconstructError::AmbiguousColumn {
                label: label.to_string(),
                matches,
            })?;

        log::debug!(
            "Day {} '{}' -> column x={} width={} (header bottom y={})",
            day_index,
            label,
            column_box.x,
            column_box.width,
            column_box.bottom()
        );

        Ok(DayColumn {
            day_index,
            label: label.to_string(),
            column_box: column_box.clone(),
        })
    }
}

/// The single item of `iter`, or the number of items found
fn exactly_one<T>(mut iter: impl Iterator<Item = T>) -> Result<T, usize> {
    match (iter.next(), iter.next()) {
        (Some(only), None) => Ok(only),
        (None, _) => Err(0),
        (Some(_), Some(_)) => Err(2 + iter.count()),
    }
}

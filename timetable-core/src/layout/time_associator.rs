use super::time_pattern::TimePattern;
use crate::config::TimeScoringConfig;
use crate::error::{ReconstructError, ReconstructResult};
use crate::types::*;

/// Matches a lesson box corner to the nearest time label.
///
/// Time labels are drawn next to, not inside, the box edges and nothing in
/// the render ties them together. Every time-shaped fragment is scored
/// against the reference corner:
///
/// ```text
/// score = |dx| + vertical_weight * |dy| ^ vertical_exponent
/// ```
///
/// `dx` is measured from the fragment anchor, `dy` from the fragment's
/// vertical center (`y + trunc(font_size / 2)`). Labels are row-aligned with
/// the edge they annotate, so vertical distance dominates. Lowest score wins;
/// on a tie the earlier fragment wins.
pub struct TimeAssociator<'a> {
    pattern: &'a TimePattern,
    scoring: &'a TimeScoringConfig,
}

impl<'a> TimeAssociator<'a> {
    pub fn new(pattern: &'a TimePattern, scoring: &'a TimeScoringConfig) -> Self {
        Self { pattern, scoring }
    }

    pub fn find_time(
        &self,
        texts: &[TextFragment],
        lesson_box: &RenderBox,
        role: TimeRole,
    ) -> ReconstructResult<LessonTime> {
        let winner = self
            .best_candidate(texts, role.reference_point(lesson_box))
            .ok_or(ReconstructError::NoTimeCandidate { role })?;
        self.pattern.parse(&winner.content)
    }

    pub fn best_candidate<'t>(
        &self,
        texts: &'t [TextFragment],
        reference: Point,
    ) -> Option<&'t TextFragment> {
        // min_by_key keeps the first of several equal minima
        texts
            .iter()
            .filter(|text| self.pattern.is_time(&text.content))
            .min_by_key(|text| self.score(text, reference))
    }

    pub fn score(&self, text: &TextFragment, reference: Point) -> i64 {
        let dx = (text.x as i64 - reference.x as i64).abs();
        let center_y = text.y as i64 + (0.5 * text.font_size) as i64;
        let dy = (center_y - reference.y as i64).abs();

        let vertical = dy
            .saturating_pow(self.scoring.vertical_exponent)
            .saturating_mul(self.scoring.vertical_weight);
        dx.saturating_add(vertical)
    }
}

use crate::config::ScheduleConfig;
use crate::error::{ReconstructError, ReconstructResult};
use crate::layout::{ColumnLocator, LessonBoxSelector, TextAssembler, TimeAssociator, TimePattern};
use crate::primitives::parse_primitives;
use crate::source::{RenderData, RenderSource};
use crate::types::*;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and diagnostics: lets you inspect/compare each boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct ReconstructionStages {
    pub primitives: Primitives,
    pub columns: Vec<DayColumn>,
    pub lessons: Vec<Lesson>,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        log::info!("⏱️  {}: {}µs", step_name, elapsed.as_micros());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn print_summary(&self) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        log::info!("📊 Performance Summary:");
        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();

        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            log::info!(
                "   {:.<35} {}µs ({:.1}%)",
                step,
                duration.as_micros(),
                percentage
            );
        }
        log::info!("   {:.<35} {}µs", "Total", total.as_micros());
    }
}

/// Render data + config -> lessons.
///
/// Pure: no I/O happens inside [`ScheduleProcessor::reconstruct`] and the
/// same input always yields the same lesson list.
pub struct ScheduleProcessor {
    config: ScheduleConfig,
    time_pattern: TimePattern,
}

impl ScheduleProcessor {
    /// Validates the config and compiles the time pattern
    pub fn new(config: ScheduleConfig) -> Result<Self> {
        config.validate()?;
        let time_pattern = TimePattern::new(&config.time_pattern)?;
        Ok(Self {
            config,
            time_pattern,
        })
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn reconstruct(&self, data: &RenderData) -> ReconstructResult<Vec<Lesson>> {
        self.reconstruct_with_profiling(data, false)
    }

    pub fn reconstruct_with_profiling(
        &self,
        data: &RenderData,
        enable_profiling: bool,
    ) -> ReconstructResult<Vec<Lesson>> {
        let mut profiler = StepProfiler::new(enable_profiling);
        let primitives = profiler.time_step("Primitive Parsing", || parse_primitives(data))?;
        let (_, lessons) = self.run_pipeline(&primitives, &mut profiler)?;
        profiler.print_summary();
        Ok(lessons)
    }

    /// Reconstruct from already parsed primitives
    pub fn reconstruct_primitives(&self, primitives: &Primitives) -> ReconstructResult<Vec<Lesson>> {
        let (_, lessons) = self.run_pipeline(primitives, &mut StepProfiler::new(false))?;
        Ok(lessons)
    }

    /// Run the pipeline and keep every intermediate result
    pub fn capture_stages(&self, data: &RenderData) -> ReconstructResult<ReconstructionStages> {
        let primitives = parse_primitives(data)?;
        let (columns, lessons) = self.run_pipeline(&primitives, &mut StepProfiler::new(false))?;
        Ok(ReconstructionStages {
            primitives,
            columns,
            lessons,
        })
    }

    /// Fetch one week from `source` and reconstruct it
    pub fn process_week(
        &self,
        source: &dyn RenderSource,
        iso_year: i32,
        week: u32,
        enable_profiling: bool,
    ) -> Result<WeekSchedule> {
        log::info!("📄 Week {iso_year}-W{week:02} from {} source", source.name());
        let data = source
            .fetch_week(iso_year, week)
            .with_context(|| format!("Failed to fetch render for {iso_year}-W{week:02}"))?;
        let lessons = self
            .reconstruct_with_profiling(&data, enable_profiling)
            .with_context(|| format!("Failed to reconstruct {iso_year}-W{week:02}"))?;
        log::info!("✅ Week {iso_year}-W{week:02}: {} lessons", lessons.len());
        Ok(WeekSchedule::new(iso_year, week, lessons))
    }

    fn run_pipeline(
        &self,
        primitives: &Primitives,
        profiler: &mut StepProfiler,
    ) -> ReconstructResult<(Vec<DayColumn>, Vec<Lesson>)> {
        let columns = profiler.time_step("Column Location", || {
            ColumnLocator::new(&self.config.weekday_labels).locate(primitives)
        })?;

        let selections = profiler.time_step("Lesson Box Selection", || {
            self.select_lesson_boxes(&primitives.boxes, &columns)
        });
        ensure_partition(&selections)?;

        let lessons = profiler.time_step("Lesson Assembly", || {
            self.build_lessons(primitives, &columns, &selections)
        })?;

        log::info!(
            "🧩 Reconstructed {} lessons from {} texts / {} boxes",
            lessons.len(),
            primitives.texts.len(),
            primitives.boxes.len()
        );
        Ok((columns, lessons))
    }

    /// Lesson box indices per column, in column order
    fn select_lesson_boxes(&self, boxes: &[RenderBox], columns: &[DayColumn]) -> Vec<Vec<usize>> {
        let selector = LessonBoxSelector::new(&self.config.lesson_selection);
        if self.config.parallel {
            columns
                .par_iter()
                .map(|column| selector.select(boxes, column))
                .collect()
        } else {
            columns
                .iter()
                .map(|column| selector.select(boxes, column))
                .collect()
        }
    }

    fn build_lessons(
        &self,
        primitives: &Primitives,
        columns: &[DayColumn],
        selections: &[Vec<usize>],
    ) -> ReconstructResult<Vec<Lesson>> {
        let build_column = |(column, selected): (&DayColumn, &Vec<usize>)| {
            selected
                .iter()
                .map(|&index| self.build_lesson(&primitives.texts, column, &primitives.boxes[index]))
                .collect::<ReconstructResult<Vec<Lesson>>>()
        };

        let per_column: Vec<Vec<Lesson>> = if self.config.parallel {
            columns
                .par_iter()
                .zip(selections.par_iter())
                .map(build_column)
                .collect::<ReconstructResult<_>>()?
        } else {
            columns
                .iter()
                .zip(selections.iter())
                .map(build_column)
                .collect::<ReconstructResult<_>>()?
        };

        Ok(per_column.into_iter().flatten().collect())
    }

    fn build_lesson(
        &self,
        texts: &[TextFragment],
        column: &DayColumn,
        lesson_box: &RenderBox,
    ) -> ReconstructResult<Lesson> {
        let associator = TimeAssociator::new(&self.time_pattern, &self.config.time_scoring);
        let start = associator.find_time(texts, lesson_box, TimeRole::Start)?;
        let end = associator.find_time(texts, lesson_box, TimeRole::End)?;

        if start > end {
            if self.config.strict_time_order {
                return Err(ReconstructError::InvertedTimes {
                    day_index: column.day_index,
                    start,
                    end,
                });
            }
            log::warn!(
                "Lesson on {} starts at {} but ends at {}",
                column.label,
                start,
                end
            );
        }

        let description = TextAssembler::new(&self.time_pattern).assemble(texts, lesson_box);
        log::debug!(
            "Lesson {} {}-{} color {}: {}",
            column.label,
            start,
            end,
            lesson_box.fill_color,
            description
        );

        Ok(Lesson {
            day_index: column.day_index,
            start,
            end,
            description,
            color: lesson_box.fill_color.clone(),
        })
    }
}

/// Every selected box must belong to exactly one column
fn ensure_partition(selections: &[Vec<usize>]) -> ReconstructResult<()> {
    let mut owners: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (day_index, selected) in selections.iter().enumerate() {
        for &box_index in selected {
            owners.entry(box_index).or_default().push(day_index);
        }
    }

    match owners.into_iter().find(|(_, days)| days.len() > 1) {
        Some((box_index, days)) => Err(ReconstructError::ContestedBox { box_index, days }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_accepts_disjoint_selections() {
        assert!(ensure_partition(&[vec![0, 2], vec![1], vec![], vec![3], vec![]]).is_ok());
    }

    #[test]
    fn test_partition_rejects_shared_box() {
        match ensure_partition(&[vec![0, 4], vec![1], vec![4], vec![], vec![]]) {
            Err(ReconstructError::ContestedBox { box_index, days }) => {
                assert_eq!(box_index, 4);
                assert_eq!(days, vec![0, 2]);
            }
            other => panic!("expected ContestedBox, got {other:?}"),
        }
    }

    #[test]
    fn test_profiler_records_only_when_enabled() {
        let mut disabled = StepProfiler::new(false);
        assert_eq!(disabled.time_step("noop", || 1 + 1), 2);
        assert!(disabled.timings().is_empty());

        let mut enabled = StepProfiler::new(true);
        enabled.time_step("noop", || ());
        assert_eq!(enabled.timings().len(), 1);
        assert_eq!(enabled.timings()[0].0, "noop");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScheduleConfig {
            time_pattern: "(".to_string(),
            ..ScheduleConfig::default()
        };
        assert!(ScheduleProcessor::new(config).is_err());
    }
}

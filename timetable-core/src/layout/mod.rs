// Layout reconstruction passes, applied in this order:
// - column_locator.rs: weekday header labels -> day column boxes
// - lesson_selector.rs: color and containment filters per column
// - time_associator.rs: weighted-distance match of start/end time labels
// - text_assembler.rs: descriptive text inside a lesson box
// time_pattern.rs holds the time label recognizer shared by the last two.

pub mod column_locator;
pub mod lesson_selector;
pub mod text_assembler;
pub mod time_associator;
pub mod time_pattern;

pub use column_locator::ColumnLocator;
pub use lesson_selector::LessonBoxSelector;
pub use text_assembler::TextAssembler;
pub use time_associator::TimeAssociator;
pub use time_pattern::TimePattern;

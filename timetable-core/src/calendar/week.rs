use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Date of `day_index` (0 = Monday) in the given ISO week
pub fn date_for(iso_year: i32, week: u32, day_index: usize) -> Option<NaiveDate> {
    if day_index >= 7 {
        return None;
    }
    let monday = NaiveDate::from_isoywd_opt(iso_year, week, Weekday::Mon)?;
    monday.checked_add_days(Days::new(day_index as u64))
}

/// ISO (year, week) containing `date`
pub fn iso_week_of(date: NaiveDate) -> (i32, u32) {
    let week = date.iso_week();
    (week.year(), week.week())
}

/// `count` consecutive ISO weeks starting at the given one.
/// Crosses year boundaries, including 53-week years.
pub fn consecutive_weeks(iso_year: i32, week: u32, count: usize) -> Option<Vec<(i32, u32)>> {
    let mut monday = NaiveDate::from_isoywd_opt(iso_year, week, Weekday::Mon)?;
    let mut weeks = Vec::with_capacity(count);
    for _ in 0..count {
        weeks.push(iso_week_of(monday));
        monday = monday.checked_add_days(Days::new(7))?;
    }
    Some(weeks)
}

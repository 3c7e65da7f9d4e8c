use serde::Serialize;
use time::Date;
use time::macros::format_description;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Strict `YYYY-MM-DD` parse: zero-padded fields, no time-of-day, no fallbacks.
pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecord {
    #[serde(rename = "task")]
    pub name: String,
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
    pub color: String,
    #[serde(rename = "height")]
    pub bar_height: f64,
}

impl TaskRecord {
    /// Whole days between `start` and `end`. Negative when the record ends
    /// before it starts, which only happens under `DateOrderPolicy::Allow`.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).whole_days()
    }
}

/// Ordered task rows produced by one extraction request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    tasks: Vec<TaskRecord>,
}

impl Schedule {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TaskRecord> {
        self.tasks.iter()
    }

    /// Earliest start and latest end across all rows.
    pub fn date_range(&self) -> Option<(Date, Date)> {
        let first = self.tasks.first()?;
        let mut low = first.start.min(first.end);
        let mut high = first.start.max(first.end);
        for task in &self.tasks[1..] {
            low = low.min(task.start).min(task.end);
            high = high.max(task.start).max(task.end);
        }
        Some((low, high))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl FromIterator<TaskRecord> for Schedule {
    fn from_iter<I: IntoIterator<Item = TaskRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a TaskRecord;
    type IntoIter = std::slice::Iter<'a, TaskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.tasks.iter()
    }
}

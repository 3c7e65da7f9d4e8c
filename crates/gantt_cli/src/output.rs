use gantt_core::error::AppError;
use gantt_core::model::{Schedule, format_date};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ScheduleRow {
    #[tabled(rename = "#")]
    index: usize,
    task: String,
    start: String,
    end: String,
    days: i64,
    color: String,
    height: f64,
}

pub fn schedule_table(schedule: &Schedule) -> String {
    if schedule.is_empty() {
        return "No tasks.".to_string();
    }

    let rows = schedule.iter().enumerate().map(|(index, task)| ScheduleRow {
        index,
        task: task.name.clone(),
        start: format_date(task.start),
        end: format_date(task.end),
        days: task.duration_days(),
        color: task.color.clone(),
        height: task.bar_height,
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn schedule_json(schedule: &Schedule) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(schedule).map_err(|err| AppError::invalid_data(err.to_string()))
}

mod task;

pub use task::{Schedule, TaskRecord, format_date, parse_date};

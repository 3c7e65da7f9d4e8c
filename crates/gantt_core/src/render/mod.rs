mod axis;
mod svg;

use crate::error::AppError;
use crate::model::{Schedule, TaskRecord};
use std::path::Path;

pub use axis::{TimeScale, month_label, month_ticks};
pub use svg::SvgRenderer;

pub trait Renderer {
    fn render(&self, schedule: &Schedule, title: &str) -> Result<String, AppError>;
}

/// Rows in drawing order: latest start first, ties keep schedule order.
/// Rows are stacked bottom-up, so the earliest task ends up on top.
pub fn render_order(schedule: &Schedule) -> Vec<&TaskRecord> {
    let mut rows: Vec<&TaskRecord> = schedule.iter().collect();
    rows.sort_by(|a, b| b.start.cmp(&a.start));
    rows
}

pub fn render_to_file(
    renderer: &dyn Renderer,
    schedule: &Schedule,
    title: &str,
    path: &Path,
) -> Result<(), AppError> {
    let chart = renderer.render(schedule, title)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|err| AppError::io(format!("{}: {}", parent.display(), err)))?;
    }
    std::fs::write(path, chart)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    log::info!("wrote chart with {} task(s) to {}", schedule.len(), path.display());
    Ok(())
}

use super::axis::{TimeScale, month_label, month_ticks};
use super::{Renderer, render_order};
use crate::error::AppError;
use crate::font::FontChoice;
use crate::model::Schedule;
use std::borrow::Cow;
use std::fmt::Write as _;
use unicode_width::UnicodeWidthStr;

const TITLE_FONT_SIZE: f64 = 18.0;
const LABEL_FONT_SIZE: f64 = 12.0;
const TOP_MARGIN: f64 = 110.0;
const BOTTOM_MARGIN: f64 = 30.0;
const RIGHT_MARGIN: f64 = 40.0;
const MIN_LABEL_COLUMN: f64 = 80.0;
const MAX_LABEL_COLUMN: f64 = 400.0;
const GRID_STYLE: &str = r##"stroke="#808080" stroke-dasharray="4 4" stroke-opacity="0.5""##;

/// Horizontal-bar timeline written as a standalone SVG document.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    font: FontChoice,
    width: f64,
    height: f64,
}

impl SvgRenderer {
    pub fn new(font: FontChoice) -> Self {
        Self {
            font,
            width: 1200.0,
            height: 600.0,
        }
    }

    fn label_column(&self, schedule: &Schedule) -> f64 {
        let widest = schedule
            .iter()
            .map(|task| UnicodeWidthStr::width(task.name.as_str()))
            .max()
            .unwrap_or(0);
        (widest as f64 * LABEL_FONT_SIZE * 0.6 + 24.0).clamp(MIN_LABEL_COLUMN, MAX_LABEL_COLUMN)
    }

    fn write_chart(&self, out: &mut String, schedule: &Schedule, title: &str) -> std::fmt::Result {
        let left = self.label_column(schedule);
        let right = self.width - RIGHT_MARGIN;
        let top = TOP_MARGIN;
        let bottom = self.height - BOTTOM_MARGIN;

        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
            w = self.width,
            h = self.height,
            font = escape_xml(&self.font.css_family()),
        )?;
        if let Some(path) = &self.font.path {
            writeln!(
                out,
                "<style>@font-face {{ font-family: '{}'; src: url('file://{}'); }}</style>",
                escape_xml(&self.font.family),
                escape_xml(&path.to_string_lossy()),
            )?;
        }
        writeln!(
            out,
            r#"<rect width="100%" height="100%" fill="white"/>"#
        )?;
        writeln!(
            out,
            r#"<text class="title" x="{:.1}" y="{:.1}" font-size="{}" text-anchor="middle">{}</text>"#,
            self.width / 2.0,
            TITLE_FONT_SIZE + 12.0,
            TITLE_FONT_SIZE,
            escape_xml(title),
        )?;

        if let Some((first, last)) = schedule.date_range() {
            let scale = TimeScale::new(first, last, left, right - left);
            let rows = render_order(schedule);
            let pitch = (bottom - top) / rows.len() as f64;

            for tick in month_ticks(scale.start(), scale.end()) {
                let x = scale.x(tick);
                writeln!(
                    out,
                    r#"<line class="grid" x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}" {GRID_STYLE}/>"#
                )?;
                let label_y = top - 8.0;
                writeln!(
                    out,
                    r#"<text class="tick" x="{x:.1}" y="{label_y:.1}" font-size="{LABEL_FONT_SIZE}" transform="rotate(-45 {x:.1} {label_y:.1})">{}</text>"#,
                    month_label(tick),
                )?;
            }

            for (row, task) in rows.iter().enumerate() {
                let center = bottom - (row as f64 + 0.5) * pitch;
                writeln!(
                    out,
                    r#"<line class="grid" x1="{left:.1}" y1="{center:.1}" x2="{right:.1}" y2="{center:.1}" {GRID_STYLE}/>"#
                )?;
                writeln!(
                    out,
                    r#"<text class="label" x="{:.1}" y="{center:.1}" font-size="{LABEL_FONT_SIZE}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
                    left - 8.0,
                    escape_xml(&task.name),
                )?;

                let x_start = scale.x(task.start);
                let x_end = scale.x(task.end);
                let thickness = task.bar_height.min(1.0) * pitch;
                writeln!(
                    out,
                    r#"<rect class="bar" x="{:.1}" y="{:.1}" width="{:.1}" height="{thickness:.1}" fill="{}" stroke="black"/>"#,
                    x_start.min(x_end),
                    center - thickness / 2.0,
                    (x_end - x_start).abs(),
                    escape_xml(&task.color),
                )?;
            }
        }

        writeln!(
            out,
            r#"<rect class="frame" x="{left:.1}" y="{top:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
            right - left,
            bottom - top,
        )?;
        writeln!(out, "</svg>")
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(FontChoice::fallback())
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, schedule: &Schedule, title: &str) -> Result<String, AppError> {
        let mut out = String::new();
        self.write_chart(&mut out, schedule, title)
            .map_err(|err| AppError::invalid_data(format!("failed to draw chart: {err}")))?;
        Ok(out)
    }
}

fn escape_xml(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(raw);
    }
    let mut escaped = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

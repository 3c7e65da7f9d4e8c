pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a project manager. Generate JSON for a Gantt chart from the following text.";

pub const DEFAULT_TEMPERATURE: f64 = 0.3;

const OUTPUT_FORMAT: &str = r#"Reply with a JSON array only. Each element is one task:
- "task": task name (required)
- "start": start date as YYYY-MM-DD (required)
- "end": end date as YYYY-MM-DD (required)
- "color": bar color name or hex code (optional)
- "height": bar thickness between 0 and 1 (optional)

Example:
[
  {"task": "Requirements", "start": "2024-04-01", "end": "2024-04-12", "color": "skyblue"},
  {"task": "Implementation", "start": "2024-04-15", "end": "2024-05-31", "height": 0.6}
]"#;

/// Base instruction with the caller's style instruction appended, if any.
pub fn system_instruction(style: Option<&str>) -> String {
    match style.map(str::trim).filter(|style| !style.is_empty()) {
        Some(style) => format!("{DEFAULT_SYSTEM_PROMPT}\n\n{style}"),
        None => DEFAULT_SYSTEM_PROMPT.to_string(),
    }
}

pub fn user_content(description: &str) -> String {
    format!("{}\n\n{}", description.trim(), OUTPUT_FORMAT)
}

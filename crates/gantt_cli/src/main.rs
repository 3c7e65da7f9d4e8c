use clap::Parser;
use clap::error::ErrorKind;
use gantt_cli::cli::{Cli, Command, apply_override, parse_config_override};
use gantt_cli::output::{schedule_json, schedule_table};
use gantt_core::completion::Model;
use gantt_core::config::{self, ConfigOverrides, Settings};
use gantt_core::error::AppError;
use gantt_core::extract::extract_json_payload;
use gantt_core::font::resolve_font;
use gantt_core::pipeline::{self, ScheduleSource};
use gantt_core::render::{SvgRenderer, render_to_file};
use std::io::Read;
use std::path::PathBuf;

const LOG_ENV_VAR: &str = "GANTTGEN_LOG";

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String, AppError> {
    if let Some(text) = text {
        return Ok(text);
    }

    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(buffer)
}

fn resolve_settings(raw_overrides: &[String], flags: ConfigOverrides) -> Result<Settings, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        log::warn!("ignoring configuration file: {err}");
    }

    let mut overrides = ConfigOverrides::default();
    for raw in raw_overrides {
        let target = parse_config_override(raw).map_err(AppError::invalid_input)?;
        apply_override(&mut overrides, target);
    }
    let merged = config::merge_overrides(&loaded.config, &overrides);
    Ok(config::merge_overrides(&merged, &flags).settings())
}

fn reject_overrides(command: &str, raw_overrides: &[String]) -> Result<(), AppError> {
    if raw_overrides.is_empty() {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "--config-override has no effect on `{command}`"
        )))
    }
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let Cli {
        command,
        json,
        config_override,
    } = cli;

    match command {
        Command::Generate {
            text,
            file,
            api_key,
            model,
            style,
            title,
            output,
        } => {
            let flags = ConfigOverrides {
                model,
                style_prompt: style,
                title,
                output,
                ..ConfigOverrides::default()
            };
            let settings = resolve_settings(&config_override, flags)?;
            let renderer = SvgRenderer::new(resolve_font(&settings.fonts));

            let input = read_input(text, file)?;
            let generated = pipeline::generate_schedule(&input, &settings, || {
                pipeline::completion_client(&settings, api_key.as_deref())
            })?;
            render_to_file(&renderer, &generated.schedule, &settings.title, &settings.output)?;

            if json {
                let source = match generated.source {
                    ScheduleSource::Direct => "direct",
                    ScheduleSource::Completion { .. } => "completion",
                };
                let json = serde_json::json!({
                    "output": settings.output.display().to_string(),
                    "source": source,
                    "tasks": schedule_json(&generated.schedule)?,
                });
                println!("{}", json);
            } else {
                println!("{}", schedule_table(&generated.schedule));
                println!(
                    "Wrote {} task(s) to {}",
                    generated.schedule.len(),
                    settings.output.display()
                );
            }
        }
        Command::Extract { text, file } => {
            reject_overrides("extract", &config_override)?;
            let input = read_input(text, file)?;
            let payload = extract_json_payload(&input).map_err(|source| AppError::Extraction {
                source,
                raw_response: input.clone(),
            })?;
            if json {
                println!("{}", serde_json::json!({ "payload": payload }));
            } else {
                println!("{payload}");
            }
        }
        Command::Validate { text, file } => {
            let settings = resolve_settings(&config_override, ConfigOverrides::default())?;
            let input = read_input(text, file)?;
            let schedule = pipeline::schedule_from_text(&input, &settings)?;
            if json {
                println!("{}", schedule_json(&schedule)?);
            } else {
                println!("{}", schedule_table(&schedule));
            }
        }
        Command::Models => {
            reject_overrides("models", &config_override)?;
            if json {
                let names: Vec<_> = Model::ALL.iter().map(Model::as_str).collect();
                println!("{}", serde_json::json!(names));
            } else {
                for model in Model::ALL {
                    let marker = if model == Model::default() {
                        " (default)"
                    } else {
                        ""
                    };
                    println!("{model}{marker}");
                }
            }
        }
    }

    Ok(())
}

fn report(err: &AppError) {
    eprintln!("ERROR: {}", err);
    if let Some(context) = err.debug_context() {
        let label = match err {
            AppError::Extraction { .. } => "assistant response",
            _ => "payload",
        };
        eprintln!("--- {label} ---\n{}", context.trim_end());
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV_VAR, "warn"))
        .format_timestamp(None)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        report(&err);
        std::process::exit(1);
    }
}

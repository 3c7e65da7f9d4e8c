use clap::{Parser, Subcommand};
use gantt_core::completion::Model;
use gantt_core::config::ConfigOverrides;
use gantt_core::normalize::{DateOrderPolicy, ObjectPolicy};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Turn a project description into a Gantt chart
    ///
    /// Example: ganttgen generate "Design in April, build in May, launch June 1"
    /// Example: ganttgen generate --file plan.txt --output plan.svg
    /// Example: ganttgen generate '[{"task":"Design","start":"2024-04-01","end":"2024-04-30"}]'
    Generate {
        /// Description text or a JSON task array (read from stdin when omitted)
        text: Option<String>,
        /// Read the description from a file
        #[arg(long, short = 'f', value_name = "PATH", conflicts_with = "text")]
        file: Option<PathBuf>,
        /// API key for the completion endpoint
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Model to request
        #[arg(long)]
        model: Option<Model>,
        /// Extra style instruction appended to the prompt
        #[arg(long)]
        style: Option<String>,
        /// Chart title
        #[arg(long)]
        title: Option<String>,
        /// Where to write the SVG chart
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Print the JSON payload found in a model reply
    ///
    /// Example: ganttgen extract "Sure! [{\"task\": \"A\"}] Anything else?"
    Extract {
        text: Option<String>,
        #[arg(long, short = 'f', value_name = "PATH", conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Check a JSON task array and print the normalized schedule
    ///
    /// Example: ganttgen validate --file tasks.json
    Validate {
        text: Option<String>,
        #[arg(long, short = 'f', value_name = "PATH", conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// List the models accepted by --model
    Models,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigOverrideTarget {
    Model(Model),
    StylePrompt(String),
    Temperature(f64),
    Endpoint(String),
    Title(String),
    Output(PathBuf),
    DefaultColor(String),
    BarHeight(f64),
    ObjectPolicy(ObjectPolicy),
    DateOrder(DateOrderPolicy),
}

/// Parse a raw `KEY=VALUE` override string into a typed target.
pub fn parse_config_override(raw: &str) -> Result<ConfigOverrideTarget, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim();
    let field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    match field.as_str() {
        "model" => value.parse().map(ConfigOverrideTarget::Model),
        "style" | "style_prompt" => Ok(ConfigOverrideTarget::StylePrompt(value.to_string())),
        "temperature" => {
            let temperature = parse_number(&field, value)?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err("temperature must be between 0 and 2".to_string());
            }
            Ok(ConfigOverrideTarget::Temperature(temperature))
        }
        "endpoint" => non_empty(&field, value).map(ConfigOverrideTarget::Endpoint),
        "title" => Ok(ConfigOverrideTarget::Title(value.to_string())),
        "output" => non_empty(&field, value).map(|path| ConfigOverrideTarget::Output(path.into())),
        "color" | "default_color" => {
            non_empty(&field, value).map(ConfigOverrideTarget::DefaultColor)
        }
        "height" | "bar_height" => {
            let height = parse_number(&field, value)?;
            if !(height.is_finite() && height > 0.0) {
                return Err("bar_height must be a positive number".to_string());
            }
            Ok(ConfigOverrideTarget::BarHeight(height))
        }
        "object_policy" => match canonicalize_flag_name(value).as_deref() {
            Some("reject") => Ok(ConfigOverrideTarget::ObjectPolicy(ObjectPolicy::Reject)),
            Some("wrap") => Ok(ConfigOverrideTarget::ObjectPolicy(ObjectPolicy::Wrap)),
            _ => Err(format!("object_policy must be 'reject' or 'wrap', got '{value}'")),
        },
        "date_order" => match canonicalize_flag_name(value).as_deref() {
            Some("reject") => Ok(ConfigOverrideTarget::DateOrder(DateOrderPolicy::Reject)),
            Some("allow") => Ok(ConfigOverrideTarget::DateOrder(DateOrderPolicy::Allow)),
            Some("clamp") => Ok(ConfigOverrideTarget::DateOrder(DateOrderPolicy::Clamp)),
            _ => Err(format!(
                "date_order must be 'reject', 'allow' or 'clamp', got '{value}'"
            )),
        },
        other => Err(format!("unknown config field '{other}'")),
    }
}

pub fn apply_override(overrides: &mut ConfigOverrides, target: ConfigOverrideTarget) {
    match target {
        ConfigOverrideTarget::Model(model) => overrides.model = Some(model),
        ConfigOverrideTarget::StylePrompt(style) => overrides.style_prompt = Some(style),
        ConfigOverrideTarget::Temperature(value) => overrides.temperature = Some(value),
        ConfigOverrideTarget::Endpoint(endpoint) => overrides.endpoint = Some(endpoint),
        ConfigOverrideTarget::Title(title) => overrides.title = Some(title),
        ConfigOverrideTarget::Output(path) => overrides.output = Some(path),
        ConfigOverrideTarget::DefaultColor(color) => overrides.default_color = Some(color),
        ConfigOverrideTarget::BarHeight(height) => overrides.bar_height = Some(height),
        ConfigOverrideTarget::ObjectPolicy(policy) => overrides.object_policy = Some(policy),
        ConfigOverrideTarget::DateOrder(policy) => overrides.date_order = Some(policy),
    }
}

fn parse_number(field: &str, value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .map_err(|_| format!("{field} must be a number, got '{value}'"))
}

fn non_empty(field: &str, value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("{field} override cannot be empty"))
    } else {
        Ok(value.to_string())
    }
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

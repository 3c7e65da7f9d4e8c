use crate::completion::{DEFAULT_ENDPOINT, Model};
use crate::error::AppError;
use crate::font::{self, FontCandidate};
use crate::normalize::{
    DEFAULT_BAR_HEIGHT, DEFAULT_COLOR, DateOrderPolicy, NormalizeOptions, ObjectPolicy,
};
use crate::prompt::DEFAULT_TEMPERATURE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "GANTTGEN_CONFIG_PATH";

pub const DEFAULT_TITLE: &str = "Project Schedule";
pub const DEFAULT_OUTPUT: &str = "gantt.svg";

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: Option<Model>,
    #[serde(default)]
    pub style_prompt: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub default_color: Option<String>,
    #[serde(default)]
    pub bar_height: Option<f64>,
    #[serde(default)]
    pub object_policy: Option<ObjectPolicy>,
    #[serde(default)]
    pub date_order: Option<DateOrderPolicy>,
    #[serde(default)]
    pub fonts: Option<Vec<FontCandidate>>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub model: Option<Model>,
    pub style_prompt: Option<String>,
    pub temperature: Option<f64>,
    pub endpoint: Option<String>,
    pub title: Option<String>,
    pub output: Option<PathBuf>,
    pub default_color: Option<String>,
    pub bar_height: Option<f64>,
    pub object_policy: Option<ObjectPolicy>,
    pub date_order: Option<DateOrderPolicy>,
}

/// Fully resolved values for one request; every default already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model: Model,
    pub style_prompt: Option<String>,
    pub temperature: f64,
    pub endpoint: String,
    pub title: String,
    pub output: PathBuf,
    pub normalize: NormalizeOptions,
    pub fonts: Vec<FontCandidate>,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().settings()
    }
}

impl Config {
    pub fn settings(&self) -> Settings {
        Settings {
            model: self.model.unwrap_or_default(),
            style_prompt: self
                .style_prompt
                .clone()
                .filter(|style| !style.trim().is_empty()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            title: self
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            output: self
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            normalize: NormalizeOptions {
                default_color: self
                    .default_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                default_bar_height: self.bar_height.unwrap_or(DEFAULT_BAR_HEIGHT),
                object_policy: self.object_policy.unwrap_or_default(),
                date_order: self.date_order.unwrap_or_default(),
            },
            fonts: self.fonts.clone().unwrap_or_else(font::default_candidates),
        }
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("ganttgen")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("ganttgen")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    validate_config(&config, path)?;
    Ok(config)
}

fn validate_config(config: &Config, path: &Path) -> Result<(), AppError> {
    if let Some(height) = config.bar_height
        && !(height.is_finite() && height > 0.0)
    {
        return Err(AppError::invalid_data(format!(
            "{}: bar_height must be a positive number",
            path.display()
        )));
    }
    if let Some(temperature) = config.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        return Err(AppError::invalid_data(format!(
            "{}: temperature must be between 0 and 2",
            path.display()
        )));
    }
    Ok(())
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(model) = overrides.model {
        merged.model = Some(model);
    }
    if let Some(style) = overrides.style_prompt.as_ref() {
        merged.style_prompt = Some(style.clone());
    }
    if let Some(temperature) = overrides.temperature {
        merged.temperature = Some(temperature);
    }
    if let Some(endpoint) = overrides.endpoint.as_ref() {
        merged.endpoint = Some(endpoint.clone());
    }
    if let Some(title) = overrides.title.as_ref() {
        merged.title = Some(title.clone());
    }
    if let Some(output) = overrides.output.as_ref() {
        merged.output = Some(output.clone());
    }
    if let Some(color) = overrides.default_color.as_ref() {
        merged.default_color = Some(color.clone());
    }
    if let Some(height) = overrides.bar_height {
        merged.bar_height = Some(height);
    }
    if let Some(policy) = overrides.object_policy {
        merged.object_policy = Some(policy);
    }
    if let Some(policy) = overrides.date_order {
        merged.date_order = Some(policy);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::{
        Config, ConfigOverrides, DEFAULT_OUTPUT, DEFAULT_TITLE, load_config_from_path,
        load_config_with_fallback_from_path, merge_overrides,
    };
    use crate::completion::{DEFAULT_ENDPOINT, Model};
    use crate::normalize::{DateOrderPolicy, NormalizeOptions, ObjectPolicy};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("ganttgen-{nanos}-{file_name}"))
    }

    #[test]
    fn load_config_missing_returns_defaults_without_error() {
        let path = temp_path("missing-config.json");
        let result = load_config_with_fallback_from_path(&path);

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_config_invalid_returns_defaults_and_error() {
        let path = temp_path("invalid-config.json");
        fs::write(&path, "{ invalid json ").unwrap();

        let result = load_config_with_fallback_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.config, Config::default());
        assert!(result.error.is_some());
    }

    #[test]
    fn load_config_reads_valid_file() {
        let path = temp_path("valid-config.json");
        let content = serde_json::json!({
            "model": "gpt-4o",
            "style_prompt": "Use one color per phase.",
            "bar_height": 0.4,
            "object_policy": "wrap",
            "date_order": "clamp",
            "fonts": [{"path": "/fonts/a.ttf", "family": "A"}]
        });
        fs::write(&path, serde_json::to_string(&content).unwrap()).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(loaded.model, Some(Model::Gpt4o));
        assert_eq!(loaded.style_prompt.as_deref(), Some("Use one color per phase."));
        assert_eq!(loaded.bar_height, Some(0.4));
        assert_eq!(loaded.object_policy, Some(ObjectPolicy::Wrap));
        assert_eq!(loaded.date_order, Some(DateOrderPolicy::Clamp));
        assert_eq!(loaded.fonts.unwrap()[0].family, "A");
    }

    #[test]
    fn load_config_rejects_unknown_model() {
        let path = temp_path("bad-model-config.json");
        fs::write(&path, r#"{"model": "gpt-99"}"#).unwrap();

        let result = load_config_from_path(&path);
        fs::remove_file(&path).ok();

        assert_eq!(result.unwrap_err().code(), "invalid_data");
    }

    #[test]
    fn load_config_rejects_non_positive_bar_height() {
        let path = temp_path("bad-height-config.json");
        fs::write(&path, r#"{"bar_height": 0}"#).unwrap();

        let result = load_config_from_path(&path);
        fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(err.message().contains("bar_height"));
    }

    #[test]
    fn settings_apply_defaults() {
        let settings = Config::default().settings();

        assert_eq!(settings.model, Model::Gpt4oMini);
        assert_eq!(settings.style_prompt, None);
        assert_eq!(settings.temperature, 0.3);
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.title, DEFAULT_TITLE);
        assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(settings.normalize, NormalizeOptions::default());
        assert_eq!(settings.fonts.len(), 3);
    }

    #[test]
    fn settings_drop_blank_style_prompt() {
        let config = Config {
            style_prompt: Some("   ".into()),
            ..Config::default()
        };
        assert_eq!(config.settings().style_prompt, None);
    }

    #[test]
    fn merge_overrides_updates_fields() {
        let base = Config {
            model: Some(Model::Gpt4oMini),
            title: Some("Base".into()),
            bar_height: Some(0.4),
            ..Config::default()
        };

        let overrides = ConfigOverrides {
            model: Some(Model::Gpt41),
            bar_height: Some(0.7),
            date_order: Some(DateOrderPolicy::Allow),
            ..ConfigOverrides::default()
        };

        let merged = merge_overrides(&base, &overrides);
        assert_eq!(merged.model, Some(Model::Gpt41));
        assert_eq!(merged.title.as_deref(), Some("Base"));
        assert_eq!(merged.bar_height, Some(0.7));
        assert_eq!(merged.date_order, Some(DateOrderPolicy::Allow));
    }

    #[test]
    fn merge_overrides_preserves_base_config() {
        let base = Config {
            title: Some("Base".into()),
            ..Config::default()
        };
        let overrides = ConfigOverrides {
            title: Some("Override".into()),
            ..ConfigOverrides::default()
        };

        let merged = merge_overrides(&base, &overrides);

        assert_eq!(base.title.as_deref(), Some("Base"));
        assert_eq!(merged.title.as_deref(), Some("Override"));
    }

    #[test]
    fn merge_overrides_with_empty_overrides_returns_clone() {
        let base = Config {
            endpoint: Some("http://localhost:8080/v1/chat/completions".into()),
            ..Config::default()
        };

        let merged = merge_overrides(&base, &ConfigOverrides::default());

        assert_eq!(merged, base);
    }
}

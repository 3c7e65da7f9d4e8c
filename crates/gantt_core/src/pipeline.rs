use crate::completion::{ApiKey, CompletionClient, CompletionRequest, OpenAiClient};
use crate::config::Settings;
use crate::error::AppError;
use crate::extract::{extract_json_payload, looks_like_json};
use crate::model::Schedule;
use crate::normalize::normalize_schedule_with;

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleSource {
    /// The caller typed JSON directly; no completion was requested.
    Direct,
    Completion { raw_response: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub schedule: Schedule,
    pub payload: String,
    pub source: ScheduleSource,
}

/// Builds the endpoint client. Only called when the input needs a completion,
/// so a missing key is not an error for JSON input.
pub fn completion_client(
    settings: &Settings,
    api_key: Option<&str>,
) -> Result<Box<dyn CompletionClient>, AppError> {
    let key = ApiKey::new(api_key.unwrap_or_default())?;
    let client = OpenAiClient::new(&settings.endpoint, key)?;
    Ok(Box::new(client))
}

pub fn generate_schedule<F>(
    input: &str,
    settings: &Settings,
    connect: F,
) -> Result<Generated, AppError>
where
    F: FnOnce() -> Result<Box<dyn CompletionClient>, AppError>,
{
    if input.trim().is_empty() {
        return Err(AppError::invalid_input("project description is required"));
    }

    if looks_like_json(input) {
        log::debug!("input is already JSON, skipping completion");
        let payload = input.trim().to_string();
        let schedule = normalize_payload(&payload, settings)?;
        return Ok(Generated {
            schedule,
            payload,
            source: ScheduleSource::Direct,
        });
    }

    let client = connect()?;
    let mut request =
        CompletionRequest::for_schedule(input, settings.style_prompt.as_deref(), settings.model);
    request.temperature = settings.temperature;
    let raw_response = client.complete(&request)?;

    let payload = extract_json_payload(&raw_response)
        .map_err(|source| AppError::Extraction {
            source,
            raw_response: raw_response.clone(),
        })?
        .to_string();
    log::debug!(
        "extracted {} byte payload from {} byte reply",
        payload.len(),
        raw_response.len()
    );

    let schedule = normalize_payload(&payload, settings)?;
    Ok(Generated {
        schedule,
        payload,
        source: ScheduleSource::Completion { raw_response },
    })
}

/// Extractor and normalizer only, for text that never goes to the endpoint.
pub fn schedule_from_text(text: &str, settings: &Settings) -> Result<Schedule, AppError> {
    let payload = extract_json_payload(text).map_err(|source| AppError::Extraction {
        source,
        raw_response: text.to_string(),
    })?;
    normalize_payload(payload, settings)
}

fn normalize_payload(payload: &str, settings: &Settings) -> Result<Schedule, AppError> {
    normalize_schedule_with(payload, &settings.normalize).map_err(|source| {
        AppError::Normalization {
            source,
            payload: payload.to_string(),
        }
    })
}

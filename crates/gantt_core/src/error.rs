use crate::completion::EndpointError;
use crate::extract::ExtractionError;
use crate::normalize::NormalizationError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Io(String),
    Extraction {
        source: ExtractionError,
        raw_response: String,
    },
    Normalization {
        source: NormalizationError,
        payload: String,
    },
    Endpoint(EndpointError),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Extraction { source, .. } => source.code(),
            Self::Normalization { source, .. } => source.code(),
            Self::Endpoint(_) => "endpoint_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidInput(message) => message.clone(),
            Self::InvalidData(message) => message.clone(),
            Self::Io(message) => message.clone(),
            Self::Extraction { source, .. } => source.to_string(),
            Self::Normalization { source, .. } => source.to_string(),
            Self::Endpoint(source) => source.to_string(),
        }
    }

    /// Text worth showing next to the message when debugging a failed request:
    /// the raw model reply or the payload the normalizer rejected.
    pub fn debug_context(&self) -> Option<&str> {
        match self {
            Self::Extraction { raw_response, .. } => Some(raw_response),
            Self::Normalization { payload, .. } => Some(payload),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Extraction { source, .. } => Some(source),
            Self::Normalization { source, .. } => Some(source),
            Self::Endpoint(source) => Some(source),
            _ => None,
        }
    }
}

impl From<EndpointError> for AppError {
    fn from(err: EndpointError) -> Self {
        Self::Endpoint(err)
    }
}

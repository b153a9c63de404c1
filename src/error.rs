use crate::providers::ProviderError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
  #[error("{0}")]
  Unauthenticated(String),
  #[error("{0}")]
  InvalidArgument(String),
  #[error("{0}")]
  Forbidden(String),
  #[error("{0}")]
  NotFound(String),
  /// Third-party API or document store failure. `details` carries the underlying message.
  #[error("{message}")]
  Upstream {
    message: String,
    details: Option<String>,
  },
  #[error("{0}")]
  Configuration(String),
}

impl ApiError {
  pub fn upstream(message: &str, cause: impl std::fmt::Display) -> Self {
    ApiError::Upstream {
      message: message.to_owned(),
      details: Some(cause.to_string()),
    }
  }

  /// Store errors mapped for an operation on a single review.
  pub fn from_store(message: &str, error: StoreError) -> Self {
    match error {
      StoreError::NotFound => ApiError::NotFound("Review not found".to_owned()),
      error => ApiError::upstream(message, error),
    }
  }

  pub fn from_provider(message: &str, error: ProviderError) -> Self {
    match error {
      ProviderError::NotConfigured(key) => ApiError::Configuration(format!("{} not set", key)),
      error => ApiError::upstream(message, error),
    }
  }

  pub fn details(&self) -> Option<&str> {
    match self {
      ApiError::Upstream { details, .. } => details.as_deref(),
      _ => None,
    }
  }
}

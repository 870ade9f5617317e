use std::fmt;
use thiserror::Error;

/// A single failed client-side check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every client-side check that failed for one form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Ok when nothing was recorded
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MarketError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Errors surfaced by client operations
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("invalid input: {0}")]
    Validation(ValidationErrors),

    #[error("not logged in")]
    NotAuthenticated,

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("session storage: {0}")]
    Storage(String),
}

/// How a failure is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Network,
}

impl MarketError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MarketError::Validation(_) | MarketError::NotAuthenticated => ErrorCategory::Validation,
            MarketError::Network(_) | MarketError::Server { .. } | MarketError::Storage(_) => {
                ErrorCategory::Network
            }
        }
    }

    /// Shortcut for a one-field validation failure
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        MarketError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;

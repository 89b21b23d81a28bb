use std::fmt::{Display, Formatter};

/// Failure of a single call against the users API.
///
/// The message names the attempted operation (and the id for per-record
/// calls) followed by the underlying cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    message: String,
}

impl RequestError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RequestError {}

pub type RequestResult<T> = std::result::Result<T, RequestError>;

/// Prefix an error with a lazily built description of what was being attempted.
pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> RequestResult<T>;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Display,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> RequestResult<T> {
        self.map_err(|e| RequestError::new(format!("{}: {}", f(), e)))
    }
}

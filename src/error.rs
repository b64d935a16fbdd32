//! Error taxonomy for the phrase generation pipeline.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GenerateError>;

/// Everything that can go wrong between loading configuration and printing
/// the generated batch. Each variant maps to its own process exit code.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Credential missing or empty, or the environment could not be read.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service rejected the credential.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The service rejected the schema, or generation stopped before a
    /// conforming batch could be produced.
    #[error("Schema rejected: {0}")]
    SchemaViolation(String),

    /// Any other remote failure (rate limit, server error, failed run).
    #[error("Service error: {0}")]
    Service(String),

    /// The response envelope could not be decoded, carried no output text,
    /// or contained a refusal.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl GenerateError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Transport(_) => 3,
            Self::Authentication(_) => 4,
            Self::SchemaViolation(_) => 5,
            Self::Service(_) => 6,
            Self::UnexpectedResponse(_) => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn exit_codes_are_distinct_and_reserved() {
        let errors = [
            GenerateError::Configuration(String::new()),
            GenerateError::Transport(String::new()),
            GenerateError::Authentication(String::new()),
            GenerateError::SchemaViolation(String::new()),
            GenerateError::Service(String::new()),
            GenerateError::UnexpectedResponse(String::new()),
        ];

        let codes: HashSet<u8> = errors.iter().map(GenerateError::exit_code).collect();
        assert_eq!(codes.len(), errors.len(), "every failure class needs its own code");

        // 0 is success and 1 is the generic failure code, so the taxonomy
        // must stay clear of both.
        assert!(codes.iter().all(|code| *code > 1));
    }

    #[test]
    fn messages_carry_the_failure_class() {
        let error = GenerateError::Configuration("OPENAI_API_KEY is empty".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: OPENAI_API_KEY is empty"
        );
    }
}

use thiserror::Error;

/// Failures turning stored string values back into domain enums.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown language code: '{0}'")]
    UnknownLanguage(String),

    #[error("unknown task status: '{0}'")]
    UnknownStatus(String),

    #[error("unknown entity type: '{0}'")]
    UnknownEntityType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offending_value() {
        let err = ParseError::UnknownLanguage("fr".to_string());
        assert!(err.to_string().contains("fr"));

        let err = ParseError::UnknownStatus("STARTED".to_string());
        assert!(err.to_string().contains("STARTED"));

        let err = ParseError::UnknownEntityType("PAGE".to_string());
        assert!(err.to_string().contains("PAGE"));
    }
}

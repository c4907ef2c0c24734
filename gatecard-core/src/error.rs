//! Error types for gatecard core.

use std::{error::Error, fmt};

/// Error type for report validation and card formatting.
#[derive(Debug)]
pub enum GateCardError {
    /// The payload is not a JSON document of the expected shape.
    InvalidPayload(serde_json::Error),
    /// A required field is absent; holds the JSON path of the field.
    MissingField(&'static str),
}

impl fmt::Display for GateCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPayload(err) => write!(f, "invalid analysis payload: {err}"),
            Self::MissingField(path) => write!(f, "analysis payload is missing `{path}`"),
        }
    }
}

impl Error for GateCardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPayload(err) => Some(err),
            Self::MissingField(_) => None,
        }
    }
}

impl From<serde_json::Error> for GateCardError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidPayload(value)
    }
}

/// Convenience result type for gatecard core.
pub type Result<T> = std::result::Result<T, GateCardError>;

#[cfg(test)]
mod tests {
    use super::GateCardError;
    use std::error::Error;

    #[test]
    fn missing_field_names_the_path() {
        let error = GateCardError::MissingField("qualityGate.status");
        assert_eq!(
            format!("{error}"),
            "analysis payload is missing `qualityGate.status`"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn from_json_error_maps_variant() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: GateCardError = json_err.into();
        match &error {
            GateCardError::InvalidPayload(_) => {
                assert!(format!("{error}").starts_with("invalid analysis payload"));
                assert!(error.source().is_some());
            }
            GateCardError::MissingField(_) => panic!("expected InvalidPayload variant"),
        }
    }
}

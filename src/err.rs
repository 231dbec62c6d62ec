use std::io;

use thiserror::Error;

pub type GeneratorResult<T> = std::result::Result<T, GeneratorError>;
pub type NormalizationResult<T> = std::result::Result<T, NormalizationError>;

#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A visitor broke the start/end call discipline. These are programming
    /// errors in the calling code and are never recovered from.
    #[error("Output generation error in `{operation}`: {message}")]
    OutputGeneration {
        operation: &'static str,
        message: String,
    },

    #[error("No visitor is able to handle a value of type `{type_name}`")]
    InvalidTypeForVisiting { type_name: &'static str },

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error("Encoding the JSON document failed with: {source}")]
    Json { source: serde_json::Error },

    #[error("Cannot encode non-finite float `{value}` as JSON")]
    NonFiniteFloat { value: f64 },

    #[error("Writing to XML failed with: {message}")]
    XmlOutput { message: String },

    #[error("An I/O error has occurred: {source}")]
    Io { source: io::Error },
}

impl GeneratorError {
    /// Structural contract violation in `operation` (mismatched names, wrong
    /// stack state, illegal container for the attempted call).
    pub(crate) fn contract(operation: &'static str, message: impl Into<String>) -> Self {
        GeneratorError::OutputGeneration {
            operation,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(err: serde_json::Error) -> Self {
        GeneratorError::Json { source: err }
    }
}

/// Adapter for `quick-xml` error values, which otherwise surface as a mix of
/// encoding and attribute errors with no common public constructor.
impl From<quick_xml::Error> for GeneratorError {
    fn from(err: quick_xml::Error) -> Self {
        GeneratorError::XmlOutput {
            message: format!("{err}"),
        }
    }
}

impl From<io::Error> for GeneratorError {
    fn from(err: io::Error) -> Self {
        GeneratorError::Io { source: err }
    }
}

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error(
        "No normalizer is registered for a value of type `{type_name}` \
         (register a `FieldTypeNormalizer` for it)"
    )]
    UnsupportedType { type_name: &'static str },

    #[error("Normalizer for a value of type `{type_name}` failed with: {message}")]
    NormalizerFailure {
        type_name: &'static str,
        message: String,
    },
}

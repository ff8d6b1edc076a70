use thiserror::Error;

/// Rejections from the form controller. Parse failures and range violations
/// are absorbed by the controller and never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("unknown ocean proximity option: {0}")]
    UnknownOption(String),
}

/// Failures of one prediction round trip.
#[derive(Error, Debug)]
pub enum PredictError {
    /// The service answered with a non-2xx status.
    #[error("{0}")]
    Application(String),

    /// No usable response: connection failure, timeout, or an unexpected body.
    #[error("transport failure: {0}")]
    Transport(String),
}

pub const PREDICTION_FAILED: &str = "Prediction failed";
pub const COULD_NOT_CONNECT: &str = "Could not connect to API";

impl PredictError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> &str {
        match self {
            PredictError::Application(message) => message,
            PredictError::Transport(_) => COULD_NOT_CONNECT,
        }
    }
}

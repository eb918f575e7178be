//! Error taxonomy for the quiz engine
//!
//! The facade reports every failure as an [`Error`] whose display text is
//! short enough to be shown to chat users as-is. Provider and transport
//! failures are converted at the boundary.

use serde::Serialize;
use thiserror::Error;

/// Errors reported by the engine operations
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requester is not in the operator allow-list
    #[error("only operators can do that")]
    Unauthorized,
    /// A round is already running in this chat
    #[error("a round is already running")]
    RoundAlreadyActive,
    /// There is no round to answer or cancel
    #[error("there is no round running")]
    NoActiveRound,
    /// The participant already answered the current round
    #[error("you already answered")]
    AlreadyAnswered,
    /// No acceptable candidate was found within the retry budget
    #[error("could not find a character, try again")]
    NoCandidateFound,
    /// The content provider could not be reached
    #[error("the character database is unavailable, try again later")]
    ProviderUnavailable,
    /// The chat transport refused to publish the question
    #[error("could not post the question, try again later")]
    TransportUnavailable,
}

/// Failures reported by a content provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider could not be reached or answered with a failure
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    /// The provider answered with something that could not be understood
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Failures reported by a chat transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The chat service could not be reached
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    /// The chat service rejected the message
    #[error("message rejected: {0}")]
    Rejected(String),
}

impl From<TransportError> for Error {
    fn from(_: TransportError) -> Self {
        Self::TransportUnavailable
    }
}

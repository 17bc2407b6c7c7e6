//! Crate error type.

/// Errors that can occur while constructing a [`crate::Readability`].
/// `parse()` itself never surfaces a failure this way — per the
/// orchestrator's catch-all policy, a failed extraction degrades to `None`
/// rather than an `Err`. This type exists for the one genuinely exceptional,
/// pre-extraction failure: a source URI that doesn't parse.
#[derive(thiserror::Error, Debug)]
pub enum ReadabilityError {
    #[error("invalid source uri: {0}")]
    InvalidUri(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ReadabilityError>;

pub type CaptionResult<T> = Result<T, CaptionError>;

/// Coarse classification of a [`CaptionError`], used by the session boundary to decide how a
/// failure is surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The user supplied something that is not acceptable (e.g. a non-image file).
    Input,
    /// An image could not be decoded.
    Decode,
    /// A host capability (clipboard) is missing or refused the request.
    Capability,
    /// The requested mutation would break a scene invariant.
    Invariant,
    /// Configuration or template data is malformed.
    Config,
    /// The surface could not be encoded.
    Encode,
    /// Anything else.
    Other,
}

#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    #[error("input error: {0}")]
    Input(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("capability error: {0}")]
    Capability(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Capability(_) => ErrorKind::Capability,
            Self::Invariant(_) => ErrorKind::Invariant,
            Self::Config(_) => ErrorKind::Config,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

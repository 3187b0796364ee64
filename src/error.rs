/// Error type
#[derive(Debug)]
pub enum Error {
    /// An IO error while reading the input stream.
    Io(std::io::Error),

    /// A record could not be decoded.
    Decode(serde_json::Error),

    /// The array framing around the records is malformed.
    UnexpectedToken {
        /// What the reader was looking for
        expected: &'static str,

        /// The byte that was found instead, `None` on end of input
        found: Option<u8>,
    },

    /// A configuration variable holds an unusable value.
    InvalidConfig {
        /// Name of the variable
        key: &'static str,

        /// The rejected value
        value: String,
    },

    /// The aggregation worker panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        // NOTE: serde_json wraps reader failures, surface them as such
        if value.is_io() {
            Self::Io(value.into())
        } else {
            Self::Decode(value)
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Task(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => {
                write!(f, "{e}")
            }
            Self::Decode(e) => {
                write!(f, "invalid record: {e}")
            }
            Self::UnexpectedToken {
                expected,
                found: Some(byte),
            } => {
                write!(f, "expected {expected}, found {:?}", char::from(*byte))
            }
            Self::UnexpectedToken {
                expected,
                found: None,
            } => {
                write!(f, "expected {expected}, found end of input")
            }
            Self::InvalidConfig { key, value } => {
                write!(f, "invalid value for {key}: {value:?}")
            }
            Self::Task(e) => {
                write!(f, "aggregation task failed: {e}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Task(e) => Some(e),
            Self::UnexpectedToken { .. } | Self::InvalidConfig { .. } => None,
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;

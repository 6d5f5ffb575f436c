/// Error type
#[derive(Debug)]
pub enum Error {
    /// An IO error.
    Io(std::io::Error),

    /// Error reading or writing CSV data.
    Csv(csv::Error),

    /// Error in storage engine.
    Storage(fjall::Error),

    /// A configuration value is out of range (e.g. a bucket scale of zero).
    InvalidConfiguration(String),

    /// A field could not be parsed as the expected number.
    MalformedInput {
        /// 0-based data row (header rows are not counted)
        row: usize,

        /// The offending text
        value: String,
    },

    /// An aggregated trace is shorter than the reference (first) trace.
    TraceLengthMismatch {
        /// Position of the short trace in the input list
        trace: usize,

        /// Reference length
        expected: usize,

        /// Actual length of the short trace
        actual: usize,
    },
}

impl From<fjall::Error> for Error {
    fn from(value: fjall::Error) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => {
                write!(f, "{e}")
            }
            Self::Io(e) => {
                write!(f, "{e}")
            }
            Self::Csv(e) => {
                write!(f, "{e}")
            }
            Self::InvalidConfiguration(msg) => {
                write!(f, "InvalidConfiguration: {msg}")
            }
            Self::MalformedInput { row, value } => {
                write!(f, "MalformedInput: row {row} has non-numeric field {value:?}")
            }
            Self::TraceLengthMismatch {
                trace,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "TraceLengthMismatch: trace {trace} has {actual} rows, expected at least {expected}"
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;

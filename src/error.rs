use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("malformed timestamp in '{filename}': {reason}")]
    MalformedTimestamp { filename: String, reason: String },

    #[error("unknown range '{0}'")]
    UnknownRange(String),
}

impl TimelineError {
    pub fn malformed(filename: &str, reason: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedTimestamp { .. } => "TIMELINE_MALFORMED_TIMESTAMP",
            Self::UnknownRange(_) => "TIMELINE_UNKNOWN_RANGE",
        }
    }
}

pub type TimelineResult<T> = Result<T, TimelineError>;

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring a run or sourcing its stream.
///
/// The estimator itself is total over its input and never fails.
#[derive(Debug, Error)]
pub enum CvmError {
    #[error("invalid parameter '{param}': {msg}")]
    InvalidParameter { param: &'static str, msg: String },

    #[error("unknown stream type '{0}'")]
    UnknownStreamType(String),

    #[error("invalid logging level '{0}'")]
    InvalidLogLevel(String),

    #[error("failed to read stream file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid element '{token}' at position {position} in stream file")]
    Parse {
        token: String,
        position: usize,
        #[source]
        source: ParseIntError,
    },
}

impl CvmError {
    pub(crate) fn invalid(param: &'static str, msg: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            msg: msg.into(),
        }
    }
}

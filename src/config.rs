//! Run configuration: which stream to generate, how large it is and how large the
//! estimator buffer may grow.
//!
//! [`ConfigBuilder`] carries defaults for every parameter; [`ConfigBuilder::build`]
//! validates them and is the only way to obtain a [`Config`].

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::CvmError;

/// Kind of stream fed to the estimator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "with_serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum StreamType {
    /// `i % distinct` for every position `i`
    #[default]
    Incremental,
    /// random values from a range, repeated after `distinct` positions
    Random,
    /// whitespace separated integers read from a file
    File,
}

impl FromStr for StreamType {
    type Err = CvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incremental" => Ok(Self::Incremental),
            "random" => Ok(Self::Random),
            "file" => Ok(Self::File),
            _ => Err(CvmError::UnknownStreamType(s.to_string())),
        }
    }
}

impl Display for StreamType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Incremental => "incremental",
            Self::Random => "random",
            Self::File => "file",
        })
    }
}

/// Verbosity of the run log; `Deep` also reports every estimator decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "with_serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
    Deep,
}

impl LogLevel {
    /// Return matching `tracing` level
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Deep => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = CvmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "deep" => Ok(Self::Deep),
            _ => Err(CvmError::InvalidLogLevel(s.to_string())),
        }
    }
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize))]
pub struct Config {
    stream_type: StreamType,
    total: usize,
    distinct: usize,
    buffer_size: usize,
    random_min: i64,
    random_max: i64,
    file_path: Option<PathBuf>,
    log_level: LogLevel,
    seed: Option<u64>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn stream_type(&self) -> StreamType {
        self.stream_type
    }

    /// Return total number of elements in a generated stream
    pub fn total(&self) -> usize {
        self.total
    }

    /// Return number of distinct elements in a generated stream
    pub fn distinct(&self) -> usize {
        self.distinct
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn random_min(&self) -> i64 {
        self.random_min
    }

    pub fn random_max(&self) -> i64 {
        self.random_max
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Unvalidated configuration parameters with defaults
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "with_serde",
    derive(serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
pub struct ConfigBuilder {
    stream_type: StreamType,
    total: usize,
    distinct: usize,
    buffer_size: usize,
    random_min: i64,
    random_max: i64,
    file_path: Option<PathBuf>,
    log_level: LogLevel,
    seed: Option<u64>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            stream_type: StreamType::Incremental,
            total: 100_000_000,
            distinct: 5_000_000,
            buffer_size: 10_000,
            random_min: 0,
            random_max: 1_000_000_000,
            file_path: None,
            log_level: LogLevel::Info,
            seed: None,
        }
    }
}

impl ConfigBuilder {
    pub fn stream_type(mut self, stream_type: StreamType) -> Self {
        self.stream_type = stream_type;
        self
    }

    pub fn total(mut self, total: usize) -> Self {
        self.total = total;
        self
    }

    pub fn distinct(mut self, distinct: usize) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn random_range(mut self, min: i64, max: i64) -> Self {
        self.random_min = min;
        self.random_max = max;
        self
    }

    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate parameters and build [`Config`]
    pub fn build(self) -> Result<Config, CvmError> {
        if self.buffer_size == 0 {
            return Err(CvmError::invalid("bufferSize", "must be a positive integer"));
        }

        match self.stream_type {
            StreamType::Incremental | StreamType::Random => {
                if self.total == 0 {
                    return Err(CvmError::invalid("total", "must be a positive integer"));
                }
                if self.distinct == 0 {
                    return Err(CvmError::invalid("distinct", "must be a positive integer"));
                }
                if self.total < self.distinct {
                    return Err(CvmError::invalid(
                        "total < distinct",
                        "total number of elements can't be smaller than distinct number of elements",
                    ));
                }
                if self.stream_type == StreamType::Random && self.random_min > self.random_max {
                    return Err(CvmError::invalid(
                        "randomMin > randomMax",
                        "lower bound of random range can't be greater than upper bound",
                    ));
                }
            }
            StreamType::File => {
                if self.file_path.is_none() {
                    return Err(CvmError::invalid(
                        "filePath",
                        "must be set for file stream",
                    ));
                }
            }
        }

        Ok(Config {
            stream_type: self.stream_type,
            total: self.total,
            distinct: self.distinct,
            buffer_size: self.buffer_size,
            random_min: self.random_min,
            random_max: self.random_max,
            file_path: self.file_path,
            log_level: self.log_level,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.stream_type(), StreamType::Incremental);
        assert_eq!(config.total(), 100_000_000);
        assert_eq!(config.distinct(), 5_000_000);
        assert_eq!(config.buffer_size(), 10_000);
        assert_eq!(config.log_level(), LogLevel::Info);
        assert_eq!(config.seed(), None);
        assert_eq!(config.file_path(), None);
    }

    #[test]
    fn test_builder() {
        let config = Config::builder()
            .stream_type(StreamType::Random)
            .total(100)
            .distinct(50)
            .buffer_size(10)
            .random_range(-5, 5)
            .log_level(LogLevel::Deep)
            .seed(3)
            .build()
            .unwrap();
        assert_eq!(config.stream_type(), StreamType::Random);
        assert_eq!(config.total(), 100);
        assert_eq!(config.distinct(), 50);
        assert_eq!(config.buffer_size(), 10);
        assert_eq!((config.random_min(), config.random_max()), (-5, 5));
        assert_eq!(config.log_level(), LogLevel::Deep);
        assert_eq!(config.seed(), Some(3));
    }

    #[test_case(Config::builder().total(0) => "invalid parameter 'total': must be a positive integer"; "zero total")]
    #[test_case(Config::builder().distinct(0) => "invalid parameter 'distinct': must be a positive integer"; "zero distinct")]
    #[test_case(Config::builder().buffer_size(0) => "invalid parameter 'bufferSize': must be a positive integer"; "zero buffer size")]
    #[test_case(Config::builder().total(10).distinct(11) => "invalid parameter 'total < distinct': total number of elements can't be smaller than distinct number of elements"; "total below distinct")]
    #[test_case(Config::builder().stream_type(StreamType::Random).random_range(5, 1) => "invalid parameter 'randomMin > randomMax': lower bound of random range can't be greater than upper bound"; "inverted random range")]
    #[test_case(Config::builder().stream_type(StreamType::File) => "invalid parameter 'filePath': must be set for file stream"; "file without path")]
    fn test_validation(builder: ConfigBuilder) -> String {
        builder.build().unwrap_err().to_string()
    }

    #[test]
    fn test_file_stream_ignores_generator_sizes() {
        let config = Config::builder()
            .stream_type(StreamType::File)
            .file_path("stream.txt")
            .total(0)
            .distinct(0)
            .build()
            .unwrap();
        assert_eq!(config.file_path(), Some(Path::new("stream.txt")));
    }

    #[test_case("incremental" => StreamType::Incremental)]
    #[test_case("random" => StreamType::Random)]
    #[test_case("file" => StreamType::File)]
    fn test_stream_type_from_str(s: &str) -> StreamType {
        let stream_type: StreamType = s.parse().unwrap();
        assert_eq!(stream_type.to_string(), s);
        stream_type
    }

    #[test]
    fn test_unknown_stream_type() {
        let err = "unknown".parse::<StreamType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown stream type 'unknown'");
    }

    #[test_case("info" => tracing::Level::INFO)]
    #[test_case("debug" => tracing::Level::DEBUG)]
    #[test_case("deep" => tracing::Level::TRACE)]
    fn test_log_level(s: &str) -> tracing::Level {
        s.parse::<LogLevel>().unwrap().as_tracing_level()
    }

    #[test]
    fn test_invalid_log_level() {
        let err = "unknown".parse::<LogLevel>().unwrap_err();
        assert_eq!(err.to_string(), "invalid logging level 'unknown'");
    }

    #[cfg(feature = "with_serde")]
    #[test]
    fn test_deserialize_builder() {
        let json = r#"{"streamType": "random", "total": 1000, "distinct": 100, "bufferSize": 50, "logLevel": "debug"}"#;
        let config = serde_json::from_str::<ConfigBuilder>(json)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.stream_type(), StreamType::Random);
        assert_eq!(config.total(), 1000);
        assert_eq!(config.distinct(), 100);
        assert_eq!(config.buffer_size(), 50);
        assert_eq!(config.log_level(), LogLevel::Debug);
        assert_eq!(config.random_max(), 1_000_000_000);
    }
}

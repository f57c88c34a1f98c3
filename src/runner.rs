//! Runs the estimator over one configured stream and reports the outcome.

use tracing::info;

use crate::config::Config;
use crate::error::CvmError;
use crate::estimator::{BufferSnapshot, CvmEstimator};
use crate::random::WyRand;
use crate::stream::{Stream, StreamGenerator};
use crate::trace::{RootDisplay, TracingSink};

/// Outcome of a single pass over a stream
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize))]
pub struct RunSummary {
    /// Estimated number of distinct elements
    pub estimate: usize,
    /// Actual (or, for random streams, configured) number of distinct elements
    pub distinct: usize,
    /// Number of processed elements
    pub total: u64,
    /// `min(estimate / distinct, distinct / estimate)`
    pub precision: f64,
    pub snapshot: BufferSnapshot,
    /// Value stored in the buffer root, i.e. the one holding the maximum priority
    pub root: Option<i64>,
}

impl RunSummary {
    /// Render the buffer root as `<Value: v, Priority: p>` or `nil`
    pub fn root_display(&self) -> String {
        let root = self.root.as_ref().zip(self.snapshot.max_priority);
        RootDisplay(root).to_string()
    }
}

/// Feeds a configured stream through a [`CvmEstimator`]
#[derive(Debug, Clone)]
pub struct CvmRunner {
    config: Config,
}

impl CvmRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate the stream and estimate its number of distinct elements
    pub fn run(&self) -> Result<RunSummary, CvmError> {
        let stream = Stream::from_config(&self.config)?;
        let distinct = stream.distinct_hint().unwrap_or(self.config.distinct());
        let source = match self.config.seed() {
            Some(seed) => WyRand::new(seed),
            None => WyRand::from_entropy(),
        };
        let mut estimator = CvmEstimator::new(self.config.buffer_size())
            .with_source(source)
            .with_sink(TracingSink);

        info!(
            stream_type = %self.config.stream_type(),
            elements = stream.len(),
            buffer_size = self.config.buffer_size(),
            "starting CVM algorithm"
        );
        estimator.extend(stream);

        let estimate = estimator.estimate();
        let precision = precision(estimate, distinct);
        let percent = format!("{:.2}%", precision * 100.0);
        info!(
            n = estimate,
            precision = %percent,
            "done estimating number of distinct elements"
        );
        info!(
            size = estimator.buffer().len(),
            root = %RootDisplay(estimator.buffer().peek_max()),
            "buffer status"
        );

        Ok(RunSummary {
            estimate,
            distinct,
            total: estimator.elements_seen(),
            precision,
            snapshot: estimator.snapshot(),
            root: estimator.buffer().peek_max().map(|(value, _)| *value),
        })
    }
}

/// Return how close `estimate` is to `distinct`, as a ratio in `[0, 1]`
pub fn precision(estimate: usize, distinct: usize) -> f64 {
    if estimate == 0 || distinct == 0 {
        return if estimate == distinct { 1.0 } else { 0.0 };
    }
    let ratio = estimate as f64 / distinct as f64;
    if ratio > 1.0 {
        1.0 / ratio
    } else {
        ratio
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config::StreamType;
    use std::io::Write;
    use test_case::test_case;

    #[test_case(10, 10 => 1.0; "exact")]
    #[test_case(5, 10 => 0.5; "underestimate")]
    #[test_case(20, 10 => 0.5; "overestimate")]
    #[test_case(0, 0 => 1.0; "empty stream")]
    #[test_case(0, 10 => 0.0; "nothing estimated")]
    fn test_precision(estimate: usize, distinct: usize) -> f64 {
        precision(estimate, distinct)
    }

    #[test]
    fn test_run_exact_buffer() {
        let config = Config::builder()
            .total(1_000_000)
            .distinct(10_000)
            .buffer_size(10_000)
            .seed(1)
            .build()
            .unwrap();
        let summary = CvmRunner::new(config).run().unwrap();
        assert_eq!(summary.estimate, 10_000);
        assert_eq!(summary.distinct, 10_000);
        assert_eq!(summary.total, 1_000_000);
        assert_eq!(summary.precision, 1.0);
        assert_eq!(summary.snapshot.threshold, 1.0);
        let root = summary.root.unwrap();
        assert!((0..10_000).contains(&root));
        assert_eq!(
            summary.root_display(),
            format!(
                "<Value: {}, Priority: {:.6}>",
                root,
                summary.snapshot.max_priority.unwrap()
            )
        );
    }

    #[test]
    fn test_run_smaller_buffer() {
        let config = Config::builder()
            .total(1_000_000)
            .distinct(10_000)
            .buffer_size(1_000)
            .seed(42)
            .build()
            .unwrap();
        let summary = CvmRunner::new(config).run().unwrap();
        assert!(
            summary.estimate.abs_diff(10_000) <= 1_000,
            "estimate {}",
            summary.estimate
        );
        assert!(summary.snapshot.size <= 1_000);
        assert!(summary.precision > 0.9);
    }

    #[test]
    fn test_run_file_stream() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "7 7 8 9 9 9 10").unwrap();
        let config = Config::builder()
            .stream_type(StreamType::File)
            .file_path(file.path())
            .buffer_size(10)
            .build()
            .unwrap();
        let summary = CvmRunner::new(config).run().unwrap();
        assert_eq!(summary.estimate, 4);
        assert_eq!(summary.distinct, 4);
        assert_eq!(summary.total, 7);
    }

    #[test]
    fn test_root_display_empty_buffer() {
        let summary = RunSummary {
            estimate: 0,
            distinct: 0,
            total: 0,
            precision: 1.0,
            snapshot: CvmEstimator::<i64>::with_seed(4, 1).snapshot(),
            root: None,
        };
        assert_eq!(summary.root_display(), "nil");
    }

    #[test]
    fn test_run_missing_file() {
        let config = Config::builder()
            .stream_type(StreamType::File)
            .file_path("/nonexistent/stream/file")
            .build()
            .unwrap();
        assert!(matches!(
            CvmRunner::new(config).run(),
            Err(CvmError::Io { .. })
        ));
    }

    #[cfg(feature = "with_serde")]
    #[test]
    fn test_summary_serialize() {
        let config = Config::builder()
            .total(100)
            .distinct(10)
            .buffer_size(100)
            .seed(1)
            .build()
            .unwrap();
        let summary = CvmRunner::new(config).run().unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["estimate"], 10);
        assert_eq!(json["snapshot"]["capacity"], 100);
    }
}

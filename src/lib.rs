//! `cvm-estimator` is a Rust crate designed to estimate the number of distinct elements in a stream
//! using memory bounded by a fixed buffer capacity.
//!
//! This library implements the CVM algorithm (Chakraborty, Vinodchandran, Meel) on top of a treap,
//! keeping a priority sampled subset of distinct values and deriving the estimate from the
//! sample size and the acceptance threshold.
//!
//! ```
//! use cvm_estimator::CvmEstimator;
//!
//! let mut estimator = CvmEstimator::with_seed(1_000, 42);
//! for i in 0..100_000u32 {
//!     estimator.process(i % 500);
//! }
//! assert_eq!(estimator.estimate(), 500);
//! ```
pub mod config;
pub mod error;
pub mod estimator;
pub mod random;
pub mod runner;
pub mod stream;
pub mod trace;
pub mod treap;

pub use config::{Config, ConfigBuilder, LogLevel, StreamType};
pub use error::CvmError;
pub use estimator::{BufferSnapshot, CvmEstimator};
pub use random::{RngSource, UniformSource, WyRand};
pub use runner::{CvmRunner, RunSummary};
pub use stream::{Stream, StreamGenerator};
pub use trace::{NoopSink, TraceEvent, TraceSink, TracingSink};
pub use treap::{Comparator, NaturalOrder, TreapBuffer};

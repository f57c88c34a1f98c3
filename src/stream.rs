//! Stream generators feeding the estimator.
//!
//! Every generator yields `i64` elements one at a time and knows how many elements
//! remain, so a [`Stream`] is an [`ExactSizeIterator`]. Generators are dispatched
//! statically through [`Stream`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use enum_dispatch::enum_dispatch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, trace};

use crate::config::{Config, StreamType};
use crate::error::CvmError;

/// Operations shared by all stream generators
#[enum_dispatch]
pub trait StreamGenerator {
    /// Return next element, or `None` once the stream is exhausted
    fn next_element(&mut self) -> Option<i64>;
    /// Return number of elements not yet produced
    fn remaining(&self) -> usize;
    /// Return number of distinct elements in the whole stream, when known
    fn distinct_hint(&self) -> Option<usize>;
}

/// Stream generator types
#[enum_dispatch(StreamGenerator)]
#[derive(Debug)]
pub enum Stream {
    Incremental(IncrementalStream),
    Random(RandomStream),
    File(FileStream),
}

impl Stream {
    /// Create the generator described by `config`
    pub fn from_config(config: &Config) -> Result<Self, CvmError> {
        let stream: Stream = match config.stream_type() {
            StreamType::Incremental => {
                IncrementalStream::new(config.total(), config.distinct()).into()
            }
            StreamType::Random => {
                let rng = match config.seed() {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                RandomStream::new(
                    config.total(),
                    config.distinct(),
                    config.random_min()..=config.random_max(),
                    rng,
                )
                .into()
            }
            StreamType::File => {
                let path = config
                    .file_path()
                    .ok_or_else(|| CvmError::invalid("filePath", "must be set for file stream"))?;
                FileStream::open(path)?.into()
            }
        };
        Ok(stream)
    }
}

impl Iterator for Stream {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<i64> {
        self.next_element()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Stream {}

/// Yields `i % distinct` for `i` in `0..total`
#[derive(Debug, Clone)]
pub struct IncrementalStream {
    total: usize,
    distinct: usize,
    position: usize,
}

impl IncrementalStream {
    pub fn new(total: usize, distinct: usize) -> Self {
        Self {
            total,
            distinct,
            position: 0,
        }
    }
}

impl StreamGenerator for IncrementalStream {
    #[inline]
    fn next_element(&mut self) -> Option<i64> {
        if self.position >= self.total || self.distinct == 0 {
            return None;
        }
        let element = (self.position % self.distinct) as i64;
        self.position += 1;
        Some(element)
    }

    fn remaining(&self) -> usize {
        if self.distinct == 0 {
            return 0;
        }
        self.total - self.position
    }

    fn distinct_hint(&self) -> Option<usize> {
        Some(self.distinct.min(self.total))
    }
}

/// Draws `distinct` values uniformly from a range, then repeats them round-robin.
///
/// Draws may collide, so `distinct` is an upper bound on the number of distinct elements.
#[derive(Debug, Clone)]
pub struct RandomStream {
    total: usize,
    position: usize,
    range: std::ops::RangeInclusive<i64>,
    head: Vec<i64>,
    distinct: usize,
    rng: StdRng,
}

impl RandomStream {
    pub fn new(
        total: usize,
        distinct: usize,
        range: std::ops::RangeInclusive<i64>,
        rng: StdRng,
    ) -> Self {
        Self {
            total,
            position: 0,
            range,
            head: Vec::with_capacity(distinct.min(total)),
            distinct,
            rng,
        }
    }
}

impl StreamGenerator for RandomStream {
    fn next_element(&mut self) -> Option<i64> {
        if self.position >= self.total || self.distinct == 0 || self.range.is_empty() {
            return None;
        }
        let element = if self.position < self.distinct {
            let element = self.rng.gen_range(self.range.clone());
            self.head.push(element);
            element
        } else {
            self.head[self.position % self.distinct]
        };
        self.position += 1;
        Some(element)
    }

    fn remaining(&self) -> usize {
        if self.distinct == 0 || self.range.is_empty() {
            return 0;
        }
        self.total - self.position
    }

    fn distinct_hint(&self) -> Option<usize> {
        None
    }
}

/// Whitespace separated integers read from a file
#[derive(Debug, Clone)]
pub struct FileStream {
    path: PathBuf,
    elements: Vec<i64>,
    distinct: usize,
    position: usize,
}

impl FileStream {
    /// Read and parse the whole file, counting its distinct elements
    pub fn open(path: &Path) -> Result<Self, CvmError> {
        info!(path = %path.display(), "started generating stream from file");
        let content = std::fs::read_to_string(path).map_err(|source| CvmError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stream = Self::parse(path, &content)?;
        info!(
            distinct = stream.distinct,
            total = stream.elements.len(),
            "stream generated"
        );
        Ok(stream)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, CvmError> {
        let mut elements = Vec::new();
        let mut found = HashSet::new();
        for (position, token) in content.split_whitespace().enumerate() {
            let element: i64 = token.parse().map_err(|source| CvmError::Parse {
                token: token.to_string(),
                position,
                source,
            })?;
            trace!(element, position, "element appended to stream");
            found.insert(element);
            elements.push(element);
        }
        Ok(Self {
            path: path.to_path_buf(),
            elements,
            distinct: found.len(),
            position: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StreamGenerator for FileStream {
    #[inline]
    fn next_element(&mut self) -> Option<i64> {
        let element = self.elements.get(self.position).copied()?;
        self.position += 1;
        Some(element)
    }

    fn remaining(&self) -> usize {
        self.elements.len() - self.position
    }

    fn distinct_hint(&self) -> Option<usize> {
        Some(self.distinct)
    }
}

//! CVM estimator allows to estimate number of distinct elements in a stream
//! using memory bounded by a fixed `capacity`.
//!
//! # Algorithm
//!
//! The estimator keeps a threshold `p`, starting at `1.0`, and a [`TreapBuffer`] holding
//! every distinct value seen so far whose independently drawn priority is below `p`.
//! For each element of the stream:
//! 1. draw `u` uniformly in `[0, 1)`,
//! 2. delete any previous occurrence of the element from the buffer,
//! 3. if `u >= p` the element is rejected,
//! 4. otherwise, if the buffer has room, the element is stored with priority `u`,
//! 5. otherwise, with `m` the maximum stored priority (the buffer root):
//!    - if `u > m`, the threshold drops to `u` and the element is not stored,
//!    - else the threshold drops to `m`, the root is evicted and the element is stored.
//!
//! The estimate is `size / p` truncated towards zero. While the number of distinct
//! elements does not exceed `capacity`, `p` stays at `1.0` and the count is exact.
//!
//! Every step costs `O(log capacity)` expected time and memory never exceeds
//! `capacity` nodes, regardless of the stream length.
//!
//! ## Zero capacity
//! With `capacity == 0` nothing is ever stored. There is no root to compare against,
//! so every accepted draw lowers the threshold to itself and `p` decays towards 0,
//! while [`CvmEstimator::estimate`] keeps returning 0.

use std::fmt::{Debug, Formatter};

use crate::random::{UniformSource, WyRand};
use crate::trace::{NoopSink, TraceEvent, TraceSink};
use crate::treap::{Comparator, NaturalOrder, TreapBuffer};

/// Read-only view of the estimator state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "with_serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferSnapshot {
    /// Number of distinct values currently stored
    pub size: usize,
    pub capacity: usize,
    /// Priority of the buffer root, `None` while the buffer is empty
    pub max_priority: Option<f64>,
    /// Current acceptance threshold `p`
    pub threshold: f64,
    pub elements_seen: u64,
}

/// Distinct-count estimator over values of type `T`.
///
/// - `C`: comparator defining the total order of buffered values.
/// - `R`: uniform source used to draw priorities.
/// - `S`: sink receiving trace events.
pub struct CvmEstimator<T, C = NaturalOrder, R = WyRand, S = NoopSink> {
    buffer: TreapBuffer<T, C>,
    /// Acceptance threshold, non-increasing over the run
    p: f64,
    elements_seen: u64,
    source: R,
    sink: S,
}

impl<T: Ord> CvmEstimator<T> {
    /// Creates new estimator with natural ordering and an entropy seeded source
    pub fn new(capacity: usize) -> Self {
        Self::with_comparator(capacity, NaturalOrder)
    }

    /// Creates new estimator with natural ordering and a seeded source
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::from_parts(TreapBuffer::new(capacity), WyRand::new(seed), NoopSink)
    }
}

impl<T, C: Comparator<T>> CvmEstimator<T, C> {
    /// Creates new estimator ordering buffered values with `order`
    pub fn with_comparator(capacity: usize, order: C) -> Self {
        Self::from_parts(
            TreapBuffer::with_comparator(capacity, order),
            WyRand::from_entropy(),
            NoopSink,
        )
    }
}

impl<T, C, R, S> CvmEstimator<T, C, R, S> {
    fn from_parts(buffer: TreapBuffer<T, C>, source: R, sink: S) -> Self {
        Self {
            buffer,
            p: 1.0,
            elements_seen: 0,
            source,
            sink,
        }
    }

    /// Replace the uniform source used to draw priorities
    pub fn with_source<R2: UniformSource>(self, source: R2) -> CvmEstimator<T, C, R2, S> {
        CvmEstimator {
            buffer: self.buffer,
            p: self.p,
            elements_seen: self.elements_seen,
            source,
            sink: self.sink,
        }
    }

    /// Replace the sink receiving trace events
    pub fn with_sink<S2: TraceSink<T>>(self, sink: S2) -> CvmEstimator<T, C, R, S2> {
        CvmEstimator {
            buffer: self.buffer,
            p: self.p,
            elements_seen: self.elements_seen,
            source: self.source,
            sink,
        }
    }

    /// Return current estimate of the number of distinct elements
    #[inline]
    pub fn estimate(&self) -> usize {
        if self.buffer.is_empty() {
            return 0;
        }
        (self.buffer.len() as f64 / self.p) as usize
    }

    /// Return current acceptance threshold `p`
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.p
    }

    #[inline]
    pub fn elements_seen(&self) -> u64 {
        self.elements_seen
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Return underlying buffer
    #[inline]
    pub fn buffer(&self) -> &TreapBuffer<T, C> {
        &self.buffer
    }

    /// Return read-only view of the estimator state
    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            size: self.buffer.len(),
            capacity: self.buffer.capacity(),
            max_priority: self.buffer.peek_max_priority(),
            threshold: self.p,
            elements_seen: self.elements_seen,
        }
    }
}

impl<T, C, R, S> CvmEstimator<T, C, R, S>
where
    C: Comparator<T>,
    R: UniformSource,
    S: TraceSink<T>,
{
    /// Process next stream element and return the updated estimate
    pub fn process(&mut self, value: T) -> usize {
        self.elements_seen += 1;
        let u = self.source.next_uniform();
        self.sink.record(TraceEvent::Step {
            index: self.elements_seen,
            threshold: self.p,
            draw: u,
            root: self.buffer.peek_max(),
        });

        if self.buffer.delete(&value) {
            self.sink.record(TraceEvent::Removed { value: &value });
        }

        if u >= self.p {
            self.sink.record(TraceEvent::Rejected {
                value: &value,
                draw: u,
                threshold: self.p,
            });
            return self.estimate();
        }

        if !self.buffer.is_full() {
            self.sink.record(TraceEvent::Admitted {
                value: &value,
                draw: u,
            });
            self.buffer.insert(value, u);
            return self.estimate();
        }

        match self.buffer.peek_max_priority() {
            Some(m) if u <= m => {
                self.p = m;
                if let Some((evicted, _)) = self.buffer.pop_max() {
                    self.sink.record(TraceEvent::Evicted {
                        evicted: &evicted,
                        threshold: m,
                        value: &value,
                        draw: u,
                    });
                }
                self.buffer.insert(value, u);
            }
            // also taken at zero capacity, where there is no root
            _ => {
                self.sink.record(TraceEvent::ThresholdLowered {
                    previous: self.p,
                    threshold: u,
                });
                self.p = u;
            }
        }
        self.estimate()
    }
}

impl<T, C, R, S> Extend<T> for CvmEstimator<T, C, R, S>
where
    C: Comparator<T>,
    R: UniformSource,
    S: TraceSink<T>,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.process(value);
        }
    }
}

impl<T, C, R, S> Debug for CvmEstimator<T, C, R, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ size: {}, capacity: {}, threshold: {}, estimate: {} }}",
            self.buffer.len(),
            self.buffer.capacity(),
            self.p,
            self.estimate()
        )
    }
}

//! Trace events emitted by the estimator while processing a stream.
//!
//! Events are delivered to an injected [`TraceSink`]; they are informational only and
//! never influence the estimator's control flow. [`TracingSink`] forwards them to the
//! `tracing` ecosystem, [`NoopSink`] discards them.

use std::fmt::Debug;

use tracing::{debug, trace};

/// Single step of the estimator's state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceEvent<'a, T> {
    /// New element drawn; `index` is 1-based.
    Step {
        index: u64,
        threshold: f64,
        draw: f64,
        root: Option<(&'a T, f64)>,
    },
    /// Previous occurrence of the element removed from the buffer.
    Removed { value: &'a T },
    /// Draw is not below the threshold, element discarded.
    Rejected { value: &'a T, draw: f64, threshold: f64 },
    /// Buffer had room, element stored with its draw as priority.
    Admitted { value: &'a T, draw: f64 },
    /// Buffer full and draw above every stored priority: threshold moved to the draw.
    ThresholdLowered { previous: f64, threshold: f64 },
    /// Buffer full: root evicted, threshold moved to its priority, element stored.
    Evicted {
        evicted: &'a T,
        threshold: f64,
        value: &'a T,
        draw: f64,
    },
}

/// Receiver of [`TraceEvent`]s
pub trait TraceSink<T> {
    fn record(&mut self, event: TraceEvent<'_, T>);
}

/// Sink discarding every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl<T> TraceSink<T> for NoopSink {
    #[inline]
    fn record(&mut self, _event: TraceEvent<'_, T>) {}
}

/// Sink emitting events through `tracing`: steps at `DEBUG`, decisions at `TRACE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl<T: Debug> TraceSink<T> for TracingSink {
    fn record(&mut self, event: TraceEvent<'_, T>) {
        match event {
            TraceEvent::Step {
                index,
                threshold,
                draw,
                root,
            } => debug!(
                index,
                p = threshold,
                u = draw,
                root = %RootDisplay(root),
                "starting loop"
            ),
            TraceEvent::Removed { value } => {
                trace!(value = ?value, "removed previous occurrence from buffer")
            }
            TraceEvent::Rejected {
                value,
                draw,
                threshold,
            } => trace!(value = ?value, u = draw, p = threshold, "rejected by threshold"),
            TraceEvent::Admitted { value, draw } => {
                trace!(value = ?value, u = draw, "buffer not full, inserting new node")
            }
            TraceEvent::ThresholdLowered {
                previous,
                threshold,
            } => trace!(previous, p = threshold, "setting new threshold from draw"),
            TraceEvent::Evicted {
                evicted,
                threshold,
                value,
                draw,
            } => trace!(
                evicted = ?evicted,
                p = threshold,
                value = ?value,
                u = draw,
                "setting new threshold from root priority, root evicted"
            ),
        }
    }
}

/// Renders the buffer root as `<Value: v, Priority: p>` or `nil`
pub(crate) struct RootDisplay<'a, T>(pub(crate) Option<(&'a T, f64)>);

impl<T: Debug> std::fmt::Display for RootDisplay<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some((value, priority)) => write!(f, "<Value: {:?}, Priority: {:.6}>", value, priority),
            None => write!(f, "nil"),
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing::Level;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(level: Level, events: &[TraceEvent<'_, i32>]) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut sink = TracingSink;
            for event in events {
                sink.record(*event);
            }
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_root_display() {
        assert_eq!(RootDisplay::<i32>(None).to_string(), "nil");
        assert_eq!(
            RootDisplay(Some((&7, 0.25))).to_string(),
            "<Value: 7, Priority: 0.250000>"
        );
    }

    #[test]
    fn test_tracing_sink_levels() {
        let events = [
            TraceEvent::Step {
                index: 1,
                threshold: 1.0,
                draw: 0.5,
                root: None,
            },
            TraceEvent::Admitted {
                value: &3,
                draw: 0.5,
            },
        ];

        let debug = capture(Level::DEBUG, &events);
        assert!(debug.contains("starting loop"), "{}", debug);
        assert!(debug.contains("root=nil"), "{}", debug);
        assert!(!debug.contains("inserting new node"), "{}", debug);

        let deep = capture(Level::TRACE, &events);
        assert!(deep.contains("starting loop"), "{}", deep);
        assert!(deep.contains("buffer not full, inserting new node"), "{}", deep);
        assert!(deep.contains("value=3"), "{}", deep);

        let info = capture(Level::INFO, &events);
        assert!(info.is_empty(), "{}", info);
    }

    #[test]
    fn test_noop_sink() {
        let mut sink = NoopSink;
        sink.record(TraceEvent::Removed { value: &1 });
    }
}

// SPDX-License-Identifier: MPL-2.0
//! Startup timing marks.
//!
//! The bootstrap drops named marks at fixed points of the startup sequence so
//! the embedding application can later measure "localization setup" and
//! "entry import" phases. Marks carry the elapsed time since the recorder was
//! created and are kept in a bounded buffer; if a startup somehow emits more
//! marks than the buffer holds, the oldest are dropped.

mod buffer;

pub use buffer::RingBuffer;

use crate::config::DEFAULT_MARK_CAPACITY;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Mark names emitted by the bootstrap.
pub mod marks {
    /// Localization setup begins.
    pub const WILL_LOAD_NLS: &str = "code/willLoadNls";
    /// A message catalog load was attempted (successfully or not).
    pub const DID_LOAD_NLS: &str = "code/didLoadNls";
    /// Localization has settled and the entry module import begins.
    pub const WILL_LOAD_CODE: &str = "code/fork/willLoadCode";
    /// The entry module import settled.
    pub const DID_LOAD_CODE: &str = "code/fork/didLoadCode";
}

/// A single recorded mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub name: String,
    /// Time since the recorder was created.
    pub elapsed: Duration,
}

/// Thread-safe recorder of startup marks.
#[derive(Debug)]
pub struct PerformanceMarks {
    origin: Instant,
    buffer: Mutex<RingBuffer<Mark>>,
}

impl Default for PerformanceMarks {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MARK_CAPACITY)
    }
}

impl PerformanceMarks {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            origin: Instant::now(),
            buffer: Mutex::new(RingBuffer::with_capacity(capacity)),
        }
    }

    /// Records `name` at the current instant.
    pub fn mark(&self, name: &str) {
        let mark = Mark {
            name: name.to_string(),
            elapsed: self.origin.elapsed(),
        };
        tracing::trace!(mark = name, elapsed_us = mark.elapsed.as_micros() as u64, "perf mark");

        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.push(mark);
    }

    /// All retained marks, oldest first.
    #[must_use]
    pub fn marks(&self) -> Vec<Mark> {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.iter().cloned().collect()
    }

    /// Names of all retained marks, oldest first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.marks().into_iter().map(|mark| mark.name).collect()
    }

    /// Position of the first mark called `name`, if any.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.marks().iter().position(|mark| mark.name == name)
    }
}

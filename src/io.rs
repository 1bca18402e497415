//! Host-side I/O channels.
//!
//! Channels belong to the caller and are lent to the computer for the span of
//! one [`resume`](crate::Computer::resume) call. The computer never blocks on
//! them: an empty input channel is itself the signal to suspend.

use std::collections::VecDeque;

/// Source of values for the input instruction.
pub trait InputChannel {
    /// Whether a value is ready to be taken.
    fn has_value(&self) -> bool;

    /// Take the next value, if any.
    fn next(&mut self) -> Option<i64>;
}

/// Sink for values emitted by the output instruction.
pub trait OutputChannel {
    fn add_output(&mut self, value: i64);
}

impl InputChannel for VecDeque<i64> {
    fn has_value(&self) -> bool {
        !self.is_empty()
    }

    fn next(&mut self) -> Option<i64> {
        self.pop_front()
    }
}

impl OutputChannel for VecDeque<i64> {
    fn add_output(&mut self, value: i64) {
        self.push_back(value);
    }
}

impl OutputChannel for Vec<i64> {
    fn add_output(&mut self, value: i64) {
        self.push(value);
    }
}

/// Input channel that never has a value.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputChannel for NoInput {
    fn has_value(&self) -> bool {
        false
    }

    fn next(&mut self) -> Option<i64> {
        None
    }
}

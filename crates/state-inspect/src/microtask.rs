//! Work deferred until the current synchronous pass has finished.

use std::collections::VecDeque;

use crate::subscribers::PassToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Microtask {
    /// Attribute the reads of a render pass to its consumer.
    FinalizeReadPass(PassToken),
}

/// FIFO queue of [`Microtask`]s, drained by the host's run loop.
#[derive(Debug, Default)]
pub struct MicrotaskQueue {
    tasks: VecDeque<Microtask>,
}

impl MicrotaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Microtask) {
        self.tasks.push_back(task);
    }

    pub fn pop(&mut self) -> Option<Microtask> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

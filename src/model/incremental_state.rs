//! Incremental-evaluation state bag.
//!
//! Holds the step position a decoder carries across successive single-step
//! calls. The frontend in this crate never performs incremental evaluation;
//! it only checks whether a bag was passed and rejects the call if so.

/// Opaque container for state cached across incremental decoding steps.
#[derive(Debug, Clone, Default)]
pub struct IncrementalStateBag {
    step: usize,
    max_num_steps: Option<usize>,
}

impl IncrementalStateBag {
    /// Create a bag, optionally bounded to `max_num_steps` decoding steps.
    pub fn new(max_num_steps: Option<usize>) -> Self {
        Self {
            step: 0,
            max_num_steps,
        }
    }

    /// Current decoding step.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Maximum number of steps, if bounded.
    pub fn max_num_steps(&self) -> Option<usize> {
        self.max_num_steps
    }

    /// Advance to the next decoding step.
    pub fn increment_step(&mut self) {
        self.step += 1;
    }
}

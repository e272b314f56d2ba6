//! Scripted RNG for tests
//!
//! Feeds a queue of raw values to [`RandomSource::below`], reducing each
//! modulo the requested bound. Once the queue is empty it falls back to a
//! fixed bias, so a test only has to script the rolls it cares about.

use std::collections::VecDeque;

use crate::RandomSource;

/// What a [`RiggedRng`] returns once its script runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
    /// Always 0: every `chance` and `one_in` succeeds.
    #[default]
    Low,
    /// Always `n - 1`: every `chance(x, y)` with `x < y` fails.
    High,
}

#[derive(Debug, Clone, Default)]
pub struct RiggedRng {
    script: VecDeque<u32>,
    bias: Bias,
    calls: usize,
}

impl RiggedRng {
    pub fn new(bias: Bias) -> Self {
        Self {
            script: VecDeque::new(),
            bias,
            calls: 0,
        }
    }

    /// Queue raw values to be returned, in order, before falling back.
    pub fn with_script(bias: Bias, values: &[u32]) -> Self {
        Self {
            script: values.iter().copied().collect(),
            bias,
            calls: 0,
        }
    }

    pub fn push(&mut self, value: u32) {
        self.script.push_back(value);
    }

    /// Number of calls made to `below`.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Scripted values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl RandomSource for RiggedRng {
    fn below(&mut self, n: u32) -> u32 {
        self.calls += 1;
        if n == 0 {
            return 0;
        }
        match self.script.pop_front() {
            Some(v) => v % n,
            None => match self.bias {
                Bias::Low => 0,
                Bias::High => n - 1,
            },
        }
    }
}

// Stagger delays for revealing N items in sequence.
// Linear mode spaces items evenly; Fibonacci mode widens the gap before each later item.

use crate::accessibility::MotionGate;
use crate::constants::PHI_INV;
use crate::fibonacci::{self, FibonacciProvider};
use crate::types::SequenceOptions;

/// Uniform per-item delay used when reduced motion is preferred (seconds).
pub const REDUCED_MOTION_DELAY: f64 = 0.05;

/// First Fibonacci index drawn for weights. Skips the degenerate leading `1, 1`.
const FIRST_WEIGHT_INDEX: usize = 2;

/// Computes per-item delays in logical order.
///
/// Direction is not applied here: callers map logical index `i` to the
/// physical step they reveal.
#[derive(Debug, Clone)]
pub struct StaggerDistributor {
    fibonacci: &'static FibonacciProvider,
    gate: MotionGate,
}

impl StaggerDistributor {
    pub fn new(gate: MotionGate) -> Self {
        StaggerDistributor {
            fibonacci: fibonacci::shared(),
            gate,
        }
    }

    /// Delay before each item, in seconds.
    pub fn distribute(&self, options: &SequenceOptions) -> Vec<f64> {
        let steps = options.step_count();
        if steps == 0 {
            return Vec::new();
        }

        if self.gate.is_reduced_motion_preferred() {
            // A tight budget still wins over the minimal delay.
            let delay = match options.total_budget() {
                Some(total) => REDUCED_MOTION_DELAY.min(total / steps as f64),
                None => REDUCED_MOTION_DELAY,
            };
            return vec![delay; steps];
        }

        let base_delay = non_negative(options.base_delay);

        if !options.use_fibonacci {
            let delay = match options.total_budget() {
                Some(total) => total / steps as f64,
                None => base_delay,
            };
            return vec![delay; steps];
        }

        let weights = self
            .fibonacci
            .range_slice(FIRST_WEIGHT_INDEX, FIRST_WEIGHT_INDEX + steps);
        let sum: f64 = weights.iter().map(|w| *w as f64).sum();
        let denominator = if sum > 0.0 { sum } else { 1.0 };

        let scale = match options.total_budget() {
            Some(total) => total * PHI_INV,
            None => base_delay * steps as f64,
        };

        weights
            .iter()
            .map(|w| (*w as f64 / denominator) * scale)
            .collect()
    }

    /// Cumulative activation time of each item: `initial_delay + Σ_{k≤i} delays[k]`.
    pub fn offsets(&self, options: &SequenceOptions) -> Vec<f64> {
        let mut elapsed = non_negative(options.initial_delay);
        self.distribute(options)
            .into_iter()
            .map(|delay| {
                elapsed += delay;
                elapsed
            })
            .collect()
    }
}

impl Default for StaggerDistributor {
    fn default() -> Self {
        StaggerDistributor::new(MotionGate::default())
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// Reduced-motion gate. The preference is an injected capability, re-read on every query.
// Rule: when the user asks for less motion, flatten it; never fail because the signal is missing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source of the platform's "prefers reduced motion" preference.
pub trait MotionPreference: Send + Sync {
    fn prefers_reduced_motion(&self) -> bool;
}

/// Used when the environment exposes no accessibility API. Motion is acceptable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreference;

impl MotionPreference for NoPreference {
    fn prefers_reduced_motion(&self) -> bool {
        false
    }
}

/// Shared flag the host flips when the media query changes.
/// Clones observe the same value.
#[derive(Debug, Clone, Default)]
pub struct ReducedMotionSignal(Arc<AtomicBool>);

impl ReducedMotionSignal {
    pub fn new(initial: bool) -> Self {
        ReducedMotionSignal(Arc::new(AtomicBool::new(initial)))
    }

    pub fn set(&self, reduced: bool) {
        self.0.store(reduced, Ordering::Relaxed);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl MotionPreference for ReducedMotionSignal {
    fn prefers_reduced_motion(&self) -> bool {
        self.get()
    }
}

/// Duration multiplier under reduced motion.
pub const REDUCED_DURATION_FACTOR: f64 = 0.5;
/// Distance multiplier under reduced motion.
pub const REDUCED_DISTANCE_FACTOR: f64 = 0.3;
/// Fraction of a scale delta (away from 1.0) kept under reduced motion.
pub const REDUCED_SCALE_FACTOR: f64 = 0.3;

/// Motion parameters that can be de-amplified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionValues {
    /// Seconds.
    pub duration: f64,
    /// Pixels.
    pub distance: f64,
    /// Multiplicative scale, 1.0 = unchanged.
    pub scale: f64,
}

impl MotionValues {
    pub fn new(duration: f64, distance: f64, scale: f64) -> Self {
        MotionValues {
            duration,
            distance,
            scale,
        }
    }
}

/// Consulted by every component before producing motion.
#[derive(Clone)]
pub struct MotionGate {
    source: Arc<dyn MotionPreference>,
}

impl MotionGate {
    pub fn new(source: Arc<dyn MotionPreference>) -> Self {
        MotionGate { source }
    }

    pub fn from_signal(signal: ReducedMotionSignal) -> Self {
        MotionGate::new(Arc::new(signal))
    }

    pub fn is_reduced_motion_preferred(&self) -> bool {
        self.source.prefers_reduced_motion()
    }

    /// Shorten duration, shrink distance and pull scale toward 1 when reduced motion is active.
    pub fn adapt(&self, values: MotionValues) -> MotionValues {
        if !self.is_reduced_motion_preferred() {
            return values;
        }
        MotionValues {
            duration: values.duration * REDUCED_DURATION_FACTOR,
            distance: values.distance * REDUCED_DISTANCE_FACTOR,
            scale: 1.0 + (values.scale - 1.0) * REDUCED_SCALE_FACTOR,
        }
    }

    /// Gated duration in seconds.
    pub fn duration(&self, seconds: f64) -> f64 {
        if self.is_reduced_motion_preferred() {
            seconds * REDUCED_DURATION_FACTOR
        } else {
            seconds
        }
    }
}

impl Default for MotionGate {
    fn default() -> Self {
        MotionGate::new(Arc::new(NoPreference))
    }
}

impl fmt::Debug for MotionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionGate")
            .field("reduced_motion", &self.is_reduced_motion_preferred())
            .finish()
    }
}

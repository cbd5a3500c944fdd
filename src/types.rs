// Strong typing over strings. Newtypes for timer granularity, option structs for the host.
// Every option field carries a serde default so partial JSON from JS is always valid.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Milliseconds on the scheduler's logical clock. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Millis(u64);

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub const fn from_millis(ms: u64) -> Self {
        Millis(ms)
    }

    /// Convert seconds to the millisecond timer granularity.
    /// Negative, NaN and infinite inputs become zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Millis(0);
        }
        Millis((secs * 1000.0).round() as u64)
    }

    /// Lossy conversion for values arriving from JS numbers.
    pub fn from_f64_lossy(ms: f64) -> Self {
        if !ms.is_finite() || ms <= 0.0 {
            return Millis(0);
        }
        Millis(ms.round() as u64)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_secs(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn saturating_add(self, other: Millis) -> Self {
        Millis(self.0.saturating_add(other.0))
    }
}

/// Order in which a sequence reveals its steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// Most steps a single sequence schedules. Larger counts are rejected by validation
/// and truncated by `SequenceOptions::step_count`.
pub const MAX_TOTAL_STEPS: usize = 4096;

/// Options for a staggered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceOptions {
    #[serde(default = "default_total_steps")]
    pub total_steps: usize,
    /// Delay between steps in seconds (linear mode) or per-step budget (Fibonacci mode).
    #[serde(default = "default_base_delay")]
    pub base_delay: f64,
    /// Optional overall budget in seconds. Overrides `base_delay` when positive.
    #[serde(default)]
    pub total_duration: Option<f64>,
    #[serde(default)]
    pub use_fibonacci: bool,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub initial_delay: f64,
}

fn default_total_steps() -> usize {
    1
}

fn default_base_delay() -> f64 {
    0.1
}

impl Default for SequenceOptions {
    fn default() -> Self {
        SequenceOptions {
            total_steps: default_total_steps(),
            base_delay: default_base_delay(),
            total_duration: None,
            use_fibonacci: false,
            direction: Direction::Forward,
            looping: false,
            initial_delay: 0.0,
        }
    }
}

impl SequenceOptions {
    pub fn new(total_steps: usize) -> Self {
        SequenceOptions {
            total_steps,
            ..Default::default()
        }
    }

    /// Number of steps actually scheduled.
    pub fn step_count(&self) -> usize {
        self.total_steps.min(MAX_TOTAL_STEPS)
    }

    /// Total budget if one was supplied and is usable.
    pub fn total_budget(&self) -> Option<f64> {
        self.total_duration.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Map a logical (reveal-order) index to the physical step it activates.
    pub fn physical_step(&self, logical: usize) -> usize {
        match self.direction {
            Direction::Forward => logical,
            Direction::Reverse => self.step_count().saturating_sub(1).saturating_sub(logical),
        }
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        if !self.base_delay.is_finite() || self.base_delay < 0.0 {
            return Err(MotionError::InvalidConfig(format!(
                "sequence.base_delay must be a non-negative number, got {}",
                self.base_delay
            )));
        }
        if self.total_steps > MAX_TOTAL_STEPS {
            return Err(MotionError::InvalidConfig(format!(
                "sequence.total_steps must be at most {}, got {}",
                MAX_TOTAL_STEPS, self.total_steps
            )));
        }
        Ok(())
    }
}

/// Scroll-coupled transform options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxOptions {
    /// Speed multiplier. The sign selects the direction of travel.
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub horizontal: bool,
    #[serde(default)]
    pub use_golden_ratio: bool,
    /// Maximum travel in pixels.
    #[serde(default = "default_range")]
    pub range: f64,
    /// Which point of the element (0 = leading edge, 1 = trailing edge) drives progress.
    #[serde(default = "default_offset_fraction")]
    pub offset_fraction: f64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub use_easing: bool,
}

fn default_speed() -> f64 {
    0.5
}

fn default_range() -> f64 {
    100.0
}

fn default_offset_fraction() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

impl Default for ParallaxOptions {
    fn default() -> Self {
        ParallaxOptions {
            speed: default_speed(),
            horizontal: false,
            use_golden_ratio: false,
            range: default_range(),
            offset_fraction: default_offset_fraction(),
            enabled: true,
            use_easing: false,
        }
    }
}

impl ParallaxOptions {
    pub fn validate(&self) -> Result<(), MotionError> {
        if !(0.0..=1.0).contains(&self.offset_fraction) {
            return Err(MotionError::InvalidConfig(format!(
                "parallax.offset_fraction must be within [0, 1], got {}",
                self.offset_fraction
            )));
        }
        Ok(())
    }
}

/// Element bounding box in viewport coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ElementRect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        ElementRect {
            top,
            left,
            width,
            height,
        }
    }
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        ViewportSize { width, height }
    }
}

/// Engine configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Initial value of the reduced-motion signal.
    #[serde(default)]
    pub reduced_motion: bool,
    /// Defaults for sequences created without explicit options.
    #[serde(default)]
    pub sequence: SequenceOptions,
    /// Defaults for parallax trackers created without explicit options.
    #[serde(default)]
    pub parallax: ParallaxOptions,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, MotionError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), MotionError> {
        self.sequence.validate()?;
        self.parallax.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_conversions() {
        let ms = Millis::from_secs_f64(1.5);
        assert_eq!(ms.as_millis(), 1500);
        assert!((ms.as_secs() - 1.5).abs() < 0.0001);
    }

    #[test]
    fn millis_clamps_degenerate_seconds() {
        assert_eq!(Millis::from_secs_f64(-2.0), Millis::ZERO);
        assert_eq!(Millis::from_secs_f64(f64::NAN), Millis::ZERO);
        assert_eq!(Millis::from_f64_lossy(f64::INFINITY), Millis::ZERO);
    }

    #[test]
    fn reverse_maps_logical_to_physical() {
        let options = SequenceOptions {
            direction: Direction::Reverse,
            ..SequenceOptions::new(4)
        };
        assert_eq!(options.physical_step(0), 3);
        assert_eq!(options.physical_step(3), 0);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert!(!config.reduced_motion);
        assert_eq!(config.sequence, SequenceOptions::default());
        assert_eq!(config.parallax, ParallaxOptions::default());
    }

    #[test]
    fn partial_sequence_config() {
        let config = EngineConfig::from_json(
            r#"{"sequence":{"total_steps":5,"use_fibonacci":true,"direction":"reverse","loop":true}}"#,
        )
        .unwrap();
        assert_eq!(config.sequence.total_steps, 5);
        assert!(config.sequence.use_fibonacci);
        assert!(config.sequence.looping);
        assert_eq!(config.sequence.direction, Direction::Reverse);
        assert!((config.sequence.base_delay - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_offset_fraction() {
        let err = EngineConfig::from_json(r#"{"parallax":{"offset_fraction":1.5}}"#).unwrap_err();
        assert!(matches!(err, MotionError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_oversized_step_count() {
        let err = EngineConfig::from_json(r#"{"sequence":{"total_steps":1000000}}"#).unwrap_err();
        assert!(matches!(err, MotionError::InvalidConfig(_)));
    }

    #[test]
    fn step_count_is_capped() {
        let options = SequenceOptions {
            direction: Direction::Reverse,
            ..SequenceOptions::new(usize::MAX)
        };
        assert_eq!(options.step_count(), MAX_TOTAL_STEPS);
        assert_eq!(options.physical_step(0), MAX_TOTAL_STEPS - 1);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, MotionError::Serialization(_)));
    }
}

// motion_core: Rust/WASM motion engine for the site's visual effects.
// Computes *when* and *by how much*; the JS side only applies the numbers.

mod accessibility;
mod constants;
mod error;
mod fibonacci;
mod parallax;
mod scheduler;
mod stagger;
mod timing;
mod types;

use wasm_bindgen::prelude::*;

pub use accessibility::{
    MotionGate, MotionPreference, MotionValues, NoPreference, ReducedMotionSignal,
};
pub use constants::{FIBONACCI, PHI, PHI_INV};
pub use error::MotionError;
pub use fibonacci::{
    index_from_f64, shared as shared_fibonacci, FibonacciProvider, MAX_EXACT_INDEX, MAX_SLICE_LEN,
};
pub use parallax::{ParallaxCalculator, ParallaxFrame, ParallaxTracker, WasmParallaxTracker};
pub use scheduler::{
    SequenceEvent, SequencePhase, SequenceScheduler, SequenceState, TimerId,
    WasmSequenceScheduler, LOOP_PAUSE,
};
pub use stagger::{StaggerDistributor, REDUCED_MOTION_DELAY};
pub use timing::{
    apply_golden_ratio, resolve_duration, resolve_easing, to_css_cubic_bezier, ControlPoints,
    DurationKeyword, DurationSpec, Easing, EasingFn, EasingName, EasingSpec,
};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Main engine interface exposed to JavaScript.
///
/// Owns the reduced-motion signal; every scheduler and tracker it creates
/// shares that signal, so one `set_reduced_motion` call reaches all of them.
#[wasm_bindgen]
pub struct MotionEngine {
    config: EngineConfig,
    signal: ReducedMotionSignal,
}

impl MotionEngine {
    pub fn from_config(config: EngineConfig) -> Self {
        let signal = ReducedMotionSignal::new(config.reduced_motion);
        MotionEngine { config, signal }
    }

    pub fn gate(&self) -> MotionGate {
        MotionGate::from_signal(self.signal.clone())
    }

    fn sequence_options(
        &self,
        options_json: Option<String>,
    ) -> Result<SequenceOptions, MotionError> {
        let options: SequenceOptions = match options_json {
            Some(json) => serde_json::from_str(&json)?,
            None => return Ok(self.config.sequence.clone()),
        };
        options.validate()?;
        Ok(options)
    }

    fn parallax_options(
        &self,
        options_json: Option<String>,
    ) -> Result<ParallaxOptions, MotionError> {
        let options: ParallaxOptions = match options_json {
            Some(json) => serde_json::from_str(&json)?,
            None => return Ok(self.config.parallax.clone()),
        };
        options.validate()?;
        Ok(options)
    }
}

fn to_js(err: MotionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
impl MotionEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<MotionEngine, JsValue> {
        let config = EngineConfig::from_json(config_json).map_err(to_js)?;
        Ok(MotionEngine::from_config(config))
    }

    /// Feed the `prefers-reduced-motion` media query result. Takes effect on the next query.
    pub fn set_reduced_motion(&self, reduced: bool) {
        tracing::debug!(reduced, "reduced motion preference changed");
        self.signal.set(reduced);
    }

    pub fn prefers_reduced_motion(&self) -> bool {
        self.signal.get()
    }

    /// Seconds for a duration keyword, shortened under reduced motion.
    pub fn duration(&self, keyword: &str) -> f64 {
        self.gate().duration(resolve_duration(DurationKeyword::parse_lossy(keyword)))
    }

    /// `duration(keyword)` scaled by φ⁻¹.
    pub fn golden_duration(&self, keyword: &str) -> f64 {
        apply_golden_ratio(self.duration(keyword))
    }

    /// CSS `cubic-bezier()` for a named easing.
    pub fn easing_css(&self, name: &str) -> String {
        to_css_cubic_bezier(&EasingName::parse_lossy(name).control_points())
    }

    /// Fibonacci value at `index`. Negative and NaN indices resolve to the first element.
    pub fn fibonacci(&self, index: f64) -> u64 {
        shared_fibonacci().value_at(index_from_f64(index))
    }

    pub fn fibonacci_range(&self, start: f64, end_exclusive: f64) -> Vec<u64> {
        shared_fibonacci().range_slice(index_from_f64(start), index_from_f64(end_exclusive))
    }

    /// Per-item stagger delays in seconds. Uses the configured defaults when no JSON is given.
    pub fn stagger_delays(&self, options_json: Option<String>) -> Result<Vec<f64>, JsValue> {
        let options = self.sequence_options(options_json).map_err(to_js)?;
        Ok(StaggerDistributor::new(self.gate()).distribute(&options))
    }

    /// De-amplified `[duration, distance, scale]`.
    pub fn adapt(&self, duration: f64, distance: f64, scale: f64) -> Vec<f64> {
        let adapted = self.gate().adapt(MotionValues::new(duration, distance, scale));
        vec![adapted.duration, adapted.distance, adapted.scale]
    }

    /// New scheduler sharing this engine's reduced-motion signal.
    pub fn sequence(&self, options_json: Option<String>) -> Result<WasmSequenceScheduler, JsValue> {
        let options = self.sequence_options(options_json).map_err(to_js)?;
        Ok(WasmSequenceScheduler::new(SequenceScheduler::new(
            options,
            self.gate(),
        )))
    }

    /// New parallax tracker sharing this engine's reduced-motion signal.
    pub fn parallax(&self, options_json: Option<String>) -> Result<WasmParallaxTracker, JsValue> {
        let options = self.parallax_options(options_json).map_err(to_js)?;
        Ok(WasmParallaxTracker::new(ParallaxTracker::new(
            ParallaxCalculator::new(options, self.gate()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_creation_works() {
        let config = r#"{"reduced_motion":false,"sequence":{"total_steps":3},"parallax":{}}"#;
        let engine = MotionEngine::new(config);
        assert!(engine.is_ok());
    }

    #[test]
    fn durations_follow_reduced_motion_signal() {
        let engine = MotionEngine::from_config(EngineConfig::default());
        assert_eq!(engine.duration("normal"), 0.377);
        assert_eq!(engine.duration("nonsense"), 0.377);

        engine.set_reduced_motion(true);
        assert!((engine.duration("normal") - 0.1885).abs() < 1e-12);
        assert!((engine.golden_duration("normal") - 0.1885 * PHI_INV).abs() < 1e-12);
    }

    #[test]
    fn fibonacci_boundary_is_total() {
        let engine = MotionEngine::from_config(EngineConfig::default());
        assert_eq!(engine.fibonacci(-4.0), 1);
        assert_eq!(engine.fibonacci(f64::NAN), 1);
        assert_eq!(engine.fibonacci(25.0), 121_393);
        assert_eq!(engine.fibonacci_range(3.0, 6.0), vec![3, 5, 8]);
        assert_eq!(engine.fibonacci_range(0.0, 1e300).len(), MAX_SLICE_LEN);
        assert_eq!(engine.fibonacci_range(0.0, f64::INFINITY).len(), MAX_SLICE_LEN);
    }

    #[test]
    fn per_call_options_are_validated() {
        let engine = MotionEngine::from_config(EngineConfig::default());
        let err = engine
            .parallax_options(Some(r#"{"offset_fraction":4}"#.to_string()))
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidConfig(_)));

        let err = engine
            .sequence_options(Some(r#"{"base_delay":-1}"#.to_string()))
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidConfig(_)));

        let err = engine
            .sequence_options(Some(r#"{"total_steps":100000}"#.to_string()))
            .unwrap_err();
        assert!(matches!(err, MotionError::InvalidConfig(_)));

        assert!(engine
            .parallax_options(Some(r#"{"offset_fraction":0.25}"#.to_string()))
            .is_ok());
    }

    #[test]
    fn easing_css_falls_back_to_standard() {
        let engine = MotionEngine::from_config(EngineConfig::default());
        assert_eq!(engine.easing_css("??"), engine.easing_css("standard"));
    }

    #[test]
    fn stagger_uses_configured_defaults() {
        let config = EngineConfig {
            sequence: SequenceOptions {
                base_delay: 0.2,
                ..SequenceOptions::new(3)
            },
            ..Default::default()
        };
        let engine = MotionEngine::from_config(config);
        assert_eq!(engine.stagger_delays(None).unwrap(), vec![0.2; 3]);

        let delays = engine
            .stagger_delays(Some(r#"{"total_steps":2,"total_duration":1.0}"#.to_string()))
            .unwrap();
        assert_eq!(delays, vec![0.5, 0.5]);
    }

    #[test]
    fn created_components_share_the_signal() {
        let engine = MotionEngine::from_config(EngineConfig::default());
        let mut sequence = engine
            .sequence(Some(r#"{"total_steps":4,"base_delay":0.1}"#.to_string()))
            .unwrap();
        let mut tracker = engine.parallax(None).unwrap();

        engine.set_reduced_motion(true);
        sequence.play();
        assert_eq!(sequence.current_step(), 3);
        assert_eq!(sequence.pending_timers(), 0);
        assert_eq!(tracker.update(100.0, 0.0, 50.0, 50.0, 1280.0, 800.0), 0.0);
        assert!(tracker.in_view());
    }

    #[test]
    fn adapt_returns_triple() {
        let engine = MotionEngine::from_config(EngineConfig {
            reduced_motion: true,
            ..Default::default()
        });
        let adapted = engine.adapt(1.0, 100.0, 2.0);
        assert_eq!(adapted.len(), 3);
        assert!((adapted[0] - 0.5).abs() < 1e-12);
        assert!((adapted[1] - 30.0).abs() < 1e-12);
        assert!((adapted[2] - 1.3).abs() < 1e-12);
    }
}

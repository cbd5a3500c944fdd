// Scroll-coupled parallax offsets.
// Recomputed on demand from element and viewport geometry. Off-screen elements keep their
// last offset so they do not snap when they scroll back into view.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::accessibility::MotionGate;
use crate::constants::{PHI, PHI_INV};
use crate::types::{ElementRect, ParallaxOptions, ViewportSize};

/// Result of one scroll/resize tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ParallaxFrame {
    /// 0 when the element sits at the viewport's far edge, 1 at the near edge.
    pub progress: f64,
    pub in_view: bool,
    /// Translation in pixels along the configured axis.
    pub transform_offset: f64,
}

impl ParallaxFrame {
    /// CSS `translate3d` for the offset along the given axis.
    pub fn css_transform(&self, horizontal: bool) -> String {
        let offset = if self.transform_offset == 0.0 {
            0.0
        } else {
            self.transform_offset
        };
        if horizontal {
            format!("translate3d({:.2}px, 0, 0)", offset)
        } else {
            format!("translate3d(0, {:.2}px, 0)", offset)
        }
    }
}

/// Pure parallax math.
#[derive(Debug, Clone)]
pub struct ParallaxCalculator {
    options: ParallaxOptions,
    gate: MotionGate,
}

impl ParallaxCalculator {
    pub fn new(options: ParallaxOptions, gate: MotionGate) -> Self {
        ParallaxCalculator { options, gate }
    }

    pub fn options(&self) -> &ParallaxOptions {
        &self.options
    }

    pub fn effective_range(&self) -> f64 {
        let range = self.options.range.max(0.0);
        if self.options.use_golden_ratio {
            range * PHI_INV
        } else {
            range
        }
    }

    pub fn effective_speed(&self) -> f64 {
        if self.options.use_golden_ratio {
            self.options.speed * PHI
        } else {
            self.options.speed
        }
    }

    /// Compute a frame. `previous_offset` is returned unchanged while the element is out of view.
    pub fn compute(
        &self,
        element: &ElementRect,
        viewport: &ViewportSize,
        previous_offset: f64,
    ) -> ParallaxFrame {
        let (position, size, viewport_size) = if self.options.horizontal {
            (element.left, element.width, viewport.width)
        } else {
            (element.top, element.height, viewport.height)
        };

        let motion_allowed = self.options.enabled && !self.gate.is_reduced_motion_preferred();

        if !viewport_size.is_finite() || viewport_size <= 0.0 {
            return ParallaxFrame {
                progress: 0.0,
                in_view: false,
                transform_offset: if motion_allowed { previous_offset } else { 0.0 },
            };
        }

        let offset_fraction = self.options.offset_fraction.clamp(0.0, 1.0);
        let progress = clamp01(1.0 - (position + size * offset_fraction) / viewport_size);
        let in_view = position + size > 0.0 && position < viewport_size;

        let transform_offset = if !motion_allowed {
            0.0
        } else if !in_view {
            previous_offset
        } else {
            let shaped = if self.options.use_easing {
                ease_sine(progress)
            } else {
                progress
            };
            (shaped - 0.5) * self.effective_range() * self.effective_speed()
        };

        ParallaxFrame {
            progress,
            in_view,
            transform_offset,
        }
    }
}

/// S-curve through (0.5, 0.5).
fn ease_sine(progress: f64) -> f64 {
    ((progress - 0.5) * PI).sin() * 0.5 + 0.5
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Keeps the previous frame between scroll ticks.
#[derive(Debug, Clone)]
pub struct ParallaxTracker {
    calculator: ParallaxCalculator,
    last: Option<ParallaxFrame>,
}

impl ParallaxTracker {
    pub fn new(calculator: ParallaxCalculator) -> Self {
        ParallaxTracker {
            calculator,
            last: None,
        }
    }

    pub fn update(&mut self, element: &ElementRect, viewport: &ViewportSize) -> ParallaxFrame {
        let previous = self.last.map_or(0.0, |frame| frame.transform_offset);
        let frame = self.calculator.compute(element, viewport, previous);
        self.last = Some(frame);
        frame
    }

    pub fn last_frame(&self) -> Option<ParallaxFrame> {
        self.last
    }

    /// Forget the previous frame, e.g. when the element is torn down.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn calculator(&self) -> &ParallaxCalculator {
        &self.calculator
    }
}

// =============================================================================
// WASM Bindings
// =============================================================================

/// WASM-exposed parallax tracker. Created through `MotionEngine::parallax`.
/// The host calls `update` from its scroll/resize listener.
#[wasm_bindgen]
pub struct WasmParallaxTracker {
    inner: ParallaxTracker,
}

impl WasmParallaxTracker {
    pub(crate) fn new(inner: ParallaxTracker) -> Self {
        WasmParallaxTracker { inner }
    }
}

#[wasm_bindgen]
impl WasmParallaxTracker {
    /// Recompute from the element's bounding rect and the viewport size. Returns the offset.
    pub fn update(
        &mut self,
        top: f64,
        left: f64,
        width: f64,
        height: f64,
        viewport_width: f64,
        viewport_height: f64,
    ) -> f64 {
        self.inner
            .update(
                &ElementRect::new(top, left, width, height),
                &ViewportSize::new(viewport_width, viewport_height),
            )
            .transform_offset
    }

    pub fn offset(&self) -> f64 {
        self.inner.last_frame().map_or(0.0, |f| f.transform_offset)
    }

    pub fn progress(&self) -> f64 {
        self.inner.last_frame().map_or(0.0, |f| f.progress)
    }

    pub fn in_view(&self) -> bool {
        self.inner.last_frame().is_some_and(|f| f.in_view)
    }

    pub fn transform_css(&self) -> String {
        self.inner
            .last_frame()
            .unwrap_or_default()
            .css_transform(self.inner.calculator().options().horizontal)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::ReducedMotionSignal;
    use proptest::prelude::*;

    const VIEWPORT: ViewportSize = ViewportSize {
        width: 1280.0,
        height: 800.0,
    };

    fn calculator(options: ParallaxOptions) -> ParallaxCalculator {
        ParallaxCalculator::new(options, MotionGate::default())
    }

    fn centered(height: f64) -> ElementRect {
        ElementRect::new((VIEWPORT.height - height) / 2.0, 0.0, 640.0, height)
    }

    #[test]
    fn centered_element_has_zero_offset() {
        let calc = calculator(ParallaxOptions {
            speed: -0.5,
            range: 100.0,
            offset_fraction: 0.5,
            ..Default::default()
        });
        let frame = calc.compute(&centered(200.0), &VIEWPORT, 0.0);
        assert!((frame.progress - 0.5).abs() < 1e-9);
        assert!(frame.in_view);
        assert!(frame.transform_offset.abs() < 1e-6);
    }

    #[test]
    fn linear_offset_scales_with_range_and_speed() {
        let calc = calculator(ParallaxOptions {
            speed: 2.0,
            range: 100.0,
            offset_fraction: 0.0,
            ..Default::default()
        });
        // Leading edge a quarter of the way down: progress 0.75.
        let element = ElementRect::new(200.0, 0.0, 100.0, 100.0);
        let frame = calc.compute(&element, &VIEWPORT, 0.0);
        assert!((frame.progress - 0.75).abs() < 1e-9);
        assert!((frame.transform_offset - 50.0).abs() < 1e-9);
    }

    #[test]
    fn easing_shapes_progress() {
        let options = ParallaxOptions {
            speed: 1.0,
            range: 100.0,
            offset_fraction: 0.0,
            use_easing: true,
            ..Default::default()
        };
        let element = ElementRect::new(200.0, 0.0, 100.0, 100.0);
        let frame = calculator(options).compute(&element, &VIEWPORT, 0.0);
        let expected = ((0.75 - 0.5) * PI).sin() * 0.5 * 100.0;
        assert!((frame.transform_offset - expected).abs() < 1e-9);
    }

    #[test]
    fn golden_ratio_scales_range_and_speed() {
        let calc = calculator(ParallaxOptions {
            speed: 1.0,
            range: 100.0,
            use_golden_ratio: true,
            ..Default::default()
        });
        assert!((calc.effective_range() - 100.0 * PHI_INV).abs() < 1e-9);
        assert!((calc.effective_speed() - PHI).abs() < 1e-9);
        // φ · φ⁻¹ = 1, so travel is unchanged overall.
        assert!((calc.effective_range() * calc.effective_speed() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn horizontal_axis_uses_left_and_width() {
        let calc = calculator(ParallaxOptions {
            horizontal: true,
            offset_fraction: 0.0,
            ..Default::default()
        });
        let element = ElementRect::new(-5000.0, 320.0, 100.0, 100.0);
        let frame = calc.compute(&element, &VIEWPORT, 0.0);
        assert!(frame.in_view);
        assert!((frame.progress - 0.75).abs() < 1e-9);
    }

    #[test]
    fn out_of_view_retains_previous_offset() {
        let mut tracker = ParallaxTracker::new(calculator(ParallaxOptions {
            offset_fraction: 0.0,
            ..Default::default()
        }));
        let visible = tracker.update(&ElementRect::new(100.0, 0.0, 50.0, 50.0), &VIEWPORT);
        assert!(visible.in_view);
        assert!(visible.transform_offset != 0.0);

        let below = ElementRect::new(900.0, 0.0, 50.0, 50.0);
        let first = tracker.update(&below, &VIEWPORT);
        let second = tracker.update(&below, &VIEWPORT);
        assert!(!first.in_view);
        assert_eq!(first.transform_offset, visible.transform_offset);
        assert_eq!(second.transform_offset, visible.transform_offset);
    }

    #[test]
    fn element_edges_touching_viewport_are_out_of_view() {
        let calc = calculator(ParallaxOptions::default());
        let above = ElementRect::new(-100.0, 0.0, 10.0, 100.0);
        let below = ElementRect::new(VIEWPORT.height, 0.0, 10.0, 100.0);
        assert!(!calc.compute(&above, &VIEWPORT, 0.0).in_view);
        assert!(!calc.compute(&below, &VIEWPORT, 0.0).in_view);
    }

    #[test]
    fn disabled_or_reduced_motion_zeroes_offset() {
        let element = ElementRect::new(100.0, 0.0, 50.0, 50.0);

        let disabled = calculator(ParallaxOptions {
            enabled: false,
            ..Default::default()
        });
        let frame = disabled.compute(&element, &VIEWPORT, 42.0);
        assert_eq!(frame.transform_offset, 0.0);
        assert!(frame.in_view);

        let signal = ReducedMotionSignal::new(true);
        let reduced = ParallaxCalculator::new(
            ParallaxOptions::default(),
            MotionGate::from_signal(signal.clone()),
        );
        assert_eq!(reduced.compute(&element, &VIEWPORT, 42.0).transform_offset, 0.0);

        signal.set(false);
        assert!(reduced.compute(&element, &VIEWPORT, 42.0).transform_offset != 0.0);
    }

    #[test]
    fn degenerate_viewport_is_not_in_view() {
        let calc = calculator(ParallaxOptions::default());
        let frame = calc.compute(&centered(100.0), &ViewportSize::new(0.0, 0.0), 7.0);
        assert!(!frame.in_view);
        assert_eq!(frame.progress, 0.0);
        assert_eq!(frame.transform_offset, 7.0);
    }

    #[test]
    fn css_transform_formats_axis() {
        let frame = ParallaxFrame {
            progress: 0.5,
            in_view: true,
            transform_offset: -12.346,
        };
        assert_eq!(frame.css_transform(false), "translate3d(0, -12.35px, 0)");
        assert_eq!(frame.css_transform(true), "translate3d(-12.35px, 0, 0)");
    }

    #[test]
    fn wasm_tracker_reset_forgets_frame() {
        let mut tracker = WasmParallaxTracker::new(ParallaxTracker::new(calculator(
            ParallaxOptions::default(),
        )));
        assert_eq!(tracker.transform_css(), "translate3d(0, 0.00px, 0)");
        tracker.update(100.0, 0.0, 50.0, 50.0, VIEWPORT.width, VIEWPORT.height);
        assert!(tracker.in_view());
        tracker.reset();
        assert!(!tracker.in_view());
        assert_eq!(tracker.offset(), 0.0);
    }

    proptest! {
        #[test]
        fn midpoint_is_always_zero(
            speed in -5.0f64..5.0,
            range in 0.0f64..2000.0,
            golden in any::<bool>(),
            easing in any::<bool>(),
            height in 1.0f64..600.0,
        ) {
            let calc = calculator(ParallaxOptions {
                speed,
                range,
                use_golden_ratio: golden,
                use_easing: easing,
                offset_fraction: 0.5,
                ..Default::default()
            });
            let frame = calc.compute(&centered(height), &VIEWPORT, 0.0);
            prop_assert!(frame.transform_offset.abs() < 1e-6);
        }

        #[test]
        fn offset_is_bounded_by_half_travel(
            top in -400.0f64..1200.0,
            speed in -3.0f64..3.0,
            easing in any::<bool>(),
        ) {
            let calc = calculator(ParallaxOptions {
                speed,
                range: 100.0,
                use_easing: easing,
                ..Default::default()
            });
            let frame = calc.compute(&ElementRect::new(top, 0.0, 100.0, 100.0), &VIEWPORT, 0.0);
            prop_assert!((0.0..=1.0).contains(&frame.progress));
            prop_assert!(frame.transform_offset.abs() <= 50.0 * speed.abs() + 1e-9);
        }

        #[test]
        fn recomputation_is_idempotent(top in -400.0f64..1200.0, previous in -50.0f64..50.0) {
            let calc = calculator(ParallaxOptions::default());
            let element = ElementRect::new(top, 0.0, 100.0, 100.0);
            prop_assert_eq!(
                calc.compute(&element, &VIEWPORT, previous),
                calc.compute(&element, &VIEWPORT, previous)
            );
        }
    }
}

// Duration and easing resolution. Semantic keywords map to Fibonacci-derived seconds
// and golden-ratio cubic-Bézier curves. Unknown keywords fall back; nothing errors.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::{FIBONACCI, PHI, PHI_INV};

/// Named durations. Each is `F(index) / 1000` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DurationKeyword {
    Instant,
    Faster,
    Fast,
    Normal,
    Slow,
    Slower,
    Glacial,
}

impl DurationKeyword {
    pub const ALL: [DurationKeyword; 7] = [
        DurationKeyword::Instant,
        DurationKeyword::Faster,
        DurationKeyword::Fast,
        DurationKeyword::Normal,
        DurationKeyword::Slow,
        DurationKeyword::Slower,
        DurationKeyword::Glacial,
    ];

    /// Index into the Fibonacci table this keyword is derived from.
    pub fn fibonacci_index(self) -> usize {
        match self {
            DurationKeyword::Instant => 10,
            DurationKeyword::Faster => 11,
            DurationKeyword::Fast => 12,
            DurationKeyword::Normal => 13,
            DurationKeyword::Slow => 14,
            DurationKeyword::Slower => 15,
            DurationKeyword::Glacial => 16,
        }
    }

    pub fn seconds(self) -> f64 {
        FIBONACCI[self.fibonacci_index()] as f64 / 1000.0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DurationKeyword::Instant => "instant",
            DurationKeyword::Faster => "faster",
            DurationKeyword::Fast => "fast",
            DurationKeyword::Normal => "normal",
            DurationKeyword::Slow => "slow",
            DurationKeyword::Slower => "slower",
            DurationKeyword::Glacial => "glacial",
        }
    }

    /// Case-insensitive parse. Unknown keywords resolve to `Normal`.
    pub fn parse_lossy(keyword: &str) -> Self {
        let trimmed = keyword.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| {
                tracing::warn!(keyword, "unknown duration keyword, using normal");
                DurationKeyword::Normal
            })
    }
}

impl From<String> for DurationKeyword {
    fn from(keyword: String) -> Self {
        DurationKeyword::parse_lossy(&keyword)
    }
}

impl From<&str> for DurationKeyword {
    fn from(keyword: &str) -> Self {
        DurationKeyword::parse_lossy(keyword)
    }
}

/// Either raw seconds or a semantic keyword.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Seconds(f64),
    Keyword(DurationKeyword),
}

impl From<f64> for DurationSpec {
    fn from(seconds: f64) -> Self {
        DurationSpec::Seconds(seconds)
    }
}

impl From<DurationKeyword> for DurationSpec {
    fn from(keyword: DurationKeyword) -> Self {
        DurationSpec::Keyword(keyword)
    }
}

/// Resolve a duration to seconds. Raw values pass through; negative and NaN become 0.
pub fn resolve_duration(spec: impl Into<DurationSpec>) -> f64 {
    match spec.into() {
        DurationSpec::Seconds(seconds) if seconds.is_nan() || seconds < 0.0 => 0.0,
        DurationSpec::Seconds(seconds) => seconds,
        DurationSpec::Keyword(keyword) => keyword.seconds(),
    }
}

/// Scale a duration by φ⁻¹. Applying it twice compounds.
pub fn apply_golden_ratio(seconds: f64) -> f64 {
    seconds * PHI_INV
}

/// Cubic-Bézier control points `(x1, y1, x2, y2)` with implicit endpoints (0,0) and (1,1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPoints {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl ControlPoints {
    /// `x1` and `x2` are clamped into `[0, 1]` so the curve stays a function of time.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        ControlPoints {
            x1: clamp01(x1),
            y1,
            x2: clamp01(x2),
            y2,
        }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Evaluate the curve as a timing function: progress at normalized time `t`.
    pub fn sample(&self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let s = self.solve_curve_x(t);
        bezier(self.y1, self.y2, s)
    }

    fn solve_curve_x(&self, x: f64) -> f64 {
        const EPSILON: f64 = 1e-7;

        // Newton-Raphson first; it converges in a few steps for most curves.
        let mut s = x;
        for _ in 0..8 {
            let error = bezier(self.x1, self.x2, s) - x;
            if error.abs() < EPSILON {
                return s;
            }
            let slope = bezier_slope(self.x1, self.x2, s);
            if slope.abs() < 1e-6 {
                break;
            }
            s -= error / slope;
        }

        // Bisection fallback for flat regions.
        let (mut lo, mut hi) = (0.0, 1.0);
        s = x;
        for _ in 0..64 {
            let value = bezier(self.x1, self.x2, s);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
        s
    }
}

/// One coordinate of a cubic Bézier with endpoints 0 and 1.
fn bezier(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * p1 * mt * mt * t + 3.0 * p2 * mt * t * t + t * t * t
}

fn bezier_slope(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * p1 * mt * mt + 6.0 * (p2 - p1) * mt * t + 3.0 * (1.0 - p2) * t * t
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Named easing curves built from φ and φ⁻¹.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum EasingName {
    Linear,
    Standard,
    Decelerate,
    Accelerate,
    Sharp,
    Overshoot,
}

impl EasingName {
    pub const ALL: [EasingName; 6] = [
        EasingName::Linear,
        EasingName::Standard,
        EasingName::Decelerate,
        EasingName::Accelerate,
        EasingName::Sharp,
        EasingName::Overshoot,
    ];

    pub fn control_points(self) -> ControlPoints {
        let rest = 1.0 - PHI_INV;
        match self {
            EasingName::Linear => ControlPoints::new(0.0, 0.0, 1.0, 1.0),
            EasingName::Standard => ControlPoints::new(PHI_INV, 0.0, rest, 1.0),
            EasingName::Decelerate => ControlPoints::new(0.0, 0.0, rest, 1.0),
            EasingName::Accelerate => ControlPoints::new(PHI_INV, 0.0, 1.0, 1.0),
            EasingName::Sharp => ControlPoints::new(PHI_INV, 0.0, PHI_INV, 1.0),
            // y2 above 1 overshoots the target before settling.
            EasingName::Overshoot => ControlPoints::new(rest, 0.0, PHI_INV, PHI - 0.5),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EasingName::Linear => "linear",
            EasingName::Standard => "standard",
            EasingName::Decelerate => "decelerate",
            EasingName::Accelerate => "accelerate",
            EasingName::Sharp => "sharp",
            EasingName::Overshoot => "overshoot",
        }
    }

    /// Case-insensitive parse. Unknown names resolve to `Standard`.
    pub fn parse_lossy(name: &str) -> Self {
        let trimmed = name.trim();
        Self::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| {
                tracing::warn!(name, "unknown easing name, using standard");
                EasingName::Standard
            })
    }
}

impl From<String> for EasingName {
    fn from(name: String) -> Self {
        EasingName::parse_lossy(&name)
    }
}

impl From<&str> for EasingName {
    fn from(name: &str) -> Self {
        EasingName::parse_lossy(name)
    }
}

/// Caller-supplied easing function over `[0, 1]`.
pub type EasingFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// What the caller asked for.
#[derive(Clone)]
pub enum EasingSpec {
    Named(EasingName),
    Custom(EasingFn),
}

impl From<EasingName> for EasingSpec {
    fn from(name: EasingName) -> Self {
        EasingSpec::Named(name)
    }
}

impl From<&str> for EasingSpec {
    fn from(name: &str) -> Self {
        EasingSpec::Named(EasingName::parse_lossy(name))
    }
}

impl fmt::Debug for EasingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EasingSpec::Named(name) => f.debug_tuple("Named").field(name).finish(),
            EasingSpec::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A resolved easing, ready to apply.
#[derive(Clone)]
pub enum Easing {
    Curve(ControlPoints),
    Custom(EasingFn),
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Curve(points) => points.sample(t),
            Easing::Custom(func) => func(t),
        }
    }

    pub fn control_points(&self) -> Option<ControlPoints> {
        match self {
            Easing::Curve(points) => Some(*points),
            Easing::Custom(_) => None,
        }
    }

    /// CSS timing function, if the easing is expressible as one.
    pub fn to_css(&self) -> Option<String> {
        self.control_points().map(|points| to_css_cubic_bezier(&points))
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Curve(points) => f.debug_tuple("Curve").field(points).finish(),
            Easing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

pub fn resolve_easing(spec: impl Into<EasingSpec>) -> Easing {
    match spec.into() {
        EasingSpec::Named(name) => Easing::Curve(name.control_points()),
        EasingSpec::Custom(func) => Easing::Custom(func),
    }
}

/// Format control points as a CSS `cubic-bezier()` function.
pub fn to_css_cubic_bezier(points: &ControlPoints) -> String {
    format!(
        "cubic-bezier({}, {}, {}, {})",
        format_coord(points.x1),
        format_coord(points.y1),
        format_coord(points.x2),
        format_coord(points.y2)
    )
}

fn format_coord(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

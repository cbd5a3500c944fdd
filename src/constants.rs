// Golden ratio and the canonical Fibonacci prefix. Pure data.

/// The golden ratio φ.
pub const PHI: f64 = 1.618_033_988_749_895;

/// φ⁻¹, equal to φ − 1.
pub const PHI_INV: f64 = PHI - 1.0;

/// Canonical Fibonacci prefix, indices 0..=21. `F(0) = F(1) = 1`.
pub const FIBONACCI: [u64; 22] = [
    1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610, 987, 1597, 2584, 4181, 6765, 10946,
    17711,
];

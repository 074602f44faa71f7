use std::fmt::Debug;

use num::Float;

/// Storage precision of the probability table.
/// Estimation always happens in `f64`; the table keeps the narrowed value.
pub trait Precision: Float + Into<f64> + Debug + Send + Sync + 'static {
    /// narrow an `f64` into this precision
    fn from_f64_lossy(value: f64) -> Self;
}

impl Precision for f64 {
    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value
    }
}

impl Precision for f32 {
    #[inline]
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }
}

//! Normalized-time easing curves
//!
//! Every curve maps `[0, 1]` onto `[0, 1]` with `f(0) = 0` and `f(1) = 1`.
//! Formulas follow the classic Penner set.

use serde::{Deserialize, Serialize};

use crate::foundation::math::utils;

/// Easing curve applied to every scalar of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Accelerating from zero velocity
    QuadraticIn,
    /// Decelerating to zero velocity
    QuadraticOut,
    /// Accelerate until halfway, then decelerate
    QuadraticInOut,
    /// Cubic acceleration
    CubicIn,
    /// Cubic deceleration
    CubicOut,
    /// Cubic acceleration then deceleration
    CubicInOut,
    /// Bounces at the start
    BounceIn,
    /// Bounces against the end value
    BounceOut,
    /// Bounces at both ends
    BounceInOut,
}

impl Easing {
    /// All curves, in declaration order
    pub const ALL: [Self; 10] = [
        Self::Linear,
        Self::QuadraticIn,
        Self::QuadraticOut,
        Self::QuadraticInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
    ];

    /// Evaluate the curve; `t` is clamped to `[0, 1]` first
    pub fn apply(self, t: f32) -> f32 {
        let t = utils::clamp(t, 0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadraticIn => t * t,
            Self::QuadraticOut => t * (2.0 - t),
            Self::QuadraticInOut => {
                let k = t * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => {
                let k = t - 1.0;
                k * k * k + 1.0
            }
            Self::CubicInOut => {
                let k = t * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - t),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - t * 2.0)) * 0.5
                } else {
                    bounce_out(t * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;

    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let k = t - 1.5 / D;
        N * k * k + 0.75
    } else if t < 2.5 / D {
        let k = t - 2.25 / D;
        N * k * k + 0.9375
    } else {
        let k = t - 2.625 / D;
        N * k * k + 0.984_375
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_endpoints_are_fixed() {
        for easing in Easing::ALL {
            assert_abs_diff_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_input_is_clamped() {
        for easing in Easing::ALL {
            assert_abs_diff_eq!(easing.apply(-3.0), easing.apply(0.0));
            assert_abs_diff_eq!(easing.apply(7.0), easing.apply(1.0));
        }
    }

    #[test]
    fn test_output_stays_normalized() {
        for easing in Easing::ALL {
            for step in 0..=100u8 {
                let value = easing.apply(f32::from(step) / 100.0);
                assert!(
                    (-1e-6..=1.0 + 1e-6).contains(&value),
                    "{easing:?} left [0,1] at step {step}: {value}"
                );
            }
        }
    }

    #[test]
    fn test_quadratic_reference_values() {
        assert_abs_diff_eq!(Easing::QuadraticIn.apply(0.5), 0.25);
        assert_abs_diff_eq!(Easing::QuadraticOut.apply(0.5), 0.75);
        assert_abs_diff_eq!(Easing::QuadraticInOut.apply(0.25), 0.125);
        assert_abs_diff_eq!(Easing::QuadraticInOut.apply(0.5), 0.5);
        assert_abs_diff_eq!(Easing::QuadraticInOut.apply(0.75), 0.875);
    }

    #[test]
    fn test_bounce_out_reference_value() {
        assert_abs_diff_eq!(Easing::BounceOut.apply(0.5), 0.765_625, epsilon = 1e-5);
        assert_abs_diff_eq!(
            Easing::BounceIn.apply(0.5),
            1.0 - Easing::BounceOut.apply(0.5),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_monotonic_curves() {
        for easing in [Easing::Linear, Easing::QuadraticIn, Easing::QuadraticOut, Easing::QuadraticInOut, Easing::CubicInOut] {
            let mut previous = 0.0;
            for step in 1..=50u8 {
                let value = easing.apply(f32::from(step) / 50.0);
                assert!(value >= previous, "{easing:?} decreased at step {step}");
                previous = value;
            }
        }
    }
}

//! Scaling schemes for billboard annotation layers
//!
//! The scheme maps (true distance, clamped distance) to the uniform scale
//! applied to an annotation layer so labels stay legible at range.

use serde::{Deserialize, Serialize};

/// The scheme to use for scaling an annotation layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ScalingScheme {
    /// Scales the layer in proportion to the clamped distance so it appears
    /// at a constant on-screen size, with a reduction beyond 3 km.
    #[default]
    Normal,
    /// Full size up to `threshold_m` of clamped distance, then a fixed scale.
    Tiered { threshold_m: f64, scale: f32 },
    /// Two clamped-distance thresholds with their own fixed scales.
    DoubleTiered {
        first_threshold_m: f64,
        first_scale: f32,
        second_threshold_m: f64,
        second_scale: f32,
    },
    /// Shrinks linearly with true distance, reaching zero at `threshold_m`.
    Linear { threshold_m: f64 },
    /// Full size within `buffer_m` of clamped distance, linear beyond it.
    LinearBuffer { threshold_m: f64, buffer_m: f64 },
}

impl ScalingScheme {
    /// The uniform scale for an annotation layer at the given true and
    /// clamped (far-clamp adjusted) distances.
    pub fn scale_for(&self, distance_m: f64, adjusted_distance_m: f64) -> f32 {
        match *self {
            ScalingScheme::Normal => {
                let mut scale = adjusted_distance_m as f32 * 0.181;
                if distance_m > 3_000.0 {
                    scale *= 0.75;
                }
                scale
            }
            ScalingScheme::Tiered { threshold_m, scale } => {
                if adjusted_distance_m > threshold_m {
                    scale
                } else {
                    1.0
                }
            }
            ScalingScheme::DoubleTiered {
                first_threshold_m,
                first_scale,
                second_threshold_m,
                second_scale,
            } => {
                if adjusted_distance_m > second_threshold_m {
                    second_scale
                } else if adjusted_distance_m > first_threshold_m {
                    first_scale
                } else {
                    1.0
                }
            }
            ScalingScheme::Linear { threshold_m } => {
                (1.0 - distance_m / threshold_m.abs()).max(0.0) as f32
            }
            ScalingScheme::LinearBuffer {
                threshold_m,
                buffer_m,
            } => {
                if adjusted_distance_m < buffer_m {
                    1.0
                } else {
                    (1.0 - distance_m / threshold_m.abs()).max(0.0) as f32
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_scales_with_adjusted_distance() {
        let scheme = ScalingScheme::Normal;
        assert!((scheme.scale_for(50.0, 50.0) - 9.05).abs() < 1e-3);
        assert!((scheme.scale_for(250.0, 100.0) - 18.1).abs() < 1e-3);
    }

    #[test]
    fn test_normal_reduces_beyond_three_km() {
        let scheme = ScalingScheme::Normal;
        let near = scheme.scale_for(2_999.0, 100.0);
        let far = scheme.scale_for(3_001.0, 100.0);
        assert!((far - near * 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_tiered_switches_past_threshold() {
        let scheme = ScalingScheme::Tiered {
            threshold_m: 60.0,
            scale: 0.5,
        };
        assert_eq!(scheme.scale_for(40.0, 40.0), 1.0);
        assert_eq!(scheme.scale_for(40.0, 60.0), 1.0);
        assert_eq!(scheme.scale_for(40.0, 61.0), 0.5);
    }

    #[test]
    fn test_double_tiered_picks_band() {
        let scheme = ScalingScheme::DoubleTiered {
            first_threshold_m: 30.0,
            first_scale: 0.6,
            second_threshold_m: 70.0,
            second_scale: 0.3,
        };
        assert_eq!(scheme.scale_for(0.0, 20.0), 1.0);
        assert_eq!(scheme.scale_for(0.0, 50.0), 0.6);
        assert_eq!(scheme.scale_for(0.0, 80.0), 0.3);
    }

    #[test]
    fn test_linear_floors_at_zero() {
        let scheme = ScalingScheme::Linear { threshold_m: 100.0 };
        assert!((scheme.scale_for(25.0, 25.0) - 0.75).abs() < 1e-6);
        assert_eq!(scheme.scale_for(500.0, 100.0), 0.0);
    }

    #[test]
    fn test_linear_buffer_holds_full_size_inside_buffer() {
        let scheme = ScalingScheme::LinearBuffer {
            threshold_m: 200.0,
            buffer_m: 50.0,
        };
        assert_eq!(scheme.scale_for(40.0, 40.0), 1.0);
        assert!((scheme.scale_for(100.0, 100.0) - 0.5).abs() < 1e-6);
    }
}

//! Position reconciliation: from geographic estimates to local transforms
//!
//! The reconciler is a stateless service. Each call reads the tracked object
//! and the best available estimate, and writes back the object's position,
//! scale and render order. It holds no references to the store or the
//! registry; the controller passes everything in explicitly.

pub mod scaling;

use crate::core::constants::RENDER_ORDER_CEILING;
use crate::core::types::{horizontal_distance, GeoPoint, LocalPosition};
use crate::estimates::{EstimateMethod, LocationEstimate};
use crate::scene::object::TrackedObject;
use nalgebra::Vector3;

/// Converts distance in metres to a render order. The millimetre multiplier
/// eliminates flicker caused by slight distance variations; objects with
/// greater orders are rendered last.
pub fn rendering_order(distance_m: f64) -> i64 {
    RENDER_ORDER_CEILING - (distance_m * 1000.0) as i64
}

/// Stateless position-reconciliation service.
#[derive(Debug, Clone, Copy)]
pub struct PositionReconciler {
    /// How the current device location is determined.
    pub method: EstimateMethod,
    /// Far-clamp / confirmation radius in metres.
    pub scene_limit_m: f64,
}

impl PositionReconciler {
    pub fn new(method: EstimateMethod, scene_limit_m: f64) -> Self {
        Self {
            method,
            scene_limit_m,
        }
    }

    /// The object's current believed geographic location.
    ///
    /// Confirmed objects (and every object under `RawFixOnly`) report their
    /// declared location verbatim. Unconfirmed objects prefer a strictly more
    /// accurate best estimate, translated to the object's local position.
    ///
    /// `None` means the object has no declared location and no usable
    /// estimate exists. That is a missing-context condition, expected while
    /// the session warms up or after pruning empties the store; callers skip
    /// the object and retry on a later tick.
    pub fn resolved_location(
        &self,
        object: &TrackedObject,
        best_estimate: Option<&LocationEstimate>,
    ) -> Option<GeoPoint> {
        if object.location_confirmed() || self.method == EstimateMethod::RawFixOnly {
            return object.location.clone();
        }

        if let Some(best) = best_estimate {
            let more_accurate = match &object.location {
                None => true,
                Some(declared) => {
                    best.location.horizontal_accuracy < declared.horizontal_accuracy
                }
            };
            if more_accurate {
                return Some(best.translated_location(&object.position));
            }
        }

        object.location.clone()
    }

    /// Confirms an unconfirmed object once it is farther than the scene limit
    /// (horizontal, local frame) from the current position, overwriting its
    /// declared location with the best reconciled estimate. Returns whether
    /// the object transitioned; an object with no resolvable location stays
    /// unconfirmed until an estimate is available. Confirmed is terminal.
    pub fn confirm_if_distant(
        &self,
        object: &mut TrackedObject,
        current_position: &LocalPosition,
        best_estimate: Option<&LocationEstimate>,
    ) -> bool {
        if object.location_confirmed() {
            return false;
        }

        let distance = f64::from(horizontal_distance(current_position, &object.position));
        if distance <= self.scene_limit_m {
            return false;
        }

        match self.resolved_location(object, best_estimate) {
            Some(location) => {
                object.location = Some(location);
                true
            }
            None => false,
        }
    }

    /// Recomputes the object's position, scale and render order from the
    /// reconciled state of the world. `object_location` is the object's
    /// resolved location as seen by the caller. Returns false (leaving the
    /// object untouched) when the scene position or the current location is
    /// unknown, which is expected while the session warms up.
    pub fn update_position_and_scale(
        &self,
        object: &mut TrackedObject,
        setup: bool,
        scene_position: Option<&LocalPosition>,
        object_location: &GeoPoint,
        current_location: Option<&GeoPoint>,
    ) -> bool {
        let (position, current) = match (scene_position, current_location) {
            (Some(position), Some(current)) => (position, current),
            _ => return false,
        };

        let distance = object_location.distance_to(current);
        object.render_order = rendering_order(distance);

        let mut translation = current.translation_to(object_location);
        if object.ignore_altitude {
            translation.up_down = 0.0;
        }

        let adjusted_distance;
        if object.location_confirmed()
            && (distance > self.scene_limit_m || object.continually_adjust || setup)
        {
            if distance > self.scene_limit_m {
                // Too far away: bring it closer and scale it down.
                let scale = (self.scene_limit_m / distance) as f32;
                adjusted_distance = distance * f64::from(scale);

                object.position = LocalPosition::new(
                    position.x + translation.east_west as f32 * scale,
                    position.y + translation.up_down as f32 * scale,
                    position.z - translation.north_south as f32 * scale,
                );
                object.scale = Vector3::repeat(scale);
            } else {
                adjusted_distance = distance;

                object.position = LocalPosition::new(
                    position.x + translation.east_west as f32,
                    position.y + translation.up_down as f32,
                    position.z - translation.north_south as f32,
                );
                object.scale = Vector3::repeat(1.0);
            }
        } else {
            // No reliable geo data yet: render at the native local position.
            adjusted_distance = 0.0;
            object.scale = Vector3::repeat(1.0);
        }

        if object.annotation.is_some() {
            self.update_annotation(object, distance, adjusted_distance);
        }

        true
    }

    /// Applies the secondary scale law to the billboard layer. The engine
    /// ignores the scale of a billboarded parent, so the parent scale is
    /// reset and the layer carries it instead.
    fn update_annotation(&self, object: &mut TrackedObject, distance: f64, adjusted_distance: f64) {
        let applied_scale = object.scale;
        object.scale = Vector3::repeat(1.0);

        let scheme = object.scaling_scheme;
        let scale_relative = object.scale_relative_to_distance;

        if let Some(layer) = object.annotation.as_mut() {
            let layer_scale = if scale_relative {
                layer.scale = applied_scale;
                applied_scale.y
            } else {
                let scale = scheme.scale_for(distance, adjusted_distance);
                layer.scale = Vector3::repeat(scale);
                scale
            };

            layer.vertical_offset = -layer.height_adjustment_factor * layer_scale;
        }
    }
}

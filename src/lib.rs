//! Geo-Anchored Scene Positioning
//!
//! Reconciles geographic coordinates against a drifting local scene frame,
//! keeping geo-anchored content (objects, billboard annotations, polyline
//! routes) correctly placed, scaled and ordered as location fixes arrive.

pub mod core;
pub mod estimates;
pub mod reconciler;
pub mod scene;
pub mod utils;

// Re-export commonly used types
pub use core::{GeoPoint, LocalPosition, Translation, DEFAULT_SCENE_LIMIT_M, EARTH_RADIUS_M};
pub use estimates::{EstimateMethod, EstimateStore, LocationEstimate};
pub use reconciler::scaling::ScalingScheme;
pub use reconciler::{rendering_order, PositionReconciler};
pub use scene::controller::{
    CallbackHandle, SceneCallback, SceneController, SceneEvent, ScenePositionSource,
    SceneRootHandle,
};
pub use scene::object::{AnnotationLayer, ObjectId, TrackedObject};
pub use scene::polyline::{PolylineSegment, PolylineTrack};
pub use scene::SceneError;
pub use utils::SceneConfig;

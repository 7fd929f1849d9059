//! Tracked objects: geo-anchored scene content
//!
//! A `TrackedObject` is the externally visible node placed at a geographic
//! location. Billboard annotations are the same structure with an optional
//! `AnnotationLayer`, so one reconciliation algorithm handles both.

use crate::core::constants::RENDER_ORDER_CEILING;
use crate::core::types::{GeoPoint, LocalPosition};
use crate::reconciler::scaling::ScalingScheme;
use nalgebra::Vector3;

/// Opaque handle identifying a tracked object in the controller's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Billboard layer attached to a tracked object. Subcontent and adjustments
/// apply to this layer rather than the object itself, so the layer can scale
/// while keeping a 2D billboard appearance.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLayer {
    /// Raises or lowers the layer relative to the object's projected
    /// location. 1.1 places a label at a pleasing height above its anchor;
    /// 0 draws it exactly on the location, negative values below it.
    pub height_adjustment_factor: f32,
    /// Scale applied to the layer (and its children) by the reconciler.
    pub scale: Vector3<f32>,
    /// Offset along the layer's local up axis, recomputed every update as
    /// `-height_adjustment_factor * scale`.
    pub vertical_offset: f32,
}

impl Default for AnnotationLayer {
    fn default() -> Self {
        Self {
            height_adjustment_factor: 1.1,
            scale: Vector3::repeat(1.0),
            vertical_offset: 0.0,
        }
    }
}

/// A scene object anchored to a geographic location.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedObject {
    /// Declared location. Can be set later and is confirmed (and possibly
    /// overwritten with a better reconciled estimate) by the controller.
    pub location: Option<GeoPoint>,

    /// A general purpose tag that can be used to find objects already added
    /// to the scene.
    pub tag: Option<String>,

    /// Whether the object's position should be adjusted on an ongoing basis
    /// based on its given location, even within the scene limit.
    /// When false the appearance is smoother; when true the object may
    /// appear to jump around as location estimates update, but the position
    /// is generally more accurate. Defaults to true.
    pub continually_adjust: bool,

    /// Whether position and scale should be refreshed automatically on every
    /// tick. Set to false only if you plan to drive updates manually via
    /// `SceneController::update_object_position_and_scale`.
    pub continually_update: bool,

    /// Whether the annotation layer inherits the object's raw scale instead
    /// of the scaling scheme's output. The default (false) keeps annotations
    /// at a constant apparent size; true makes them scale like regular
    /// content, which suits local navigation uses.
    pub scale_relative_to_distance: bool,

    /// Keeps the object at the device's altitude. Useful when the real
    /// altitude of the anchor is unknown.
    pub ignore_altitude: bool,

    /// The scheme used to scale the annotation layer.
    pub scaling_scheme: ScalingScheme,

    /// Current position in the scene's local frame. Managed by the
    /// controller once the object is registered.
    pub position: LocalPosition,

    /// Current uniform scale. Managed by the controller.
    pub scale: Vector3<f32>,

    /// Render order; farther objects get strictly smaller values so nearer
    /// objects draw on top.
    pub render_order: i64,

    /// Billboard annotation data, if this object carries one.
    pub annotation: Option<AnnotationLayer>,
}

impl TrackedObject {
    pub fn new(location: Option<GeoPoint>, tag: Option<String>) -> Self {
        Self {
            location,
            tag,
            continually_adjust: true,
            continually_update: true,
            scale_relative_to_distance: false,
            ignore_altitude: false,
            scaling_scheme: ScalingScheme::default(),
            position: LocalPosition::zeros(),
            scale: Vector3::repeat(1.0),
            render_order: RENDER_ORDER_CEILING,
            annotation: None,
        }
    }

    /// An object carrying a billboard annotation layer.
    pub fn with_annotation(location: Option<GeoPoint>, tag: Option<String>) -> Self {
        Self {
            annotation: Some(AnnotationLayer::default()),
            ..Self::new(location, tag)
        }
    }

    /// Whether the location of the object has been confirmed. True as soon
    /// as a location is declared; the distance-based confirmation pass only
    /// refines the declared location of objects created without one.
    pub fn location_confirmed(&self) -> bool {
        self.location.is_some()
    }
}

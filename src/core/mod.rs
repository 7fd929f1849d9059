//! Core data types for geo-anchored scene content

pub mod constants;
pub mod types;

pub use constants::{
    DEFAULT_POLYLINE_ALTITUDE_OFFSET_M, DEFAULT_SCENE_LIMIT_M, DEFAULT_TICK_INTERVAL_MS,
    EARTH_RADIUS_M, RENDER_ORDER_CEILING,
};
pub use types::{horizontal_distance, GeoPoint, LocalPosition, Translation};

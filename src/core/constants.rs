//! Physical and policy constants shared across the crate

/// Mean Earth radius in metres, used by the great-circle formulas.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// The limit to the scene, in terms of what data is considered reasonably
/// accurate. Measured in metres. Estimates beyond this radius are pruned,
/// unconfirmed objects beyond it are confirmed, and rendered distance is
/// clamped to it.
pub const DEFAULT_SCENE_LIMIT_M: f64 = 100.0;

/// Default cadence for the reconciliation tick (milliseconds).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;

/// Render order assigned to an object at distance zero. Farther objects get
/// strictly smaller orders so nearer objects draw on top.
pub const RENDER_ORDER_CEILING: i64 = i64::MAX - 1000;

/// Default altitude offset applied to polyline boxes relative to the device
/// altitude (metres, negative is below the user).
pub const DEFAULT_POLYLINE_ALTITUDE_OFFSET_M: f64 = -2.0;

//! Tick orchestration over the tracked-object registry and estimate store
//!
//! The controller exclusively owns both collections and drives the periodic
//! reconciliation pass. Raw fixes and tick invocations must be marshaled onto
//! the controller's thread by the integrator; no internal locking is
//! provided. A tick is a bounded, synchronous pass: it either completes over
//! the whole registry or is skipped entirely when the scene position is
//! unknown.

use crate::core::types::{GeoPoint, LocalPosition};
use crate::estimates::EstimateStore;
use crate::reconciler::scaling::ScalingScheme;
use crate::reconciler::PositionReconciler;
use crate::scene::object::{ObjectId, TrackedObject};
use crate::scene::polyline::PolylineTrack;
use crate::scene::SceneError;
use crate::utils::config::SceneConfig;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::time::Duration;

/// The camera/scene host. The position is undefined before the first tracked
/// frame, and every operation that needs it degrades to a silent no-op until
/// it becomes available.
pub trait ScenePositionSource {
    fn current_position(&self) -> Option<LocalPosition>;
}

/// Callback function type for scene events
pub type SceneCallback = Box<dyn Fn(&SceneEvent) + Send>;

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Handle to the render host's scene root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneRootHandle(pub u64);

/// Events emitted to registered observers. All callbacks are optional.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// An object's location was confirmed after the user moved far enough
    /// away from it, using location data collected since it was placed.
    ObjectConfirmed { id: ObjectId, location: GeoPoint },
    /// An object's position and scale were recomputed.
    ObjectUpdated {
        id: ObjectId,
        position: LocalPosition,
        scale: Vector3<f32>,
    },
    /// A location estimate was recorded.
    EstimateAdded {
        position: LocalPosition,
        location: GeoPoint,
    },
    /// A location estimate left the relevance radius and was dropped.
    EstimateRemoved {
        position: LocalPosition,
        location: GeoPoint,
    },
    /// The render host's scene root was attached.
    SceneRootAttached { root: SceneRootHandle },
}

struct TrackEntry {
    track: PolylineTrack,
    segment_ids: Vec<ObjectId>,
}

/// Owns the tracked-object registry and the estimate store, and reconciles
/// both against the camera position on every tick.
pub struct SceneController {
    config: SceneConfig,
    host: Box<dyn ScenePositionSource>,
    reconciler: PositionReconciler,
    store: EstimateStore,
    objects: Vec<(ObjectId, TrackedObject)>,
    polylines: Vec<TrackEntry>,
    last_raw_fix: Option<GeoPoint>,
    scene_root: Option<SceneRootHandle>,
    running: bool,
    next_object_id: u64,
    callback_counter: u32,
    callbacks: HashMap<CallbackHandle, SceneCallback>,
}

impl SceneController {
    pub fn new(config: SceneConfig, host: Box<dyn ScenePositionSource>) -> Self {
        let reconciler = PositionReconciler::new(config.estimate_method, config.scene_limit_m);
        Self {
            config,
            host,
            reconciler,
            store: EstimateStore::new(),
            objects: Vec::new(),
            polylines: Vec::new(),
            last_raw_fix: None,
            scene_root: None,
            running: false,
            next_object_id: 0,
            callback_counter: 0,
            callbacks: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The configured tick cadence, for the integrator's timer.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms)
    }

    // MARK: observers

    /// Registers an observer for scene events.
    pub fn register_callback(&mut self, callback: SceneCallback) -> CallbackHandle {
        self.callback_counter += 1;
        let handle = CallbackHandle(self.callback_counter);
        self.callbacks.insert(handle, callback);
        handle
    }

    /// Unregisters an observer. Returns whether the handle was known.
    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    fn emit(&self, event: SceneEvent) {
        for callback in self.callbacks.values() {
            callback(&event);
        }
    }

    // MARK: lifecycle

    /// Enables the periodic work. Idempotent.
    pub fn run(&mut self) {
        self.running = true;
    }

    /// Cancels future ticks. Effects already applied by a completed tick are
    /// not rolled back.
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Records the render host's scene root and notifies observers.
    pub fn attach_scene_root(&mut self, root: SceneRootHandle) {
        self.scene_root = Some(root);
        self.emit(SceneEvent::SceneRootAttached { root });
    }

    pub fn scene_root(&self) -> Option<SceneRootHandle> {
        self.scene_root
    }

    // MARK: fixes and estimates

    /// Handles a raw geographic fix from the location source. Records it as
    /// the last raw fix and, when the scene position is known, binds it into
    /// an estimate. Silently keeps only the raw fix otherwise.
    pub fn handle_fix(&mut self, fix: GeoPoint) {
        self.last_raw_fix = Some(fix.clone());

        let position = match self.host.current_position() {
            Some(position) => position,
            None => return,
        };

        self.store.insert(fix.clone(), position);
        self.emit(SceneEvent::EstimateAdded {
            position,
            location: fix,
        });
    }

    /// The reconciled current device location, or `None` when no fix is
    /// available yet.
    pub fn current_location(&self) -> Option<GeoPoint> {
        self.store.current_location(
            self.config.estimate_method,
            self.host.current_position().as_ref(),
            self.last_raw_fix.as_ref(),
        )
    }

    pub fn estimate_count(&self) -> usize {
        self.store.len()
    }

    // MARK: tick

    /// One reconciliation pass: prune estimates, confirm distant unconfirmed
    /// objects, refresh position and scale of everything that asks for it.
    /// Skipped entirely while paused or when the scene position is unknown.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        let position = match self.host.current_position() {
            Some(position) => position,
            None => return,
        };

        self.prune_estimates(&position);
        self.confirm_distant_objects(&position);
        self.update_tracked_objects(&position);
    }

    fn prune_estimates(&mut self, position: &LocalPosition) {
        let mut removed = Vec::new();
        self.store
            .prune(position, self.config.scene_limit_m, |p, location| {
                removed.push((*p, location.clone()));
            });

        for (position, location) in removed {
            self.emit(SceneEvent::EstimateRemoved { position, location });
        }
    }

    fn confirm_distant_objects(&mut self, position: &LocalPosition) {
        let mut events = Vec::new();

        for (id, object) in self.objects.iter_mut() {
            if object.location_confirmed() {
                continue;
            }
            if self
                .reconciler
                .confirm_if_distant(object, position, self.store.best_estimate())
            {
                let location = object
                    .location
                    .clone()
                    .expect("confirmation always sets a location");
                events.push(SceneEvent::ObjectConfirmed { id: *id, location });
            }
        }

        for event in events {
            self.emit(event);
        }
    }

    fn update_tracked_objects(&mut self, position: &LocalPosition) {
        let current = self.current_location();
        let mut events = Vec::new();

        for entry in self
            .polylines
            .iter_mut()
            .filter(|e| e.track.continually_update)
        {
            for (segment, id) in entry.track.segments.iter_mut().zip(&entry.segment_ids) {
                let object_location = match self
                    .reconciler
                    .resolved_location(&segment.object, self.store.best_estimate())
                {
                    Some(location) => location,
                    None => continue,
                };
                let updated = self.reconciler.update_position_and_scale(
                    &mut segment.object,
                    false,
                    Some(position),
                    &object_location,
                    current.as_ref(),
                );
                if updated {
                    events.push(SceneEvent::ObjectUpdated {
                        id: *id,
                        position: segment.object.position,
                        scale: segment.object.scale,
                    });
                }
            }
        }

        for (id, object) in self
            .objects
            .iter_mut()
            .filter(|(_, object)| object.continually_update)
        {
            // Skip objects with no resolvable location; they wait for the
            // next usable estimate.
            let object_location = match self
                .reconciler
                .resolved_location(object, self.store.best_estimate())
            {
                Some(location) => location,
                None => continue,
            };
            let updated = self.reconciler.update_position_and_scale(
                object,
                false,
                Some(position),
                &object_location,
                current.as_ref(),
            );
            if updated {
                events.push(SceneEvent::ObjectUpdated {
                    id: *id,
                    position: object.position,
                    scale: object.scale,
                });
            }
        }

        for event in events {
            self.emit(event);
        }
    }

    // MARK: registry

    fn next_id(&mut self) -> ObjectId {
        self.next_object_id += 1;
        ObjectId(self.next_object_id)
    }

    /// Annotation objects registered without an explicit scaling scheme take
    /// the configured default; an explicit choice always wins.
    fn apply_default_scheme(&self, object: &mut TrackedObject) {
        if object.annotation.is_some() && object.scaling_scheme == ScalingScheme::default() {
            object.scaling_scheme = self.config.default_scaling_scheme;
        }
    }

    /// Registers an object at the current scene position. Its local position
    /// is stamped from the camera; an object without a declared location
    /// stays unconfirmed until the distance rule fires.
    ///
    /// Returns `None` without registering when the current position or the
    /// current location is unavailable; the caller should retry.
    pub fn add_object(&mut self, mut object: TrackedObject) -> Option<ObjectId> {
        let position = self.host.current_position()?;
        self.current_location()?;

        object.position = position;
        self.apply_default_scheme(&mut object);

        let id = self.next_id();
        self.objects.push((id, object));
        Some(id)
    }

    /// Registers an object whose declared location is taken as accurate,
    /// performing a setup-phase position update immediately. The location
    /// will not be modified. Returns `None` when no location is declared.
    pub fn add_object_with_confirmed_location(
        &mut self,
        mut object: TrackedObject,
    ) -> Option<ObjectId> {
        if !object.location_confirmed() {
            return None;
        }
        self.apply_default_scheme(&mut object);

        let object_location = self
            .reconciler
            .resolved_location(&object, self.store.best_estimate())?;
        let position = self.host.current_position();
        let current = self.current_location();

        let updated = self.reconciler.update_position_and_scale(
            &mut object,
            true,
            position.as_ref(),
            &object_location,
            current.as_ref(),
        );

        let id = self.next_id();
        if updated {
            self.emit(SceneEvent::ObjectUpdated {
                id,
                position: object.position,
                scale: object.scale,
            });
        }
        self.objects.push((id, object));
        Some(id)
    }

    /// Element-wise `add_object`; no atomicity across the batch.
    pub fn add_objects(&mut self, objects: Vec<TrackedObject>) -> Vec<Option<ObjectId>> {
        objects.into_iter().map(|o| self.add_object(o)).collect()
    }

    /// Element-wise `add_object_with_confirmed_location`.
    pub fn add_objects_with_confirmed_location(
        &mut self,
        objects: Vec<TrackedObject>,
    ) -> Vec<Option<ObjectId>> {
        objects
            .into_iter()
            .map(|o| self.add_object_with_confirmed_location(o))
            .collect()
    }

    /// Removes an object from the registry, returning it.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<TrackedObject> {
        let index = self.objects.iter().position(|(i, _)| *i == id)?;
        Some(self.objects.remove(index).1)
    }

    pub fn remove_objects(&mut self, ids: &[ObjectId]) {
        for id in ids {
            self.remove_object(*id);
        }
    }

    /// Clears the registry, including polylines.
    pub fn remove_all_objects(&mut self) {
        self.objects.clear();
        self.polylines.clear();
    }

    pub fn object(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.objects
            .iter()
            .find(|(i, _)| *i == id)
            .map(|(_, object)| object)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// All objects tagged exactly `tag` (case-sensitive). An empty tag never
    /// matches anything.
    pub fn find_tagged(&self, tag: &str) -> Vec<ObjectId> {
        if tag.is_empty() {
            return Vec::new();
        }

        self.objects
            .iter()
            .filter(|(_, object)| object.tag.as_deref() == Some(tag))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        !self.find_tagged(tag).is_empty()
    }

    /// Best estimate of an object's geographic location. `None` when the
    /// object is unknown or its location cannot be resolved yet.
    pub fn resolved_location_of(&self, id: ObjectId) -> Option<GeoPoint> {
        let object = self.object(id)?;
        self.reconciler
            .resolved_location(object, self.store.best_estimate())
    }

    /// Manual position refresh for integrators that drive updates per frame
    /// instead of via `continually_update`. Returns whether anything changed.
    pub fn update_object_position_and_scale(&mut self, id: ObjectId) -> bool {
        let position = self.host.current_position();
        let current = self.current_location();

        let index = match self.objects.iter().position(|(i, _)| *i == id) {
            Some(index) => index,
            None => return false,
        };

        let object = &mut self.objects[index].1;
        let object_location = match self
            .reconciler
            .resolved_location(object, self.store.best_estimate())
        {
            Some(location) => location,
            None => return false,
        };
        let updated = self.reconciler.update_position_and_scale(
            object,
            false,
            position.as_ref(),
            &object_location,
            current.as_ref(),
        );

        if updated {
            let event = SceneEvent::ObjectUpdated {
                id,
                position: self.objects[index].1.position,
                scale: self.objects[index].1.scale,
            };
            self.emit(event);
        }
        updated
    }

    // MARK: routes and polylines

    /// Adds a route as a polyline track at the device altitude plus the
    /// configured offset. Rejected with `MissingAltitude` when no current
    /// location is available; existing state is untouched.
    pub fn add_route(
        &mut self,
        vertices: &[(f64, f64)],
        tag: Option<String>,
    ) -> Result<(), SceneError> {
        let current = self.current_location().ok_or(SceneError::MissingAltitude)?;
        let altitude = current.altitude + self.config.polyline_altitude_offset_m;

        let mut track = PolylineTrack::new(vertices, altitude, tag);
        let position = self.host.current_position();

        let mut segment_ids = Vec::with_capacity(track.segments.len());
        let mut events = Vec::new();

        for segment in &mut track.segments {
            let id = self.next_id();
            segment_ids.push(id);

            // Segment objects are created confirmed at their midpoints, so
            // their locations always resolve.
            let object_location = match self
                .reconciler
                .resolved_location(&segment.object, self.store.best_estimate())
            {
                Some(location) => location,
                None => continue,
            };
            let updated = self.reconciler.update_position_and_scale(
                &mut segment.object,
                true,
                position.as_ref(),
                &object_location,
                Some(&current),
            );

            if updated {
                events.push(SceneEvent::ObjectUpdated {
                    id,
                    position: segment.object.position,
                    scale: segment.object.scale,
                });
            }
        }

        self.polylines.push(TrackEntry { track, segment_ids });

        for event in events {
            self.emit(event);
        }
        Ok(())
    }

    /// Element-wise `add_route` without tags; a failure mid-batch leaves
    /// earlier successes in place.
    pub fn add_polylines(&mut self, polylines: &[Vec<(f64, f64)>]) -> Result<(), SceneError> {
        for vertices in polylines {
            self.add_route(vertices, None)?;
        }
        Ok(())
    }

    /// Removes every polyline track tagged exactly `tag`.
    pub fn remove_polylines_tagged(&mut self, tag: &str) {
        self.polylines.retain(|entry| entry.track.tag != tag);
    }

    pub fn polyline_count(&self) -> usize {
        self.polylines.len()
    }

    /// Read access to the registered polyline tracks.
    pub fn polylines(&self) -> impl Iterator<Item = &PolylineTrack> {
        self.polylines.iter().map(|entry| &entry.track)
    }
}

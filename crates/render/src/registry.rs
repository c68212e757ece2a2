use std::collections::BTreeMap;

use crate::camera::Camera;
use crate::layer::DepthLayer;
use crate::object::SceneObject;
use crate::surface::Surface;

/// Non-owning reference to a registered [`SceneObject`].
///
/// Handles carry a generation so a stale handle never reaches an object that reused its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle {
    index: u32,
    generation: u32,
}

impl ObjectHandle {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene object {0:?} not found")]
    ObjectNotFound(ObjectHandle),
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    object: Option<SceneObject>,
}

/// Counts from one [`ObjectRegistry::render_frame`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub layers: usize,
    pub objects: usize,
    pub objects_in_view: usize,
}

/// Sole owner of every scene object, bucketed into depth layers by layer number.
///
/// Layers draw in ascending layer number; within a layer, objects draw furthest first.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    layers: BTreeMap<u8, DepthLayer>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `object` and file it under `layer`.
    pub fn register(&mut self, mut object: SceneObject, layer: u8) -> ObjectHandle {
        object.set_layer(layer);
        tracing::debug!(name = object.name(), layer, "registering scene object");
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                ObjectHandle::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                ObjectHandle::new(self.slots.len() as u32 - 1, 0)
            }
        };
        self.layers.entry(layer).or_default().insert(handle);
        handle
    }

    /// Remove an object from its layer and hand it back.
    pub fn unregister(&mut self, handle: ObjectHandle) -> Result<SceneObject, SceneError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation && s.object.is_some())
            .ok_or(SceneError::ObjectNotFound(handle))?;
        let object = slot.object.take().ok_or(SceneError::ObjectNotFound(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);

        let layer = object.layer();
        if let Some(members) = self.layers.get_mut(&layer) {
            members.remove(handle);
            if members.is_empty() {
                self.layers.remove(&layer);
            }
        }
        tracing::debug!(name = object.name(), layer, "unregistered scene object");
        Ok(object)
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.object.as_ref())
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        slot_object_mut(&mut self.slots, handle)
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Move an object to another layer.
    pub fn set_layer(&mut self, handle: ObjectHandle, layer: u8) -> Result<(), SceneError> {
        let object = slot_object_mut(&mut self.slots, handle)
            .ok_or(SceneError::ObjectNotFound(handle))?;
        let old = object.layer();
        if old == layer {
            return Ok(());
        }
        object.set_layer(layer);
        if let Some(members) = self.layers.get_mut(&old) {
            members.remove(handle);
            if members.is_empty() {
                self.layers.remove(&old);
            }
        }
        self.layers.entry(layer).or_default().insert(handle);
        Ok(())
    }

    pub fn layer(&self, layer: u8) -> Option<&DepthLayer> {
        self.layers.get(&layer)
    }

    /// Occupied layer numbers in draw order.
    pub fn layer_numbers(&self) -> Vec<u8> {
        self.layers.keys().copied().collect()
    }

    pub fn object_count(&self) -> usize {
        self.slots.iter().filter(|s| s.object.is_some()).count()
    }

    /// Transform, depth-sort and draw every layer in ascending layer order.
    pub fn render_frame(&mut self, camera: &Camera, surface: &mut dyn Surface) -> FrameStats {
        let _span = tracing::trace_span!("render_frame").entered();
        let Self { slots, layers, .. } = self;
        let mut stats = FrameStats::default();

        for (number, layer) in layers.iter_mut() {
            for &handle in layer.members() {
                if let Some(object) = slot_object_mut(slots, handle) {
                    object.transform_for_camera(camera);
                }
            }
            let view: &[Slot] = slots;
            layer.sort_by_depth(|h| slot_object(view, h).and_then(SceneObject::depth_key));
            for &handle in layer.members() {
                if let Some(object) = slot_object(view, handle) {
                    stats.objects += 1;
                    if object.is_in_view() {
                        stats.objects_in_view += 1;
                    }
                    object.draw(camera, surface);
                }
            }
            stats.layers += 1;
            tracing::trace!(layer = number, members = layer.len(), "layer drawn");
        }
        stats
    }
}

fn slot_object(slots: &[Slot], handle: ObjectHandle) -> Option<&SceneObject> {
    slots
        .get(handle.index as usize)
        .filter(|s| s.generation == handle.generation)
        .and_then(|s| s.object.as_ref())
}

fn slot_object_mut(slots: &mut [Slot], handle: ObjectHandle) -> Option<&mut SceneObject> {
    slots
        .get_mut(handle.index as usize)
        .filter(|s| s.generation == handle.generation)
        .and_then(|s| s.object.as_mut())
}

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ownership of every light of the engine behind integer ids.

use std::fmt;

use radiant_core::renderer::{LightKind, ResourceError};
use radiant_lanes::{
    gpu::SharedDevice,
    render_lane::{Light, LightId, LightSource},
};

/// Error returned by light operations.
#[derive(Debug)]
pub enum LightError {
    /// The id was never returned by [`LightStore::create`] or was destroyed.
    UnknownLight(LightId),
    /// The shadow map could not be allocated.
    Shadow(ResourceError),
}

impl fmt::Display for LightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightError::UnknownLight(id) => write!(f, "Unknown light id {}", id.0),
            LightError::Shadow(e) => write!(f, "Shadow map allocation failed: {e}"),
        }
    }
}

impl std::error::Error for LightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LightError::Shadow(e) => Some(e),
            LightError::UnknownLight(_) => None,
        }
    }
}

impl From<ResourceError> for LightError {
    fn from(e: ResourceError) -> Self {
        LightError::Shadow(e)
    }
}

/// A dense slot array of lights with id recycling.
///
/// Ids start at 1. A destroyed id goes to a free list and is handed out
/// again by the next [`create`](LightStore::create), so an id held after
/// `destroy` may later name an unrelated light.
pub struct LightStore {
    device: SharedDevice,
    // Slot `i` holds the light of id `i + 1`.
    slots: Vec<Option<Light>>,
    // Released ids, reused last-in first-out.
    free: Vec<LightId>,
}

impl fmt::Debug for LightStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightStore")
            .field("lights", &self.len())
            .field("free", &self.free.len())
            .finish()
    }
}

impl LightStore {
    /// Creates an empty store allocating shadow maps on `device`.
    pub fn new(device: SharedDevice) -> Self {
        Self {
            device,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Creates a disabled light of `kind`.
    ///
    /// # Arguments
    ///
    /// * `kind`: The kind of light.
    /// * `shadow_map_size`: Resolution of the shadow map, `0` for no shadow.
    ///
    /// # Returns
    ///
    /// The id of the new light. When the shadow map cannot be allocated the
    /// light is still created, without shadow, and a warning is logged.
    pub fn create(&mut self, kind: LightKind, shadow_map_size: u32) -> LightId {
        let mut light = Light::new(kind);
        if shadow_map_size > 0 {
            if let Err(e) = light.enable_shadow(&self.device, shadow_map_size) {
                log::warn!("Light created without its {shadow_map_size}px shadow map: {e}");
            }
        }

        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.0 as usize - 1] = Some(light);
                id
            }
            None => {
                self.slots.push(Some(light));
                LightId(self.slots.len() as u32)
            }
        };
        log::debug!("Created {:?} light {}", kind, id.0);
        id
    }

    /// Destroys a light and releases its shadow map.
    ///
    /// Returns `false` when `id` names no light, including a second destroy.
    pub fn destroy(&mut self, id: LightId) -> bool {
        match self.slot_mut(id).and_then(Option::take) {
            Some(_) => {
                self.free.push(id);
                log::debug!("Destroyed light {}", id.0);
                true
            }
            None => false,
        }
    }

    /// Destroys every light.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// True when `id` names a live light.
    pub fn contains(&self, id: LightId) -> bool {
        self.get(id).is_some()
    }

    /// The light of `id`.
    pub fn get(&self, id: LightId) -> Option<&Light> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.slots.get(index)?.as_ref()
    }

    /// Mutable access to the light of `id`.
    pub fn get_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.slot_mut(id)?.as_mut()
    }

    /// Looks up a light, failing with [`LightError::UnknownLight`].
    pub fn try_get_mut(&mut self, id: LightId) -> Result<&mut Light, LightError> {
        self.get_mut(id).ok_or(LightError::UnknownLight(id))
    }

    /// Whether the light contributes to frames. `false` for unknown ids.
    pub fn is_active(&self, id: LightId) -> bool {
        self.get(id).is_some_and(|l| l.enabled)
    }

    /// Enables or disables a light. Returns `false` for unknown ids.
    pub fn set_active(&mut self, id: LightId, active: bool) -> bool {
        match self.get_mut(id) {
            Some(light) => {
                light.enabled = active;
                true
            }
            None => false,
        }
    }

    /// Flips the active flag. Returns `false` for unknown ids.
    pub fn toggle(&mut self, id: LightId) -> bool {
        match self.get_mut(id) {
            Some(light) => {
                light.enabled = !light.enabled;
                true
            }
            None => false,
        }
    }

    /// Gives the light a shadow map of `resolution` texels.
    pub fn enable_shadow(&mut self, id: LightId, resolution: u32) -> Result<(), LightError> {
        let device = self.device.clone();
        self.try_get_mut(id)?.enable_shadow(&device, resolution)?;
        Ok(())
    }

    /// Releases the shadow map. Nothing happens when shadows are already off.
    pub fn disable_shadow(&mut self, id: LightId) -> Result<(), LightError> {
        self.try_get_mut(id)?.disable_shadow();
        Ok(())
    }

    /// Changes the kind of a light, reallocating its shadow map if it has one.
    pub fn set_kind(&mut self, id: LightId, kind: LightKind) -> Result<(), LightError> {
        let device = self.device.clone();
        self.try_get_mut(id)?.set_kind(&device, kind)?;
        Ok(())
    }

    /// Number of live lights.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when no light is alive.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live lights in id order.
    pub fn iter(&self) -> impl Iterator<Item = (LightId, &Light)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|l| (LightId(i as u32 + 1), l)))
    }

    fn slot_mut(&mut self, id: LightId) -> Option<&mut Option<Light>> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.slots.get_mut(index)
    }
}

impl LightSource for LightStore {
    fn light(&self, id: LightId) -> Option<&Light> {
        self.get(id)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use radiant_core::math::Vec3;
    use radiant_infra::HeadlessDevice;

    use super::*;

    fn store() -> (Rc<HeadlessDevice>, LightStore) {
        let headless = Rc::new(HeadlessDevice::new(64, 64));
        let device: SharedDevice = headless.clone();
        (headless, LightStore::new(device))
    }

    #[test]
    fn test_ids_start_at_one_and_are_recycled() {
        let (_, mut lights) = store();
        let a = lights.create(LightKind::Omni, 0);
        let b = lights.create(LightKind::Spot, 0);
        assert_eq!((a, b), (LightId(1), LightId(2)));
        assert!(lights.destroy(a));
        assert!(!lights.destroy(a));
        assert!(!lights.contains(a));
        assert_eq!(lights.create(LightKind::Directional, 0), a);
        assert_eq!(lights.len(), 2);
        assert!(lights.get(LightId(0)).is_none());
    }

    #[test]
    fn test_active_flag_follows_setters() {
        let (_, mut lights) = store();
        let id = lights.create(LightKind::Omni, 0);
        assert!(!lights.is_active(id));
        assert!(lights.set_active(id, true));
        assert!(lights.is_active(id));
        lights.toggle(id);
        lights.toggle(id);
        assert!(lights.is_active(id));
        lights.destroy(id);
        assert!(!lights.set_active(id, true));
        assert!(!lights.is_active(id));
    }

    #[test]
    fn test_light_defaults() {
        let (_, mut lights) = store();
        let id = lights.create(LightKind::Spot, 0);
        let light = lights.get(id).unwrap();
        assert_relative_eq!(light.energy, 1.0);
        assert_relative_eq!(light.max_distance, 32.0);
        assert!(!light.has_shadow());
        assert_relative_eq!(light.direction().length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_shadow_allocation_failure_keeps_the_light() {
        let (headless, mut lights) = store();
        headless.set_fail_allocations(true);
        let id = lights.create(LightKind::Directional, 1024);
        assert!(lights.contains(id));
        assert!(!lights.get(id).unwrap().has_shadow());
        assert!(!lights.is_active(id));
        assert!(matches!(lights.enable_shadow(id, 512), Err(LightError::Shadow(_))));

        headless.set_fail_allocations(false);
        lights.enable_shadow(id, 512).unwrap();
        assert!(lights.get(id).unwrap().has_shadow());
        lights.disable_shadow(id).unwrap();
        lights.disable_shadow(id).unwrap();
        assert!(!lights.get(id).unwrap().has_shadow());
    }

    #[test]
    fn test_destroy_releases_the_shadow_map() {
        let (headless, mut lights) = store();
        let before = headless.live_textures();
        let id = lights.create(LightKind::Omni, 256);
        assert!(headless.live_textures() > before);
        lights.destroy(id);
        assert_eq!(headless.live_textures(), before);
    }

    #[test]
    fn test_unknown_ids_are_reported() {
        let (_, mut lights) = store();
        let err = lights.set_kind(LightId(7), LightKind::Spot).unwrap_err();
        assert!(matches!(err, LightError::UnknownLight(LightId(7))));
        lights.create(LightKind::Omni, 0);
        lights.get_mut(LightId(1)).unwrap().set_direction(Vec3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(lights.get(LightId(1)).unwrap().direction().y, 1.0);
    }
}

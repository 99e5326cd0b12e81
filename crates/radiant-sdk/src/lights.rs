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

//! Light management on the [`Engine`].
//!
//! Lights are addressed by [`LightId`]. Getters return `None` and setters
//! return [`EngineError::Light`] for ids that name no light; both cases are
//! logged. A destroyed id may later be handed out again by
//! [`Engine::create_light`].

use radiant_agents::LightError;
use radiant_core::math::{Color, Vec3};
use radiant_core::renderer::{Layers, LightKind};
use radiant_lanes::render_lane::{Light, LightId};

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Creates a disabled light.
    ///
    /// `shadow_map_size` of `0` creates it without shadow. A shadow map that
    /// cannot be allocated is logged and the light is created without one.
    pub fn create_light(&mut self, kind: LightKind, shadow_map_size: u32) -> LightId {
        self.agent.lights_mut().create(kind, shadow_map_size)
    }

    /// Destroys a light. Returns `false` for unknown ids, including a
    /// second destroy.
    pub fn destroy_light(&mut self, id: LightId) -> bool {
        let destroyed = self.agent.destroy_light(id);
        if !destroyed {
            log::warn!("Cannot destroy light {}: no such light", id.0);
        }
        destroyed
    }

    /// Number of live lights.
    pub fn light_count(&self) -> usize {
        self.agent.lights().len()
    }

    /// Whether the light contributes to frames. `false` for unknown ids.
    pub fn is_light_active(&self, id: LightId) -> bool {
        self.agent.lights().is_active(id)
    }

    /// Enables or disables a light.
    pub fn set_light_active(&mut self, id: LightId, active: bool) -> EngineResult<()> {
        self.update_light(id, |light| light.enabled = active)
    }

    /// Flips the active flag of a light.
    pub fn toggle_light(&mut self, id: LightId) -> EngineResult<()> {
        self.update_light(id, |light| light.enabled = !light.enabled)
    }

    /// The kind of a light.
    pub fn light_kind(&self, id: LightId) -> Option<LightKind> {
        self.read_light(id, Light::kind)
    }

    /// Changes the kind of a light, reallocating its shadow map.
    pub fn set_light_kind(&mut self, id: LightId, kind: LightKind) -> EngineResult<()> {
        self.agent
            .lights_mut()
            .set_kind(id, kind)
            .map_err(light_failure)
    }

    /// The color of a light.
    pub fn light_color(&self, id: LightId) -> Option<Color> {
        self.read_light(id, |light| light.color)
    }

    /// Sets the color of a light.
    pub fn set_light_color(&mut self, id: LightId, color: Color) -> EngineResult<()> {
        self.update_light(id, |light| light.color = color)
    }

    /// The position of a light.
    pub fn light_position(&self, id: LightId) -> Option<Vec3> {
        self.read_light(id, Light::position)
    }

    /// Moves a light. Directional and spot lights recompute their frustum;
    /// prefer [`set_light_position_target`](Self::set_light_position_target)
    /// when the direction changes too.
    pub fn set_light_position(&mut self, id: LightId, position: Vec3) -> EngineResult<()> {
        self.update_light(id, |light| light.set_position(position))
    }

    /// The unit direction of a light.
    pub fn light_direction(&self, id: LightId) -> Option<Vec3> {
        self.read_light(id, Light::direction)
    }

    /// Points a light along `direction`, normalized. A zero vector is ignored.
    pub fn set_light_direction(&mut self, id: LightId, direction: Vec3) -> EngineResult<()> {
        self.update_light(id, |light| light.set_direction(direction))
    }

    /// Points a light at `target`.
    pub fn set_light_target(&mut self, id: LightId, target: Vec3) -> EngineResult<()> {
        self.update_light(id, |light| light.set_target(target))
    }

    /// Moves a light and points it at `target` with one frustum update.
    pub fn set_light_position_target(&mut self, id: LightId, position: Vec3, target: Vec3) -> EngineResult<()> {
        self.update_light(id, |light| light.set_position_target(position, target))
    }

    /// The energy of a light.
    pub fn light_energy(&self, id: LightId) -> Option<f32> {
        self.read_light(id, |light| light.energy)
    }

    /// Sets the energy of a light.
    pub fn set_light_energy(&mut self, id: LightId, energy: f32) -> EngineResult<()> {
        self.update_light(id, |light| light.energy = energy)
    }

    /// The range of a spot or omni light.
    pub fn light_range(&self, id: LightId) -> Option<f32> {
        self.read_light(id, |light| light.max_distance)
    }

    /// Sets the range of a spot or omni light.
    pub fn set_light_range(&mut self, id: LightId, range: f32) -> EngineResult<()> {
        self.update_light(id, |light| light.max_distance = range)
    }

    /// The attenuation factor of a light.
    pub fn light_attenuation(&self, id: LightId) -> Option<f32> {
        self.read_light(id, |light| light.attenuation)
    }

    /// Sets the attenuation factor of a light.
    pub fn set_light_attenuation(&mut self, id: LightId, attenuation: f32) -> EngineResult<()> {
        self.update_light(id, |light| light.attenuation = attenuation)
    }

    /// The inner cone angle of a spot light, in degrees.
    pub fn light_inner_cutoff(&self, id: LightId) -> Option<f32> {
        self.read_light(id, Light::inner_cutoff)
    }

    /// Sets the inner cone angle of a spot light, in degrees.
    pub fn set_light_inner_cutoff(&mut self, id: LightId, degrees: f32) -> EngineResult<()> {
        self.update_light(id, |light| light.set_inner_cutoff(degrees))
    }

    /// The outer cone angle of a spot light, in degrees.
    pub fn light_outer_cutoff(&self, id: LightId) -> Option<f32> {
        self.read_light(id, Light::outer_cutoff)
    }

    /// Sets the outer cone angle of a spot light, in degrees.
    pub fn set_light_outer_cutoff(&mut self, id: LightId, degrees: f32) -> EngineResult<()> {
        self.update_light(id, |light| light.set_outer_cutoff(degrees))
    }

    /// The shadow depth bias of a light.
    pub fn light_shadow_bias(&self, id: LightId) -> Option<f32> {
        self.read_light(id, |light| light.shadow_bias)
    }

    /// Sets the shadow depth bias of a light.
    pub fn set_light_shadow_bias(&mut self, id: LightId, bias: f32) -> EngineResult<()> {
        self.update_light(id, |light| light.shadow_bias = bias)
    }

    /// Whether a light has a shadow map. `false` for unknown ids.
    pub fn light_has_shadow(&self, id: LightId) -> bool {
        self.read_light(id, Light::has_shadow).unwrap_or(false)
    }

    /// Gives a light a shadow map of `resolution` texels.
    pub fn enable_light_shadow(&mut self, id: LightId, resolution: u32) -> EngineResult<()> {
        self.agent
            .lights_mut()
            .enable_shadow(id, resolution)
            .map_err(light_failure)
    }

    /// Releases the shadow map of a light. Nothing happens when it has none.
    pub fn disable_light_shadow(&mut self, id: LightId) -> EngineResult<()> {
        self.agent
            .lights_mut()
            .disable_shadow(id)
            .map_err(light_failure)
    }

    /// The layers a light illuminates.
    pub fn light_layers(&self, id: LightId) -> Option<Layers> {
        self.read_light(id, |light| light.layers)
    }

    /// Replaces the layers a light illuminates.
    pub fn set_light_layers(&mut self, id: LightId, layers: Layers) -> EngineResult<()> {
        self.update_light(id, |light| light.layers = layers)
    }

    /// Adds layers to a light.
    pub fn add_light_layers(&mut self, id: LightId, layers: Layers) -> EngineResult<()> {
        self.update_light(id, |light| light.layers.insert(layers))
    }

    /// Removes layers from a light.
    pub fn remove_light_layers(&mut self, id: LightId, layers: Layers) -> EngineResult<()> {
        self.update_light(id, |light| light.layers.remove(layers))
    }

    /// Toggles layers of a light.
    pub fn toggle_light_layers(&mut self, id: LightId, layers: Layers) -> EngineResult<()> {
        self.update_light(id, |light| light.layers.toggle(layers))
    }

    fn read_light<T>(&self, id: LightId, read: impl FnOnce(&Light) -> T) -> Option<T> {
        match self.agent.lights().get(id) {
            Some(light) => Some(read(light)),
            None => {
                log::warn!("Unknown light id {}", id.0);
                None
            }
        }
    }

    fn update_light(&mut self, id: LightId, update: impl FnOnce(&mut Light)) -> EngineResult<()> {
        let light = self
            .agent
            .lights_mut()
            .try_get_mut(id)
            .map_err(light_failure)?;
        update(light);
        Ok(())
    }
}

fn light_failure(e: LightError) -> EngineError {
    log::warn!("{e}");
    EngineError::Light(e)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use approx::assert_relative_eq;
    use radiant_infra::HeadlessDevice;

    use super::*;

    fn engine() -> Engine {
        Engine::init(Rc::new(HeadlessDevice::new(32, 32))).unwrap()
    }

    #[test]
    fn test_active_flag_round_trips() {
        let mut engine = engine();
        let id = engine.create_light(LightKind::Spot, 0);
        assert!(!engine.is_light_active(id));
        engine.set_light_active(id, true).unwrap();
        assert!(engine.is_light_active(id));
        engine.toggle_light(id).unwrap();
        engine.toggle_light(id).unwrap();
        assert!(engine.is_light_active(id));

        assert!(engine.destroy_light(id));
        assert!(!engine.destroy_light(id));
        assert!(!engine.is_light_active(id));
        assert!(matches!(
            engine.set_light_active(id, true),
            Err(EngineError::Light(LightError::UnknownLight(_)))
        ));
    }

    #[test]
    fn test_directions_stay_normalized() {
        let mut engine = engine();
        let id = engine.create_light(LightKind::Directional, 0);
        engine.set_light_direction(id, Vec3::new(3.0, -4.0, 0.0)).unwrap();
        assert_relative_eq!(engine.light_direction(id).unwrap().length(), 1.0, epsilon = 1e-5);

        engine.set_light_position(id, Vec3::new(0.0, 5.0, 2.0)).unwrap();
        engine.set_light_target(id, Vec3::new(7.0, 1.0, -3.0)).unwrap();
        assert_relative_eq!(engine.light_direction(id).unwrap().length(), 1.0, epsilon = 1e-5);

        engine
            .set_light_position_target(id, Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO)
            .unwrap();
        let dir = engine.light_direction(id).unwrap();
        assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(dir.x, -(1.0f32 / 3.0).sqrt(), epsilon = 1e-5);
        assert_eq!(engine.light_position(id), Some(Vec3::new(1.0, 1.0, 1.0)));
    }

    #[test]
    fn test_cutoffs_are_returned_in_degrees() {
        let mut engine = engine();
        let id = engine.create_light(LightKind::Spot, 0);
        engine.set_light_outer_cutoff(id, 35.0).unwrap();
        engine.set_light_inner_cutoff(id, 20.0).unwrap();
        assert_relative_eq!(engine.light_inner_cutoff(id).unwrap(), 20.0, epsilon = 1e-3);
        assert_relative_eq!(engine.light_outer_cutoff(id).unwrap(), 35.0, epsilon = 1e-3);
    }

    #[test]
    fn test_layer_masks_combine() {
        let mut engine = engine();
        let id = engine.create_light(LightKind::Omni, 0);
        assert_eq!(engine.light_layers(id), Some(Layers::ALL));
        engine.set_light_layers(id, Layers::LAYER_1).unwrap();
        engine.add_light_layers(id, Layers::LAYER_4).unwrap();
        engine.remove_light_layers(id, Layers::LAYER_1).unwrap();
        engine.toggle_light_layers(id, Layers::LAYER_2).unwrap();
        let mut expected = Layers::LAYER_4;
        expected.insert(Layers::LAYER_2);
        assert_eq!(engine.light_layers(id), Some(expected));
    }

    #[test]
    fn test_shadow_can_be_toggled() {
        let mut engine = engine();
        let id = engine.create_light(LightKind::Spot, 0);
        assert!(!engine.light_has_shadow(id));
        engine.enable_light_shadow(id, 128).unwrap();
        assert!(engine.light_has_shadow(id));
        engine.set_light_kind(id, LightKind::Omni).unwrap();
        assert!(engine.light_has_shadow(id));
        assert_eq!(engine.light_kind(id), Some(LightKind::Omni));
        engine.disable_light_shadow(id).unwrap();
        engine.disable_light_shadow(id).unwrap();
        assert!(!engine.light_has_shadow(id));
    }

    #[test]
    fn test_scalar_properties() {
        let mut engine = engine();
        let id = engine.create_light(LightKind::Omni, 0);
        engine.set_light_color(id, Color::new(255, 0, 0, 255)).unwrap();
        engine.set_light_energy(id, 4.0).unwrap();
        engine.set_light_range(id, 12.0).unwrap();
        engine.set_light_attenuation(id, 0.5).unwrap();
        engine.set_light_shadow_bias(id, 0.002).unwrap();
        assert_eq!(engine.light_color(id), Some(Color::new(255, 0, 0, 255)));
        assert_eq!(engine.light_energy(id), Some(4.0));
        assert_eq!(engine.light_range(id), Some(12.0));
        assert_eq!(engine.light_attenuation(id), Some(0.5));
        assert_eq!(engine.light_shadow_bias(id), Some(0.002));
        assert_eq!(engine.light_energy(LightId(99)), None);
    }
}

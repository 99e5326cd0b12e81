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

//! Turning models, sprites and particle systems into batched calls.

use radiant_core::{
    math::{billboard_rotation, BillboardMode, Mat4, Vec3},
    renderer::RenderError,
};
use radiant_data::{Model, ParticleSystem, Sprite};
use radiant_lanes::render_lane::{DrawSource, ParticleInstance, SceneCall, ShadowCall};

use super::{
    agent::{invalid_state, RenderAgent},
    culling::{call_matrix, classify, Classification, CullSettings, Drawable, FrameView},
};

impl RenderAgent {
    fn frame_view(&self) -> Result<FrameView, RenderError> {
        self.view
            .ok_or_else(|| invalid_state("submission outside a begin/end pair"))
    }

    fn classify(&self, view: &FrameView, drawable: &Drawable) -> Classification {
        let settings = CullSettings {
            frustum: &view.frustum,
            frustum_culling: self.frustum_culling(),
            active_layers: self.settings.active_layers,
        };
        classify(drawable, &self.lights, &settings)
    }

    /// Submits every surface of `model`.
    ///
    /// # Arguments
    ///
    /// * `model`: The model. Surfaces whose mesh was never uploaded are skipped.
    /// * `position`, `axis`, `angle_deg`, `scale`: Placement of this draw,
    ///   applied after the model's own transform.
    ///
    /// # Returns
    ///
    /// An error when called outside a frame or when the model's transform
    /// hierarchy contains a cycle.
    pub fn submit_model(
        &mut self,
        model: &Model,
        position: Vec3,
        axis: Vec3,
        angle_deg: f32,
        scale: Vec3,
    ) -> Result<(), RenderError> {
        let view = self.frame_view()?;
        let local = model
            .transform
            .to_global()
            .map_err(|e| RenderError::InvalidState(e.to_string()))?;
        let world = view.world_matrix(call_matrix(position, axis, angle_deg, scale), local, model.billboard);
        let drawable = Drawable {
            bounds: model.aabb.transform(&world),
            position: world.translation(),
            shadow: model.shadow,
            layers: model.layers,
        };
        let class = self.classify(&view, &drawable);
        if class.is_culled() {
            return Ok(());
        }

        for surface in &model.surfaces {
            let Some(mesh) = surface.mesh.id else {
                log::debug!("Skipping surface without uploaded mesh");
                continue;
            };
            let source = DrawSource::Mesh {
                mesh,
                triangles: surface.mesh.data.triangle_count(),
            };
            for &light in &class.shadow_lights {
                self.shadow_batches.push(
                    light,
                    ShadowCall {
                        source: source.clone(),
                        transform: world,
                    },
                );
            }
            if class.draw_scene {
                self.scene_batches.push(
                    surface.material.config,
                    SceneCall {
                        source,
                        material: surface.material,
                        transform: world,
                        lights: class.lights,
                    },
                );
            }
        }
        Ok(())
    }

    /// Submits a sprite, drawn with the shared unit quad.
    ///
    /// Culling uses the unit cube around the sprite.
    pub fn submit_sprite(
        &mut self,
        sprite: &Sprite,
        position: Vec3,
        axis: Vec3,
        angle_deg: f32,
        scale: Vec3,
    ) -> Result<(), RenderError> {
        let view = self.frame_view()?;
        let local = sprite
            .transform
            .to_global()
            .map_err(|e| RenderError::InvalidState(e.to_string()))?;
        let world = view.world_matrix(call_matrix(position, axis, angle_deg, scale), local, sprite.billboard);
        let drawable = Drawable {
            bounds: sprite.bounding_box().transform(&world),
            position: world.translation(),
            shadow: sprite.shadow,
            layers: sprite.layers,
        };
        let class = self.classify(&view, &drawable);

        for &light in &class.shadow_lights {
            self.shadow_batches.push(
                light,
                ShadowCall {
                    source: DrawSource::Sprite,
                    transform: world,
                },
            );
        }
        if class.draw_scene {
            self.scene_batches.push(
                sprite.material.config,
                SceneCall {
                    source: DrawSource::Sprite,
                    material: sprite.material,
                    transform: world,
                    lights: class.lights,
                },
            );
        }
        Ok(())
    }

    /// Submits every live particle of `system` as one call.
    ///
    /// Culling uses the system bounds, see
    /// [`ParticleSystem::calculate_bounding_box`]. Each particle is placed at
    /// its own position, oriented by the system's billboard mode.
    pub fn submit_particle_system(&mut self, system: &ParticleSystem) -> Result<(), RenderError> {
        let view = self.frame_view()?;
        if system.count() == 0 {
            return Ok(());
        }
        let Some(mesh) = system.surface.mesh.id else {
            log::debug!("Skipping particle system without uploaded mesh");
            return Ok(());
        };
        let drawable = Drawable {
            bounds: system.aabb,
            position: system.aabb.center(),
            shadow: system.shadow,
            layers: system.layers,
        };
        let class = self.classify(&view, &drawable);
        if class.is_culled() {
            return Ok(());
        }

        let instances = particle_instances(system, &view);
        let source = DrawSource::Particles {
            mesh,
            triangles: system.surface.mesh.data.triangle_count(),
            instances,
        };
        for &light in &class.shadow_lights {
            self.shadow_batches.push(
                light,
                ShadowCall {
                    source: source.clone(),
                    transform: Mat4::IDENTITY,
                },
            );
        }
        if class.draw_scene {
            let material = system.surface.material;
            self.scene_batches.push(
                material.config,
                SceneCall {
                    source,
                    material,
                    transform: Mat4::IDENTITY,
                    lights: class.lights,
                },
            );
        }
        Ok(())
    }
}

fn particle_instances(system: &ParticleSystem, view: &FrameView) -> Vec<ParticleInstance> {
    system
        .particles()
        .iter()
        .map(|p| {
            let mut transform = view.ambient * p.world_matrix();
            if system.billboard != BillboardMode::Disabled {
                let facing = billboard_rotation(system.billboard, p.position, view.position);
                let origin = Mat4::from_translation(p.position);
                transform = view.ambient
                    * origin
                    * facing
                    * Mat4::from_translation(-p.position)
                    * p.world_matrix();
            }
            ParticleInstance {
                transform,
                color: p.color,
            }
        })
        .collect()
}

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

//! Skyboxes and their image-based lighting maps.
//!
//! A skybox owns three cubemaps: the sky itself, its diffuse irradiance and
//! its prefiltered specular radiance (five roughness mips). Everything the
//! generation passes need but that does not depend on the sky lives in
//! [`SkyboxShared`], created with the first skybox and dropped with the last.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use radiant_core::math::{degrees_to_radians, Color, Mat4, Quaternion, Vec3, CUBE_FACE_VIEWS};
use radiant_core::renderer::{
    Attachment, ClearFlags, CullMode, InternalFormat, Rect, RenderError, ResourceError,
    TextureFormat, TextureWrap,
};

use super::shaders::{
    BRDF_FS, CUBEMAP_VS, EQUIRECTANGULAR_FS, IRRADIANCE_FS, PREFILTER_FS, SCREEN_VS, SKYBOX_FS,
    SKYBOX_VS,
};
use crate::gpu::{
    Framebuffer, GpuMesh, Renderbuffer, ShaderProgram, SharedDevice, Texture, TextureFilter,
};

/// Side length of the BRDF integration map.
pub const BRDF_LUT_SIZE: u32 = 512;

/// Face size of the prefiltered radiance cubemap.
pub const PREFILTER_SIZE: u32 = 128;

/// Roughness levels stored in the prefiltered cubemap.
pub const PREFILTER_MIP_LEVELS: u32 = 5;

/// Smallest face size of the irradiance cubemap.
pub const MIN_IRRADIANCE_SIZE: u32 = 32;

/// Face size of the irradiance map generated from a sky of `face_size`.
pub fn irradiance_size(face_size: u32) -> u32 {
    (face_size / 16).max(MIN_IRRADIANCE_SIZE)
}

/// Roughness written into prefilter mip `mip`.
pub fn prefilter_roughness(mip: u32) -> f32 {
    mip as f32 / (PREFILTER_MIP_LEVELS - 1) as f32
}

/// Resources shared by every live skybox.
pub struct SkyboxShared {
    device: SharedDevice,
    framebuffer: Framebuffer,
    depth: RefCell<Renderbuffer>,
    cube: GpuMesh,
    quad: GpuMesh,
    face_views: [Mat4; 6],
    projection: Mat4,
    equirectangular: ShaderProgram,
    irradiance: ShaderProgram,
    prefilter: ShaderProgram,
    skybox: ShaderProgram,
    brdf_lut: Texture,
}

impl fmt::Debug for SkyboxShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkyboxShared")
            .field("framebuffer", &self.framebuffer.id())
            .field("brdf_lut", &self.brdf_lut.id())
            .finish()
    }
}

impl SkyboxShared {
    /// Returns the live shared data, or creates it when no skybox exists.
    ///
    /// `slot` only holds a weak reference: the data is released as soon as
    /// the last skybox is dropped.
    pub fn acquire(slot: &mut Weak<SkyboxShared>, device: &SharedDevice) -> Result<Rc<Self>, RenderError> {
        if let Some(shared) = slot.upgrade() {
            return Ok(shared);
        }
        let shared = Rc::new(Self::new(device.clone())?);
        *slot = Rc::downgrade(&shared);
        Ok(shared)
    }

    fn new(device: SharedDevice) -> Result<Self, RenderError> {
        let framebuffer = Framebuffer::new(device.clone())?;
        let depth = Renderbuffer::new(device.clone(), InternalFormat::Depth24, BRDF_LUT_SIZE, BRDF_LUT_SIZE)?;
        framebuffer.attach_renderbuffer(Attachment::Depth, &depth);
        framebuffer.set_draw_buffer(Attachment::COLOR_0);

        let mut brdf_lut =
            Texture::new_2d(device.clone(), None, BRDF_LUT_SIZE, BRDF_LUT_SIZE, TextureFormat::RG16F)?;
        brdf_lut.set_filter(TextureFilter::Bilinear);
        brdf_lut.set_wrap(TextureWrap::ClampToEdge);

        let mut face_views = [Mat4::IDENTITY; 6];
        for (view, face) in face_views.iter_mut().zip(CUBE_FACE_VIEWS.iter()) {
            *view = face.view_matrix(Vec3::ZERO);
        }

        let shared = Self {
            cube: GpuMesh::unit_cube(device.clone())?,
            quad: GpuMesh::screen_quad(device.clone())?,
            equirectangular: ShaderProgram::new(device.clone(), CUBEMAP_VS, EQUIRECTANGULAR_FS)?,
            irradiance: ShaderProgram::new(device.clone(), CUBEMAP_VS, IRRADIANCE_FS)?,
            prefilter: ShaderProgram::new(device.clone(), CUBEMAP_VS, PREFILTER_FS)?,
            skybox: ShaderProgram::new(device.clone(), SKYBOX_VS, SKYBOX_FS)?,
            brdf_lut,
            projection: Mat4::perspective(degrees_to_radians(90.0), 1.0, 0.1, 10.0),
            face_views,
            framebuffer,
            depth: RefCell::new(depth),
            device,
        };
        shared.generate_brdf_lut()?;
        log::info!("Created shared skybox resources");
        Ok(shared)
    }

    /// The BRDF integration map.
    pub fn brdf_lut(&self) -> &Texture {
        &self.brdf_lut
    }

    fn generate_brdf_lut(&self) -> Result<(), RenderError> {
        let program = ShaderProgram::new(self.device.clone(), SCREEN_VS, BRDF_FS)?;
        self.begin_capture(BRDF_LUT_SIZE);
        self.framebuffer.attach_texture(Attachment::COLOR_0, &self.brdf_lut, 0);
        let status = self.framebuffer.check_status();
        if status.is_ok() {
            self.device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, Color::BLANK);
            program.bind();
            self.quad.draw();
            program.unbind();
        }
        self.end_capture();
        Ok(status?)
    }

    fn begin_capture(&self, size: u32) {
        self.depth.borrow_mut().resize(size, size);
        self.framebuffer.bind();
        self.device.set_viewport(Rect::from_size(size as i32, size as i32));
        self.device.set_cull_mode(CullMode::Disabled);
    }

    fn end_capture(&self) {
        Framebuffer::unbind(&self.device);
        let (w, h) = self.device.default_framebuffer_size();
        self.device.set_viewport(Rect::from_size(w as i32, h as i32));
        self.device.set_cull_mode(CullMode::Back);
    }

    /// Renders the cube once per face of mip `level` of `target`.
    fn render_faces(&self, program: &ShaderProgram, target: &Texture, level: u32) -> Result<(), ResourceError> {
        program.set_uniform("uMatProj", self.projection);
        for (face, view) in self.face_views.iter().enumerate() {
            program.set_uniform("uMatView", *view);
            self.framebuffer.attach_cube_face(Attachment::COLOR_0, target, face, level);
            if face == 0 && level == 0 {
                self.framebuffer.check_status()?;
            }
            self.device.clear(ClearFlags::COLOR | ClearFlags::DEPTH, Color::BLANK);
            self.cube.draw();
        }
        Ok(())
    }
}

/// A sky cubemap with its precomputed lighting.
pub struct Skybox {
    shared: Rc<SkyboxShared>,
    cubemap: Texture,
    irradiance: Texture,
    prefilter: Texture,
    /// Euler rotation of the sky in degrees.
    pub rotation: Vec3,
}

impl fmt::Debug for Skybox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Skybox")
            .field("cubemap", &self.cubemap.id())
            .field("irradiance", &self.irradiance.id())
            .field("prefilter", &self.prefilter.id())
            .field("rotation", &self.rotation)
            .finish()
    }
}

impl Skybox {
    /// Builds a skybox from six faces already laid out in `+X, -X, +Y, -Y,
    /// +Z, -Z` order.
    pub fn from_faces(
        shared: Rc<SkyboxShared>,
        face_size: u32,
        format: TextureFormat,
        data: &[u8],
    ) -> Result<Self, RenderError> {
        let mut cubemap = Texture::new_cube(shared.device.clone(), Some(data), face_size, format)?;
        cubemap.set_wrap(TextureWrap::ClampToEdge);
        cubemap.set_filter(TextureFilter::Bilinear);
        Self::with_cubemap(shared, cubemap)
    }

    /// Builds a skybox by projecting an equirectangular RGB panorama onto
    /// a cubemap of `face_size`.
    pub fn from_panorama(
        shared: Rc<SkyboxShared>,
        width: u32,
        height: u32,
        rgb: &[f32],
        face_size: u32,
    ) -> Result<Self, RenderError> {
        let mut panorama = Texture::new_2d(
            shared.device.clone(),
            Some(bytemuck::cast_slice(rgb)),
            width,
            height,
            TextureFormat::RGB32F,
        )?;
        panorama.set_filter(TextureFilter::Bilinear);
        panorama.set_wrap(TextureWrap::ClampToEdge);

        let mut cubemap = Texture::new_cube(shared.device.clone(), None, face_size, TextureFormat::RGBA16F)?;
        cubemap.set_wrap(TextureWrap::ClampToEdge);
        cubemap.set_filter(TextureFilter::Bilinear);

        let program = &shared.equirectangular;
        shared.begin_capture(face_size);
        program.bind();
        program.bind_sampler("uTexEquirectangular", &panorama);
        let result = shared.render_faces(program, &cubemap, 0);
        program.unbind();
        shared.end_capture();
        result?;

        log::debug!("Projected {}x{} panorama onto {}px cubemap", width, height, face_size);
        Self::with_cubemap(shared, cubemap)
    }

    fn with_cubemap(shared: Rc<SkyboxShared>, cubemap: Texture) -> Result<Self, RenderError> {
        let irradiance = Self::generate_irradiance(&shared, &cubemap)?;
        let prefilter = Self::generate_prefilter(&shared, &cubemap)?;
        log::info!(
            "Created skybox ({}px, irradiance {}px)",
            cubemap.width(),
            irradiance.width()
        );
        Ok(Self {
            shared,
            cubemap,
            irradiance,
            prefilter,
            rotation: Vec3::ZERO,
        })
    }

    fn generate_irradiance(shared: &SkyboxShared, cubemap: &Texture) -> Result<Texture, RenderError> {
        let size = irradiance_size(cubemap.width());
        let mut irradiance = Texture::new_cube(shared.device.clone(), None, size, TextureFormat::RGBA16F)?;
        irradiance.set_wrap(TextureWrap::ClampToEdge);
        irradiance.set_filter(TextureFilter::Nearest);

        let program = &shared.irradiance;
        shared.begin_capture(size);
        program.bind();
        program.bind_sampler("uTexCubemap", cubemap);
        let result = shared.render_faces(program, &irradiance, 0);
        program.unbind();
        shared.end_capture();
        result?;
        Ok(irradiance)
    }

    fn generate_prefilter(shared: &SkyboxShared, cubemap: &Texture) -> Result<Texture, RenderError> {
        let mut prefilter =
            Texture::new_cube(shared.device.clone(), None, PREFILTER_SIZE, TextureFormat::RGB16F)?;
        prefilter.set_wrap(TextureWrap::ClampToEdge);
        prefilter.set_filter(TextureFilter::Trilinear);

        let program = &shared.prefilter;
        shared.framebuffer.bind();
        shared.device.set_cull_mode(CullMode::Disabled);
        program.bind();
        program.bind_sampler("uTexCubemap", cubemap);
        let mut result = Ok(());
        for mip in 0..PREFILTER_MIP_LEVELS {
            let size = (PREFILTER_SIZE >> mip).max(1);
            shared.depth.borrow_mut().resize(size, size);
            shared.device.set_viewport(Rect::from_size(size as i32, size as i32));
            program.set_uniform("uRoughness", prefilter_roughness(mip));
            result = shared.render_faces(program, &prefilter, mip);
            if result.is_err() {
                break;
            }
        }
        program.unbind();
        shared.end_capture();
        result?;
        Ok(prefilter)
    }

    /// The sky cubemap.
    pub fn cubemap(&self) -> &Texture {
        &self.cubemap
    }

    /// Diffuse irradiance cubemap.
    pub fn irradiance(&self) -> &Texture {
        &self.irradiance
    }

    /// Prefiltered radiance cubemap.
    pub fn prefilter(&self) -> &Texture {
        &self.prefilter
    }

    /// The shared BRDF integration map.
    pub fn brdf_lut(&self) -> &Texture {
        self.shared.brdf_lut()
    }

    /// The sky rotation as a quaternion, uploaded as `uQuatSkybox`.
    pub fn rotation_quat(&self) -> Quaternion {
        Quaternion::from_euler(
            degrees_to_radians(self.rotation.x),
            degrees_to_radians(self.rotation.y),
            degrees_to_radians(self.rotation.z),
        )
    }

    /// Draws the sky behind everything with the camera's view and projection.
    ///
    /// Depth writes and face culling are disabled while drawing and
    /// restored afterwards.
    pub fn draw(&self, view: Mat4, projection: Mat4) {
        let program = &self.shared.skybox;
        let device = &self.shared.device;
        device.set_cull_mode(CullMode::Disabled);
        device.set_depth_mask(false);

        program.bind();
        program.set_uniform("uMatView", view);
        program.set_uniform("uMatProj", projection);
        program.set_uniform("uQuatSkybox", self.rotation_quat());
        program.bind_sampler("uTexSkybox", &self.cubemap);
        self.shared.cube.draw();
        program.unbind();

        device.set_cull_mode(CullMode::Back);
        device.set_depth_mask(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_irradiance_size_has_a_floor() {
        assert_eq!(irradiance_size(1024), 64);
        assert_eq!(irradiance_size(256), 32);
        assert_eq!(irradiance_size(16), 32);
    }

    #[test]
    fn test_prefilter_roughness_spans_unit_range() {
        assert_relative_eq!(prefilter_roughness(0), 0.0);
        assert_relative_eq!(prefilter_roughness(2), 0.5);
        assert_relative_eq!(prefilter_roughness(PREFILTER_MIP_LEVELS - 1), 1.0);
    }
}

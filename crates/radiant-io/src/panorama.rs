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

//! Equirectangular HDR panoramas used to build image-based lighting.

use std::path::Path;

use crate::AssetError;

/// An equirectangular panorama, RGB32F, rows from top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct HdrPanorama {
    /// Width in pixels, covering 360 degrees of longitude.
    pub width: u32,
    /// Height in pixels, covering 180 degrees of latitude.
    pub height: u32,
    /// `width * height * 3` floats.
    pub rgb: Vec<f32>,
}

impl HdrPanorama {
    /// Converts a decoded image to linear RGB floats.
    ///
    /// LDR images are accepted and mapped to `[0, 1]`.
    pub fn from_image(image: image::DynamicImage) -> Self {
        let rgb = image.into_rgb32f();
        let (width, height) = rgb.dimensions();
        Self {
            width,
            height,
            rgb: rgb.into_raw(),
        }
    }

    /// Largest channel value, useful to judge the dynamic range.
    pub fn max_value(&self) -> f32 {
        self.rgb.iter().copied().fold(0.0, f32::max)
    }
}

/// Reads the panorama at `path`, typically a Radiance `.hdr` file.
pub fn load_hdr_panorama(path: impl AsRef<Path>) -> Result<HdrPanorama, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| AssetError::io(path, e))?;
    let image = image::load_from_memory(&bytes)?;
    let panorama = HdrPanorama::from_image(image);
    if panorama.width < 2 * panorama.height {
        log::warn!(
            "Panorama '{}' is {}x{}, not 2:1; the sky will look stretched",
            path.display(),
            panorama.width,
            panorama.height
        );
    }
    log::debug!("Loaded panorama '{}' ({}x{})", path.display(), panorama.width, panorama.height);
    Ok(panorama)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ldr_image_maps_to_unit_range() {
        let rgb = image::RgbImage::from_pixel(4, 2, image::Rgb([255, 0, 51]));
        let pano = HdrPanorama::from_image(image::DynamicImage::ImageRgb8(rgb));
        assert_eq!(pano.rgb.len(), 4 * 2 * 3);
        assert_relative_eq!(pano.rgb[0], 1.0);
        assert_relative_eq!(pano.rgb[1], 0.0);
        assert_relative_eq!(pano.rgb[2], 0.2, epsilon = 1e-3);
        assert_relative_eq!(pano.max_value(), 1.0);
    }

    #[test]
    fn test_float_image_keeps_high_values() {
        let rgb = image::Rgb32FImage::from_pixel(2, 1, image::Rgb([12.5, 0.5, 3.0]));
        let pano = HdrPanorama::from_image(image::DynamicImage::ImageRgb32F(rgb));
        assert_relative_eq!(pano.max_value(), 12.5);
    }
}

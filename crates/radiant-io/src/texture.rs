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

//! Decoding of plain 2D images into RGBA8 pixels.

use std::path::Path;

use crate::AssetError;

/// A decoded image, RGBA8, rows from top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Wraps a decoded image, converting it to RGBA8.
    pub fn from_image(image: image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            pixels: rgba.into_raw(),
        }
    }

    /// The RGBA bytes of pixel `(x, y)`, `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let p = &self.pixels[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Decodes an image held in memory; the format is guessed from its content.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData, AssetError> {
    let image = image::load_from_memory(bytes)?;
    Ok(ImageData::from_image(image))
}

/// Reads and decodes the image at `path`.
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| AssetError::io(path, e))?;
    let image = decode_image(&bytes)?;
    log::debug!("Loaded image '{}' ({}x{})", path.display(), image.width, image.height);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_image_converts_to_rgba() {
        let rgb = image::RgbImage::from_pixel(2, 3, image::Rgb([10, 20, 30]));
        let data = ImageData::from_image(image::DynamicImage::ImageRgb8(rgb));
        assert_eq!((data.width, data.height), (2, 3));
        assert_eq!(data.pixels.len(), 2 * 3 * 4);
        assert_eq!(data.pixel(1, 2), Some([10, 20, 30, 255]));
        assert_eq!(data.pixel(2, 0), None);
    }
}

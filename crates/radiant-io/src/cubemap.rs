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

//! Splitting a single image into the six faces of a cubemap.

use std::path::Path;

use crate::{texture::ImageData, AssetError};

/// How the six faces of a cubemap are arranged in a single image.
///
/// Faces are always extracted in `+X, -X, +Y, -Y, +Z, -Z` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CubemapLayout {
    /// Guess the layout from the image proportions.
    #[default]
    AutoDetect,
    /// Six faces stacked top to bottom.
    LineVertical,
    /// Six faces side by side.
    LineHorizontal,
    /// A cross three faces wide and four high.
    CrossThreeByFour,
    /// A cross four faces wide and three high.
    CrossFourByThree,
}

impl CubemapLayout {
    /// Guesses the layout of a `width` x `height` image.
    ///
    /// Returns `None` when the proportions match no layout.
    pub fn detect(width: u32, height: u32) -> Option<Self> {
        if width > height {
            if width / 6 == height {
                return Some(CubemapLayout::LineHorizontal);
            }
            if width / 4 == height / 3 {
                return Some(CubemapLayout::CrossFourByThree);
            }
        } else if height > width {
            if height / 6 == width {
                return Some(CubemapLayout::LineVertical);
            }
            if width / 3 == height / 4 {
                return Some(CubemapLayout::CrossThreeByFour);
            }
        }
        None
    }

    /// Resolves [`AutoDetect`](Self::AutoDetect) against the image size.
    pub fn resolve(self, width: u32, height: u32) -> Option<Self> {
        match self {
            CubemapLayout::AutoDetect => Self::detect(width, height),
            layout => Some(layout),
        }
    }

    /// Edge length of one face for an image of `width` x `height`.
    ///
    /// Zero for [`AutoDetect`](Self::AutoDetect), which must be resolved first.
    pub fn face_size(self, width: u32, height: u32) -> u32 {
        match self {
            CubemapLayout::AutoDetect => 0,
            CubemapLayout::LineVertical => width,
            CubemapLayout::LineHorizontal => width / 6,
            CubemapLayout::CrossThreeByFour => width / 3,
            CubemapLayout::CrossFourByThree => width / 4,
        }
        .min(match self {
            CubemapLayout::LineVertical => height / 6,
            CubemapLayout::CrossThreeByFour => height / 4,
            CubemapLayout::CrossFourByThree => height / 3,
            _ => height,
        })
    }

    /// Top-left pixel of each face, in face order.
    pub fn face_origins(self, size: u32) -> [(u32, u32); 6] {
        match self {
            CubemapLayout::AutoDetect | CubemapLayout::LineVertical => {
                std::array::from_fn(|i| (0, size * i as u32))
            }
            CubemapLayout::LineHorizontal => std::array::from_fn(|i| (size * i as u32, 0)),
            CubemapLayout::CrossThreeByFour => [
                (size, size),
                (size, 3 * size),
                (size, 0),
                (size, 2 * size),
                (0, size),
                (2 * size, size),
            ],
            CubemapLayout::CrossFourByThree => [
                (2 * size, size),
                (0, size),
                (size, 0),
                (size, 2 * size),
                (size, size),
                (3 * size, size),
            ],
        }
    }
}

/// The six faces of a cubemap, RGBA8, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubemapFaces {
    /// Edge length of every face.
    pub face_size: u32,
    /// The faces one after another, `face_size * face_size * 4` bytes each.
    pub pixels: Vec<u8>,
}

impl CubemapFaces {
    /// Cuts the faces out of `image` arranged as `layout`.
    pub fn from_image(image: &ImageData, layout: CubemapLayout) -> Result<Self, AssetError> {
        let unsupported = AssetError::UnsupportedLayout {
            width: image.width,
            height: image.height,
        };
        let Some(layout) = layout.resolve(image.width, image.height) else {
            return Err(unsupported);
        };
        let size = layout.face_size(image.width, image.height);
        if size == 0 {
            return Err(unsupported);
        }

        let row = (size * 4) as usize;
        let mut pixels = Vec::with_capacity(row * size as usize * 6);
        for (x, y) in layout.face_origins(size) {
            if x + size > image.width || y + size > image.height {
                return Err(unsupported);
            }
            for line in y..y + size {
                let start = ((line * image.width + x) * 4) as usize;
                pixels.extend_from_slice(&image.pixels[start..start + row]);
            }
        }
        log::debug!("Extracted {:?} cubemap with {}px faces", layout, size);
        Ok(Self {
            face_size: size,
            pixels,
        })
    }

    /// The bytes of face `index`, `None` past the sixth face.
    pub fn face(&self, index: usize) -> Option<&[u8]> {
        let len = (self.face_size * self.face_size * 4) as usize;
        self.pixels.get(index * len..(index + 1) * len)
    }
}

/// Reads the image at `path` and cuts it into cubemap faces.
pub fn load_cubemap(path: impl AsRef<Path>, layout: CubemapLayout) -> Result<CubemapFaces, AssetError> {
    let image = crate::texture::load_image(path)?;
    CubemapFaces::from_image(&image, layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_layouts() {
        assert_eq!(CubemapLayout::detect(600, 100), Some(CubemapLayout::LineHorizontal));
        assert_eq!(CubemapLayout::detect(100, 600), Some(CubemapLayout::LineVertical));
        assert_eq!(CubemapLayout::detect(400, 300), Some(CubemapLayout::CrossFourByThree));
        assert_eq!(CubemapLayout::detect(300, 400), Some(CubemapLayout::CrossThreeByFour));
        assert_eq!(CubemapLayout::detect(256, 256), None);
        assert_eq!(CubemapLayout::detect(500, 100), None);
    }

    #[test]
    fn test_face_size_per_layout() {
        assert_eq!(CubemapLayout::LineHorizontal.face_size(600, 100), 100);
        assert_eq!(CubemapLayout::CrossFourByThree.face_size(400, 300), 100);
        assert_eq!(CubemapLayout::CrossThreeByFour.face_size(300, 400), 100);
        assert_eq!(CubemapLayout::LineVertical.face_size(64, 384), 64);
        assert_eq!(CubemapLayout::AutoDetect.face_size(64, 384), 0);
    }

    #[test]
    fn test_explicit_layout_too_small_fails() {
        let image = ImageData {
            width: 4,
            height: 4,
            pixels: vec![0; 64],
        };
        let err = CubemapFaces::from_image(&image, CubemapLayout::LineHorizontal).unwrap_err();
        assert!(matches!(err, AssetError::UnsupportedLayout { width: 4, height: 4 }));
    }
}

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

//! Light classification, render layers and shadow policies.

use serde::{Deserialize, Serialize};

/// The kind of a light source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    /// Infinitely distant light (the sun). Position only anchors its shadow frustum.
    Directional,
    /// Cone light with inner and outer cutoffs.
    Spot,
    /// Point light radiating in every direction.
    Omni,
}

impl LightKind {
    /// The integer the material shader uses for this kind.
    pub fn shader_id(&self) -> i32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Spot => 1,
            LightKind::Omni => 2,
        }
    }
}

radiant_bitflags! {
    /// Render layers. Lights and drawables interact only when their masks intersect.
    pub struct Layers: u32 {
        /// Layer 1, the default layer of drawables.
        const LAYER_1 = 1 << 0;
        /// Layer 2.
        const LAYER_2 = 1 << 1;
        /// Layer 3.
        const LAYER_3 = 1 << 2;
        /// Layer 4.
        const LAYER_4 = 1 << 3;
        /// Layer 5.
        const LAYER_5 = 1 << 4;
        /// Layer 6.
        const LAYER_6 = 1 << 5;
        /// Layer 7.
        const LAYER_7 = 1 << 6;
        /// Layer 8.
        const LAYER_8 = 1 << 7;
        /// Every layer.
        const ALL = u32::MAX;
    }
}

impl Layers {
    /// The single layer `n` in `1..=32`. Out-of-range values yield the empty mask.
    pub const fn layer(n: u32) -> Self {
        if n == 0 || n > 32 {
            Self::empty()
        } else {
            Self::from_bits(1 << (n - 1))
        }
    }
}

/// Whether a drawable appears in shadow maps and in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShadowCastMode {
    /// Drawn in the scene only.
    #[default]
    Off,
    /// Drawn in the scene and in shadow maps.
    On,
    /// Drawn in shadow maps only.
    ShadowOnly,
}

impl ShadowCastMode {
    /// True when the drawable feeds shadow maps.
    pub fn casts(&self) -> bool {
        !matches!(self, ShadowCastMode::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_numbering() {
        assert_eq!(Layers::layer(1), Layers::LAYER_1);
        assert_eq!(Layers::layer(8), Layers::LAYER_8);
        assert_eq!(Layers::layer(32).bits(), 1 << 31);
        assert!(Layers::layer(0).is_empty());
        assert!(Layers::layer(33).is_empty());
    }

    #[test]
    fn test_layer_toggle() {
        let mut l = Layers::LAYER_1;
        l.toggle(Layers::LAYER_3);
        assert!(l.contains(Layers::LAYER_3));
        l.toggle(Layers::LAYER_3);
        assert_eq!(l, Layers::LAYER_1);
    }
}

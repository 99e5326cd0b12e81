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

//! Keyframed scalar curves, used to drive particle attributes over lifetime.

use radiant_core::math::lerp;

/// A `(time, value)` control point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Keyframe {
    /// Time of the keyframe, usually normalized to `[0, 1]`.
    pub time: f32,
    /// Value at `time`.
    pub value: f32,
}

/// A piecewise-linear curve over keyframes kept sorted by time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterpolationCurve {
    keyframes: Vec<Keyframe>,
    capacity: usize,
}

impl InterpolationCurve {
    /// Creates an empty curve able to hold `capacity` keyframes before growing.
    pub fn new(capacity: usize) -> Self {
        Self {
            keyframes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Current keyframe capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keyframes.
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Returns `true` if the curve has no keyframes.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframes, sorted by time.
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Inserts a keyframe, keeping time order.
    ///
    /// A full curve doubles its capacity (rounded up to the next power of
    /// two). Keyframes sharing a time keep their insertion order.
    pub fn add_keyframe(&mut self, time: f32, value: f32) {
        if self.keyframes.len() >= self.capacity {
            self.capacity = (self.capacity.max(1) * 2).next_power_of_two();
            self.keyframes
                .reserve(self.capacity - self.keyframes.len());
        }
        let at = self.keyframes.partition_point(|k| k.time <= time);
        self.keyframes.insert(at, Keyframe { time, value });
    }

    /// Value at `time`.
    ///
    /// Clamps to the first and last keyframes outside their range and
    /// returns `0` for an empty curve.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        let next = self.keyframes.partition_point(|k| k.time <= time);
        let (a, b) = (self.keyframes[next - 1], self.keyframes[next]);
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        lerp(a.value, b.value, (time - a.time) / span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_curve_is_zero() {
        assert_eq!(InterpolationCurve::new(4).evaluate(0.5), 0.0);
    }

    #[test]
    fn test_out_of_order_insert_and_lerp() {
        let mut c = InterpolationCurve::new(2);
        c.add_keyframe(1.0, 0.0);
        c.add_keyframe(0.0, 1.0);
        c.add_keyframe(0.5, 2.0);

        let times: Vec<f32> = c.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(c.capacity(), 4);

        assert_relative_eq!(c.evaluate(0.25), 1.5);
        assert_relative_eq!(c.evaluate(0.75), 1.0);
        assert_relative_eq!(c.evaluate(-1.0), 1.0);
        assert_relative_eq!(c.evaluate(2.0), 0.0);
    }

    #[test]
    fn test_capacity_doubles_when_full() {
        let mut c = InterpolationCurve::new(3);
        for i in 0..4 {
            c.add_keyframe(i as f32, 0.0);
        }
        assert_eq!(c.capacity(), 8);
        assert_eq!(c.len(), 4);
    }
}

//! Block transforms: translate, then rotate, then scale.
//!
//! Angles are degrees, positive is clockwise on screen (y grows downwards).

use glam::{Affine2, Vec2};

/// Position, rotation and scale of a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Degrees in [0, 360)
    pub rotation: f32,
    pub scale: Vec2,
}

impl Transform {
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation: normalize_angle(rotation),
            scale: Vec2::ONE,
        }
    }

    pub fn affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation.to_radians(), self.position)
    }

    /// Map a block-local point to world space
    pub fn apply(&self, local: Vec2) -> Vec2 {
        self.affine().transform_point2(local)
    }

    /// Map a world point back to block-local space
    pub fn apply_inverse(&self, world: Vec2) -> Vec2 {
        self.affine().inverse().transform_point2(world)
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Change rotation by `delta` degrees while `local_pivot` stays put in world space
    pub fn rotate_about(&mut self, local_pivot: Vec2, delta: f32) {
        let before = self.apply(local_pivot);
        self.rotation = normalize_angle(self.rotation + delta);
        let after = self.apply(local_pivot);
        self.position += before - after;
    }

    /// Replace the scale while `local_pivot` stays put in world space
    pub fn rescale_about(&mut self, local_pivot: Vec2, scale: Vec2) {
        let before = self.apply(local_pivot);
        self.scale = scale;
        let after = self.apply(local_pivot);
        self.position += before - after;
    }
}

/// Normalize an angle in degrees to [0, 360)
pub fn normalize_angle(angle: f32) -> f32 {
    let mut angle = angle % 360.0;
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}

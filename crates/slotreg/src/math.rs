//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Transform`] is the one built-in
//! [`Component`](crate::entity::Component).

pub use glam::{Mat4, Quat, Vec3};

use crate::entity::Component;

/// Position, rotation, and scale of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Return a copy rotated by `rotation` (applied after the current rotation).
    pub fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation * self.rotation;
        self
    }

    /// Compute the 4x4 model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Component for Transform {
    fn name(&self) -> &str {
        "Transform"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translation_lands_in_last_column() {
        let m = Transform::from_xyz(1.0, 2.0, 3.0).with_scale(2.0).matrix();
        let col3 = m.col(3);
        assert!((col3.x - 1.0).abs() < 1e-6);
        assert!((col3.y - 2.0).abs() < 1e-6);
        assert!((col3.z - 3.0).abs() < 1e-6);
        assert!((m.col(0).x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn rotated_composes() {
        let quarter = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let t = Transform::default().rotated(quarter).rotated(quarter);
        let x = t.rotation * Vec3::X;
        assert!((x.x + 1.0).abs() < 1e-5);
        assert!(x.y.abs() < 1e-5);
    }

    #[test]
    fn is_a_component() {
        let mut entity = Entity::default();
        entity.add_comp(Transform::from_xyz(5.0, 0.0, 0.0)).translation.y = 1.0;
        let t = entity.comp::<Transform>().unwrap();
        assert_eq!(t.translation, Vec3::new(5.0, 1.0, 0.0));
        assert_eq!(entity.comp_names().collect::<Vec<_>>(), vec!["Transform"]);
    }
}

use glam::{Mat4, Vec3};

use crate::config::{ModelPlacement, ProjectionParameters};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformSet {
    pub model_view: Mat4,
    pub model_view_projection: Mat4,
}

pub struct TransformComposer {
    rotation: Mat4,
    translation: Mat4,
    projection: Mat4,
}

impl TransformComposer {
    pub fn new(placement: &ModelPlacement, projection: &ProjectionParameters) -> Self {
        let axis = placement.axis.try_normalize().unwrap_or(Vec3::X);
        Self {
            rotation: Mat4::from_axis_angle(axis, placement.angle),
            translation: Mat4::from_translation(placement.translation),
            projection: Mat4::perspective_rh(
                projection.fov_y,
                projection.aspect,
                projection.near,
                projection.far,
            ),
        }
    }

    // Column vectors: model_view = translation * (rotation * view).
    pub fn compose(&self, view: Mat4) -> TransformSet {
        let model_view = self.translation * (self.rotation * view);
        TransformSet {
            model_view,
            model_view_projection: self.projection * model_view,
        }
    }
}

impl Default for TransformComposer {
    fn default() -> Self {
        Self::new(&ModelPlacement::default(), &ProjectionParameters::default())
    }
}

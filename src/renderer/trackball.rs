use glam::{Mat4, Quat, Vec2, Vec3};

/// Pointer-driven view rotation about the centre of the drawing viewport.
/// The view matrix is a pure rotation.
pub struct Trackball {
    pub rotation: Quat,
    pub origin: Vec2,
    pub viewport: Vec2,
    pub sensitivity: f32,

    drag_anchor: Option<Vec3>,
}

impl Default for Trackball {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            origin: Vec2::ZERO,
            viewport: Vec2::new(1.0, 1.0),
            sensitivity: 1.0,
            drag_anchor: None,
        }
    }
}

impl Trackball {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }

    /// `origin` is the top-left corner of the viewport in window pixels.
    pub fn set_viewport(&mut self, origin: Vec2, size: Vec2) {
        self.origin = origin;
        self.viewport = size.max(Vec2::ONE);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn begin_drag(&mut self, cursor: Vec2) {
        self.drag_anchor = Some(self.project(cursor));
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn drag_to(&mut self, cursor: Vec2) {
        let Some(from) = self.drag_anchor else {
            return;
        };
        let to = self.project(cursor);

        let axis = from.cross(to);
        if axis.length_squared() > f32::EPSILON {
            let angle = from.dot(to).clamp(-1.0, 1.0).acos() * self.sensitivity;
            let delta = Quat::from_axis_angle(axis.normalize(), angle);
            self.rotation = (delta * self.rotation).normalize();
        }
        self.drag_anchor = Some(to);
    }

    pub fn reset(&mut self) {
        self.rotation = Quat::IDENTITY;
        self.drag_anchor = None;
    }

    // Cursors outside the sphere land on its silhouette.
    fn project(&self, cursor: Vec2) -> Vec3 {
        let half = self.viewport * 0.5;
        let center = self.origin + half;
        let radius = half.x.min(half.y);
        let x = (cursor.x - center.x) / radius;
        let y = (center.y - cursor.y) / radius;

        let d2 = x * x + y * y;
        if d2 <= 1.0 {
            Vec3::new(x, y, (1.0 - d2).sqrt())
        } else {
            Vec3::new(x, y, 0.0).normalize()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trackball() -> Trackball {
        let mut t = Trackball::default();
        t.set_viewport(Vec2::ZERO, Vec2::splat(400.0));
        t
    }

    #[test]
    fn starts_at_identity() {
        assert_eq!(Trackball::default().view_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn horizontal_drag_rotates_about_y() {
        let mut t = trackball();
        t.begin_drag(Vec2::new(200.0, 200.0));
        t.drag_to(Vec2::new(300.0, 200.0));

        let (axis, angle) = t.rotation.to_axis_angle();
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-5));
        approx::assert_abs_diff_eq!(angle, 0.5_f32.asin(), epsilon = 1e-5);
    }

    #[test]
    fn offset_viewport_rotates_about_its_own_centre() {
        // A 400px square centred in a 1280x900 window.
        let mut t = Trackball::default();
        t.set_viewport(Vec2::new(440.0, 250.0), Vec2::splat(400.0));
        t.begin_drag(Vec2::new(640.0, 450.0));
        t.drag_to(Vec2::new(740.0, 450.0));

        let mut reference = trackball();
        reference.begin_drag(Vec2::new(200.0, 200.0));
        reference.drag_to(Vec2::new(300.0, 200.0));

        assert!(t.rotation.abs_diff_eq(reference.rotation, 1e-6));
    }

    #[test]
    fn drag_without_anchor_is_ignored() {
        let mut t = trackball();
        t.drag_to(Vec2::new(10.0, 10.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn view_matrix_stays_orthonormal() {
        let mut t = trackball();
        t.begin_drag(Vec2::new(120.0, 80.0));
        for step in 0..20 {
            t.drag_to(Vec2::new(120.0 + step as f32 * 9.0, 80.0 + step as f32 * 5.0));
        }
        t.end_drag();
        assert!(!t.is_dragging());

        let m = t.view_matrix();
        let product = m * m.transpose();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn reset_restores_identity() {
        let mut t = trackball();
        t.begin_drag(Vec2::new(200.0, 200.0));
        t.drag_to(Vec2::new(250.0, 260.0));
        t.reset();
        assert_eq!(t.view_matrix(), Mat4::IDENTITY);
    }
}

use glam::Vec3;

use crate::config::LightOrbit;

impl LightOrbit {
    /// Light position after `time_ms` milliseconds. Pure function of time.
    pub fn position_at(&self, time_ms: f64) -> Vec3 {
        let angle = time_ms * self.angular_speed;
        Vec3::new(
            self.radius * angle.cos() as f32,
            self.height,
            self.radius * angle.sin() as f32 + self.center_z,
        )
    }
}

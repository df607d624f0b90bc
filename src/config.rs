use glam::Vec3;

pub const DEFAULT_U_STEPS: u32 = 50;
pub const DEFAULT_V_STEPS: u32 = 50;

/// Largest slider value; keeps `(steps + 1)^2` inside the 16-bit index range.
pub const MAX_STEPS: u32 = 200;

pub const TARGET_FPS: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadingParameters {
    pub ambient: f32,
    pub specular: f32,
    pub shininess: f32,
    pub color: [f32; 4],
    pub view_position: Vec3,
}

impl Default for ShadingParameters {
    fn default() -> Self {
        Self {
            ambient: 0.1,
            specular: 0.9,
            shininess: 10.0,
            color: [1.0, 0.1, 0.0, 1.0],
            view_position: Vec3::new(0.0, 0.0, 30.0),
        }
    }
}

/// Circular path of the point light. The angle advances by
/// `angular_speed` radians per millisecond.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightOrbit {
    pub radius: f32,
    pub height: f32,
    pub center_z: f32,
    pub angular_speed: f64,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self {
            radius: 5.0,
            height: 10.0,
            center_z: -50.0,
            angular_speed: 0.001,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelPlacement {
    pub axis: Vec3,
    pub angle: f32,
    pub translation: Vec3,
}

impl Default for ModelPlacement {
    fn default() -> Self {
        Self {
            axis: Vec3::new(1.0, 0.5, 0.5),
            angle: -60.0_f32.to_radians(),
            translation: Vec3::new(0.0, 0.0, -50.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionParameters {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self {
            fov_y: 22.5_f32.to_radians(),
            aspect: 1.0,
            near: 1.0,
            far: 60.0,
        }
    }
}

pub struct SceneConfig {
    pub title: &'static str,
    pub window_size: (u32, u32),
    pub target_fps: f64,
    pub default_steps: (u32, u32),
    pub shading: ShadingParameters,
    pub light: LightOrbit,
    pub placement: ModelPlacement,
    pub projection: ProjectionParameters,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "Richmond's Minimal Surface",
            window_size: (1280, 900),
            target_fps: TARGET_FPS,
            default_steps: (DEFAULT_U_STEPS, DEFAULT_V_STEPS),
            shading: ShadingParameters::default(),
            light: LightOrbit::default(),
            placement: ModelPlacement::default(),
            projection: ProjectionParameters::default(),
        }
    }
}

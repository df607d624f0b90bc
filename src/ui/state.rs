use crate::config::{DEFAULT_U_STEPS, DEFAULT_V_STEPS};

pub struct UiState {
    pub u_steps: u32,
    pub v_steps: u32,

    pub show_stats: bool,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            u_steps: DEFAULT_U_STEPS,
            v_steps: DEFAULT_V_STEPS,

            show_stats: true,
            show_help: true,
        }
    }
}

#[derive(Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub vertices: usize,
    pub triangles: usize,
    pub u_steps: u32,
    pub v_steps: u32,
}

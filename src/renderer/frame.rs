use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::config::{LightOrbit, ShadingParameters};
use crate::renderer::transform::TransformComposer;

pub const CLEAR_COLOR: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

/// Uniform block of the surface program. Field order and padding mirror the
/// `Shading` struct in `surface.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ShadingUniforms {
    pub model_view_projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub light_position: [f32; 3],
    pub ambient_strength: f32,
    pub view_position: [f32; 3],
    pub specular_strength: f32,
    pub shininess: f32,
    pub _padding: [f32; 3],
}

pub trait SurfacePass {
    fn clear(&mut self, color: [f64; 4]);
    fn set_uniforms(&mut self, uniforms: &ShadingUniforms);
    fn draw_indexed(&mut self, index_count: u32);
}

pub struct FrameRenderer {
    transforms: TransformComposer,
    light: LightOrbit,
}

impl FrameRenderer {
    pub fn new(transforms: TransformComposer, light: LightOrbit) -> Self {
        Self { transforms, light }
    }

    pub fn uniforms(&self, view: Mat4, time_ms: f64, shading: &ShadingParameters) -> ShadingUniforms {
        let set = self.transforms.compose(view);
        let light_position: Vec3 = self.light.position_at(time_ms);

        ShadingUniforms {
            model_view_projection: set.model_view_projection.to_cols_array_2d(),
            model_view: set.model_view.to_cols_array_2d(),
            color: shading.color,
            light_position: light_position.to_array(),
            ambient_strength: shading.ambient,
            view_position: shading.view_position.to_array(),
            specular_strength: shading.specular,
            shininess: shading.shininess,
            _padding: [0.0; 3],
        }
    }

    pub fn render_frame<P: SurfacePass + ?Sized>(
        &self,
        pass: &mut P,
        index_count: u32,
        view: Mat4,
        time_ms: f64,
        shading: &ShadingParameters,
    ) {
        pass.clear(CLEAR_COLOR);
        pass.set_uniforms(&self.uniforms(view, time_ms, shading));
        pass.draw_indexed(index_count);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    pub(crate) enum PassCall {
        Clear([f64; 4]),
        Uniforms(ShadingUniforms),
        Draw(u32),
    }

    #[derive(Default)]
    pub(crate) struct RecordingPass {
        pub calls: Vec<PassCall>,
    }

    impl SurfacePass for RecordingPass {
        fn clear(&mut self, color: [f64; 4]) {
            self.calls.push(PassCall::Clear(color));
        }

        fn set_uniforms(&mut self, uniforms: &ShadingUniforms) {
            self.calls.push(PassCall::Uniforms(*uniforms));
        }

        fn draw_indexed(&mut self, index_count: u32) {
            self.calls.push(PassCall::Draw(index_count));
        }
    }

    fn renderer() -> FrameRenderer {
        FrameRenderer::new(TransformComposer::default(), LightOrbit::default())
    }

    #[test]
    fn uniform_block_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<ShadingUniforms>(), 192);
        assert_eq!(std::mem::offset_of!(ShadingUniforms, color), 128);
        assert_eq!(std::mem::offset_of!(ShadingUniforms, light_position), 144);
        assert_eq!(std::mem::offset_of!(ShadingUniforms, view_position), 160);
        assert_eq!(std::mem::offset_of!(ShadingUniforms, shininess), 176);
    }

    #[test]
    fn frame_clears_uploads_then_draws_once() {
        let mut pass = RecordingPass::default();
        let shading = ShadingParameters::default();
        renderer().render_frame(&mut pass, 15_000, Mat4::IDENTITY, 0.0, &shading);

        assert_eq!(pass.calls.len(), 3);
        assert_eq!(pass.calls[0], PassCall::Clear(CLEAR_COLOR));
        assert!(matches!(pass.calls[1], PassCall::Uniforms(_)));
        assert_eq!(pass.calls[2], PassCall::Draw(15_000));
    }

    #[test]
    fn uniforms_carry_shading_constants_and_light() {
        let shading = ShadingParameters::default();
        let u = renderer().uniforms(Mat4::IDENTITY, 0.0, &shading);

        assert_eq!(u.light_position, [5.0, 10.0, -50.0]);
        assert_eq!(u.view_position, [0.0, 0.0, 30.0]);
        assert_eq!(u.color, [1.0, 0.1, 0.0, 1.0]);
        assert_eq!(u.ambient_strength, 0.1);
        assert_eq!(u.specular_strength, 0.9);
        assert_eq!(u.shininess, 10.0);
    }

    #[test]
    fn uniforms_follow_view_and_time() {
        let r = renderer();
        let shading = ShadingParameters::default();
        let view = Mat4::from_rotation_y(1.2);

        let u = r.uniforms(view, 1_000.0, &shading);
        let set = TransformComposer::default().compose(view);
        assert_eq!(u.model_view, set.model_view.to_cols_array_2d());
        assert_eq!(
            u.model_view_projection,
            set.model_view_projection.to_cols_array_2d()
        );
        assert_eq!(
            u.light_position,
            LightOrbit::default().position_at(1_000.0).to_array()
        );
    }
}

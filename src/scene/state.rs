use crate::error::MeshError;
use crate::math::mesh::{self, SurfaceMesh, SurfaceParameters};

pub trait MeshSink {
    fn upload_vertices(&mut self, vertices: &[f32]);
    fn upload_normals(&mut self, normals: &[f32]);
    fn upload_indices(&mut self, indices: &[u16]);
}

/// Owns the active mesh. Regeneration either replaces it entirely or leaves
/// it untouched.
pub struct RendererState {
    mesh: SurfaceMesh,
}

impl RendererState {
    pub fn new<S: MeshSink + ?Sized>(params: SurfaceParameters, sink: &mut S) -> Self {
        let mesh = mesh::generate_surface(params);
        upload(&mesh, sink);
        Self { mesh }
    }

    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    pub fn index_count(&self) -> u32 {
        self.mesh.index_count() as u32
    }

    pub fn regenerate<S: MeshSink + ?Sized>(
        &mut self,
        u_steps: f64,
        v_steps: f64,
        sink: &mut S,
    ) -> Result<&SurfaceMesh, MeshError> {
        let mesh = match mesh::generate(u_steps, v_steps) {
            Ok(m) => m,
            Err(e) => {
                log::error!("regeneration rejected, keeping current mesh: {}", e);
                return Err(e);
            }
        };

        upload(&mesh, sink);
        self.mesh = mesh;

        log::info!(
            "surface regenerated at {}x{} ({} triangles)",
            self.mesh.params.u_steps(),
            self.mesh.params.v_steps(),
            self.mesh.triangle_count()
        );
        Ok(&self.mesh)
    }
}

fn upload<S: MeshSink + ?Sized>(mesh: &SurfaceMesh, sink: &mut S) {
    sink.upload_vertices(&mesh.mesh.vertices);
    sink.upload_normals(&mesh.mesh.normals);
    sink.upload_indices(&mesh.mesh.indices);
}

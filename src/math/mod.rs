pub mod mesh;
pub mod richmond;

pub use mesh::SurfaceParameters;

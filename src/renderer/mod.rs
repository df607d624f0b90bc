pub mod frame;
pub mod gpu;
pub mod light;
pub mod trackball;
pub mod transform;

pub use frame::FrameRenderer;
pub use gpu::GpuState;
pub use trackball::Trackball;
pub use transform::TransformComposer;

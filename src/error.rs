use thiserror::Error;

/// Rejected tessellation request. The caller keeps whatever mesh it had.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("invalid tessellation parameter {axis} = {value}: must be a positive finite integer and fit an addressable grid")]
    InvalidTessellationParameter { axis: &'static str, value: f64 },
}

/// Fatal at startup; nothing is retried.
#[derive(Debug, Error)]
pub enum ContextError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create drawing surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("drawing surface reports no supported texture format")]
    NoSurfaceFormat,

    #[error("failed to acquire graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface shading program failed to build: {0}")]
    Program(String),

    #[error("initial surface rejected: {0}")]
    InitialMesh(#[from] MeshError),
}
